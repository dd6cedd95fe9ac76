//! Process identity and webhook serving configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_APP_NAME, DEFAULT_CERT_DIR, DEFAULT_NAMESPACE};
use crate::errors::ConfigError;
use crate::model::StringMap;

/// Identity of the running webhook service.
///
/// Name, namespace and the serving fields below are resolved into a
/// `ServingIdentity` when the webhook set is built; the transport layer that
/// serves HTTPS and registers the webhooks reads them from there.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Application name. Default: "kuberule".
    pub name: Option<String>,
    /// Namespace the service runs in and fallback rule scope.
    /// Default: `POD_NAMESPACE`, else "default".
    pub namespace: Option<String>,
    /// Serving certificate directory. Default: "/tmp/cert".
    pub cert_dir: Option<String>,
    /// Service name. Default: the app name.
    pub service_name: Option<String>,
    /// Certificate secret name. Default: the app name.
    pub secret_name: Option<String>,
    /// Selector of the pods backing the service, `k=v,k2=v2`.
    /// Default: `app=<name>`.
    pub service_selector: Option<String>,
}

impl AppConfig {
    pub fn effective_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_APP_NAME)
    }

    pub fn effective_namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE)
    }

    pub fn effective_cert_dir(&self) -> &str {
        self.cert_dir.as_deref().unwrap_or(DEFAULT_CERT_DIR)
    }

    pub fn effective_service_name(&self) -> &str {
        self.service_name
            .as_deref()
            .unwrap_or_else(|| self.effective_name())
    }

    pub fn effective_secret_name(&self) -> &str {
        self.secret_name
            .as_deref()
            .unwrap_or_else(|| self.effective_name())
    }

    /// Parsed service selector.
    pub fn effective_service_selector(&self) -> Result<StringMap, ConfigError> {
        match &self.service_selector {
            Some(raw) => parse_selector(raw),
            None => {
                let mut selector = StringMap::new();
                selector.insert("app".to_string(), self.effective_name().to_string());
                Ok(selector)
            }
        }
    }
}

/// Parse an equality-based selector string (`a=b,c==d`) into a label map.
pub fn parse_selector(raw: &str) -> Result<StringMap, ConfigError> {
    let mut selector = StringMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((key, value)) = entry
            .split_once("==")
            .or_else(|| entry.split_once('='))
        else {
            return Err(ConfigError::InvalidValue {
                field: "app.service_selector".to_string(),
                message: format!("{entry:?} is not of the form key=value"),
            });
        };
        let key = key.trim();
        if key.is_empty() || key.contains('!') {
            return Err(ConfigError::InvalidValue {
                field: "app.service_selector".to_string(),
                message: format!("{entry:?} has an invalid key"),
            });
        }
        selector.insert(key.to_string(), value.trim().to_string());
    }
    Ok(selector)
}
