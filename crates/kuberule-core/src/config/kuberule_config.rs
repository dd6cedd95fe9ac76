//! Top-level kube-rule configuration with layered resolution.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AffinityPolicy, AppConfig, FailurePolicy, MergeConfig, PipelineConfig, WebhookConfig};
use crate::constants::{CONFIG_FILE_NAME, POD_NAMESPACE_ENV};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Explicit overrides (applied via `apply_overrides`)
/// 2. Environment variables (`KUBERULE_*`)
/// 3. Project config (`kuberule.toml` in the given directory)
/// 4. `POD_NAMESPACE` as the namespace fallback
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KuberuleConfig {
    pub app: AppConfig,
    pub merge: MergeConfig,
    pub webhook: WebhookConfig,
    pub pipeline: PipelineConfig,
}

/// Override arguments that take precedence over every other layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub namespace: Option<String>,
    pub cert_dir: Option<String>,
    pub affinity_policy: Option<AffinityPolicy>,
    pub failure_policy: Option<FailurePolicy>,
}

impl KuberuleConfig {
    /// Load configuration with layered resolution.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 3: project config
        let project_config_path = root.join(CONFIG_FILE_NAME);
        if project_config_path.exists() {
            debug!(path = %project_config_path.display(), "loading project config");
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config)?;

        // Layer 1 (highest priority): explicit overrides
        if let Some(overrides) = overrides {
            Self::apply_overrides(&mut config, overrides);
        }

        Self::validate(&config)?;
        debug!(
            namespace = config.app.effective_namespace(),
            affinity_policy = %config.merge.effective_affinity_policy(),
            "configuration resolved"
        );

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &KuberuleConfig) -> Result<(), ConfigError> {
        if let Some(name) = &config.app.name {
            if name.trim().is_empty() {
                return Err(ConfigError::ValidationFailed {
                    field: "app.name".to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }
        if let Some(namespace) = &config.app.namespace {
            if namespace.trim().is_empty() {
                return Err(ConfigError::ValidationFailed {
                    field: "app.namespace".to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }
        if config.pipeline.batch_threads == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "pipeline.batch_threads".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        config.app.effective_service_selector()?;
        Ok(())
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut KuberuleConfig, path: &Path) -> Result<(), ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                path: path.display().to_string(),
            })?;

        let file_config: KuberuleConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`, where `other` values override `base` values
    /// only when `other` has a `Some` value.
    fn merge(base: &mut KuberuleConfig, other: &KuberuleConfig) {
        // App
        if other.app.name.is_some() {
            base.app.name = other.app.name.clone();
        }
        if other.app.namespace.is_some() {
            base.app.namespace = other.app.namespace.clone();
        }
        if other.app.cert_dir.is_some() {
            base.app.cert_dir = other.app.cert_dir.clone();
        }
        if other.app.service_name.is_some() {
            base.app.service_name = other.app.service_name.clone();
        }
        if other.app.secret_name.is_some() {
            base.app.secret_name = other.app.secret_name.clone();
        }
        if other.app.service_selector.is_some() {
            base.app.service_selector = other.app.service_selector.clone();
        }

        // Merge
        if other.merge.affinity_policy.is_some() {
            base.merge.affinity_policy = other.merge.affinity_policy;
        }

        // Webhook
        if other.webhook.failure_policy.is_some() {
            base.webhook.failure_policy = other.webhook.failure_policy;
        }

        // Pipeline
        if other.pipeline.batch_threads.is_some() {
            base.pipeline.batch_threads = other.pipeline.batch_threads;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `KUBERULE_APP_NAME`, `KUBERULE_MERGE_AFFINITY_POLICY`, etc.
    ///
    /// Unparseable enum values are errors; a typo in a policy name must not
    /// silently fall back to the default.
    fn apply_env_overrides(config: &mut KuberuleConfig) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("KUBERULE_APP_NAME") {
            config.app.name = Some(val);
        }
        if let Ok(val) = std::env::var("KUBERULE_NAMESPACE") {
            config.app.namespace = Some(val);
        }
        if config.app.namespace.is_none() {
            if let Ok(val) = std::env::var(POD_NAMESPACE_ENV) {
                debug!(namespace = %val, "namespace taken from {}", POD_NAMESPACE_ENV);
                config.app.namespace = Some(val);
            }
        }
        if let Ok(val) = std::env::var("KUBERULE_CERT_DIR") {
            config.app.cert_dir = Some(val);
        }
        if let Ok(val) = std::env::var("KUBERULE_SERVICE_NAME") {
            config.app.service_name = Some(val);
        }
        if let Ok(val) = std::env::var("KUBERULE_SECRET_NAME") {
            config.app.secret_name = Some(val);
        }
        if let Ok(val) = std::env::var("KUBERULE_SERVICE_SELECTOR") {
            config.app.service_selector = Some(val);
        }
        if let Ok(val) = std::env::var("KUBERULE_MERGE_AFFINITY_POLICY") {
            let policy = AffinityPolicy::from_str(&val).map_err(|message| {
                ConfigError::InvalidValue {
                    field: "merge.affinity_policy".to_string(),
                    message,
                }
            })?;
            config.merge.affinity_policy = Some(policy);
        }
        if let Ok(val) = std::env::var("KUBERULE_WEBHOOK_FAILURE_POLICY") {
            let policy = FailurePolicy::from_str(&val).map_err(|message| {
                ConfigError::InvalidValue {
                    field: "webhook.failure_policy".to_string(),
                    message,
                }
            })?;
            config.webhook.failure_policy = Some(policy);
        }
        if let Ok(val) = std::env::var("KUBERULE_PIPELINE_BATCH_THREADS") {
            let threads = val.parse::<usize>().map_err(|e| ConfigError::InvalidValue {
                field: "pipeline.batch_threads".to_string(),
                message: format!("{val:?}: {e}"),
            })?;
            config.pipeline.batch_threads = Some(threads);
        }
        Ok(())
    }

    /// Apply explicit overrides (highest priority).
    fn apply_overrides(config: &mut KuberuleConfig, overrides: &ConfigOverrides) {
        if let Some(ref v) = overrides.namespace {
            config.app.namespace = Some(v.clone());
        }
        if let Some(ref v) = overrides.cert_dir {
            config.app.cert_dir = Some(v.clone());
        }
        if let Some(v) = overrides.affinity_policy {
            config.merge.affinity_policy = Some(v);
        }
        if let Some(v) = overrides.failure_policy {
            config.webhook.failure_policy = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}
