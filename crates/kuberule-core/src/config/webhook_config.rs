//! Admission webhook behavior.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What the admission surface does when the rule source fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Treat the failure as "no matching rules" and admit unchanged.
    #[default]
    Ignore,
    /// Reject the request.
    Fail,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignore => f.write_str("ignore"),
            Self::Fail => f.write_str("fail"),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ignore" => Ok(Self::Ignore),
            "fail" => Ok(Self::Fail),
            other => Err(format!(
                "unknown failure policy {other:?}, expected ignore or fail"
            )),
        }
    }
}

/// Configuration for the admission handlers.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WebhookConfig {
    /// Rule source failure policy. Default: ignore.
    pub failure_policy: Option<FailurePolicy>,
}

impl WebhookConfig {
    pub fn effective_failure_policy(&self) -> FailurePolicy {
        self.failure_policy.unwrap_or_default()
    }
}
