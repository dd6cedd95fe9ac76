//! Rule listing errors.

use super::error_code::{self, KuberuleErrorCode};

/// The external rule store could not produce a snapshot.
///
/// Never retried inside the engine; the transport layer owns retry policy.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RuleSourceError {
    #[error("Rule source unavailable for scope {scope}: {message}")]
    Unavailable { scope: String, message: String },

    #[error("Rule listing for scope {scope} timed out after {timeout_ms}ms")]
    Timeout { scope: String, timeout_ms: u64 },

    #[error("Rule listing for scope {scope} returned undecodable data: {message}")]
    Decode { scope: String, message: String },
}

impl RuleSourceError {
    pub fn scope(&self) -> &str {
        match self {
            Self::Unavailable { scope, .. }
            | Self::Timeout { scope, .. }
            | Self::Decode { scope, .. } => scope,
        }
    }
}

impl KuberuleErrorCode for RuleSourceError {
    fn error_code(&self) -> &'static str {
        error_code::RULE_SOURCE_ERROR
    }
}
