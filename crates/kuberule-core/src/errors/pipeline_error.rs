//! Pipeline errors.

use super::error_code::{self, KuberuleErrorCode};
use super::{
    CodecError, ConfigError, InternalConsistencyError, MalformedRuleError, MergeError,
    RuleSourceError,
};

/// Errors that can end a `select → merge → diff` run.
/// Aggregates stage errors via `From` conversions.
///
/// Every variant means no patch was produced and the target is untouched.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Rule source error: {0}")]
    RuleSource(#[from] RuleSourceError),

    #[error("Malformed rule: {0}")]
    MalformedRule(#[from] MalformedRuleError),

    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    #[error("Internal consistency error: {0}")]
    InternalConsistency(#[from] InternalConsistencyError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline cancelled after {applied} of {total} rules")]
    Cancelled { applied: usize, total: usize },

    #[error("Pipeline deadline exceeded after {applied} of {total} rules")]
    DeadlineExceeded { applied: usize, total: usize },
}

impl PipelineError {
    /// True for caller-requested stops (explicit cancel or deadline).
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled { .. } | Self::DeadlineExceeded { .. })
    }
}

impl KuberuleErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::RuleSource(e) => e.error_code(),
            Self::MalformedRule(e) => e.error_code(),
            Self::Merge(e) => e.error_code(),
            Self::InternalConsistency(e) => e.error_code(),
            Self::Codec(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Cancelled { .. } => error_code::CANCELLED,
            Self::DeadlineExceeded { .. } => error_code::DEADLINE_EXCEEDED,
        }
    }
}
