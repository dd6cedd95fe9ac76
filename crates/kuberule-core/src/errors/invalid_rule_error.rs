//! Write-time validation errors.

use super::error_code::{self, KuberuleErrorCode};
use super::FragmentViolation;

/// A rule was rejected before being stored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRuleError {
    #[error("podrule.spec.applyOrder must be >= 0")]
    NegativeApplyOrder { rule: String, order: i32 },

    #[error("podrule.metadata.name must not be empty")]
    MissingName,

    #[error("podrule.spec.selector.matchLabels has an empty key")]
    InvalidSelector { rule: String },

    #[error("podrule.spec.selector.matchExpressions is not supported, use matchLabels")]
    UnsupportedSelector { rule: String },

    #[error("podrule.spec.mutations.{violation}")]
    InvalidFragment {
        rule: String,
        #[source]
        violation: FragmentViolation,
    },
}

impl KuberuleErrorCode for InvalidRuleError {
    fn error_code(&self) -> &'static str {
        error_code::INVALID_RULE
    }
}
