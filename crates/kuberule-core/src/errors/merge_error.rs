//! Merge errors.

use super::error_code::{self, KuberuleErrorCode};

/// A structural inconsistency inside a fragment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} {message}")]
pub struct FragmentViolation {
    /// Field path relative to the fragment root, e.g. `tolerations[1].value`.
    pub field: String,
    pub message: String,
}

impl FragmentViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A fragment could not be applied. Aborts the whole request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    #[error("Rule {rule} has an invalid fragment: {violation}")]
    InvalidFragment {
        rule: String,
        #[source]
        violation: FragmentViolation,
    },
}

impl MergeError {
    /// Name of the rule whose fragment failed.
    pub fn rule(&self) -> &str {
        match self {
            Self::InvalidFragment { rule, .. } => rule,
        }
    }
}

impl KuberuleErrorCode for MergeError {
    fn error_code(&self) -> &'static str {
        error_code::MERGE_ERROR
    }
}
