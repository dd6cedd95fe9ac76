//! Read-time rule precondition failures.

use super::error_code::{self, KuberuleErrorCode};

/// A candidate rule broke an invariant the write-time validator guarantees.
///
/// Seeing one of these means a rule reached the selector without passing
/// validation. The request fails rather than skipping the rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedRuleError {
    #[error("Rule {rule} has negative apply order {order}")]
    NegativeOrder { rule: String, order: i32 },

    #[error("Rule at position {index} has no name")]
    MissingName { index: usize },

    #[error("Rule {rule} has an empty selector key")]
    EmptySelectorKey { rule: String },

    #[error("Rule {rule} uses selector expressions, which are not evaluated")]
    UnsupportedSelector { rule: String },

    #[error("Rule name {rule} appears more than once in the snapshot")]
    DuplicateName { rule: String },
}

impl KuberuleErrorCode for MalformedRuleError {
    fn error_code(&self) -> &'static str {
        error_code::MALFORMED_RULE
    }
}
