//! Contract violations between pipeline stages.

use super::error_code::{self, KuberuleErrorCode};

/// The working copy handed to the patch generator does not derive from the
/// original. Always a caller bug.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InternalConsistencyError {
    #[error("Identity field {field} differs: original {original:?}, working copy {mutated:?}")]
    IdentityMismatch {
        field: &'static str,
        original: Option<String>,
        mutated: Option<String>,
    },

    #[error("Field {field} is outside the mutable set but was changed")]
    ImmutableFieldChanged { field: &'static str },

    #[error("Field {field} could not be serialized: {message}")]
    Serialization { field: &'static str, message: String },
}

impl KuberuleErrorCode for InternalConsistencyError {
    fn error_code(&self) -> &'static str {
        error_code::INTERNAL_CONSISTENCY
    }
}
