//! Patch application errors.

use super::error_code::{self, KuberuleErrorCode};

/// A patch could not be applied to a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    #[error("Patch is not a valid JSON Patch document: {message}")]
    Malformed { message: String },

    #[error("Patch operation rejected: {message}")]
    Rejected { message: String },

    #[error("Patched document is not a valid target: {message}")]
    InvalidDocument { message: String },
}

impl KuberuleErrorCode for PatchError {
    fn error_code(&self) -> &'static str {
        error_code::PATCH_ERROR
    }
}
