//! Encode/decode errors at the byte boundary.

use super::error_code::{self, KuberuleErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Failed to decode {kind}: {message}")]
    Decode { kind: &'static str, message: String },

    #[error("Failed to encode {kind}: {message}")]
    Encode { kind: &'static str, message: String },

    #[error("Expected kind {expected}, got {actual}")]
    KindMismatch { expected: &'static str, actual: String },
}

impl KuberuleErrorCode for CodecError {
    fn error_code(&self) -> &'static str {
        error_code::CODEC_ERROR
    }
}
