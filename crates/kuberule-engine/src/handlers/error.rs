//! Handler-level errors and their HTTP status mapping.

use kuberule_core::errors::{CodecError, InvalidRuleError, KuberuleErrorCode, PipelineError};

#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    /// The request object could not be decoded.
    #[error("bad request: {0}")]
    BadRequest(#[from] CodecError),

    /// The pipeline failed; no patch.
    #[error("{}", .0.coded_string())]
    Pipeline(#[from] PipelineError),

    /// A rule failed validation.
    #[error("{0}")]
    Denied(#[from] InvalidRuleError),

    #[error("no handler for kind {kind} in the {phase} chain")]
    UnsupportedKind { kind: String, phase: &'static str },
}

impl AdmissionError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::UnsupportedKind { .. } => 400,
            Self::Denied(_) => 403,
            Self::Pipeline(_) => 500,
        }
    }
}
