//! Admission request and response shapes.

use std::fmt;
use std::time::Duration;

use kuberule_core::model::Patch;

use super::AdmissionError;

/// Operation that triggered the admission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
    Connect,
}

impl Operation {
    /// Handlers are registered for create and update only.
    pub fn is_handled(self) -> bool {
        matches!(self, Self::Create | Self::Update)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Connect => "CONNECT",
        })
    }
}

/// Which admission chain a request arrives from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionPhase {
    Mutating,
    Validating,
}

/// An admission request after transport decoding.
#[derive(Debug, Clone)]
pub struct AdmissionRequest {
    pub uid: String,
    /// Resource kind, e.g. `Pod` or `PodRule`.
    pub kind: String,
    pub namespace: String,
    pub operation: Operation,
    /// Raw object bytes, decoded by the handler's codec.
    pub object: Vec<u8>,
    /// Time budget for the request. The pipeline checks it between rules.
    pub timeout: Option<Duration>,
}

impl AdmissionRequest {
    pub fn new(
        uid: impl Into<String>,
        kind: impl Into<String>,
        namespace: impl Into<String>,
        operation: Operation,
        object: Vec<u8>,
    ) -> Self {
        Self {
            uid: uid.into(),
            kind: kind.into(),
            namespace: namespace.into(),
            operation,
            object,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// The handler's verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct AdmissionResponse {
    pub uid: String,
    pub allowed: bool,
    /// Present only when there is something to change.
    pub patch: Option<Patch>,
    pub message: Option<String>,
    pub status_code: u16,
}

impl AdmissionResponse {
    /// Allowed, with `patch` attached when non-empty.
    pub fn patched(uid: &str, patch: Patch) -> Self {
        Self {
            uid: uid.to_string(),
            allowed: true,
            patch: (!patch.is_empty()).then_some(patch),
            message: None,
            status_code: 200,
        }
    }

    pub fn allowed(uid: &str, message: impl Into<String>) -> Self {
        Self {
            uid: uid.to_string(),
            allowed: true,
            patch: None,
            message: Some(message.into()),
            status_code: 200,
        }
    }

    pub fn denied(uid: &str, message: impl Into<String>) -> Self {
        Self {
            uid: uid.to_string(),
            allowed: false,
            patch: None,
            message: Some(message.into()),
            status_code: 403,
        }
    }

    pub fn from_error(uid: &str, error: &AdmissionError) -> Self {
        match error {
            AdmissionError::Denied(e) => Self::denied(uid, e.to_string()),
            other => Self {
                uid: uid.to_string(),
                allowed: false,
                patch: None,
                message: Some(other.to_string()),
                status_code: other.status_code(),
            },
        }
    }
}
