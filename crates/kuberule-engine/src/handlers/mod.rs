//! Admission handlers. A closed set of variants, dispatched on resource
//! kind at the boundary.

pub mod error;
pub mod pod_mutation;
pub mod rule_mutation;
pub mod rule_validation;
pub mod types;
pub mod webhook_set;

pub use error::AdmissionError;
pub use pod_mutation::PodMutationHandler;
pub use rule_mutation::RuleMutationHandler;
pub use rule_validation::RuleValidationHandler;
pub use types::{AdmissionPhase, AdmissionRequest, AdmissionResponse, Operation};
pub use webhook_set::{ServingIdentity, WebhookSet};

use kuberule_core::constants::webhooks;
use kuberule_core::model::Patch;
use tracing::warn;

/// One admission handler. Each variant implements
/// `apply(request) -> Result<Patch, AdmissionError>`.
pub enum AdmissionHandler {
    PodMutation(PodMutationHandler),
    RuleMutation(RuleMutationHandler),
    RuleValidation(RuleValidationHandler),
}

impl AdmissionHandler {
    /// Webhook name the handler is registered under.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PodMutation(_) => webhooks::MUTATE_PODS,
            Self::RuleMutation(_) => webhooks::MUTATE_POD_RULES,
            Self::RuleValidation(_) => webhooks::VALIDATE_POD_RULES,
        }
    }

    pub fn phase(&self) -> AdmissionPhase {
        match self {
            Self::PodMutation(_) | Self::RuleMutation(_) => AdmissionPhase::Mutating,
            Self::RuleValidation(_) => AdmissionPhase::Validating,
        }
    }

    /// Run the handler without shaping a response.
    pub fn apply(&self, request: &AdmissionRequest) -> Result<Patch, AdmissionError> {
        match self {
            Self::PodMutation(h) => h.apply(request),
            Self::RuleMutation(h) => h.apply(request),
            Self::RuleValidation(h) => h.apply(request).map(|()| Patch::new()),
        }
    }

    /// Run the handler and shape the admission response.
    pub fn handle(&self, request: &AdmissionRequest) -> AdmissionResponse {
        match self.apply(request) {
            Ok(patch) => match self.phase() {
                AdmissionPhase::Mutating => AdmissionResponse::patched(&request.uid, patch),
                AdmissionPhase::Validating => AdmissionResponse::allowed(&request.uid, "OK"),
            },
            Err(e) => {
                if e.status_code() >= 500 {
                    warn!(
                        handler = self.name(),
                        request.namespace = %request.namespace,
                        error = %e,
                        "admission request failed"
                    );
                }
                AdmissionResponse::from_error(&request.uid, &e)
            }
        }
    }
}
