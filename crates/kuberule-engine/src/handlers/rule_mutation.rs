use std::sync::Arc;

use kuberule_core::model::Patch;
use kuberule_core::traits::TargetCodec;
use tracing::info;

use super::{AdmissionError, AdmissionRequest};

/// Admits rules as submitted. Decoding still has to succeed.
pub struct RuleMutationHandler {
    codec: Arc<dyn TargetCodec>,
}

impl RuleMutationHandler {
    pub fn new(codec: Arc<dyn TargetCodec>) -> Self {
        Self { codec }
    }

    pub fn apply(&self, request: &AdmissionRequest) -> Result<Patch, AdmissionError> {
        let rule = self.codec.decode_rule(&request.object)?;
        info!(
            rule.name = %rule.name,
            request.namespace = %request.namespace,
            request.operation = %request.operation,
            "mutating podrule"
        );
        Ok(Patch::new())
    }
}
