use std::sync::Arc;

use kuberule_core::traits::{RuleValidator, TargetCodec};
use tracing::info;

use super::{AdmissionError, AdmissionRequest};

/// Rejects invalid rules before they are stored.
pub struct RuleValidationHandler {
    codec: Arc<dyn TargetCodec>,
    validator: Arc<dyn RuleValidator>,
}

impl RuleValidationHandler {
    pub fn new(codec: Arc<dyn TargetCodec>, validator: Arc<dyn RuleValidator>) -> Self {
        Self { codec, validator }
    }

    pub fn apply(&self, request: &AdmissionRequest) -> Result<(), AdmissionError> {
        let rule = self.codec.decode_rule(&request.object)?;
        if let Err(e) = self.validator.validate(&rule) {
            info!(rule.name = %rule.name, reason = %e, "podrule rejected");
            return Err(e.into());
        }
        Ok(())
    }
}
