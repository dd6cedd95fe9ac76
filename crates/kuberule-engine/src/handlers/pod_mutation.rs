use std::sync::Arc;

use kuberule_core::model::Patch;
use kuberule_core::traits::{CancellationToken, RuleSource, TargetCodec};
use tracing::info;

use super::{AdmissionError, AdmissionRequest};
use crate::pipeline::MutationPipeline;

/// Mutates incoming pods with the rules of the request namespace.
pub struct PodMutationHandler {
    pipeline: Arc<MutationPipeline>,
    source: Arc<dyn RuleSource>,
    codec: Arc<dyn TargetCodec>,
}

impl PodMutationHandler {
    pub fn new(
        pipeline: Arc<MutationPipeline>,
        source: Arc<dyn RuleSource>,
        codec: Arc<dyn TargetCodec>,
    ) -> Self {
        Self {
            pipeline,
            source,
            codec,
        }
    }

    pub fn apply(&self, request: &AdmissionRequest) -> Result<Patch, AdmissionError> {
        let target = self.codec.decode_target(&request.object)?;

        info!(
            request.namespace = %request.namespace,
            request.operation = %request.operation,
            target.name = %target.display_name(),
            "receiving pod to handle"
        );

        let cancel = match request.timeout {
            Some(timeout) => CancellationToken::new().with_timeout(timeout),
            None => CancellationToken::new(),
        };
        let scope = if request.namespace.is_empty() {
            target.namespace().unwrap_or_default()
        } else {
            request.namespace.as_str()
        };
        let outcome = if scope.is_empty() {
            self.pipeline
                .run_with_source(&target, self.source.as_ref(), &cancel)?
        } else {
            self.pipeline
                .run_in_scope(&target, scope, self.source.as_ref(), &cancel)?
        };
        Ok(outcome.patch)
    }
}
