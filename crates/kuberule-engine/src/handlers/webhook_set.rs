//! The registered handler set, routed by resource kind and phase.

use std::sync::Arc;

use kuberule_core::config::KuberuleConfig;
use kuberule_core::constants::{POD_KIND, POD_RULE_KIND, VERSION};
use kuberule_core::errors::ConfigError;
use kuberule_core::model::StringMap;
use kuberule_core::traits::{RuleSource, RuleValidator, TargetCodec};
use tracing::{debug, info};

use super::{
    AdmissionError, AdmissionHandler, AdmissionPhase, AdmissionRequest, AdmissionResponse,
    PodMutationHandler, RuleMutationHandler, RuleValidationHandler,
};
use crate::pipeline::MutationPipeline;

/// Names the serving layer needs to expose and register the webhooks:
/// the Service fronting the handlers, the Secret holding its certificate,
/// and the directory the certificate is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServingIdentity {
    pub service_name: String,
    pub secret_name: String,
    pub cert_dir: String,
    pub service_selector: StringMap,
}

impl ServingIdentity {
    pub fn from_config(config: &KuberuleConfig) -> Result<Self, ConfigError> {
        let app = &config.app;
        Ok(Self {
            service_name: app.effective_service_name().to_string(),
            secret_name: app.effective_secret_name().to_string(),
            cert_dir: app.effective_cert_dir().to_string(),
            service_selector: app.effective_service_selector()?,
        })
    }
}

pub struct WebhookSet {
    handlers: Vec<AdmissionHandler>,
    serving: ServingIdentity,
}

impl WebhookSet {
    /// Build the three handlers from resolved configuration.
    pub fn new(
        config: &KuberuleConfig,
        source: Arc<dyn RuleSource>,
        codec: Arc<dyn TargetCodec>,
        validator: Arc<dyn RuleValidator>,
    ) -> Result<Self, ConfigError> {
        let serving = ServingIdentity::from_config(config)?;
        let pipeline = Arc::new(
            MutationPipeline::from_config(config)?
                .with_failure_policy(config.webhook.effective_failure_policy()),
        );
        let handlers = vec![
            AdmissionHandler::PodMutation(PodMutationHandler::new(
                pipeline,
                source,
                Arc::clone(&codec),
            )),
            AdmissionHandler::RuleMutation(RuleMutationHandler::new(Arc::clone(&codec))),
            AdmissionHandler::RuleValidation(RuleValidationHandler::new(codec, validator)),
        ];
        info!(
            version = VERSION,
            namespace = config.app.effective_namespace(),
            failure_policy = %config.webhook.effective_failure_policy(),
            service = %serving.service_name,
            "registered {} webhooks",
            handlers.len()
        );
        Ok(Self { handlers, serving })
    }

    /// Resolved serving names, for the layer that exposes the handlers.
    pub fn serving(&self) -> &ServingIdentity {
        &self.serving
    }

    pub fn handlers(&self) -> &[AdmissionHandler] {
        &self.handlers
    }

    /// Registered webhook names, in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(AdmissionHandler::name).collect()
    }

    /// Handler for `kind` in `phase`, if one is registered.
    pub fn route(&self, kind: &str, phase: AdmissionPhase) -> Option<&AdmissionHandler> {
        self.handlers.iter().find(|h| {
            h.phase() == phase
                && matches!(
                    (h, kind),
                    (AdmissionHandler::PodMutation(_), POD_KIND)
                        | (AdmissionHandler::RuleMutation(_), POD_RULE_KIND)
                        | (AdmissionHandler::RuleValidation(_), POD_RULE_KIND)
                )
        })
    }

    /// Answer one admission request.
    ///
    /// Delete and connect requests pass through without a patch. An
    /// unrouted kind is a bad request.
    pub fn review(&self, phase: AdmissionPhase, request: &AdmissionRequest) -> AdmissionResponse {
        if !request.operation.is_handled() {
            debug!(operation = %request.operation, kind = %request.kind, "passing through");
            return AdmissionResponse::patched(&request.uid, Default::default());
        }
        match self.route(&request.kind, phase) {
            Some(handler) => handler.handle(request),
            None => AdmissionResponse::from_error(
                &request.uid,
                &AdmissionError::UnsupportedKind {
                    kind: request.kind.clone(),
                    phase: match phase {
                        AdmissionPhase::Mutating => "mutating",
                        AdmissionPhase::Validating => "validating",
                    },
                },
            ),
        }
    }
}
