//! # kuberule-core
//!
//! Foundation crate for the kube-rule mutation engine.
//! Defines the rule and target model, the error taxonomy, configuration,
//! collaborator traits, cancellation, tracing setup, and constants.
//! The engine crate depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod model;
pub mod tracing;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::KuberuleConfig;
pub use errors::PipelineError;
pub use model::{
    Affinity, MutationFragment, MutationRule, Patch, PatchOperation, SecretRef, StringMap,
    TargetObject, Toleration,
};
pub use traits::{Cancellable, CancellationToken, RuleSource, RuleValidator, TargetCodec};
