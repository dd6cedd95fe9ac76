//! # kuberule-engine
//!
//! Policy-driven pod mutation: pick the rules whose selectors match a
//! target, merge their fragments into an owned working copy with per-field
//! policies, and diff the result into a minimal JSON Patch.
//!
//! The pipeline is `select → merge → diff`, synchronous, and keeps no state
//! between requests. Independent targets can run in parallel against one
//! shared rule snapshot (see [`MutationPipeline::run_batch`]).

pub mod codec;
pub mod handlers;
pub mod merge;
pub mod patch;
pub mod pipeline;
pub mod selector;
pub mod source;
pub mod validation;

pub use codec::JsonCodec;
pub use handlers::{AdmissionHandler, AdmissionRequest, AdmissionResponse, WebhookSet};
pub use merge::{MergeEngine, MergeOptions};
pub use patch::{apply_patch, PatchGenerator};
pub use pipeline::{MutationOutcome, MutationPipeline};
pub use selector::RuleSelector;
pub use source::InMemoryRuleSource;
pub use validation::DefaultRuleValidator;
