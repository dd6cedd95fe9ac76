//! Merge engine: applies ordered rule fragments to an owned working copy.
//!
//! | Field              | Policy                          |
//! |--------------------|---------------------------------|
//! | annotations        | map union, last writer wins     |
//! | nodeSelector       | claimed once by the first rule  |
//! | affinity           | [`AffinityPolicy`]              |
//! | tolerations        | append, no dedup                |
//! | imagePullSecrets   | append, dedup by name           |
//!
//! [`AffinityPolicy`]: kuberule_core::config::AffinityPolicy

pub mod engine;
pub mod policies;

pub use engine::{MergeEngine, MergeOptions};
