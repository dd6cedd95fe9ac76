//! Rule, target, and patch model.
//!
//! Serialized shapes follow the Kubernetes resource representation
//! (`camelCase` keys, empty collections omitted).

pub mod affinity;
pub mod patch;
pub mod rule;
pub mod target;
pub mod toleration;

use std::collections::BTreeMap;

/// Ordered string map used for labels, annotations, and node selectors.
pub type StringMap = BTreeMap<String, String>;

pub use affinity::{
    Affinity, NodeAffinity, NodeSelector, NodeSelectorOperator, NodeSelectorRequirement,
    NodeSelectorTerm, PodAffinity, PodAffinityTerm, PreferredSchedulingTerm,
    WeightedPodAffinityTerm,
};
pub use patch::{Patch, PatchOperation};
pub use rule::{
    LabelSelector, LabelSelectorOperator, LabelSelectorRequirement, MutationFragment, MutationRule,
    RuleDocument,
};
pub use target::{ObjectMeta, SecretRef, TargetObject, TargetSpec};
pub use toleration::{TaintEffect, Toleration, TolerationOperator};
