//! Scheduling affinity carried by fragments and targets.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::rule::LabelSelector;
use crate::constants::{MAX_TERM_WEIGHT, MIN_TERM_WEIGHT};
use crate::errors::FragmentViolation;

/// Pod scheduling constraints.
///
/// Every struct keeps fields it does not model in `extra`, so an affinity
/// passes through decode and encode unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Affinity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_affinity: Option<NodeAffinity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_affinity: Option<PodAffinity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_anti_affinity: Option<PodAffinity>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeAffinity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_during_scheduling_ignored_during_execution: Option<NodeSelector>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preferred_during_scheduling_ignored_during_execution: Vec<PreferredSchedulingTerm>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Disjunction of node selector terms.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSelector {
    #[serde(default)]
    pub node_selector_terms: Vec<NodeSelectorTerm>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Conjunction of node label expressions and node field expressions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSelectorTerm {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_expressions: Vec<NodeSelectorRequirement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_fields: Vec<NodeSelectorRequirement>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSelectorRequirement {
    pub key: String,
    pub operator: NodeSelectorOperator,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeSelectorOperator {
    In,
    NotIn,
    Exists,
    DoesNotExist,
    Gt,
    Lt,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferredSchedulingTerm {
    pub weight: i32,
    pub preference: NodeSelectorTerm,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Shared shape of pod affinity and pod anti-affinity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodAffinity {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_during_scheduling_ignored_during_execution: Vec<PodAffinityTerm>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preferred_during_scheduling_ignored_during_execution: Vec<WeightedPodAffinityTerm>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodAffinityTerm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<LabelSelector>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<String>,
    #[serde(default)]
    pub topology_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_selector: Option<LabelSelector>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_label_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mismatch_label_keys: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedPodAffinityTerm {
    pub weight: i32,
    pub pod_affinity_term: PodAffinityTerm,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Affinity {
    /// Check the internal consistency of every term.
    ///
    /// Returns the first violation found, with a field path relative to the
    /// affinity root.
    pub fn check_consistency(&self) -> Result<(), FragmentViolation> {
        if let Some(node) = &self.node_affinity {
            node.check_consistency("affinity.nodeAffinity")?;
        }
        if let Some(pod) = &self.pod_affinity {
            pod.check_consistency("affinity.podAffinity")?;
        }
        if let Some(anti) = &self.pod_anti_affinity {
            anti.check_consistency("affinity.podAntiAffinity")?;
        }
        Ok(())
    }
}

impl NodeAffinity {
    fn check_consistency(&self, field: &str) -> Result<(), FragmentViolation> {
        if let Some(required) = &self.required_during_scheduling_ignored_during_execution {
            let field = format!("{field}.requiredDuringSchedulingIgnoredDuringExecution");
            if required.node_selector_terms.is_empty() {
                return Err(FragmentViolation::new(
                    format!("{field}.nodeSelectorTerms"),
                    "must contain at least one term",
                ));
            }
            for (i, term) in required.node_selector_terms.iter().enumerate() {
                term.check_consistency(&format!("{field}.nodeSelectorTerms[{i}]"))?;
            }
        }
        for (i, preferred) in self
            .preferred_during_scheduling_ignored_during_execution
            .iter()
            .enumerate()
        {
            let field = format!("{field}.preferredDuringSchedulingIgnoredDuringExecution[{i}]");
            check_weight(&field, preferred.weight)?;
            preferred
                .preference
                .check_consistency(&format!("{field}.preference"))?;
        }
        Ok(())
    }
}

impl NodeSelectorTerm {
    fn check_consistency(&self, field: &str) -> Result<(), FragmentViolation> {
        for (i, requirement) in self.match_expressions.iter().enumerate() {
            requirement.check_consistency(&format!("{field}.matchExpressions[{i}]"))?;
        }
        for (i, requirement) in self.match_fields.iter().enumerate() {
            requirement.check_consistency(&format!("{field}.matchFields[{i}]"))?;
        }
        Ok(())
    }
}

impl NodeSelectorRequirement {
    pub fn new(
        key: impl Into<String>,
        operator: NodeSelectorOperator,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            key: key.into(),
            operator,
            values: values.into_iter().map(Into::into).collect(),
            extra: Map::new(),
        }
    }

    fn check_consistency(&self, field: &str) -> Result<(), FragmentViolation> {
        if self.key.is_empty() {
            return Err(FragmentViolation::new(format!("{field}.key"), "must not be empty"));
        }
        match self.operator {
            NodeSelectorOperator::In | NodeSelectorOperator::NotIn => {
                if self.values.is_empty() {
                    return Err(FragmentViolation::new(
                        format!("{field}.values"),
                        format!("must be non-empty for operator {:?}", self.operator),
                    ));
                }
            }
            NodeSelectorOperator::Exists | NodeSelectorOperator::DoesNotExist => {
                if !self.values.is_empty() {
                    return Err(FragmentViolation::new(
                        format!("{field}.values"),
                        format!("must be empty for operator {:?}", self.operator),
                    ));
                }
            }
            NodeSelectorOperator::Gt | NodeSelectorOperator::Lt => {
                let [value] = self.values.as_slice() else {
                    return Err(FragmentViolation::new(
                        format!("{field}.values"),
                        format!("must have exactly one value for operator {:?}", self.operator),
                    ));
                };
                if value.parse::<i64>().is_err() {
                    return Err(FragmentViolation::new(
                        format!("{field}.values[0]"),
                        format!("{value:?} is not an integer"),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl PodAffinity {
    fn check_consistency(&self, field: &str) -> Result<(), FragmentViolation> {
        for (i, term) in self
            .required_during_scheduling_ignored_during_execution
            .iter()
            .enumerate()
        {
            term.check_consistency(&format!(
                "{field}.requiredDuringSchedulingIgnoredDuringExecution[{i}]"
            ))?;
        }
        for (i, weighted) in self
            .preferred_during_scheduling_ignored_during_execution
            .iter()
            .enumerate()
        {
            let field = format!("{field}.preferredDuringSchedulingIgnoredDuringExecution[{i}]");
            check_weight(&field, weighted.weight)?;
            weighted
                .pod_affinity_term
                .check_consistency(&format!("{field}.podAffinityTerm"))?;
        }
        Ok(())
    }
}

impl PodAffinityTerm {
    fn check_consistency(&self, field: &str) -> Result<(), FragmentViolation> {
        if self.topology_key.is_empty() {
            return Err(FragmentViolation::new(
                format!("{field}.topologyKey"),
                "must not be empty",
            ));
        }
        if let Some(selector) = &self.label_selector {
            selector.check_consistency(&format!("{field}.labelSelector"))?;
        }
        if let Some(selector) = &self.namespace_selector {
            selector.check_consistency(&format!("{field}.namespaceSelector"))?;
        }
        Ok(())
    }
}

fn check_weight(field: &str, weight: i32) -> Result<(), FragmentViolation> {
    if !(MIN_TERM_WEIGHT..=MAX_TERM_WEIGHT).contains(&weight) {
        return Err(FragmentViolation::new(
            format!("{field}.weight"),
            format!("{weight} is outside {MIN_TERM_WEIGHT}..={MAX_TERM_WEIGHT}"),
        ));
    }
    Ok(())
}
