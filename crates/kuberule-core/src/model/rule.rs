//! Mutation rules and their fragments.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::affinity::Affinity;
use super::target::SecretRef;
use super::toleration::Toleration;
use super::StringMap;
use crate::constants::{POD_RULE_API_VERSION, POD_RULE_KIND};
use crate::errors::FragmentViolation;

/// An ordered, selector-scoped set of mutations.
///
/// Serializes as a `PodRule` resource (see [`RuleDocument`]).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RuleDocument", into = "RuleDocument")]
pub struct MutationRule {
    pub name: String,
    /// Scope key the rule is listed under.
    pub namespace: Option<String>,
    /// Rank; higher applies later. Negative values never pass validation.
    pub order: i32,
    /// Exact label constraints. Empty matches every target.
    pub selector: StringMap,
    /// Set-based selector expressions as submitted. Rule selection does not
    /// evaluate them, so a rule carrying any is rejected.
    pub selector_expressions: Vec<LabelSelectorRequirement>,
    pub fragment: MutationFragment,
}

/// Field-level mutations contributed by one rule.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationFragment {
    #[serde(default, skip_serializing_if = "StringMap::is_empty")]
    pub annotations: StringMap,
    #[serde(default, skip_serializing_if = "StringMap::is_empty")]
    pub node_selector: StringMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity: Option<Affinity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tolerations: Vec<Toleration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_pull_secrets: Vec<SecretRef>,
}

/// Label selector, as used by rules and by pod affinity terms.
///
/// Only `matchLabels` takes part in rule selection. Inside an affinity term
/// the whole selector is carried through to the target unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    #[serde(default, skip_serializing_if = "StringMap::is_empty")]
    pub match_labels: StringMap,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_expressions: Vec<LabelSelectorRequirement>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelectorRequirement {
    pub key: String,
    pub operator: LabelSelectorOperator,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelSelectorOperator {
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

impl LabelSelector {
    /// Check that every expression agrees with its operator.
    pub fn check_consistency(&self, field: &str) -> Result<(), FragmentViolation> {
        for (i, requirement) in self.match_expressions.iter().enumerate() {
            let field = format!("{field}.matchExpressions[{i}]");
            if requirement.key.is_empty() {
                return Err(FragmentViolation::new(format!("{field}.key"), "must not be empty"));
            }
            let needs_values = matches!(
                requirement.operator,
                LabelSelectorOperator::In | LabelSelectorOperator::NotIn
            );
            if needs_values == requirement.values.is_empty() {
                let message = if needs_values {
                    "must be non-empty"
                } else {
                    "must be empty"
                };
                return Err(FragmentViolation::new(
                    format!("{field}.values"),
                    format!("{message} for operator {:?}", requirement.operator),
                ));
            }
        }
        Ok(())
    }
}

impl MutationRule {
    pub fn new(name: impl Into<String>, order: i32) -> Self {
        Self {
            name: name.into(),
            order,
            ..Default::default()
        }
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_selector(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.selector.insert(key.into(), value.into());
        self
    }

    pub fn with_fragment(mut self, fragment: MutationFragment) -> Self {
        self.fragment = fragment;
        self
    }

    /// True iff every selector entry is present in `labels` with an equal value.
    pub fn matches(&self, labels: &StringMap) -> bool {
        self.selector
            .iter()
            .all(|(key, value)| labels.get(key) == Some(value))
    }
}

impl MutationFragment {
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
            && self.node_selector.is_empty()
            && self.affinity.is_none()
            && self.tolerations.is_empty()
            && self.image_pull_secrets.is_empty()
    }

    /// Check the structural fields (affinity, tolerations, secret names).
    pub fn check_consistency(&self) -> Result<(), FragmentViolation> {
        if let Some(affinity) = &self.affinity {
            affinity.check_consistency()?;
        }
        for (i, toleration) in self.tolerations.iter().enumerate() {
            toleration.check_consistency(&format!("tolerations[{i}]"))?;
        }
        for (i, secret) in self.image_pull_secrets.iter().enumerate() {
            if secret.name.is_empty() {
                return Err(FragmentViolation::new(
                    format!("imagePullSecrets[{i}].name"),
                    "must not be empty",
                ));
            }
        }
        Ok(())
    }
}

/// Wire shape of a rule: a `PodRule` resource.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub metadata: RuleMeta,
    #[serde(default)]
    pub spec: RuleSpec,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RuleMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSpec {
    #[serde(default)]
    pub apply_order: i32,
    #[serde(default)]
    pub selector: LabelSelector,
    #[serde(default)]
    pub mutations: MutationFragment,
}

impl From<RuleDocument> for MutationRule {
    fn from(doc: RuleDocument) -> Self {
        Self {
            name: doc.metadata.name,
            namespace: doc.metadata.namespace,
            order: doc.spec.apply_order,
            selector: doc.spec.selector.match_labels,
            selector_expressions: doc.spec.selector.match_expressions,
            fragment: doc.spec.mutations,
        }
    }
}

impl From<MutationRule> for RuleDocument {
    fn from(rule: MutationRule) -> Self {
        Self {
            api_version: Some(POD_RULE_API_VERSION.to_string()),
            kind: Some(POD_RULE_KIND.to_string()),
            metadata: RuleMeta {
                name: rule.name,
                namespace: rule.namespace,
            },
            spec: RuleSpec {
                apply_order: rule.order,
                selector: LabelSelector {
                    match_labels: rule.selector,
                    match_expressions: rule.selector_expressions,
                    ..Default::default()
                },
                mutations: rule.fragment,
            },
        }
    }
}
