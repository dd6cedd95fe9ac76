//! Taint tolerations.

use serde::{Deserialize, Serialize};

use crate::errors::FragmentViolation;

/// A toleration of a node taint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toleration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<TolerationOperator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<TaintEffect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toleration_seconds: Option<i64>,
}

/// Missing operator means `Equal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TolerationOperator {
    Exists,
    Equal,
}

/// Missing effect matches every effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaintEffect {
    NoSchedule,
    PreferNoSchedule,
    NoExecute,
}

impl Toleration {
    /// Operator with the `Equal` default applied.
    pub fn effective_operator(&self) -> TolerationOperator {
        self.operator.unwrap_or(TolerationOperator::Equal)
    }

    /// Check that key, operator, value, and effect agree with each other.
    pub fn check_consistency(&self, field: &str) -> Result<(), FragmentViolation> {
        let operator = self.effective_operator();
        let has_value = self.value.as_deref().is_some_and(|v| !v.is_empty());
        let has_key = self.key.as_deref().is_some_and(|k| !k.is_empty());

        if operator == TolerationOperator::Exists && has_value {
            return Err(FragmentViolation::new(
                format!("{field}.value"),
                "must be empty when operator is Exists",
            ));
        }
        if !has_key && operator != TolerationOperator::Exists {
            return Err(FragmentViolation::new(
                format!("{field}.operator"),
                "must be Exists when key is empty",
            ));
        }
        if self.toleration_seconds.is_some() && self.effect != Some(TaintEffect::NoExecute) {
            return Err(FragmentViolation::new(
                format!("{field}.tolerationSeconds"),
                "only allowed with effect NoExecute",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exists_with_value_is_rejected() {
        let toleration = Toleration {
            key: Some("dedicated".into()),
            operator: Some(TolerationOperator::Exists),
            value: Some("gpu".into()),
            ..Default::default()
        };
        assert!(toleration.check_consistency("tolerations[0]").is_err());
    }

    #[test]
    fn empty_key_requires_exists() {
        let wildcard = Toleration {
            operator: Some(TolerationOperator::Exists),
            ..Default::default()
        };
        assert!(wildcard.check_consistency("tolerations[0]").is_ok());

        let equal = Toleration::default();
        let violation = equal.check_consistency("tolerations[0]").unwrap_err();
        assert_eq!(violation.field, "tolerations[0].operator");
    }

    #[test]
    fn toleration_seconds_needs_no_execute() {
        let mut toleration = Toleration {
            key: Some("node.kubernetes.io/unreachable".into()),
            operator: Some(TolerationOperator::Exists),
            effect: Some(TaintEffect::NoSchedule),
            toleration_seconds: Some(300),
            ..Default::default()
        };
        assert!(toleration.check_consistency("t").is_err());
        toleration.effect = Some(TaintEffect::NoExecute);
        assert!(toleration.check_consistency("t").is_ok());
    }
}
