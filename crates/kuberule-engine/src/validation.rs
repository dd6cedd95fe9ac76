//! Write-time rule validation.

use kuberule_core::errors::InvalidRuleError;
use kuberule_core::model::MutationRule;
use kuberule_core::traits::RuleValidator;
use tracing::debug;

/// Rejects rules the selector and merge engine must never see.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRuleValidator;

impl RuleValidator for DefaultRuleValidator {
    fn validate(&self, rule: &MutationRule) -> Result<(), InvalidRuleError> {
        if rule.name.is_empty() {
            return Err(InvalidRuleError::MissingName);
        }
        if rule.order < 0 {
            return Err(InvalidRuleError::NegativeApplyOrder {
                rule: rule.name.clone(),
                order: rule.order,
            });
        }
        if rule.selector.keys().any(|key| key.is_empty()) {
            return Err(InvalidRuleError::InvalidSelector {
                rule: rule.name.clone(),
            });
        }
        if !rule.selector_expressions.is_empty() {
            return Err(InvalidRuleError::UnsupportedSelector {
                rule: rule.name.clone(),
            });
        }
        rule.fragment
            .check_consistency()
            .map_err(|violation| InvalidRuleError::InvalidFragment {
                rule: rule.name.clone(),
                violation,
            })?;
        debug!(rule.name = %rule.name, rule.order = rule.order, "rule passed validation");
        Ok(())
    }
}
