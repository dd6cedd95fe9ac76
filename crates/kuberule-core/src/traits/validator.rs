use crate::errors::InvalidRuleError;
use crate::model::MutationRule;

/// Write-time rule gate. Runs before a rule is stored, never in the
/// mutation pipeline.
pub trait RuleValidator: Send + Sync {
    fn validate(&self, rule: &MutationRule) -> Result<(), InvalidRuleError>;
}
