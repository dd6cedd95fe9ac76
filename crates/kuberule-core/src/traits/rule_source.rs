use crate::errors::RuleSourceError;
use crate::model::MutationRule;

/// Lists the rules visible in one scope (a namespace).
///
/// Each call must return an internally consistent snapshot. The engine never
/// retries a failed listing.
pub trait RuleSource: Send + Sync {
    fn list_rules(&self, scope: &str) -> Result<Vec<MutationRule>, RuleSourceError>;
}
