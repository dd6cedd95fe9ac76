//! In-memory rule store keyed by scope.

use std::collections::HashMap;
use std::sync::RwLock;

use kuberule_core::constants::DEFAULT_NAMESPACE;
use kuberule_core::errors::RuleSourceError;
use kuberule_core::model::MutationRule;
use kuberule_core::traits::RuleSource;

/// A [`RuleSource`] backed by a map of scope to rules.
///
/// Every listing clones the scope's rules under a read lock, so callers get
/// a consistent snapshot even while rules are being replaced.
#[derive(Debug, Default)]
pub struct InMemoryRuleSource {
    scopes: RwLock<HashMap<String, Vec<MutationRule>>>,
}

impl InMemoryRuleSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source from rules, each stored under its own namespace
    /// (or "default").
    pub fn from_rules(rules: impl IntoIterator<Item = MutationRule>) -> Self {
        let source = Self::new();
        for rule in rules {
            source.upsert(rule);
        }
        source
    }

    /// Insert a rule, replacing any rule with the same name in its scope.
    pub fn upsert(&self, rule: MutationRule) {
        let scope = rule
            .namespace
            .clone()
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        let mut scopes = self.scopes.write().unwrap_or_else(|e| e.into_inner());
        let rules = scopes.entry(scope).or_default();
        match rules.iter_mut().find(|r| r.name == rule.name) {
            Some(existing) => *existing = rule,
            None => rules.push(rule),
        }
    }

    /// Remove a rule by scope and name. Returns the removed rule.
    pub fn remove(&self, scope: &str, name: &str) -> Option<MutationRule> {
        let mut scopes = self.scopes.write().unwrap_or_else(|e| e.into_inner());
        let rules = scopes.get_mut(scope)?;
        let index = rules.iter().position(|r| r.name == name)?;
        Some(rules.remove(index))
    }

    /// Number of rules across all scopes.
    pub fn len(&self) -> usize {
        let scopes = self.scopes.read().unwrap_or_else(|e| e.into_inner());
        scopes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RuleSource for InMemoryRuleSource {
    fn list_rules(&self, scope: &str) -> Result<Vec<MutationRule>, RuleSourceError> {
        let scopes = self.scopes.read().map_err(|_| RuleSourceError::Unavailable {
            scope: scope.to_string(),
            message: "rule store lock poisoned".to_string(),
        })?;
        Ok(scopes.get(scope).cloned().unwrap_or_default())
    }
}
