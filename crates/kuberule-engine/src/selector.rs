//! Rule selection: filter by label selector, order by (apply order, name).

use std::cmp::Ordering;

use kuberule_core::errors::MalformedRuleError;
use kuberule_core::model::{MutationRule, TargetObject};
use rustc_hash::FxHashSet;

/// Stateless rule selector.
pub struct RuleSelector;

impl RuleSelector {
    /// Return the candidates whose selectors match `target`'s labels, in
    /// application order.
    ///
    /// Every candidate is checked for the invariants the write-time
    /// validator guarantees, matching or not. A violation fails the request.
    pub fn select<'r>(
        target: &TargetObject,
        candidates: &'r [MutationRule],
    ) -> Result<Vec<&'r MutationRule>, MalformedRuleError> {
        Self::check_snapshot(candidates)?;

        let labels = target.labels();
        let mut selected: Vec<&MutationRule> = candidates
            .iter()
            .filter(|rule| rule.matches(labels))
            .collect();
        selected.sort_by(|a, b| Self::application_order(a, b));
        Ok(selected)
    }

    /// Ascending apply order, ties broken by name.
    pub fn application_order(a: &MutationRule, b: &MutationRule) -> Ordering {
        a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name))
    }

    fn check_snapshot(candidates: &[MutationRule]) -> Result<(), MalformedRuleError> {
        let mut names: FxHashSet<&str> = FxHashSet::default();
        for (index, rule) in candidates.iter().enumerate() {
            if rule.name.is_empty() {
                return Err(MalformedRuleError::MissingName { index });
            }
            if rule.order < 0 {
                return Err(MalformedRuleError::NegativeOrder {
                    rule: rule.name.clone(),
                    order: rule.order,
                });
            }
            if rule.selector.keys().any(|key| key.is_empty()) {
                return Err(MalformedRuleError::EmptySelectorKey {
                    rule: rule.name.clone(),
                });
            }
            if !rule.selector_expressions.is_empty() {
                return Err(MalformedRuleError::UnsupportedSelector {
                    rule: rule.name.clone(),
                });
            }
            // Name is the tie-breaker, so it has to be unique for the order to be total.
            if !names.insert(rule.name.as_str()) {
                return Err(MalformedRuleError::DuplicateName {
                    rule: rule.name.clone(),
                });
            }
        }
        Ok(())
    }
}
