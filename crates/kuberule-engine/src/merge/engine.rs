//! MergeEngine: folds ordered rule fragments into a working copy.

use std::borrow::Borrow;

use kuberule_core::config::{AffinityPolicy, KuberuleConfig, MergeConfig};
use kuberule_core::errors::{MergeError, PipelineError};
use kuberule_core::model::{MutationRule, TargetObject};
use kuberule_core::traits::{Cancellable, StopReason};
use tracing::debug;

use super::policies;

/// Knobs that change merge semantics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    pub affinity_policy: AffinityPolicy,
}

impl From<&MergeConfig> for MergeOptions {
    fn from(config: &MergeConfig) -> Self {
        Self {
            affinity_policy: config.effective_affinity_policy(),
        }
    }
}

/// Applies rule fragments in order using the per-field policies.
///
/// The engine takes the working copy by value and hands back a new owned
/// value. On any error the working copy is dropped, so a failed request
/// leaves nothing behind.
#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    options: MergeOptions,
}

impl MergeEngine {
    pub fn new(options: MergeOptions) -> Self {
        Self { options }
    }

    pub fn from_config(config: &KuberuleConfig) -> Self {
        Self::new(MergeOptions::from(&config.merge))
    }

    pub fn options(&self) -> MergeOptions {
        self.options
    }

    /// Apply every rule in order.
    pub fn merge<R: Borrow<MutationRule>>(
        &self,
        working: TargetObject,
        rules: &[R],
    ) -> Result<TargetObject, MergeError> {
        let mut working = working;
        for rule in rules {
            self.apply_rule(&mut working, rule.borrow())?;
        }
        Ok(working)
    }

    /// Apply every rule in order, polling `cancel` before each one.
    pub fn merge_cancellable<R: Borrow<MutationRule>>(
        &self,
        working: TargetObject,
        rules: &[R],
        cancel: &dyn Cancellable,
    ) -> Result<TargetObject, PipelineError> {
        let total = rules.len();
        let mut working = working;
        for (applied, rule) in rules.iter().enumerate() {
            if let Some(reason) = cancel.stop_reason() {
                debug!(applied, total, ?reason, "merge stopped");
                return Err(stop_error(reason, applied, total));
            }
            self.apply_rule(&mut working, rule.borrow())?;
        }
        Ok(working)
    }

    /// Apply one rule's fragment. The whole fragment is checked first so a
    /// structural error never leaves a half-applied rule.
    pub fn apply_rule(
        &self,
        working: &mut TargetObject,
        rule: &MutationRule,
    ) -> Result<(), MergeError> {
        let fragment = &rule.fragment;
        fragment
            .check_consistency()
            .map_err(|violation| MergeError::InvalidFragment {
                rule: rule.name.clone(),
                violation,
            })?;

        let annotations =
            policies::merge_annotations(&mut working.metadata.annotations, &fragment.annotations);
        let node_selector =
            policies::claim_node_selector(&mut working.spec.node_selector, &fragment.node_selector);
        let affinity = policies::merge_affinity(
            &mut working.spec.affinity,
            fragment.affinity.as_ref(),
            self.options.affinity_policy,
        );
        let tolerations =
            policies::append_tolerations(&mut working.spec.tolerations, &fragment.tolerations);
        let secrets = policies::append_image_pull_secrets(
            &mut working.spec.image_pull_secrets,
            &fragment.image_pull_secrets,
        );

        debug!(
            rule.name = %rule.name,
            rule.order = rule.order,
            target.name = %working.display_name(),
            annotations,
            node_selector,
            affinity,
            tolerations,
            secrets_added = secrets,
            "applied rule fragment"
        );
        Ok(())
    }
}

pub(crate) fn stop_error(reason: StopReason, applied: usize, total: usize) -> PipelineError {
    match reason {
        StopReason::Cancelled => PipelineError::Cancelled { applied, total },
        StopReason::DeadlineExceeded => PipelineError::DeadlineExceeded { applied, total },
    }
}
