//! MutationPipeline: `select → merge → diff` for one target per call.

use std::sync::Arc;

use kuberule_core::config::{FailurePolicy, KuberuleConfig};
use kuberule_core::constants::DEFAULT_NAMESPACE;
use kuberule_core::errors::{ConfigError, PipelineError};
use kuberule_core::model::{MutationRule, Patch, TargetObject};
use kuberule_core::traits::{Cancellable, CancellationToken, RuleSource};
use rayon::prelude::*;
use tracing::{debug, info, info_span, warn};

use crate::merge::engine::stop_error;
use crate::merge::{MergeEngine, MergeOptions};
use crate::patch::PatchGenerator;
use crate::selector::RuleSelector;

/// Result of a successful pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    /// Minimal patch from the original to `mutated`.
    pub patch: Patch,
    /// Names of the applied rules, in application order.
    pub applied_rules: Vec<String>,
    /// The final working copy.
    pub mutated: TargetObject,
}

impl MutationOutcome {
    fn unchanged(target: &TargetObject) -> Self {
        Self {
            patch: Patch::new(),
            applied_rules: Vec::new(),
            mutated: target.clone(),
        }
    }
}

/// Stateless pipeline. Safe to share across threads; every run allocates
/// its own working copy and reads the rule snapshot without mutating it.
pub struct MutationPipeline {
    merge: MergeEngine,
    default_scope: String,
    failure_policy: FailurePolicy,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl MutationPipeline {
    /// Pipeline with the given merge options, scope fallback "default",
    /// and rule source failures propagated.
    pub fn new(options: MergeOptions) -> Self {
        Self {
            merge: MergeEngine::new(options),
            default_scope: DEFAULT_NAMESPACE.to_string(),
            failure_policy: FailurePolicy::Fail,
            pool: None,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(MergeOptions::default())
    }

    /// Build from resolved configuration. Rule source failures are still
    /// propagated; the admission surface opts into its own policy.
    pub fn from_config(config: &KuberuleConfig) -> Result<Self, ConfigError> {
        let pool = match config.pipeline.batch_threads {
            Some(threads) => Some(Arc::new(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("kuberule-batch-{i}"))
                    .build()
                    .map_err(|e| ConfigError::InvalidValue {
                        field: "pipeline.batch_threads".to_string(),
                        message: e.to_string(),
                    })?,
            )),
            None => None,
        };
        Ok(Self {
            merge: MergeEngine::from_config(config),
            default_scope: config.app.effective_namespace().to_string(),
            failure_policy: FailurePolicy::Fail,
            pool,
        })
    }

    /// Set what happens when the rule source fails.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    pub fn merge_engine(&self) -> &MergeEngine {
        &self.merge
    }

    /// Run the pipeline against an explicit rule snapshot.
    ///
    /// On any error no patch is produced and `target` is untouched.
    pub fn run(
        &self,
        target: &TargetObject,
        rules: &[MutationRule],
        cancel: &dyn Cancellable,
    ) -> Result<MutationOutcome, PipelineError> {
        let _span = info_span!("kuberule.pipeline", target.name = %target.display_name()).entered();

        if let Some(reason) = cancel.stop_reason() {
            return Err(stop_error(reason, 0, rules.len()));
        }

        let selected = RuleSelector::select(target, rules)?;
        debug!(
            rules.candidates = rules.len(),
            rules.selected = selected.len(),
            "selected rules"
        );
        if selected.is_empty() {
            return Ok(MutationOutcome::unchanged(target));
        }

        let mutated = self
            .merge
            .merge_cancellable(target.clone(), &selected, cancel)?;
        let patch = PatchGenerator::diff(target, &mutated)?;

        info!(
            target.name = %target.display_name(),
            rules.selected = selected.len(),
            patch.operations = patch.len(),
            "mutation computed"
        );

        Ok(MutationOutcome {
            patch,
            applied_rules: selected.iter().map(|r| r.name.clone()).collect(),
            mutated,
        })
    }

    /// List rules for the target's namespace (or the default scope) and run.
    pub fn run_with_source(
        &self,
        target: &TargetObject,
        source: &dyn RuleSource,
        cancel: &dyn Cancellable,
    ) -> Result<MutationOutcome, PipelineError> {
        let scope = target.namespace().unwrap_or(&self.default_scope);
        self.run_in_scope(target, scope, source, cancel)
    }

    /// List rules for `scope` and run.
    ///
    /// A listing failure is propagated under [`FailurePolicy::Fail`]; under
    /// [`FailurePolicy::Ignore`] it is logged and the target is left as is.
    pub fn run_in_scope(
        &self,
        target: &TargetObject,
        scope: &str,
        source: &dyn RuleSource,
        cancel: &dyn Cancellable,
    ) -> Result<MutationOutcome, PipelineError> {
        let rules = match source.list_rules(scope) {
            Ok(rules) => rules,
            Err(e) => match self.failure_policy {
                FailurePolicy::Fail => return Err(e.into()),
                FailurePolicy::Ignore => {
                    warn!(scope, error = %e, "rule listing failed, treating as no rules");
                    return Ok(MutationOutcome::unchanged(target));
                }
            },
        };
        self.run(target, &rules, cancel)
    }

    /// Run many independent targets in parallel against one snapshot.
    ///
    /// Results are in input order. A failure of one target does not affect
    /// the others. Cancelling `cancel` stops every run that has not finished.
    pub fn run_batch(
        &self,
        targets: &[TargetObject],
        rules: &[MutationRule],
        cancel: &CancellationToken,
    ) -> Vec<Result<MutationOutcome, PipelineError>> {
        let work = || -> Vec<Result<MutationOutcome, PipelineError>> {
            targets
                .par_iter()
                .map(|target| self.run(target, rules, cancel))
                .collect()
        };
        match &self.pool {
            Some(pool) => pool.install(work),
            None => work(),
        }
    }
}

impl Default for MutationPipeline {
    fn default() -> Self {
        Self::with_defaults()
    }
}
