//! End-to-end tests for `select → merge → diff`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use kuberule_core::config::FailurePolicy;
use kuberule_core::errors::{PipelineError, RuleSourceError};
use kuberule_core::model::{
    MutationFragment, MutationRule, SecretRef, StringMap, TargetObject, Toleration,
    TolerationOperator,
};
use kuberule_core::traits::{Cancellable, CancellationToken, RuleSource, TargetCodec};
use kuberule_engine::patch::apply_to_target;
use kuberule_engine::{InMemoryRuleSource, JsonCodec, MutationPipeline, RuleSelector};
use serde_json::json;

fn web_pod() -> TargetObject {
    TargetObject::new("default", "web-0").with_label("app", "web")
}

fn annotations(entries: &[(&str, &str)]) -> StringMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn annotating(name: &str, order: i32, key: &str, value: &str) -> MutationRule {
    MutationRule::new(name, order)
        .with_selector("app", "web")
        .with_fragment(MutationFragment {
            annotations: annotations(&[(key, value)]),
            ..Default::default()
        })
}

/// Stops once `is_cancelled` has been polled more than `after` times.
struct CancelAfter {
    after: usize,
    polls: AtomicUsize,
}

impl CancelAfter {
    fn new(after: usize) -> Self {
        Self {
            after,
            polls: AtomicUsize::new(0),
        }
    }
}

impl Cancellable for CancelAfter {
    fn is_cancelled(&self) -> bool {
        self.polls.fetch_add(1, Ordering::SeqCst) >= self.after
    }

    fn cancel(&self) {
        self.polls.store(self.after, Ordering::SeqCst);
    }
}

struct FailingSource;

impl RuleSource for FailingSource {
    fn list_rules(&self, scope: &str) -> Result<Vec<MutationRule>, RuleSourceError> {
        Err(RuleSourceError::Unavailable {
            scope: scope.to_string(),
            message: "connection refused".into(),
        })
    }
}

#[test]
fn later_rule_wins_annotation_collision() {
    let rules = vec![
        annotating("r2", 2, "tier", "edge"),
        annotating("r1", 1, "tier", "frontend"),
    ];
    let target = web_pod();

    let selected = RuleSelector::select(&target, &rules).unwrap();
    let names: Vec<&str> = selected.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["r1", "r2"]);

    let outcome = MutationPipeline::with_defaults()
        .run(&target, &rules, &CancellationToken::new())
        .unwrap();
    assert_eq!(outcome.applied_rules, ["r1", "r2"]);
    assert_eq!(
        outcome.mutated.metadata.annotations,
        annotations(&[("tier", "edge")])
    );
    assert_eq!(
        serde_json::to_value(&outcome.patch).unwrap(),
        json!([{"op": "add", "path": "/metadata/annotations", "value": {"tier": "edge"}}])
    );
}

#[test]
fn first_node_selector_claims_the_field() {
    let rules = vec![
        MutationRule::new("zone-a", 1).with_fragment(MutationFragment {
            node_selector: annotations(&[("zone", "a")]),
            ..Default::default()
        }),
        MutationRule::new("zone-b", 2).with_fragment(MutationFragment {
            node_selector: annotations(&[("zone", "b"), ("disk", "ssd")]),
            ..Default::default()
        }),
    ];
    let outcome = MutationPipeline::with_defaults()
        .run(&web_pod(), &rules, &CancellationToken::new())
        .unwrap();
    assert_eq!(
        outcome.mutated.spec.node_selector,
        annotations(&[("zone", "a")])
    );
    assert_eq!(outcome.patch.paths(), ["/spec/nodeSelector"]);
}

#[test]
fn existing_node_selector_is_never_touched() {
    let mut target = web_pod();
    target
        .spec
        .node_selector
        .insert("pool".into(), "system".into());
    let rules = vec![MutationRule::new("zone-a", 1).with_fragment(MutationFragment {
        node_selector: annotations(&[("zone", "a")]),
        ..Default::default()
    })];
    let outcome = MutationPipeline::with_defaults()
        .run(&target, &rules, &CancellationToken::new())
        .unwrap();
    assert!(outcome.patch.is_empty());
    assert_eq!(outcome.applied_rules, ["zone-a"]);
}

#[test]
fn image_pull_secrets_are_deduplicated() {
    let secret_rule = |name: &str, order| {
        MutationRule::new(name, order).with_fragment(MutationFragment {
            image_pull_secrets: vec![SecretRef::new("regcred")],
            ..Default::default()
        })
    };
    let rules = vec![secret_rule("a", 1), secret_rule("b", 2)];
    let outcome = MutationPipeline::with_defaults()
        .run(&web_pod(), &rules, &CancellationToken::new())
        .unwrap();
    assert_eq!(
        outcome.mutated.spec.image_pull_secrets,
        vec![SecretRef::new("regcred")]
    );
}

#[test]
fn tolerations_are_not_idempotent() {
    let toleration = Toleration {
        key: Some("dedicated".into()),
        operator: Some(TolerationOperator::Exists),
        ..Default::default()
    };
    let rule = MutationRule::new("dedicated", 1).with_fragment(MutationFragment {
        tolerations: vec![toleration.clone()],
        ..Default::default()
    });
    let pipeline = MutationPipeline::with_defaults();
    let cancel = CancellationToken::new();

    let first = pipeline
        .run(&web_pod(), std::slice::from_ref(&rule), &cancel)
        .unwrap();
    let second = pipeline
        .run(&first.mutated, std::slice::from_ref(&rule), &cancel)
        .unwrap();
    assert_eq!(
        second.mutated.spec.tolerations,
        vec![toleration.clone(), toleration]
    );
    assert_eq!(second.patch.operations()[0].op(), "replace");
}

#[test]
fn patch_reproduces_the_merged_target() {
    let rules = vec![
        annotating("r1", 1, "tier", "frontend"),
        MutationRule::new("r2", 2).with_fragment(MutationFragment {
            node_selector: annotations(&[("zone", "a")]),
            image_pull_secrets: vec![SecretRef::new("regcred")],
            ..Default::default()
        }),
    ];
    let mut target = web_pod();
    target
        .metadata
        .annotations
        .insert("owner".into(), "team-a".into());
    target
        .spec
        .extra
        .insert("containers".into(), json!([{"name": "web", "image": "nginx"}]));

    let outcome = MutationPipeline::with_defaults()
        .run(&target, &rules, &CancellationToken::new())
        .unwrap();
    let patched = apply_to_target(&target, &outcome.patch).unwrap();
    assert_eq!(patched, outcome.mutated);
    assert_eq!(
        outcome.patch.paths(),
        [
            "/metadata/annotations",
            "/spec/nodeSelector",
            "/spec/imagePullSecrets"
        ]
    );
}

#[test]
fn affinity_fragment_is_forwarded_verbatim() {
    let affinity = json!({
        "nodeAffinity": {
            "requiredDuringSchedulingIgnoredDuringExecution": {
                "nodeSelectorTerms": [{
                    "matchExpressions": [
                        {"key": "topology.kubernetes.io/zone", "operator": "In", "values": ["a"]}
                    ],
                    "matchFields": [
                        {"key": "metadata.name", "operator": "NotIn", "values": ["node-7"]}
                    ]
                }]
            }
        },
        "podAntiAffinity": {
            "requiredDuringSchedulingIgnoredDuringExecution": [{
                "labelSelector": {
                    "matchExpressions": [{"key": "app", "operator": "In", "values": ["web"]}]
                },
                "namespaceSelector": {"matchLabels": {"team": "a"}},
                "matchLabelKeys": ["pod-template-hash"],
                "topologyKey": "kubernetes.io/hostname"
            }]
        }
    });
    let rule = json!({
        "apiVersion": "kuberule.chickenzord.com/v1alpha1",
        "kind": "PodRule",
        "metadata": {"name": "spread"},
        "spec": {
            "selector": {"matchLabels": {"app": "web"}},
            "mutations": {"affinity": affinity}
        }
    });
    let rule = JsonCodec.decode_rule(rule.to_string().as_bytes()).unwrap();

    let outcome = MutationPipeline::with_defaults()
        .run(&web_pod(), &[rule], &CancellationToken::new())
        .unwrap();
    assert_eq!(outcome.patch.paths(), ["/spec/affinity"]);
    assert_eq!(outcome.patch.operations()[0].value(), Some(&affinity));

    let encoded = JsonCodec.encode_target(&outcome.mutated).unwrap();
    let reencoded: serde_json::Value = serde_json::from_slice(&encoded).unwrap();
    assert_eq!(reencoded["spec"]["affinity"], affinity);
}

#[test]
fn no_matching_rules_yields_empty_patch() {
    let rules = vec![MutationRule::new("api", 1)
        .with_selector("app", "api")
        .with_fragment(MutationFragment {
            annotations: annotations(&[("x", "y")]),
            ..Default::default()
        })];
    let pipeline = MutationPipeline::with_defaults();
    let cancel = CancellationToken::new();

    let outcome = pipeline.run(&web_pod(), &rules, &cancel).unwrap();
    assert!(outcome.patch.is_empty());
    assert!(outcome.applied_rules.is_empty());

    let outcome = pipeline.run(&web_pod(), &[], &cancel).unwrap();
    assert!(outcome.patch.is_empty());
}

#[test]
fn malformed_candidate_fails_even_when_not_matching() {
    let rules = vec![
        annotating("r1", 1, "tier", "edge"),
        MutationRule::new("broken", -1).with_selector("app", "api"),
    ];
    let err = MutationPipeline::with_defaults()
        .run(&web_pod(), &rules, &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, PipelineError::MalformedRule(_)));
}

#[test]
fn invalid_fragment_aborts_without_patch() {
    let bad = Toleration {
        key: Some("dedicated".into()),
        operator: Some(TolerationOperator::Exists),
        value: Some("gpu".into()),
        ..Default::default()
    };
    let rules = vec![
        annotating("r1", 1, "tier", "edge"),
        MutationRule::new("r2", 2).with_fragment(MutationFragment {
            tolerations: vec![bad],
            ..Default::default()
        }),
    ];
    let target = web_pod();
    let snapshot = target.clone();
    match MutationPipeline::with_defaults().run(&target, &rules, &CancellationToken::new()) {
        Err(PipelineError::Merge(e)) => assert_eq!(e.rule(), "r2"),
        other => panic!("expected merge error, got {other:?}"),
    }
    assert_eq!(target, snapshot);
}

#[test]
fn cancellation_between_rules() {
    let rules = vec![
        annotating("r1", 1, "a", "1"),
        annotating("r2", 2, "b", "2"),
        annotating("r3", 3, "c", "3"),
    ];
    // One poll before selection, then one before each rule.
    let cancel = CancelAfter::new(2);
    match MutationPipeline::with_defaults().run(&web_pod(), &rules, &cancel) {
        Err(PipelineError::Cancelled { applied, total }) => {
            assert_eq!(applied, 1);
            assert_eq!(total, 3);
        }
        other => panic!("expected cancellation, got {other:?}"),
    }
}

#[test]
fn cancelled_token_stops_before_any_work() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = MutationPipeline::with_defaults()
        .run(&web_pod(), &[annotating("r1", 1, "a", "1")], &cancel)
        .unwrap_err();
    assert!(err.is_cancellation());
}

#[test]
fn expired_deadline_is_reported() {
    let cancel = CancellationToken::new().with_deadline(Instant::now() - Duration::from_millis(1));
    let err = MutationPipeline::with_defaults()
        .run(&web_pod(), &[annotating("r1", 1, "a", "1")], &cancel)
        .unwrap_err();
    assert!(matches!(err, PipelineError::DeadlineExceeded { applied: 0, .. }));
}

#[test]
fn source_failure_respects_failure_policy() {
    let cancel = CancellationToken::new();

    let failing = MutationPipeline::with_defaults();
    assert_eq!(failing.failure_policy(), FailurePolicy::Fail);
    let err = failing
        .run_with_source(&web_pod(), &FailingSource, &cancel)
        .unwrap_err();
    assert!(matches!(err, PipelineError::RuleSource(_)));

    let ignoring = MutationPipeline::with_defaults().with_failure_policy(FailurePolicy::Ignore);
    let outcome = ignoring
        .run_with_source(&web_pod(), &FailingSource, &cancel)
        .unwrap();
    assert!(outcome.patch.is_empty());
}

#[test]
fn source_rules_are_scoped_by_namespace() {
    let source = InMemoryRuleSource::from_rules([
        annotating("r1", 1, "scope", "default").in_namespace("default"),
        annotating("r1", 1, "scope", "ml").in_namespace("ml"),
    ]);
    let pipeline = MutationPipeline::with_defaults();
    let cancel = CancellationToken::new();

    let outcome = pipeline
        .run_with_source(&web_pod(), &source, &cancel)
        .unwrap();
    assert_eq!(outcome.mutated.metadata.annotations["scope"], "default");

    let ml_pod = TargetObject::new("ml", "trainer").with_label("app", "web");
    let outcome = pipeline.run_with_source(&ml_pod, &source, &cancel).unwrap();
    assert_eq!(outcome.mutated.metadata.annotations["scope"], "ml");
}

#[test]
fn batch_results_are_independent_and_ordered() {
    let rules = vec![annotating("r1", 1, "tier", "edge")];
    let targets: Vec<TargetObject> = (0..16)
        .map(|i| {
            let pod = TargetObject::new("default", format!("pod-{i}"));
            if i % 2 == 0 {
                pod.with_label("app", "web")
            } else {
                pod.with_label("app", "api")
            }
        })
        .collect();

    let results =
        MutationPipeline::with_defaults().run_batch(&targets, &rules, &CancellationToken::new());
    assert_eq!(results.len(), targets.len());
    for (i, result) in results.iter().enumerate() {
        let outcome = result.as_ref().unwrap();
        assert_eq!(outcome.mutated.display_name(), format!("pod-{i}"));
        assert_eq!(outcome.patch.is_empty(), i % 2 == 1);
    }
}

#[test]
fn cancelled_batch_fails_every_target() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let targets = vec![web_pod(), web_pod()];
    let results = MutationPipeline::with_defaults().run_batch(
        &targets,
        &[annotating("r1", 1, "a", "1")],
        &cancel,
    );
    assert!(results
        .iter()
        .all(|r| matches!(r, Err(e) if e.is_cancellation())));
}
