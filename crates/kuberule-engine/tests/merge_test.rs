//! Merge engine behavior across rules and policies.

use kuberule_core::config::{AffinityPolicy, KuberuleConfig};
use kuberule_core::errors::MergeError;
use kuberule_core::model::{
    Affinity, MutationFragment, MutationRule, NodeAffinity, NodeSelector, NodeSelectorOperator,
    NodeSelectorRequirement, NodeSelectorTerm, PreferredSchedulingTerm, TargetObject,
};
use kuberule_engine::{MergeEngine, MergeOptions};

fn zone_affinity(zone: &str) -> Affinity {
    Affinity {
        node_affinity: Some(NodeAffinity {
            required_during_scheduling_ignored_during_execution: Some(NodeSelector {
                node_selector_terms: vec![NodeSelectorTerm {
                    match_expressions: vec![NodeSelectorRequirement::new(
                        "topology.kubernetes.io/zone",
                        NodeSelectorOperator::In,
                        [zone],
                    )],
                    ..Default::default()
                }],
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn affinity_rule(name: &str, order: i32, affinity: Affinity) -> MutationRule {
    MutationRule::new(name, order).with_fragment(MutationFragment {
        affinity: Some(affinity),
        ..Default::default()
    })
}

#[test]
fn fragment_wins_replaces_whole_affinity() {
    let mut target = TargetObject::new("default", "web-0");
    target.spec.affinity = Some(zone_affinity("a"));

    let merged = MergeEngine::default()
        .merge(target, &[affinity_rule("zone-b", 1, zone_affinity("b"))])
        .unwrap();
    assert_eq!(merged.spec.affinity, Some(zone_affinity("b")));
}

#[test]
fn no_clobber_keeps_existing_affinity() {
    let engine = MergeEngine::new(MergeOptions {
        affinity_policy: AffinityPolicy::NoClobber,
    });

    let mut target = TargetObject::new("default", "web-0");
    target.spec.affinity = Some(zone_affinity("a"));
    let merged = engine
        .merge(target, &[affinity_rule("zone-b", 1, zone_affinity("b"))])
        .unwrap();
    assert_eq!(merged.spec.affinity, Some(zone_affinity("a")));

    // With nothing set, the first fragment claims the field.
    let merged = engine
        .merge(
            TargetObject::new("default", "web-1"),
            &[
                affinity_rule("zone-b", 1, zone_affinity("b")),
                affinity_rule("zone-c", 2, zone_affinity("c")),
            ],
        )
        .unwrap();
    assert_eq!(merged.spec.affinity, Some(zone_affinity("b")));
}

#[test]
fn engine_reads_policy_from_config() {
    let config = KuberuleConfig::from_toml("[merge]\naffinity_policy = \"no_clobber\"\n").unwrap();
    let engine = MergeEngine::from_config(&config);
    assert_eq!(engine.options().affinity_policy, AffinityPolicy::NoClobber);
}

#[test]
fn inconsistent_affinity_is_rejected() {
    let bad = Affinity {
        node_affinity: Some(NodeAffinity {
            preferred_during_scheduling_ignored_during_execution: vec![PreferredSchedulingTerm {
                weight: 0,
                ..Default::default()
            }],
            ..Default::default()
        }),
        ..Default::default()
    };
    let err = MergeEngine::default()
        .merge(
            TargetObject::new("default", "web-0"),
            &[affinity_rule("weightless", 1, bad)],
        )
        .unwrap_err();
    let MergeError::InvalidFragment { rule, violation } = err;
    assert_eq!(rule, "weightless");
    assert!(violation.field.contains("preferredDuringSchedulingIgnoredDuringExecution[0]"));
}

#[test]
fn failing_rule_applies_none_of_its_fields() {
    let rule = MutationRule::new("half", 1).with_fragment(MutationFragment {
        annotations: [("tier".to_string(), "edge".to_string())].into(),
        affinity: Some(Affinity {
            node_affinity: Some(NodeAffinity {
                required_during_scheduling_ignored_during_execution: Some(NodeSelector::default()),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    });
    let mut working = TargetObject::new("default", "web-0");
    assert!(MergeEngine::default().apply_rule(&mut working, &rule).is_err());
    assert!(working.metadata.annotations.is_empty());
}

#[test]
fn merge_accepts_borrowed_rules() {
    let rules = [
        MutationRule::new("a", 1).with_fragment(MutationFragment {
            annotations: [("a".to_string(), "1".to_string())].into(),
            ..Default::default()
        }),
        MutationRule::new("b", 2).with_fragment(MutationFragment {
            annotations: [("b".to_string(), "2".to_string())].into(),
            ..Default::default()
        }),
    ];
    let borrowed: Vec<&MutationRule> = rules.iter().collect();
    let merged = MergeEngine::default()
        .merge(TargetObject::new("default", "web-0"), &borrowed)
        .unwrap();
    assert_eq!(merged.metadata.annotations.len(), 2);
}
