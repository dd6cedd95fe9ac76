use kuberule_core::constants::paths;
use kuberule_core::model::{
    MutationFragment, MutationRule, SecretRef, StringMap, TargetObject, Toleration,
    TolerationOperator,
};
use kuberule_core::traits::CancellationToken;
use kuberule_engine::patch::apply_to_target;
use kuberule_engine::{MutationPipeline, RuleSelector};
use proptest::prelude::*;

fn label_map() -> impl Strategy<Value = StringMap> {
    prop::collection::btree_map("[a-c]", "[x-z]", 0..3)
}

type RuleSpec = (i32, StringMap, StringMap, StringMap, Vec<String>, Vec<String>);

/// Annotations, tolerated taint keys, and pull secrets the pod arrives with.
type Seed = (StringMap, Vec<String>, Vec<String>);

fn tolerating(key: String) -> Toleration {
    Toleration {
        key: Some(key),
        operator: Some(TolerationOperator::Exists),
        ..Default::default()
    }
}

fn rule_strategy() -> impl Strategy<Value = RuleSpec> {
    (
        0..5i32,
        label_map(),
        prop::collection::btree_map("[a-d]", "[0-9]{1,2}", 0..3),
        prop::collection::btree_map("[a-b]", "[p-q]", 0..2),
        prop::collection::vec("[r-s]", 0..3),
        prop::collection::vec("[t-u]", 0..2),
    )
}

fn seed_strategy() -> impl Strategy<Value = Seed> {
    (
        prop::collection::btree_map("[a-d]", "[0-9]{1,2}", 0..3),
        prop::collection::vec("[t-u]", 0..2),
        prop::collection::btree_set("[r-s]", 0..2).prop_map(|names| names.into_iter().collect()),
    )
}

fn rules_from(specs: Vec<RuleSpec>) -> Vec<MutationRule> {
    specs
        .into_iter()
        .enumerate()
        .map(
            |(i, (order, selector, annotations, node_selector, secrets, taints))| MutationRule {
                name: format!("rule-{i}"),
                namespace: None,
                order,
                selector,
                selector_expressions: Vec::new(),
                fragment: MutationFragment {
                    annotations,
                    node_selector,
                    tolerations: taints.into_iter().map(tolerating).collect(),
                    image_pull_secrets: secrets.into_iter().map(SecretRef::new).collect(),
                    ..Default::default()
                },
            },
        )
        .collect()
}

fn target_with(labels: StringMap) -> TargetObject {
    seeded_target(labels, Seed::default())
}

fn seeded_target(labels: StringMap, (annotations, taints, secrets): Seed) -> TargetObject {
    let mut target = TargetObject::new("default", "pod");
    target.metadata.labels = labels;
    target.metadata.annotations = annotations;
    target.spec.tolerations = taints.into_iter().map(tolerating).collect();
    target.spec.image_pull_secrets = secrets.into_iter().map(SecretRef::new).collect();
    target
}

/// Whether `path` already held a value on the incoming target.
fn was_present(target: &TargetObject, path: &str) -> bool {
    match path {
        paths::ANNOTATIONS => !target.metadata.annotations.is_empty(),
        paths::NODE_SELECTOR => !target.spec.node_selector.is_empty(),
        paths::AFFINITY => target.spec.affinity.is_some(),
        paths::TOLERATIONS => !target.spec.tolerations.is_empty(),
        paths::IMAGE_PULL_SECRETS => !target.spec.image_pull_secrets.is_empty(),
        _ => false,
    }
}

proptest! {
    #[test]
    fn selected_iff_selector_is_subset(labels in label_map(), specs in prop::collection::vec(rule_strategy(), 0..6)) {
        let target = target_with(labels.clone());
        let rules = rules_from(specs);
        let selected = RuleSelector::select(&target, &rules).unwrap();
        for rule in &rules {
            let is_subset = rule.selector.iter().all(|(k, v)| labels.get(k) == Some(v));
            let was_selected = selected.iter().any(|r| r.name == rule.name);
            prop_assert_eq!(is_subset, was_selected);
        }
        for pair in selected.windows(2) {
            prop_assert!((pair[0].order, &pair[0].name) <= (pair[1].order, &pair[1].name));
        }
    }

    #[test]
    fn patch_round_trips(
        labels in label_map(),
        seed in seed_strategy(),
        specs in prop::collection::vec(rule_strategy(), 0..6),
    ) {
        let target = seeded_target(labels, seed);
        let rules = rules_from(specs);
        let outcome = MutationPipeline::with_defaults()
            .run(&target, &rules, &CancellationToken::new())
            .unwrap();
        let patched = apply_to_target(&target, &outcome.patch).unwrap();
        prop_assert_eq!(patched, outcome.mutated.clone());

        for op in &outcome.patch {
            let expected = if was_present(&target, op.path()) { "replace" } else { "add" };
            prop_assert_eq!(op.op(), expected, "{}", op.path());
        }

        let mut names: Vec<&str> = outcome
            .mutated
            .spec
            .image_pull_secrets
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        let before = names.len();
        names.sort_unstable();
        names.dedup();
        prop_assert_eq!(before, names.len());
    }

    #[test]
    fn empty_rule_set_yields_empty_patch(labels in label_map()) {
        let target = target_with(labels);
        let outcome = MutationPipeline::with_defaults()
            .run(&target, &[], &CancellationToken::new())
            .unwrap();
        prop_assert!(outcome.patch.is_empty());
        prop_assert_eq!(outcome.mutated, target);
    }
}
