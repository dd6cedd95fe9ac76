//! Per-field merge policies.
//!
//! Each function mutates one field of the working copy and reports whether
//! it changed anything, for logging.

use kuberule_core::config::AffinityPolicy;
use kuberule_core::model::{Affinity, SecretRef, StringMap, Toleration};
use rustc_hash::FxHashSet;

/// Set or overwrite every fragment key. Later rules win on collision.
pub fn merge_annotations(working: &mut StringMap, fragment: &StringMap) -> bool {
    let mut changed = false;
    for (key, value) in fragment {
        if working.get(key) != Some(value) {
            working.insert(key.clone(), value.clone());
            changed = true;
        }
    }
    changed
}

/// Populate the node selector only while it is still empty.
///
/// The first rule with a non-empty node selector claims the field; every
/// later rule's entries are ignored, as are all rules when the target
/// arrived with a node selector of its own.
pub fn claim_node_selector(working: &mut StringMap, fragment: &StringMap) -> bool {
    if !working.is_empty() || fragment.is_empty() {
        return false;
    }
    working.extend(fragment.iter().map(|(k, v)| (k.clone(), v.clone())));
    true
}

/// Apply a fragment affinity according to `policy`.
pub fn merge_affinity(
    working: &mut Option<Affinity>,
    fragment: Option<&Affinity>,
    policy: AffinityPolicy,
) -> bool {
    let Some(affinity) = fragment else {
        return false;
    };
    match policy {
        AffinityPolicy::FragmentWins => {}
        AffinityPolicy::NoClobber if working.is_none() => {}
        AffinityPolicy::NoClobber => return false,
    }
    let changed = working.as_ref() != Some(affinity);
    *working = Some(affinity.clone());
    changed
}

/// Append every fragment toleration in order.
///
/// Not idempotent: applying the same fragment twice yields duplicate entries.
pub fn append_tolerations(working: &mut Vec<Toleration>, fragment: &[Toleration]) -> bool {
    working.extend_from_slice(fragment);
    !fragment.is_empty()
}

/// Append secrets whose name is not present yet. First occurrence wins.
/// Returns the number of entries added.
pub fn append_image_pull_secrets(working: &mut Vec<SecretRef>, fragment: &[SecretRef]) -> usize {
    if fragment.is_empty() {
        return 0;
    }
    let mut seen: FxHashSet<String> = working.iter().map(|s| s.name.clone()).collect();
    let before = working.len();
    for secret in fragment {
        if seen.insert(secret.name.clone()) {
            working.push(secret.clone());
        }
    }
    working.len() - before
}
