//! JSON Patch application through the `json-patch` crate.
//!
//! Used to verify generated patches and by callers that hold the target
//! locally instead of forwarding the patch.

use kuberule_core::errors::PatchError;
use kuberule_core::model::{Patch, TargetObject};
use serde_json::Value;

/// Apply `patch` to `doc` in order. On failure `doc` is left unchanged.
pub fn apply_patch(doc: &mut Value, patch: &Patch) -> Result<(), PatchError> {
    let wire = to_wire(patch)?;
    json_patch::patch(doc, &wire.0).map_err(|e| PatchError::Rejected {
        message: e.to_string(),
    })
}

/// Apply `patch` to a copy of `target` and decode the result.
pub fn apply_to_target(target: &TargetObject, patch: &Patch) -> Result<TargetObject, PatchError> {
    let mut doc = serde_json::to_value(target).map_err(|e| PatchError::InvalidDocument {
        message: e.to_string(),
    })?;
    apply_patch(&mut doc, patch)?;
    serde_json::from_value(doc).map_err(|e| PatchError::InvalidDocument {
        message: e.to_string(),
    })
}

// Both types share the RFC 6902 wire shape.
fn to_wire(patch: &Patch) -> Result<json_patch::Patch, PatchError> {
    serde_json::to_value(patch)
        .and_then(serde_json::from_value)
        .map_err(|e| PatchError::Malformed {
            message: e.to_string(),
        })
}
