//! PatchGenerator: one operation per changed mutable field.

use kuberule_core::constants::paths;
use kuberule_core::errors::InternalConsistencyError;
use kuberule_core::model::{Patch, PatchOperation, TargetObject};
use serde::Serialize;
use serde_json::Value;

/// Stateless diff of the mutable field set.
pub struct PatchGenerator;

impl PatchGenerator {
    /// Diff `original` against `working`.
    ///
    /// Emits, in fixed field order, `add` for a field that was empty and now
    /// has a value, `replace` for a field that had a different value, and
    /// `remove` for a field that was cleared. Unchanged fields produce
    /// nothing, so the patch length equals the number of changed fields.
    /// The merge engine never clears a field, so pipeline patches only
    /// contain `add` and `replace`.
    pub fn diff(
        original: &TargetObject,
        working: &TargetObject,
    ) -> Result<Patch, InternalConsistencyError> {
        Self::check_compatible(original, working)?;

        let mut patch = Patch::new();
        field_op(
            &mut patch,
            paths::ANNOTATIONS,
            "metadata.annotations",
            &original.metadata.annotations,
            &working.metadata.annotations,
            |m| m.is_empty(),
        )?;
        field_op(
            &mut patch,
            paths::NODE_SELECTOR,
            "spec.nodeSelector",
            &original.spec.node_selector,
            &working.spec.node_selector,
            |m| m.is_empty(),
        )?;
        field_op(
            &mut patch,
            paths::AFFINITY,
            "spec.affinity",
            &original.spec.affinity,
            &working.spec.affinity,
            |a| a.is_none(),
        )?;
        field_op(
            &mut patch,
            paths::TOLERATIONS,
            "spec.tolerations",
            &original.spec.tolerations,
            &working.spec.tolerations,
            |t| t.is_empty(),
        )?;
        field_op(
            &mut patch,
            paths::IMAGE_PULL_SECRETS,
            "spec.imagePullSecrets",
            &original.spec.image_pull_secrets,
            &working.spec.image_pull_secrets,
            |s| s.is_empty(),
        )?;
        Ok(patch)
    }

    /// The working copy must derive from the original: same identity, and
    /// nothing outside the mutable set touched.
    fn check_compatible(
        original: &TargetObject,
        working: &TargetObject,
    ) -> Result<(), InternalConsistencyError> {
        let identity = [
            ("metadata.name", &original.metadata.name, &working.metadata.name),
            (
                "metadata.generateName",
                &original.metadata.generate_name,
                &working.metadata.generate_name,
            ),
            (
                "metadata.namespace",
                &original.metadata.namespace,
                &working.metadata.namespace,
            ),
            ("kind", &original.kind, &working.kind),
            ("apiVersion", &original.api_version, &working.api_version),
        ];
        for (field, before, after) in identity {
            if before != after {
                return Err(InternalConsistencyError::IdentityMismatch {
                    field,
                    original: before.clone(),
                    mutated: after.clone(),
                });
            }
        }

        if original.metadata.labels != working.metadata.labels {
            return Err(InternalConsistencyError::ImmutableFieldChanged {
                field: "metadata.labels",
            });
        }
        if original.metadata.extra != working.metadata.extra {
            return Err(InternalConsistencyError::ImmutableFieldChanged { field: "metadata" });
        }
        if original.spec.extra != working.spec.extra {
            return Err(InternalConsistencyError::ImmutableFieldChanged { field: "spec" });
        }
        if original.extra != working.extra {
            return Err(InternalConsistencyError::ImmutableFieldChanged { field: "<root>" });
        }
        Ok(())
    }
}

fn field_op<T, F>(
    patch: &mut Patch,
    path: &str,
    field: &'static str,
    before: &T,
    after: &T,
    is_empty: F,
) -> Result<(), InternalConsistencyError>
where
    T: PartialEq + Serialize,
    F: Fn(&T) -> bool,
{
    if before == after {
        return Ok(());
    }
    let path = path.to_string();
    let op = match (is_empty(before), is_empty(after)) {
        (_, true) => PatchOperation::Remove { path },
        (true, false) => PatchOperation::Add {
            path,
            value: to_value(field, after)?,
        },
        (false, false) => PatchOperation::Replace {
            path,
            value: to_value(field, after)?,
        },
    };
    patch.push(op);
    Ok(())
}

fn to_value<T: Serialize>(field: &'static str, value: &T) -> Result<Value, InternalConsistencyError> {
    serde_json::to_value(value).map_err(|e| InternalConsistencyError::Serialization {
        field,
        message: e.to_string(),
    })
}
