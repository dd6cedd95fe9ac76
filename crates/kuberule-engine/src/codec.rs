//! JSON implementation of the byte boundary.

use kuberule_core::constants::{POD_KIND, POD_RULE_KIND};
use kuberule_core::errors::CodecError;
use kuberule_core::model::{MutationRule, Patch, RuleDocument, TargetObject};
use kuberule_core::traits::TargetCodec;

/// Decodes and encodes the Kubernetes JSON representation.
///
/// A document without `kind` is accepted; a document with the wrong kind
/// is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    /// Serialize a patch to its wire bytes.
    pub fn encode_patch(&self, patch: &Patch) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(patch).map_err(|e| CodecError::Encode {
            kind: "patch",
            message: e.to_string(),
        })
    }

    pub fn encode_rule(&self, rule: &MutationRule) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(rule).map_err(|e| CodecError::Encode {
            kind: POD_RULE_KIND,
            message: e.to_string(),
        })
    }
}

impl TargetCodec for JsonCodec {
    fn decode_target(&self, bytes: &[u8]) -> Result<TargetObject, CodecError> {
        let target: TargetObject =
            serde_json::from_slice(bytes).map_err(|e| CodecError::Decode {
                kind: POD_KIND,
                message: e.to_string(),
            })?;
        check_kind(POD_KIND, target.kind.as_deref())?;
        Ok(target)
    }

    fn encode_target(&self, target: &TargetObject) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(target).map_err(|e| CodecError::Encode {
            kind: POD_KIND,
            message: e.to_string(),
        })
    }

    fn decode_rule(&self, bytes: &[u8]) -> Result<MutationRule, CodecError> {
        let doc: RuleDocument = serde_json::from_slice(bytes).map_err(|e| CodecError::Decode {
            kind: POD_RULE_KIND,
            message: e.to_string(),
        })?;
        check_kind(POD_RULE_KIND, doc.kind.as_deref())?;
        Ok(doc.into())
    }
}

fn check_kind(expected: &'static str, actual: Option<&str>) -> Result<(), CodecError> {
    match actual {
        Some(kind) if kind != expected => Err(CodecError::KindMismatch {
            expected,
            actual: kind.to_string(),
        }),
        _ => Ok(()),
    }
}
