use crate::errors::CodecError;
use crate::model::{MutationRule, TargetObject};

/// Byte-level representation of targets and rules.
pub trait TargetCodec: Send + Sync {
    fn decode_target(&self, bytes: &[u8]) -> Result<TargetObject, CodecError>;

    fn encode_target(&self, target: &TargetObject) -> Result<Vec<u8>, CodecError>;

    fn decode_rule(&self, bytes: &[u8]) -> Result<MutationRule, CodecError>;
}
