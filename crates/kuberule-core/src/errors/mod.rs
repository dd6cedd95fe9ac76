//! Error handling for kube-rule.
//! One error enum per concern, `thiserror` only, zero `anyhow`.

pub mod codec_error;
pub mod config_error;
pub mod consistency_error;
pub mod error_code;
pub mod invalid_rule_error;
pub mod malformed_rule_error;
pub mod merge_error;
pub mod patch_error;
pub mod pipeline_error;
pub mod rule_source_error;

pub use codec_error::CodecError;
pub use config_error::ConfigError;
pub use consistency_error::InternalConsistencyError;
pub use error_code::KuberuleErrorCode;
pub use invalid_rule_error::InvalidRuleError;
pub use malformed_rule_error::MalformedRuleError;
pub use merge_error::{FragmentViolation, MergeError};
pub use patch_error::PatchError;
pub use pipeline_error::PipelineError;
pub use rule_source_error::RuleSourceError;
