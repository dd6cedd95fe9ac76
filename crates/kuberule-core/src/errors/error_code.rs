//! KuberuleErrorCode trait for stable, machine-readable error codes.

/// Every error enum implements this to provide a structured code string
/// that callers can match on without parsing messages.
pub trait KuberuleErrorCode {
    /// Returns the error code string (e.g., "MERGE_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const RULE_SOURCE_ERROR: &str = "RULE_SOURCE_ERROR";
pub const MALFORMED_RULE: &str = "MALFORMED_RULE";
pub const MERGE_ERROR: &str = "MERGE_ERROR";
pub const INVALID_RULE: &str = "INVALID_RULE";
pub const INTERNAL_CONSISTENCY: &str = "INTERNAL_CONSISTENCY";
pub const CODEC_ERROR: &str = "CODEC_ERROR";
pub const PATCH_ERROR: &str = "PATCH_ERROR";
pub const CANCELLED: &str = "CANCELLED";
pub const DEADLINE_EXCEEDED: &str = "DEADLINE_EXCEEDED";
