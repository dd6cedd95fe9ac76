//! Collaborator contracts consumed by the engine.

pub mod cancellation;
pub mod codec;
pub mod rule_source;
pub mod validator;

pub use cancellation::{Cancellable, CancellationToken, StopReason};
pub use codec::TargetCodec;
pub use rule_source::RuleSource;
pub use validator::RuleValidator;
