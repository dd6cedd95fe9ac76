//! Configuration system for kube-rule.
//! TOML-based, layered resolution: overrides > env > project file > defaults.
//!
//! The resolved [`KuberuleConfig`] is built once at startup and passed by
//! reference to every component that needs it.

pub mod app_config;
pub mod kuberule_config;
pub mod merge_config;
pub mod pipeline_config;
pub mod webhook_config;

pub use app_config::AppConfig;
pub use kuberule_config::{ConfigOverrides, KuberuleConfig};
pub use merge_config::{AffinityPolicy, MergeConfig};
pub use pipeline_config::PipelineConfig;
pub use webhook_config::{FailurePolicy, WebhookConfig};
