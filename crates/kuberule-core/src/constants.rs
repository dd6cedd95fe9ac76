//! Shared constants for the kube-rule mutation engine.

/// kube-rule version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default application name. Also the default service and secret name.
pub const DEFAULT_APP_NAME: &str = "kuberule";

/// Namespace used when neither config nor `POD_NAMESPACE` provide one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Default directory holding the webhook serving certificate.
pub const DEFAULT_CERT_DIR: &str = "/tmp/cert";

/// Environment variable carrying the namespace the process runs in.
pub const POD_NAMESPACE_ENV: &str = "POD_NAMESPACE";

/// Project config file name.
pub const CONFIG_FILE_NAME: &str = "kuberule.toml";

/// Resource kind of mutation targets.
pub const POD_KIND: &str = "Pod";

/// Resource kind of mutation rules.
pub const POD_RULE_KIND: &str = "PodRule";

/// API version of the rule resource.
pub const POD_RULE_API_VERSION: &str = "kuberule.chickenzord.com/v1alpha1";

/// Patch paths of the fields the merge engine can mutate.
pub mod paths {
    pub const ANNOTATIONS: &str = "/metadata/annotations";
    pub const NODE_SELECTOR: &str = "/spec/nodeSelector";
    pub const AFFINITY: &str = "/spec/affinity";
    pub const TOLERATIONS: &str = "/spec/tolerations";
    pub const IMAGE_PULL_SECRETS: &str = "/spec/imagePullSecrets";
}

/// Admission webhook names, one per handler.
pub mod webhooks {
    pub const MUTATE_PODS: &str = "mutatepods.kuberule.chickenzord.com";
    pub const MUTATE_POD_RULES: &str = "mutatepodrules.kuberule.chickenzord.com";
    pub const VALIDATE_POD_RULES: &str = "validatepodrules.kuberule.chickenzord.com";
}

/// Upper bound of a preferred scheduling term weight.
pub const MAX_TERM_WEIGHT: i32 = 100;

/// Lower bound of a preferred scheduling term weight.
pub const MIN_TERM_WEIGHT: i32 = 1;
