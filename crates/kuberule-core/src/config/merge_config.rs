//! Merge policy configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a fragment's affinity interacts with an affinity already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffinityPolicy {
    /// A fragment that defines affinity replaces the current one.
    #[default]
    FragmentWins,
    /// A fragment's affinity is applied only while none is set.
    NoClobber,
}

impl fmt::Display for AffinityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FragmentWins => f.write_str("fragment_wins"),
            Self::NoClobber => f.write_str("no_clobber"),
        }
    }
}

impl FromStr for AffinityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fragment_wins" => Ok(Self::FragmentWins),
            "no_clobber" => Ok(Self::NoClobber),
            other => Err(format!(
                "unknown affinity policy {other:?}, expected fragment_wins or no_clobber"
            )),
        }
    }
}

/// Configuration for the merge engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MergeConfig {
    /// Affinity merge policy. Default: fragment_wins.
    pub affinity_policy: Option<AffinityPolicy>,
}

impl MergeConfig {
    pub fn effective_affinity_policy(&self) -> AffinityPolicy {
        self.affinity_policy.unwrap_or_default()
    }
}
