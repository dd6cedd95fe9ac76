//! Pipeline execution configuration.

use serde::{Deserialize, Serialize};

/// Configuration for batch processing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    /// Worker threads for batch runs. `None` uses the global rayon pool.
    pub batch_threads: Option<usize>,
}
