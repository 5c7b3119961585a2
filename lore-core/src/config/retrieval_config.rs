use serde::{Deserialize, Serialize};

use super::defaults;
use crate::constants::{MAX_GLOBAL_SUMMARIES, MAX_LOCAL_SEEDS, MAX_NAIVE_PASSAGES};

/// Query engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Hard cap on naive-mode passages regardless of focus.
    pub max_naive_passages: usize,
    /// Hard cap on local-mode seed entities.
    pub max_local_seeds: usize,
    /// Hard cap on global-mode community summaries.
    pub max_global_summaries: usize,
    /// Blend weight of the guidance signal in ranking (0.0..=1.0).
    pub guidance_weight: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_naive_passages: MAX_NAIVE_PASSAGES,
            max_local_seeds: MAX_LOCAL_SEEDS,
            max_global_summaries: MAX_GLOBAL_SUMMARIES,
            guidance_weight: defaults::DEFAULT_GUIDANCE_WEIGHT,
        }
    }
}
