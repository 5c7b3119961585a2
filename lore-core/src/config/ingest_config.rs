use serde::{Deserialize, Serialize};

use super::defaults;

/// Ingestion pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Target chunk length in characters.
    pub chunk_target_chars: usize,
    /// Overlap carried between adjacent chunks.
    pub chunk_overlap_chars: usize,
    /// Retry once on transient provider failures before settling `failed`.
    pub retry_transient: bool,
    /// Minimum entity count for a detected community.
    pub min_community_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_target_chars: defaults::DEFAULT_CHUNK_TARGET_CHARS,
            chunk_overlap_chars: defaults::DEFAULT_CHUNK_OVERLAP_CHARS,
            retry_transient: defaults::DEFAULT_RETRY_TRANSIENT,
            min_community_size: defaults::DEFAULT_MIN_COMMUNITY_SIZE,
        }
    }
}
