use serde::{Deserialize, Serialize};

use super::defaults;

/// Embedding subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider selector: `hashed` (offline, deterministic) or `remote`.
    pub provider: String,
    /// Dimensionality of produced vectors.
    pub dimensions: usize,
    /// Endpoint for the remote provider, if any.
    pub endpoint: Option<String>,
    /// Network timeout for remote embedding calls.
    pub timeout_ms: u64,
    /// Capacity of the in-process embedding cache (entries).
    pub cache_capacity: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: defaults::DEFAULT_EMBEDDING_PROVIDER.to_string(),
            dimensions: defaults::DEFAULT_DIMENSIONS,
            endpoint: None,
            timeout_ms: defaults::DEFAULT_PROVIDER_TIMEOUT_MS,
            cache_capacity: defaults::DEFAULT_CACHE_CAPACITY,
        }
    }
}
