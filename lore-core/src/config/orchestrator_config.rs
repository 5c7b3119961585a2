use serde::{Deserialize, Serialize};

use super::defaults;

/// Template compilation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Bounded parallelism for per-token retrieval dispatch.
    pub max_parallel_tokens: usize,
    /// Per-token query timeout. A timeout fails the whole compilation.
    pub query_timeout_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_parallel_tokens: defaults::DEFAULT_MAX_PARALLEL_TOKENS,
            query_timeout_ms: defaults::DEFAULT_QUERY_TIMEOUT_MS,
        }
    }
}
