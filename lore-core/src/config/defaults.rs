//! Default values shared between config structs.

/// Library root when none is configured.
pub const DEFAULT_LIBRARY_ROOT: &str = "lore_library";

/// Embedding defaults.
pub const DEFAULT_EMBEDDING_PROVIDER: &str = "hashed";
pub const DEFAULT_DIMENSIONS: usize = 256;
pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_CACHE_CAPACITY: u64 = 4_096;

/// Ingestion defaults.
pub const DEFAULT_CHUNK_TARGET_CHARS: usize = 1_200;
pub const DEFAULT_CHUNK_OVERLAP_CHARS: usize = 200;
pub const DEFAULT_RETRY_TRANSIENT: bool = true;
pub const DEFAULT_MIN_COMMUNITY_SIZE: usize = 2;

/// Retrieval defaults.
pub const DEFAULT_GUIDANCE_WEIGHT: f32 = 0.35;

/// Orchestrator defaults.
pub const DEFAULT_MAX_PARALLEL_TOKENS: usize = 4;
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 30_000;
