/// Lore system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Bounds for the `focus` parameter of a query.
pub const FOCUS_MIN: u8 = 1;
pub const FOCUS_MAX: u8 = 10;
pub const FOCUS_DEFAULT: u8 = 5;

/// Upper bound on passages returned by naive mode regardless of focus.
pub const MAX_NAIVE_PASSAGES: usize = 24;

/// Upper bound on entities seeding a local-mode neighborhood.
pub const MAX_LOCAL_SEEDS: usize = 16;

/// Maximum relationship hops expanded in local mode.
pub const MAX_NEIGHBORHOOD_HOPS: usize = 2;

/// Maximum community summaries returned by global mode.
pub const MAX_GLOBAL_SUMMARIES: usize = 12;

/// Archive format version written by `export_bucket`.
pub const ARCHIVE_FORMAT_VERSION: u32 = 1;

/// File names under the library root.
pub const REGISTRY_FILE: &str = "registry.json";
pub const PROJECTS_DIR: &str = "projects";
pub const BUCKETS_DIR: &str = "buckets";

/// File names inside a bucket directory.
pub const DOCUMENTS_DIR: &str = "documents";
pub const MANIFEST_FILE: &str = "documents.json";
pub const SNAPSHOT_FILE: &str = "graph.json";
