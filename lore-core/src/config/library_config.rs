use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Library storage locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Root directory holding `registry.json`, `projects/`, and `buckets/`.
    pub root: PathBuf,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(defaults::DEFAULT_LIBRARY_ROOT),
        }
    }
}
