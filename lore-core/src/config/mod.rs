//! Configuration for all Lore subsystems.
//!
//! Every struct deserializes with `serde(default)` so partial TOML files
//! work; `LoreConfig::load_from` reads a TOML file and falls back to
//! defaults when the file is absent.

pub mod defaults;
mod embedding_config;
mod ingest_config;
mod library_config;
mod orchestrator_config;
mod retrieval_config;

pub use embedding_config::EmbeddingConfig;
pub use ingest_config::IngestConfig;
pub use library_config::LibraryConfig;
pub use orchestrator_config::OrchestratorConfig;
pub use retrieval_config::RetrievalConfig;

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level configuration, one section per subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoreConfig {
    pub library: LibraryConfig,
    pub embedding: EmbeddingConfig,
    pub ingest: IngestConfig,
    pub retrieval: RetrievalConfig,
    pub orchestrator: OrchestratorConfig,
}

impl LoreConfig {
    /// Load configuration from a TOML file. A missing file yields defaults;
    /// a present-but-invalid file is an error.
    pub fn load_from(path: &Path) -> Result<Self, toml::de::Error> {
        match std::fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text),
            Err(_) => Ok(Self::default()),
        }
    }
}
