//! Embedding provider implementations.

mod hashed;
mod remote;

pub use hashed::HashedTfIdf;
pub use remote::RemoteEmbedder;

use lore_core::config::EmbeddingConfig;

/// Build the remote provider when the config selects it and carries an
/// endpoint; `None` otherwise.
pub fn create_remote(config: &EmbeddingConfig) -> Option<RemoteEmbedder> {
    if config.provider != "remote" {
        return None;
    }
    config
        .endpoint
        .as_deref()
        .map(|endpoint| RemoteEmbedder::new(endpoint, config.dimensions, config.timeout_ms))
}
