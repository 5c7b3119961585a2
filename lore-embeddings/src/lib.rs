//! # lore-embeddings
//!
//! Embedding generation for the Lore bucket library: a provider fallback
//! chain (remote service first when configured, hashed TF-IDF last resort)
//! behind a content-hash keyed cache.

pub mod cache;
pub mod chain;
pub mod providers;

pub use chain::FallbackChain;
pub use providers::{HashedTfIdf, RemoteEmbedder};

use lore_core::config::EmbeddingConfig;
use lore_core::errors::LoreResult;
use lore_core::traits::IEmbeddingProvider;
use tracing::info;

use crate::cache::EmbeddingCache;

/// The main embedding engine: provider chain plus write-through cache.
///
/// Implements `IEmbeddingProvider` so it can be used anywhere a provider is
/// expected.
pub struct EmbeddingEngine {
    chain: FallbackChain,
    cache: EmbeddingCache,
    dimensions: usize,
}

impl EmbeddingEngine {
    /// Build an engine from configuration.
    ///
    /// The chain always ends in the hashed provider so embedding never
    /// fails outright in air-gapped environments.
    pub fn new(config: &EmbeddingConfig) -> Self {
        let mut chain = FallbackChain::new();
        if let Some(primary) = providers::create_remote(config) {
            chain.push(Box::new(primary));
        }
        chain.push(Box::new(HashedTfIdf::new(config.dimensions)));

        info!(
            provider = chain.primary_name(),
            dims = config.dimensions,
            "embedding engine initialized"
        );

        Self {
            chain,
            cache: EmbeddingCache::new(config.cache_capacity),
            dimensions: config.dimensions,
        }
    }

    /// Embed text through the cache. The cache key is the blake3 digest of
    /// the text, so identical content across documents shares one entry.
    pub fn embed_cached(&self, text: &str) -> LoreResult<Vec<f32>> {
        let key = blake3::hash(text.as_bytes()).to_hex().to_string();
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }
        let vector = self.chain.embed(text)?;
        self.cache.put(key, &vector);
        Ok(vector)
    }
}

impl IEmbeddingProvider for EmbeddingEngine {
    fn embed(&self, text: &str) -> LoreResult<Vec<f32>> {
        self.embed_cached(text)
    }

    fn embed_batch(&self, texts: &[String]) -> LoreResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed_cached(t)).collect()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "lore-embedding-engine"
    }

    fn is_available(&self) -> bool {
        // The chain always ends in the hashed provider.
        true
    }
}
