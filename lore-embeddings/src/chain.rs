//! Provider fallback chain.
//!
//! Providers are tried in order; the first successful embed wins. A falling
//! provider is logged, not fatal — the chain always ends in the offline
//! hashed provider.

use lore_core::errors::{IngestError, LoreError, LoreResult};
use lore_core::traits::IEmbeddingProvider;
use tracing::warn;

/// Ordered chain of embedding providers.
pub struct FallbackChain {
    providers: Vec<Box<dyn IEmbeddingProvider>>,
}

impl FallbackChain {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    pub fn push(&mut self, provider: Box<dyn IEmbeddingProvider>) {
        self.providers.push(provider);
    }

    /// Name of the first provider in the chain.
    pub fn primary_name(&self) -> &str {
        self.providers.first().map(|p| p.name()).unwrap_or("none")
    }

    /// Try each provider in order until one succeeds.
    ///
    /// If a provider fails with a transient error and a later provider
    /// succeeds, the transient failure is only logged. The last provider's
    /// error propagates if every provider fails.
    pub fn embed(&self, text: &str) -> LoreResult<Vec<f32>> {
        let mut last_err: Option<LoreError> = None;
        for provider in &self.providers {
            if !provider.is_available() {
                continue;
            }
            match provider.embed(text) {
                Ok(vector) => return Ok(vector),
                Err(err) => {
                    warn!(provider = provider.name(), %err, "embedding provider failed, falling back");
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| {
            LoreError::Ingest(IngestError::Provider {
                provider: "fallback-chain".into(),
                transient: false,
                reason: "no providers configured".into(),
            })
        }))
    }
}

impl Default for FallbackChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::HashedTfIdf;

    struct AlwaysFails;

    impl IEmbeddingProvider for AlwaysFails {
        fn embed(&self, _text: &str) -> LoreResult<Vec<f32>> {
            Err(LoreError::Ingest(IngestError::Provider {
                provider: "always-fails".into(),
                transient: true,
                reason: "synthetic".into(),
            }))
        }

        fn embed_batch(&self, _texts: &[String]) -> LoreResult<Vec<Vec<f32>>> {
            self.embed("").map(|v| vec![v])
        }

        fn dimensions(&self) -> usize {
            8
        }

        fn name(&self) -> &str {
            "always-fails"
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    #[test]
    fn falls_through_to_working_provider() {
        let mut chain = FallbackChain::new();
        chain.push(Box::new(AlwaysFails));
        chain.push(Box::new(HashedTfIdf::new(32)));
        let v = chain.embed("still works").unwrap();
        assert_eq!(v.len(), 32);
    }

    #[test]
    fn empty_chain_is_an_error() {
        let chain = FallbackChain::new();
        assert!(chain.embed("anything").is_err());
    }

    #[test]
    fn all_failing_propagates_last_error() {
        let mut chain = FallbackChain::new();
        chain.push(Box::new(AlwaysFails));
        let err = chain.embed("x").unwrap_err();
        assert!(err.to_string().contains("always-fails"));
    }
}
