use crate::errors::LoreResult;

/// Embedding generation provider.
///
/// Implementations may call out to a network service; callers treat any
/// call as a suspension point with a timeout.
pub trait IEmbeddingProvider: Send + Sync {
    /// Embed a single text, returning a dense vector.
    fn embed(&self, text: &str) -> LoreResult<Vec<f32>>;

    /// Embed a batch of texts.
    fn embed_batch(&self, texts: &[String]) -> LoreResult<Vec<Vec<f32>>>;

    /// The dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Whether this provider is currently available.
    fn is_available(&self) -> bool;
}
