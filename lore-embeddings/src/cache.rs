//! In-process embedding cache, keyed by content digest.

use std::sync::Arc;

use moka::sync::Cache;

/// Bounded LRU-ish cache of embeddings. Vectors are stored behind `Arc` so
/// hits clone a pointer, not the data.
pub struct EmbeddingCache {
    inner: Cache<String, Arc<Vec<f32>>>,
}

impl EmbeddingCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: Cache::new(capacity),
        }
    }

    pub fn get(&self, key: &str) -> Option<Vec<f32>> {
        self.inner.get(key).map(|v| v.as_ref().clone())
    }

    pub fn put(&self, key: String, vector: &[f32]) {
        self.inner.insert(key, Arc::new(vector.to_vec()));
    }
}
