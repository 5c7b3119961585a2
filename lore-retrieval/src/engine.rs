//! QueryEngine — mode dispatch over committed snapshots.

use std::sync::Arc;

use lore_core::config::RetrievalConfig;
use lore_core::errors::{LoreResult, QueryError, RegistryError};
use lore_core::models::{QueryConfig, QueryResponse};
use lore_core::LoreError;
use lore_index::KnowledgeIndex;
use tracing::{debug, info};

use crate::strategy::{self, QueryContext};

/// The query engine. Stateless between calls; snapshots come from the
/// knowledge index and are immutable, so any number of queries run in
/// parallel with each other and with ingestion of other buckets.
pub struct QueryEngine {
    index: Arc<KnowledgeIndex>,
    config: RetrievalConfig,
}

impl QueryEngine {
    pub fn new(index: Arc<KnowledgeIndex>, config: RetrievalConfig) -> Self {
        Self { index, config }
    }

    pub fn index(&self) -> &Arc<KnowledgeIndex> {
        &self.index
    }

    /// Execute a query against one bucket.
    ///
    /// `query_text` carries the creative context being drafted; the
    /// config's guidance biases ranking on top of it. Buckets that are
    /// `empty`, or `failed` without a committed snapshot, yield `NotReady`
    /// naming the bucket rather than an empty result.
    pub fn query(
        &self,
        bucket_ref: &str,
        query_text: &str,
        config: &QueryConfig,
    ) -> LoreResult<QueryResponse> {
        let (bucket, snapshot) = self.index.snapshot(bucket_ref).map_err(|err| match err {
            // Callers of the query surface get a query-shaped error.
            LoreError::Registry(RegistryError::NotFound { reference }) => {
                LoreError::Query(QueryError::UnknownBucket { reference })
            }
            other => other,
        })?;

        let embedder = self.index.embedder();
        // Guidance doubles as the query when the caller gave no context.
        let effective_text = if query_text.trim().is_empty() {
            config.guidance.as_deref().unwrap_or_default()
        } else {
            query_text
        };
        let query_embedding = embedder.embed(effective_text)?;
        let guidance_embedding = match &config.guidance {
            Some(text) if !text.trim().is_empty() => Some(embedder.embed(text)?),
            _ => None,
        };

        let ctx = QueryContext {
            snapshot: &snapshot,
            query_text: effective_text,
            query_embedding: &query_embedding,
            guidance_embedding: guidance_embedding.as_deref(),
            config,
            retrieval: &self.config,
        };

        debug!(
            bucket = %bucket.id,
            mode = %config.mode,
            focus = config.focus,
            "dispatching query"
        );
        let scored = strategy::for_mode(config.mode).execute(&ctx);

        let passages = scored.into_iter().map(|s| s.passage).collect::<Vec<_>>();
        info!(
            bucket = %bucket.id,
            mode = %config.mode,
            passages = passages.len(),
            "query complete"
        );

        Ok(QueryResponse {
            bucket_id: bucket.id,
            bucket_name: bucket.name,
            passages,
            config: config.clone(),
        })
    }
}
