//! KnowledgeIndex — owns per-bucket snapshots and the ingestion lifecycle.
//!
//! Ingestion for a bucket is strictly serialized through the registry's
//! status machine; the commit is staged (temp file + rename) so a failed
//! run leaves the last good snapshot intact and reachable. Queries are
//! served from immutable `Arc<GraphSnapshot>` clones — readers never see a
//! partial graph, and a bucket that is `ingesting` serves its last ready
//! snapshot rather than blocking.

use std::sync::Arc;

use dashmap::DashMap;
use lore_core::config::{IngestConfig, LoreConfig};
use lore_core::errors::{IngestError, LoreResult, QueryError};
use lore_core::models::{Bucket, BucketStats, GraphSnapshot, IndexStatus};
use lore_core::traits::{IEmbeddingProvider, IEntityExtractor};
use lore_embeddings::EmbeddingEngine;
use lore_registry::{store, BucketRegistry};
use tracing::{info, warn};

use crate::extract::HeuristicExtractor;
use crate::pipeline;
use crate::store::{read_all, remove_document, write_document, DocumentSource};

/// Result of an ingestion request.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// A new snapshot was committed.
    Committed(BucketStats),
    /// The document set was unchanged; the existing snapshot stands.
    Unchanged,
}

/// The knowledge index engine.
pub struct KnowledgeIndex {
    registry: Arc<BucketRegistry>,
    embedder: Arc<dyn IEmbeddingProvider>,
    extractor: Arc<dyn IEntityExtractor>,
    config: IngestConfig,
    /// Last committed snapshot per bucket id.
    snapshots: DashMap<String, Arc<GraphSnapshot>>,
}

impl KnowledgeIndex {
    pub fn new(
        registry: Arc<BucketRegistry>,
        embedder: Arc<dyn IEmbeddingProvider>,
        extractor: Arc<dyn IEntityExtractor>,
        config: IngestConfig,
    ) -> Self {
        Self {
            registry,
            embedder,
            extractor,
            config,
            snapshots: DashMap::new(),
        }
    }

    /// Engine with the default stack: embedding engine per config plus the
    /// offline heuristic extractor.
    pub fn with_default_stack(registry: Arc<BucketRegistry>, config: &LoreConfig) -> Self {
        Self::new(
            registry,
            Arc::new(EmbeddingEngine::new(&config.embedding)),
            Arc::new(HeuristicExtractor::new()),
            config.ingest.clone(),
        )
    }

    pub fn embedder(&self) -> &Arc<dyn IEmbeddingProvider> {
        &self.embedder
    }

    // --- Document store ---

    /// Stage a document into the bucket. A ready bucket goes stale until
    /// the next ingestion run.
    pub fn add_document(&self, bucket_ref: &str, source: &DocumentSource) -> LoreResult<()> {
        let bucket = self.registry.lookup(bucket_ref, None)?;
        write_document(&self.bucket_dir(&bucket), source)?;
        self.registry.mark_stale(&bucket.id)
    }

    /// Remove a stored document. Triggers staleness; the next ingestion
    /// rebuilds the graph without it.
    pub fn remove_document(&self, bucket_ref: &str, name: &str) -> LoreResult<bool> {
        let bucket = self.registry.lookup(bucket_ref, None)?;
        let removed = remove_document(&self.bucket_dir(&bucket), name)?;
        if removed {
            self.registry.mark_stale(&bucket.id)?;
        }
        Ok(removed)
    }

    /// Stage documents and ingest in one call.
    pub fn ingest_documents(
        &self,
        bucket_ref: &str,
        sources: &[DocumentSource],
    ) -> LoreResult<IngestOutcome> {
        for source in sources {
            self.add_document(bucket_ref, source)?;
        }
        self.ingest(bucket_ref)
    }

    // --- Ingestion ---

    /// Ingest the bucket's current document set.
    ///
    /// Serialized per bucket: a concurrent call gets
    /// `IngestionInProgress`. Transient provider failures retry once; a
    /// final failure settles the bucket into `failed` with the previous
    /// committed snapshot retained.
    pub fn ingest(&self, bucket_ref: &str) -> LoreResult<IngestOutcome> {
        let bucket = self.registry.lookup(bucket_ref, None)?;
        let dir = self.bucket_dir(&bucket);

        let sources = read_all(&dir)?;
        if sources.is_empty() {
            return Err(IngestError::EmptySource {
                src: bucket.name.clone(),
            }
            .into());
        }

        // Hash gate: unchanged document set means nothing to do.
        if bucket.has_committed_snapshot && !self.document_set_changed(&dir, &sources)? {
            info!(bucket = %bucket.id, "document set unchanged, snapshot stands");
            // Re-ingestion of an unchanged set still settles a stale
            // bucket back to ready.
            self.registry.begin_ingest(&bucket.id)?;
            self.registry.finish_ingest(&bucket.id, bucket.stats)?;
            return Ok(IngestOutcome::Unchanged);
        }

        self.registry.begin_ingest(&bucket.id)?;

        let built = self.build_with_retry(&sources);
        match built {
            Ok(snapshot) => {
                let stats = BucketStats {
                    documents: snapshot.documents.len(),
                    entities: snapshot.entity_count(),
                    relationships: snapshot.relationship_count(),
                    last_modified: chrono::Utc::now(),
                };

                // Staged commit: snapshot first, then manifest; both are
                // temp-file + rename writes.
                if let Err(err) = store::write_snapshot(&dir, &snapshot)
                    .and_then(|()| store::write_manifest(&dir, &snapshot.documents))
                {
                    self.registry.fail_ingest(&bucket.id, &err.to_string())?;
                    return Err(IngestError::IngestionFailed {
                        id: bucket.id.clone(),
                        reason: err.to_string(),
                    }
                    .into());
                }

                self.snapshots
                    .insert(bucket.id.clone(), Arc::new(snapshot));
                self.registry.finish_ingest(&bucket.id, stats)?;
                info!(
                    bucket = %bucket.id,
                    documents = stats.documents,
                    entities = stats.entities,
                    relationships = stats.relationships,
                    "snapshot committed"
                );
                Ok(IngestOutcome::Committed(stats))
            }
            Err(err) => {
                self.registry.fail_ingest(&bucket.id, &err.to_string())?;
                Err(IngestError::IngestionFailed {
                    id: bucket.id.clone(),
                    reason: err.to_string(),
                }
                .into())
            }
        }
    }

    fn build_with_retry(&self, sources: &[DocumentSource]) -> LoreResult<GraphSnapshot> {
        match pipeline::build_snapshot(
            sources,
            self.embedder.as_ref(),
            self.extractor.as_ref(),
            &self.config,
        ) {
            Err(err) if self.config.retry_transient && is_transient(&err) => {
                warn!(%err, "transient ingestion failure, retrying once");
                pipeline::build_snapshot(
                    sources,
                    self.embedder.as_ref(),
                    self.extractor.as_ref(),
                    &self.config,
                )
            }
            other => other,
        }
    }

    /// Compare stored files against the committed manifest by content hash.
    fn document_set_changed(
        &self,
        dir: &std::path::Path,
        sources: &[DocumentSource],
    ) -> LoreResult<bool> {
        let manifest = store::read_manifest(dir)?;
        if manifest.len() != sources.len() {
            return Ok(true);
        }
        for source in sources {
            let digest = lore_core::models::document::content_digest(&source.content);
            let known = manifest
                .iter()
                .any(|r| r.name == source.name && r.content_hash == digest);
            if !known {
                return Ok(true);
            }
        }
        Ok(false)
    }

    // --- Snapshot access ---

    /// The snapshot a query should run against, with the documented
    /// not-ready policy:
    /// - `empty`, or `failed` without a committed snapshot → `NotReady`
    /// - `ingesting` → last ready snapshot (never blocks, never torn)
    /// - `failed`/`stale` with a committed snapshot → stale snapshot, with
    ///   a warning logged
    pub fn snapshot(&self, bucket_ref: &str) -> LoreResult<(Bucket, Arc<GraphSnapshot>)> {
        let bucket = self.registry.lookup(bucket_ref, None)?;
        if !bucket.is_queryable() {
            return Err(QueryError::NotReady {
                id: bucket.id.clone(),
                status: bucket.status.to_string(),
            }
            .into());
        }
        if matches!(bucket.status, IndexStatus::Failed | IndexStatus::Stale) {
            warn!(bucket = %bucket.id, status = %bucket.status, "serving stale snapshot");
        }

        if let Some(cached) = self.snapshots.get(&bucket.id) {
            return Ok((bucket, Arc::clone(cached.value())));
        }

        let snapshot = Arc::new(store::read_snapshot(&self.bucket_dir(&bucket))?);
        self.snapshots.insert(bucket.id.clone(), Arc::clone(&snapshot));
        Ok((bucket, snapshot))
    }

    fn bucket_dir(&self, bucket: &Bucket) -> std::path::PathBuf {
        self.registry.store().bucket_dir(bucket)
    }
}

fn is_transient(err: &lore_core::LoreError) -> bool {
    matches!(
        err,
        lore_core::LoreError::Ingest(inner) if inner.is_transient()
    )
}
