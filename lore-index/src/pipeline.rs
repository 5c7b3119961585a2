//! Snapshot construction: chunk → extract → merge → embed → cluster.
//!
//! Pure build logic; the engine owns status transitions, retries, and the
//! staged commit.

use chrono::Utc;
use lore_core::config::IngestConfig;
use lore_core::errors::LoreResult;
use lore_core::models::graph::{GraphChunk, GraphSnapshot};
use lore_core::models::DocumentRecord;
use lore_core::traits::{IEmbeddingProvider, IEntityExtractor};
use rayon::prelude::*;
use tracing::debug;

use crate::chunker::chunk_text;
use crate::communities;
use crate::store::DocumentSource;

/// Build a complete snapshot from the bucket's current document set.
///
/// The build is hash-gated by the caller: it only runs when the document
/// set actually changed, and then rebuilds from all documents so repeat
/// mentions always merge instead of duplicating.
pub fn build_snapshot(
    sources: &[DocumentSource],
    embedder: &dyn IEmbeddingProvider,
    extractor: &dyn IEntityExtractor,
    config: &IngestConfig,
) -> LoreResult<GraphSnapshot> {
    let mut snapshot = GraphSnapshot::default();

    // Chunk and extract per document, merging into one graph.
    for source in sources {
        let record = DocumentRecord::new(&source.name, &source.content);
        let chunks = chunk_text(
            &source.content,
            config.chunk_target_chars,
            config.chunk_overlap_chars,
        );

        let extraction = extractor.extract(&source.name, &chunks)?;
        crate::graph::merge_extraction(&mut snapshot, &record.id, &extraction);

        for text in chunks {
            snapshot.chunks.push(GraphChunk {
                id: uuid::Uuid::new_v4().to_string(),
                doc_id: record.id.clone(),
                text,
                embedding: Vec::new(),
            });
        }
        snapshot.documents.push(record);
    }

    debug!(
        documents = snapshot.documents.len(),
        chunks = snapshot.chunks.len(),
        entities = snapshot.entity_count(),
        relationships = snapshot.relationship_count(),
        "extraction merged, embedding"
    );

    // Embed chunks in parallel; provider calls dominate ingestion time.
    let chunk_vectors: Vec<LoreResult<Vec<f32>>> = snapshot
        .chunks
        .par_iter()
        .map(|chunk| embedder.embed(&chunk.text))
        .collect();
    for (chunk, vector) in snapshot.chunks.iter_mut().zip(chunk_vectors) {
        chunk.embedding = vector?;
    }

    // Embed entities on name + aggregated description.
    let entity_keys: Vec<String> = snapshot.entities.keys().cloned().collect();
    let entity_vectors: Vec<LoreResult<Vec<f32>>> = entity_keys
        .par_iter()
        .map(|key| {
            let entity = &snapshot.entities[key];
            embedder.embed(&format!("{}: {}", entity.name, entity.description))
        })
        .collect();
    for (key, vector) in entity_keys.iter().zip(entity_vectors) {
        if let Some(entity) = snapshot.entities.get_mut(key) {
            entity.embedding = vector?;
        }
    }

    // Detect communities, then embed their summaries for global mode.
    snapshot.communities = communities::detect(&snapshot, config.min_community_size);
    let summary_vectors: Vec<LoreResult<Vec<f32>>> = snapshot
        .communities
        .par_iter()
        .map(|c| embedder.embed(&c.summary))
        .collect();
    for (community, vector) in snapshot.communities.iter_mut().zip(summary_vectors) {
        community.embedding = vector?;
    }

    snapshot.built_at = Some(Utc::now());
    Ok(snapshot)
}
