//! The per-bucket knowledge graph snapshot.
//!
//! A snapshot is immutable once committed: ingestion builds a new one and
//! atomically replaces the old, so readers never observe a partial graph.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::document::DocumentRecord;

/// Coarse entity classification from extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Person,
    Place,
    Organization,
    Work,
    Concept,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Place => "place",
            Self::Organization => "organization",
            Self::Work => "work",
            Self::Concept => "concept",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A graph node. Entities are deduplicated by normalized name within a
/// bucket; merging a new mention unions provenance and appends the
/// description rather than overwriting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEntity {
    /// Normalized-name dedup key (lowercased, whitespace collapsed).
    pub key: String,
    /// Display name as first seen.
    pub name: String,
    pub kind: EntityKind,
    /// Description text aggregated from all mentions.
    pub description: String,
    /// Source document ids, deduplicated, insertion-ordered.
    pub provenance: Vec<String>,
    pub mentions: u32,
    /// Embedding of name + description. Empty until embedded.
    #[serde(default)]
    pub embedding: Vec<f32>,
}

/// Normalize an entity name into its dedup key.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A graph edge between two entities, keyed by their normalized names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRelationship {
    pub source: String,
    pub target: String,
    pub description: String,
    /// Source document ids supporting this relationship.
    pub provenance: Vec<String>,
    /// Co-occurrence weight; grows as more documents support the edge.
    pub weight: f32,
}

impl GraphRelationship {
    /// Canonical undirected key for dedup: ordered endpoint pair.
    pub fn key(&self) -> (String, String) {
        if self.source <= self.target {
            (self.source.clone(), self.target.clone())
        } else {
            (self.target.clone(), self.source.clone())
        }
    }
}

/// A chunk of document text with its embedding; the unit naive mode ranks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphChunk {
    pub id: String,
    /// Owning document id.
    pub doc_id: String,
    pub text: String,
    #[serde(default)]
    pub embedding: Vec<f32>,
}

/// A cluster of densely related entities with a thematic summary; the unit
/// global mode ranks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    pub id: u32,
    /// Member entity keys.
    pub members: Vec<String>,
    /// Synthesized summary of the community's entities and relationships.
    pub summary: String,
    #[serde(default)]
    pub embedding: Vec<f32>,
}

/// The committed, immutable knowledge index of one bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Entities keyed by normalized name (BTreeMap for deterministic
    /// serialization).
    pub entities: BTreeMap<String, GraphEntity>,
    pub relationships: Vec<GraphRelationship>,
    pub chunks: Vec<GraphChunk>,
    pub communities: Vec<Community>,
    /// Documents the snapshot was built from.
    pub documents: Vec<DocumentRecord>,
    pub built_at: Option<DateTime<Utc>>,
}

impl GraphSnapshot {
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    /// Display name for a document id, falling back to the id itself.
    pub fn document_name<'a>(&'a self, doc_id: &'a str) -> &'a str {
        self.documents
            .iter()
            .find(|d| d.id == doc_id)
            .map(|d| d.name.as_str())
            .unwrap_or(doc_id)
    }

    /// Relationships touching the given entity key.
    pub fn relationships_of<'a>(
        &'a self,
        key: &'a str,
    ) -> impl Iterator<Item = &'a GraphRelationship> + 'a {
        self.relationships
            .iter()
            .filter(move |r| r.source == key || r.target == key)
    }
}
