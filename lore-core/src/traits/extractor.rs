use crate::errors::LoreResult;
use crate::models::graph::EntityKind;

/// An entity mention found in one document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedEntity {
    pub name: String,
    pub kind: EntityKind,
    /// Short description of the mention in context.
    pub description: String,
}

/// A relationship between two named entities found in one document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRelation {
    pub source: String,
    pub target: String,
    pub description: String,
}

/// Everything extracted from a single document.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub entities: Vec<ExtractedEntity>,
    pub relations: Vec<ExtractedRelation>,
}

/// Entity/relationship extraction from document text.
///
/// The production path is an LLM-backed extractor; the default heuristic
/// extractor is deterministic and offline so ingestion works air-gapped.
pub trait IEntityExtractor: Send + Sync {
    /// Extract entities and relationships from a document's chunked text.
    fn extract(&self, doc_name: &str, chunks: &[String]) -> LoreResult<Extraction>;

    /// Human-readable extractor name.
    fn name(&self) -> &str;
}
