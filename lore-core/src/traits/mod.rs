//! Trait seams between subsystems, so each can be tested in isolation.

pub mod embedding;
pub mod extractor;

pub use embedding::IEmbeddingProvider;
pub use extractor::{ExtractedEntity, ExtractedRelation, Extraction, IEntityExtractor};
