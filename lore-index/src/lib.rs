//! # lore-index
//!
//! Document store and knowledge index for the Lore bucket library: chunking,
//! entity extraction, graph merging, embeddings, community detection, and
//! the serialized, staged-commit ingestion lifecycle.

pub mod chunker;
pub mod communities;
pub mod engine;
pub mod extract;
pub mod graph;
pub mod pipeline;
pub mod store;

pub use engine::{IngestOutcome, KnowledgeIndex};
pub use extract::HeuristicExtractor;
pub use graph::EntityGraph;
pub use store::DocumentSource;
