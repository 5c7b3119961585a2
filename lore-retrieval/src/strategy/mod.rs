//! The four retrieval modes as a closed set of strategy objects sharing
//! one interface, so each mode's ranking logic tests in isolation.

mod global;
mod hybrid;
mod local;
mod naive;

pub use global::GlobalStrategy;
pub use hybrid::HybridStrategy;
pub use local::LocalStrategy;
pub use naive::NaiveStrategy;

use lore_core::config::RetrievalConfig;
use lore_core::models::{GraphSnapshot, QueryConfig, QueryMode};

use crate::ranking::Scored;

/// Everything a strategy needs for one query.
pub struct QueryContext<'a> {
    pub snapshot: &'a GraphSnapshot,
    pub query_text: &'a str,
    pub query_embedding: &'a [f32],
    /// Present when the caller supplied guidance.
    pub guidance_embedding: Option<&'a [f32]>,
    pub config: &'a QueryConfig,
    pub retrieval: &'a RetrievalConfig,
}

/// One retrieval mode's ranking logic.
pub trait QueryStrategy: Send + Sync {
    fn execute(&self, ctx: &QueryContext<'_>) -> Vec<Scored>;
}

/// The strategy for a mode.
pub fn for_mode(mode: QueryMode) -> Box<dyn QueryStrategy> {
    match mode {
        QueryMode::Naive => Box::new(NaiveStrategy),
        QueryMode::Local => Box::new(LocalStrategy),
        QueryMode::Global => Box::new(GlobalStrategy),
        QueryMode::Hybrid => Box::new(HybridStrategy),
    }
}
