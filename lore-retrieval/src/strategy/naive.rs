//! Naive mode: embedding similarity over document chunks.

use lore_core::models::{PassageOrigin, RankedPassage};

use super::{QueryContext, QueryStrategy};
use crate::ranking::{blend, cosine, Scored};

/// Top-k chunks by cosine similarity; k scales with focus but stays
/// bounded so latency and prompt size never grow unbounded.
pub struct NaiveStrategy;

impl NaiveStrategy {
    /// Chunk budget for a focus level.
    pub fn chunk_budget(focus: u8, max: usize) -> usize {
        (focus as usize * 2).clamp(2, max.max(2))
    }
}

impl QueryStrategy for NaiveStrategy {
    fn execute(&self, ctx: &QueryContext<'_>) -> Vec<Scored> {
        let budget = Self::chunk_budget(ctx.config.focus, ctx.retrieval.max_naive_passages);

        let mut scored: Vec<Scored> = ctx
            .snapshot
            .chunks
            .iter()
            .map(|chunk| {
                let base = cosine(ctx.query_embedding, &chunk.embedding);
                let guidance = ctx
                    .guidance_embedding
                    .map(|g| cosine(g, &chunk.embedding));
                let score = blend(base, guidance, ctx.retrieval.guidance_weight);
                Scored {
                    passage: RankedPassage {
                        text: chunk.text.clone(),
                        score,
                        provenance: vec![ctx.snapshot.document_name(&chunk.doc_id).to_string()],
                        origin: PassageOrigin::Chunk,
                    },
                    keys: Vec::new(),
                }
            })
            .collect();

        crate::ranking::sort_scored(&mut scored);
        scored.truncate(budget);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_scales_with_focus_and_is_bounded() {
        assert_eq!(NaiveStrategy::chunk_budget(1, 24), 2);
        assert_eq!(NaiveStrategy::chunk_budget(3, 24), 6);
        assert_eq!(NaiveStrategy::chunk_budget(10, 24), 20);
        assert_eq!(NaiveStrategy::chunk_budget(10, 8), 8);
    }
}
