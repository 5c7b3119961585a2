//! Global mode: community-level thematic synthesis.
//!
//! Ranks the snapshot's community summaries against the query. Broad,
//! cross-cutting answers at the cost of fine detail.

use std::collections::BTreeSet;

use lore_core::models::{PassageOrigin, RankedPassage};

use super::{QueryContext, QueryStrategy};
use crate::ranking::{blend, cosine, Scored};

/// Provenance documents listed per community passage.
const MAX_PROVENANCE_DOCS: usize = 6;

pub struct GlobalStrategy;

impl GlobalStrategy {
    /// Community budget for a focus level.
    pub fn summary_budget(focus: u8, max: usize) -> usize {
        (1 + focus as usize / 2).clamp(1, max.max(1))
    }
}

impl QueryStrategy for GlobalStrategy {
    fn execute(&self, ctx: &QueryContext<'_>) -> Vec<Scored> {
        let budget = Self::summary_budget(ctx.config.focus, ctx.retrieval.max_global_summaries);

        let mut out: Vec<Scored> = ctx
            .snapshot
            .communities
            .iter()
            .map(|community| {
                let base = cosine(ctx.query_embedding, &community.embedding);
                let guidance = ctx
                    .guidance_embedding
                    .map(|g| cosine(g, &community.embedding));

                // Provenance: union of member documents, bounded.
                let mut docs: BTreeSet<String> = BTreeSet::new();
                for key in &community.members {
                    if let Some(entity) = ctx.snapshot.entities.get(key) {
                        for doc_id in &entity.provenance {
                            if docs.len() >= MAX_PROVENANCE_DOCS {
                                break;
                            }
                            docs.insert(ctx.snapshot.document_name(doc_id).to_string());
                        }
                    }
                }

                Scored {
                    passage: RankedPassage {
                        text: community.summary.clone(),
                        score: blend(base, guidance, ctx.retrieval.guidance_weight),
                        provenance: docs.into_iter().collect(),
                        origin: PassageOrigin::Community,
                    },
                    keys: community.members.clone(),
                }
            })
            .collect();

        crate::ranking::sort_scored(&mut out);
        out.truncate(budget);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_budget_scales_and_clamps() {
        assert_eq!(GlobalStrategy::summary_budget(1, 12), 1);
        assert_eq!(GlobalStrategy::summary_budget(10, 12), 6);
        assert_eq!(GlobalStrategy::summary_budget(10, 3), 3);
    }
}
