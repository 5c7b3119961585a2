//! Local mode: entity-centered retrieval.
//!
//! Seeds are entities matched to the query (embedding similarity plus a
//! literal-name boost), expanded to their immediate relationship
//! neighborhood. Each seed yields one passage aggregating the entity's
//! description and the relationships that touch it.

use std::collections::HashSet;

use lore_core::models::graph::normalize_name;
use lore_core::models::{PassageOrigin, RankedPassage};
use lore_index::EntityGraph;

use super::{QueryContext, QueryStrategy};
use crate::ranking::{blend, cosine, Scored};

/// Score boost when the query literally names the entity.
const NAME_MATCH_BOOST: f32 = 0.25;

/// Relationship lines included per passage.
const MAX_RELATIONS_PER_PASSAGE: usize = 4;

pub struct LocalStrategy;

impl LocalStrategy {
    /// Seed budget for a focus level.
    pub fn seed_budget(focus: u8, max: usize) -> usize {
        (1 + focus as usize / 2).clamp(1, max.max(1))
    }

    /// Seed entity keys ranked by query affinity.
    pub fn match_seeds(ctx: &QueryContext<'_>, budget: usize) -> Vec<(String, f32)> {
        let query_norm = normalize_name(ctx.query_text);
        let mut seeds: Vec<(String, f32)> = ctx
            .snapshot
            .entities
            .values()
            .map(|entity| {
                let mut score = cosine(ctx.query_embedding, &entity.embedding);
                if query_norm.contains(&entity.key) {
                    score += NAME_MATCH_BOOST;
                }
                (entity.key.clone(), score)
            })
            .collect();
        seeds.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        seeds.truncate(budget);
        seeds
    }
}

impl QueryStrategy for LocalStrategy {
    fn execute(&self, ctx: &QueryContext<'_>) -> Vec<Scored> {
        let budget = Self::seed_budget(ctx.config.focus, ctx.retrieval.max_local_seeds);
        let seeds = Self::match_seeds(ctx, budget);
        if seeds.is_empty() {
            return Vec::new();
        }

        let graph = EntityGraph::build(ctx.snapshot);
        let mut out = Vec::with_capacity(seeds.len());

        for (key, base) in seeds {
            let Some(entity) = ctx.snapshot.entities.get(&key) else {
                continue;
            };

            // Immediate neighborhood: the seed plus 1-hop neighbors.
            let neighborhood = graph.neighborhood(std::slice::from_ref(&key), 1);
            let mut covered: Vec<String> = neighborhood.clone();
            covered.sort();
            covered.dedup();

            let mut text = format!("{} ({}): {}", entity.name, entity.kind, entity.description);
            let mut relations = 0;
            for relationship in ctx.snapshot.relationships_of(&key) {
                if relations >= MAX_RELATIONS_PER_PASSAGE {
                    break;
                }
                let other_key = if relationship.source == key {
                    &relationship.target
                } else {
                    &relationship.source
                };
                if let Some(other) = ctx.snapshot.entities.get(other_key) {
                    text.push_str(&format!(
                        "\n  ↳ with {}: {}",
                        other.name, relationship.description
                    ));
                    relations += 1;
                }
            }

            let mut provenance: Vec<String> = HashSet::<&str>::from_iter(
                entity.provenance.iter().map(String::as_str),
            )
            .into_iter()
            .map(|d| ctx.snapshot.document_name(d).to_string())
            .collect();
            provenance.sort();

            let guidance = ctx
                .guidance_embedding
                .map(|g| cosine(g, &entity.embedding));
            out.push(Scored {
                passage: RankedPassage {
                    text,
                    score: blend(base, guidance, ctx.retrieval.guidance_weight),
                    provenance,
                    origin: PassageOrigin::Neighborhood,
                },
                keys: covered,
            });
        }

        crate::ranking::sort_scored(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_budget_scales_and_clamps() {
        assert_eq!(LocalStrategy::seed_budget(1, 16), 1);
        assert_eq!(LocalStrategy::seed_budget(5, 16), 3);
        assert_eq!(LocalStrategy::seed_budget(10, 16), 6);
        assert_eq!(LocalStrategy::seed_budget(10, 2), 2);
    }
}
