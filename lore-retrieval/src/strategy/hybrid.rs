//! Hybrid mode: local and global run concurrently and merge.
//!
//! Low focus biases toward global breadth, high focus toward local
//! precision; overlapping themes dedup on entity coverage.

use super::{GlobalStrategy, LocalStrategy, QueryContext, QueryStrategy};
use crate::ranking::{select_with_dedup, Scored};

pub struct HybridStrategy;

impl HybridStrategy {
    /// (local, global) blend weights for a focus level.
    pub fn weights(focus_fraction: f32) -> (f32, f32) {
        // Mid focus treats both halves evenly; the extremes keep a floor
        // so neither half ever vanishes from the merge.
        let local = 0.5 + 0.4 * (focus_fraction - 0.5);
        (local, 1.0 - local)
    }
}

impl QueryStrategy for HybridStrategy {
    fn execute(&self, ctx: &QueryContext<'_>) -> Vec<Scored> {
        // Independent reads over the same immutable snapshot.
        let (mut local, mut global) = rayon::join(
            || LocalStrategy.execute(ctx),
            || GlobalStrategy.execute(ctx),
        );

        let (local_weight, global_weight) = Self::weights(ctx.config.focus_fraction());
        for item in &mut local {
            item.passage.score *= local_weight;
        }
        for item in &mut global {
            item.passage.score *= global_weight;
        }

        let budget = local.len() + global.len();
        let mut merged = local;
        merged.append(&mut global);
        select_with_dedup(merged, budget)
    }
}
