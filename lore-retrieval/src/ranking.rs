//! Scoring primitives shared by the mode strategies.

use lore_core::models::RankedPassage;

/// Cosine similarity; embeddings from the providers are unit-norm, so this
/// is a plain dot product with a guard for dimension mismatches.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Blend the base relevance with the guidance signal.
///
/// Guidance biases ranking — it is an additional signal, never a filter:
/// a passage with zero guidance affinity keeps its base score share.
pub fn blend(base: f32, guidance: Option<f32>, guidance_weight: f32) -> f32 {
    match guidance {
        Some(g) => base * (1.0 - guidance_weight) + g * guidance_weight,
        None => base,
    }
}

/// A passage plus the entity keys it covers, for overlap dedup in hybrid
/// mode.
#[derive(Debug, Clone)]
pub struct Scored {
    pub passage: RankedPassage,
    /// Entity keys this passage covers (empty for plain chunks).
    pub keys: Vec<String>,
}

/// Sort by score descending, stable on ties by text.
pub fn sort_scored(items: &mut [Scored]) {
    items.sort_by(|a, b| {
        b.passage
            .score
            .partial_cmp(&a.passage.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.passage.text.cmp(&b.passage.text))
    });
}

/// Keep the top `limit` passages, skipping any whose entity coverage is
/// already fully covered by an earlier selection (theme dedup). Chunks
/// (no keys) dedup on identical text.
pub fn select_with_dedup(mut items: Vec<Scored>, limit: usize) -> Vec<Scored> {
    sort_scored(&mut items);

    let mut covered: std::collections::HashSet<String> = std::collections::HashSet::new();
    let mut seen_text: std::collections::HashSet<String> = std::collections::HashSet::new();
    let mut selected = Vec::new();

    for item in items {
        if selected.len() >= limit {
            break;
        }
        if item.keys.is_empty() {
            if !seen_text.insert(item.passage.text.clone()) {
                continue;
            }
        } else if item.keys.iter().all(|k| covered.contains(k)) {
            continue;
        }
        for key in &item.keys {
            covered.insert(key.clone());
        }
        selected.push(item);
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use lore_core::models::{PassageOrigin, RankedPassage};

    fn scored(text: &str, score: f32, keys: &[&str]) -> Scored {
        Scored {
            passage: RankedPassage {
                text: text.into(),
                score,
                provenance: vec![],
                origin: PassageOrigin::Neighborhood,
            },
            keys: keys.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[test]
    fn cosine_guards_mismatched_dims() {
        assert_eq!(cosine(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(cosine(&[], &[]), 0.0);
        assert!((cosine(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn blend_without_guidance_is_identity() {
        assert_eq!(blend(0.8, None, 0.35), 0.8);
    }

    #[test]
    fn blend_reorders_but_never_zeroes() {
        // A passage with no guidance affinity keeps most of its base score.
        let with = blend(0.9, Some(0.0), 0.35);
        assert!(with > 0.5);
        // Strong guidance affinity can overtake a slightly better base.
        let boosted = blend(0.7, Some(1.0), 0.35);
        assert!(boosted > with);
    }

    #[test]
    fn dedup_skips_fully_covered_themes() {
        let items = vec![
            scored("about sarah and jake", 0.9, &["sarah", "jake"]),
            scored("about sarah", 0.8, &["sarah"]),
            scored("about maya", 0.7, &["maya"]),
        ];
        let selected = select_with_dedup(items, 10);
        let texts: Vec<&str> = selected.iter().map(|s| s.passage.text.as_str()).collect();
        assert_eq!(texts, vec!["about sarah and jake", "about maya"]);
    }

    #[test]
    fn dedup_respects_limit_and_duplicate_chunks() {
        let items = vec![
            scored("same chunk", 0.9, &[]),
            scored("same chunk", 0.8, &[]),
            scored("other chunk", 0.7, &[]),
        ];
        let selected = select_with_dedup(items, 2);
        assert_eq!(selected.len(), 2);
        assert_ne!(selected[0].passage.text, selected[1].passage.text);
    }
}
