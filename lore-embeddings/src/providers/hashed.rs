//! Hashed TF-IDF provider: deterministic, offline, always available.
//!
//! Uses the hashing trick with two signed positions per term and word
//! bigrams so multi-word names ("Sarah Connor") land near their mentions.
//! Not as semantically rich as a neural provider, but good enough to rank
//! passages from a few dozen reference documents.

use std::collections::HashMap;

use lore_core::errors::LoreResult;
use lore_core::traits::IEmbeddingProvider;

/// The offline last-resort provider.
pub struct HashedTfIdf {
    dimensions: usize,
}

impl HashedTfIdf {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// FNV-1a with a seed mixed into the offset basis.
    fn seeded_hash(term: &str, seed: u64) -> u64 {
        let mut h: u64 = 0xcbf29ce484222325 ^ seed.wrapping_mul(0x9e3779b97f4a7c15);
        for b in term.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        h
    }

    /// Lowercase alphanumeric unigrams plus adjacent-word bigrams.
    fn terms(text: &str) -> Vec<String> {
        let words: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|w| w.len() >= 2)
            .map(|w| w.to_lowercase())
            .collect();

        let mut terms = words.clone();
        for pair in words.windows(2) {
            terms.push(format!("{} {}", pair[0], pair[1]));
        }
        terms
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let terms = Self::terms(text);
        let mut out = vec![0.0f32; self.dimensions];
        if terms.is_empty() {
            return out;
        }

        let mut tf: HashMap<String, f32> = HashMap::new();
        for term in &terms {
            *tf.entry(term.clone()).or_default() += 1.0;
        }

        let total = terms.len() as f32;
        for (term, count) in &tf {
            // Longer terms carry more signal; short common words get
            // close to unit weight.
            let weight = (count / total) * (1.0 + (term.len() as f32).ln());

            // Two signed positions per term reduce hash collisions
            // averaging each other out.
            let h1 = Self::seeded_hash(term, 0x51) as usize % self.dimensions;
            let h2 = Self::seeded_hash(term, 0xa7) as usize % self.dimensions;
            let sign = if Self::seeded_hash(term, 0xee) & 1 == 0 {
                1.0
            } else {
                -1.0
            };
            out[h1] += weight;
            out[h2] += sign * weight;
        }

        let norm: f32 = out.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut out {
                *v /= norm;
            }
        }
        out
    }
}

impl IEmbeddingProvider for HashedTfIdf {
    fn embed(&self, text: &str) -> LoreResult<Vec<f32>> {
        Ok(self.vector(text))
    }

    fn embed_batch(&self, texts: &[String]) -> LoreResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hashed-tfidf"
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn empty_text_is_a_zero_vector() {
        let p = HashedTfIdf::new(64);
        let v = p.embed("").unwrap();
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn output_is_unit_norm() {
        let p = HashedTfIdf::new(256);
        let v = p.embed("a meet-cute in a bustling coffee shop").unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "expected unit norm, got {norm}");
    }

    #[test]
    fn deterministic_across_calls() {
        let p = HashedTfIdf::new(128);
        assert_eq!(p.embed("Sarah Connor").unwrap(), p.embed("Sarah Connor").unwrap());
    }

    #[test]
    fn overlapping_texts_are_closer() {
        let p = HashedTfIdf::new(256);
        let a = p.embed("witty dialogue between rivals").unwrap();
        let b = p.embed("witty dialogue between friends").unwrap();
        let c = p.embed("community detection clustering graphs").unwrap();
        assert!(cosine(&a, &b) > cosine(&a, &c));
    }

    #[test]
    fn bigrams_distinguish_word_order_contexts() {
        let p = HashedTfIdf::new(256);
        // Shared unigrams but different bigrams: similar, not identical.
        let a = p.embed("coffee shop scene").unwrap();
        let b = p.embed("scene shop coffee").unwrap();
        assert_ne!(a, b);
    }
}
