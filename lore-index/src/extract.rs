//! Offline heuristic entity extraction.
//!
//! The production path is an LLM-backed extractor behind the same trait;
//! this one is deterministic so ingestion works air-gapped and tests are
//! stable. It finds capitalized name phrases, classifies them with simple
//! cues, and links entities that share a sentence.

use std::collections::HashMap;

use lore_core::errors::LoreResult;
use lore_core::models::graph::{normalize_name, EntityKind};
use lore_core::traits::{ExtractedEntity, ExtractedRelation, Extraction, IEntityExtractor};
use regex::Regex;

/// Leading words that start sentences or screenplay headings, not names.
const PHRASE_STOPLIST: &[&str] = &[
    "The", "A", "An", "And", "But", "Or", "If", "When", "Then", "She", "He", "They", "It", "We",
    "You", "His", "Her", "Their", "This", "That", "INT", "EXT", "FADE", "CUT", "DISSOLVE",
];

/// Organization cue tokens.
const ORG_TOKENS: &[&str] = &["Inc", "Corp", "Company", "Studios", "Studio", "Guild", "Agency"];

/// Place cue prepositions (phrase immediately preceded by one).
const PLACE_PREPOSITIONS: &[&str] = &["in", "at", "near", "outside", "inside"];

/// Cap on co-occurrence pairs emitted per sentence.
const MAX_PAIRS_PER_SENTENCE: usize = 6;

/// Maximum stored description length per mention.
const DESCRIPTION_LEN: usize = 200;

pub struct HeuristicExtractor {
    phrase: Regex,
    sentence_break: Regex,
}

impl HeuristicExtractor {
    pub fn new() -> Self {
        Self {
            // Capitalized word runs ("Sarah", "Sarah Connor", "NORTHSIDE").
            phrase: Regex::new(r"\b[A-Z][A-Za-z']+(?:\s+[A-Z][A-Za-z']+)*\b")
                .expect("static pattern"),
            sentence_break: Regex::new(r"[.!?]\s+").expect("static pattern"),
        }
    }

    fn sentences<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.sentence_break
            .split(text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Name phrases in a sentence with their byte offsets (for preposition
    /// lookbehind). Leading stoplist words are stripped, so "When Sarah"
    /// yields "Sarah".
    fn phrases<'t>(&self, sentence: &'t str) -> Vec<(usize, &'t str)> {
        let mut out = Vec::new();
        for m in self.phrase.find_iter(sentence) {
            let mut start = m.start();
            let mut text = m.as_str();
            while let Some(first) = text.split_whitespace().next() {
                if !PHRASE_STOPLIST.contains(&first) {
                    break;
                }
                match text[first.len()..].find(|c: char| !c.is_whitespace()) {
                    Some(gap) => {
                        start += first.len() + gap;
                        text = &text[first.len() + gap..];
                    }
                    None => {
                        text = "";
                        break;
                    }
                }
            }
            if !text.is_empty() {
                out.push((start, text));
            }
        }
        out
    }

    fn classify(sentence: &str, offset: usize, phrase: &str, mentions: u32) -> EntityKind {
        if phrase
            .split_whitespace()
            .any(|w| ORG_TOKENS.contains(&w.trim_matches(|c: char| !c.is_alphanumeric())))
        {
            return EntityKind::Organization;
        }
        // A single all-caps token reads as a screenplay character cue.
        if !phrase.contains(' ')
            && phrase.len() >= 3
            && phrase.chars().all(|c| c.is_uppercase() || c == '\'')
        {
            return EntityKind::Person;
        }
        if preceded_by_preposition(sentence, offset) {
            return EntityKind::Place;
        }
        // Short repeated proper nouns in narrative text are usually
        // characters; one-off phrases stay concepts.
        if mentions >= 2 && phrase.split_whitespace().count() <= 2 {
            return EntityKind::Person;
        }
        EntityKind::Concept
    }
}

fn preceded_by_preposition(sentence: &str, offset: usize) -> bool {
    let before = &sentence[..offset];
    let last_word = before
        .split_whitespace()
        .last()
        .map(|w| w.to_lowercase())
        .unwrap_or_default();
    PLACE_PREPOSITIONS.contains(&last_word.as_str())
}

fn truncate(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut cut = limit;
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…", &text[..cut])
}

impl Default for HeuristicExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl IEntityExtractor for HeuristicExtractor {
    fn extract(&self, doc_name: &str, chunks: &[String]) -> LoreResult<Extraction> {
        // First pass: count mentions per normalized name across the
        // document, so classification can use repetition.
        let mut mention_counts: HashMap<String, u32> = HashMap::new();
        for chunk in chunks {
            for sentence in self.sentences(chunk) {
                for (_, phrase) in self.phrases(sentence) {
                    *mention_counts.entry(normalize_name(phrase)).or_default() += 1;
                }
            }
        }

        let mut extraction = Extraction::default();
        let mut seen_relations: HashMap<(String, String), usize> = HashMap::new();

        for chunk in chunks {
            for sentence in self.sentences(chunk) {
                let found = self.phrases(sentence);
                let description = truncate(sentence, DESCRIPTION_LEN);

                for (offset, phrase) in &found {
                    let mentions = mention_counts[&normalize_name(phrase)];
                    extraction.entities.push(ExtractedEntity {
                        name: phrase.to_string(),
                        kind: Self::classify(sentence, *offset, phrase, mentions),
                        description: description.clone(),
                    });
                }

                // Entities sharing a sentence are related; the sentence is
                // the relationship's description.
                let mut pairs = 0;
                for i in 0..found.len() {
                    for j in (i + 1)..found.len() {
                        if pairs >= MAX_PAIRS_PER_SENTENCE {
                            break;
                        }
                        let a = normalize_name(found[i].1);
                        let b = normalize_name(found[j].1);
                        if a == b {
                            continue;
                        }
                        let key = if a <= b {
                            (a.clone(), b.clone())
                        } else {
                            (b.clone(), a.clone())
                        };
                        if seen_relations.contains_key(&key) {
                            continue;
                        }
                        seen_relations.insert(key, extraction.relations.len());
                        extraction.relations.push(ExtractedRelation {
                            source: found[i].1.to_string(),
                            target: found[j].1.to_string(),
                            description: format!("{description} ({doc_name})"),
                        });
                        pairs += 1;
                    }
                }
            }
        }

        Ok(extraction)
    }

    fn name(&self) -> &str {
        "heuristic-extractor"
    }
}
