//! Query configuration and result types.

use serde::{Deserialize, Serialize};

use crate::constants::{FOCUS_DEFAULT, FOCUS_MAX, FOCUS_MIN};

/// The four retrieval modes, in increasing synthesis cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// Embedding similarity over document chunks.
    Naive,
    /// Entity-centered: matched entities plus their relationship
    /// neighborhood.
    Local,
    /// Community-level thematic synthesis.
    Global,
    /// Local and global merged, weighted by focus.
    Hybrid,
}

impl QueryMode {
    /// Parse a mode name from the template syntax. `mix` is an accepted
    /// alias for hybrid, matching the original engine's mode vocabulary.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "naive" => Some(Self::Naive),
            "local" => Some(Self::Local),
            "global" => Some(Self::Global),
            "hybrid" | "mix" => Some(Self::Hybrid),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Naive => "naive",
            Self::Local => "local",
            Self::Global => "global",
            Self::Hybrid => "hybrid",
        }
    }
}

impl Default for QueryMode {
    fn default() -> Self {
        Self::Hybrid
    }
}

impl std::fmt::Display for QueryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-invocation retrieval configuration. Ephemeral — constructed by the
/// orchestrator for each call, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    pub mode: QueryMode,
    /// Free-form instruction steering ranking. An additional signal, not a
    /// filter: it reorders and truncates, never drops required content.
    pub guidance: Option<String>,
    /// Bounded breadth-vs-depth control, 1..=10.
    pub focus: u8,
}

impl QueryConfig {
    pub fn new(mode: QueryMode, guidance: Option<String>, focus: u8) -> Self {
        Self {
            mode,
            guidance,
            focus: focus.clamp(FOCUS_MIN, FOCUS_MAX),
        }
    }

    /// Focus as a 0.0..=1.0 fraction of its range.
    pub fn focus_fraction(&self) -> f32 {
        (self.focus.clamp(FOCUS_MIN, FOCUS_MAX) - FOCUS_MIN) as f32
            / (FOCUS_MAX - FOCUS_MIN) as f32
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            mode: QueryMode::default(),
            guidance: None,
            focus: FOCUS_DEFAULT,
        }
    }
}

/// Where a passage came from, for diagnostics and block formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassageOrigin {
    Chunk,
    Neighborhood,
    Community,
}

/// One retrieved passage with provenance and relevance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPassage {
    pub text: String,
    /// Relevance score; higher is more relevant. Comparable only within a
    /// single response.
    pub score: f32,
    /// Source document names.
    pub provenance: Vec<String>,
    pub origin: PassageOrigin,
}

/// The result of one bucket query: ranked passages plus the echoed
/// effective configuration, so downstream consumers see how the context was
/// retrieved, not just the content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub bucket_id: String,
    pub bucket_name: String,
    pub passages: Vec<RankedPassage>,
    pub config: QueryConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_aliases() {
        assert_eq!(QueryMode::parse("naive"), Some(QueryMode::Naive));
        assert_eq!(QueryMode::parse("Hybrid"), Some(QueryMode::Hybrid));
        assert_eq!(QueryMode::parse("mix"), Some(QueryMode::Hybrid));
        assert_eq!(QueryMode::parse("exact"), None);
    }

    #[test]
    fn config_clamps_focus() {
        let c = QueryConfig::new(QueryMode::Naive, None, 99);
        assert_eq!(c.focus, FOCUS_MAX);
        let c = QueryConfig::new(QueryMode::Naive, None, 0);
        assert_eq!(c.focus, FOCUS_MIN);
    }

    #[test]
    fn focus_fraction_spans_unit_interval() {
        assert_eq!(QueryConfig::new(QueryMode::Naive, None, 1).focus_fraction(), 0.0);
        assert_eq!(QueryConfig::new(QueryMode::Naive, None, 10).focus_fraction(), 1.0);
    }

    #[test]
    fn default_mode_is_hybrid() {
        assert_eq!(QueryConfig::default().mode, QueryMode::Hybrid);
        assert_eq!(QueryConfig::default().focus, FOCUS_DEFAULT);
    }
}
