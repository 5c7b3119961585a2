//! Instruction-block formatting.
//!
//! Each resolved token is replaced with a block embedding the retrieved
//! passages and the effective configuration, so the downstream model sees
//! how the context was retrieved, not just the content.

use lore_core::models::QueryResponse;

/// Render a retrieval block for one resolved token.
pub fn format_block(response: &QueryResponse) -> String {
    let config = &response.config;
    let mut out = String::new();

    out.push_str(&format!(
        "[Reference context from bucket \"{}\" | mode: {} | focus: {}",
        response.bucket_name, config.mode, config.focus
    ));
    if let Some(guidance) = &config.guidance {
        out.push_str(&format!(" | guidance: \"{guidance}\""));
    }
    out.push_str("]\n");

    if response.passages.is_empty() {
        out.push_str("(no passages matched)\n");
    }
    for (rank, passage) in response.passages.iter().enumerate() {
        out.push_str(&format!(
            "{}. (score {:.3}; from {}) {}\n",
            rank + 1,
            passage.score,
            if passage.provenance.is_empty() {
                "unknown".to_string()
            } else {
                passage.provenance.join(", ")
            },
            passage.text
        ));
    }
    out.push_str(&format!("[End of \"{}\" context]", response.bucket_name));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lore_core::models::{PassageOrigin, QueryConfig, QueryMode, RankedPassage};

    #[test]
    fn block_embeds_content_and_effective_config() {
        let response = QueryResponse {
            bucket_id: "b-1".into(),
            bucket_name: "books".into(),
            passages: vec![RankedPassage {
                text: "Subtext beats exposition.".into(),
                score: 0.8123,
                provenance: vec!["craft.md".into()],
                origin: PassageOrigin::Chunk,
            }],
            config: QueryConfig::new(QueryMode::Hybrid, Some("find dialogue patterns".into()), 7),
        };
        let block = format_block(&response);

        assert!(block.contains("\"books\""));
        assert!(block.contains("mode: hybrid"));
        assert!(block.contains("focus: 7"));
        assert!(block.contains("guidance: \"find dialogue patterns\""));
        assert!(block.contains("Subtext beats exposition."));
        assert!(block.contains("craft.md"));
        assert!(block.contains("score 0.812"));
    }

    #[test]
    fn empty_results_are_explicit() {
        let response = QueryResponse {
            bucket_id: "b-1".into(),
            bucket_name: "books".into(),
            passages: vec![],
            config: QueryConfig::default(),
        };
        assert!(format_block(&response).contains("(no passages matched)"));
    }
}
