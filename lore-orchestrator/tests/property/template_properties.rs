//! Property tests for the enhanced-variable parser.

use lore_core::models::QueryMode;
use lore_orchestrator::parse_tokens;
use proptest::prelude::*;

proptest! {
    /// Templates without brace blocks never produce tokens and never fail.
    #[test]
    fn brace_free_text_always_parses_empty(text in "[^{}]{0,400}") {
        let tokens = parse_tokens(&text).unwrap();
        prop_assert!(tokens.is_empty());
    }

    /// The parser never panics, whatever the input.
    #[test]
    fn arbitrary_input_never_panics(text in ".{0,400}") {
        let _ = parse_tokens(&text);
    }

    /// A well-formed token round-trips its parameters exactly.
    #[test]
    fn valid_tokens_round_trip(
        bucket in "[a-z][a-z0-9_-]{0,20}",
        guidance in "[a-zA-Z0-9 ,.]{1,60}",
        mode_idx in 0usize..5,
        focus in 1u8..=10,
    ) {
        let modes = ["naive", "local", "global", "hybrid", "mix"];
        let mode_name = modes[mode_idx];
        let template = format!(
            "prefix {{{bucket}|guidance:\"{guidance}\"|mode:\"{mode_name}\"|focus:{focus}}} suffix"
        );

        let tokens = parse_tokens(&template).unwrap();
        prop_assert_eq!(tokens.len(), 1);
        let token = &tokens[0];
        prop_assert_eq!(&token.bucket_ref, &bucket);
        prop_assert_eq!(token.guidance.as_deref(), Some(guidance.as_str()));
        prop_assert_eq!(token.focus, focus);
        let expected = QueryMode::parse(mode_name).unwrap();
        prop_assert_eq!(token.mode, expected);

        // The recorded span points exactly at the token text.
        prop_assert_eq!(&template[token.span.0..token.span.1], token.raw.as_str());
    }

    /// Focus values outside 1..=10 always fail, in range always succeed.
    #[test]
    fn focus_bounds_are_enforced(focus in -20i64..30) {
        let template = format!("{{books|focus:{focus}}}");
        let result = parse_tokens(&template);
        if (1..=10).contains(&focus) {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(result.is_err());
        }
    }
}
