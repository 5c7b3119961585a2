//! Enhanced-variable token parsing.
//!
//! Wire syntax inside a prompt template:
//! `{bucketRef|guidance:"<text>"|mode:"<naive|local|global|hybrid|mix>"|focus:<1-10>}`
//! with every clause after the bucket reference optional and order-free.
//! Tokens parse into a validated `ResolvedToken` eagerly — malformed tokens
//! fail fast at parse time, never lazily at substitution time.

use std::sync::OnceLock;

use lore_core::constants::{FOCUS_DEFAULT, FOCUS_MAX, FOCUS_MIN};
use lore_core::errors::TemplateError;
use lore_core::models::{QueryConfig, QueryMode};
use regex::Regex;

/// A parsed, validated enhanced variable.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedToken {
    /// The literal token text, braces included, for error reporting and
    /// substitution.
    pub raw: String,
    /// Byte span of the token within the template.
    pub span: (usize, usize),
    pub bucket_ref: String,
    pub guidance: Option<String>,
    pub mode: QueryMode,
    pub focus: u8,
}

impl ResolvedToken {
    pub fn query_config(&self) -> QueryConfig {
        QueryConfig::new(self.mode, self.guidance.clone(), self.focus)
    }
}

/// Whether a brace block's first clause looks like a bucket reference.
/// Dotted variables (`{sql.characters}`) and other collaborators' syntax
/// pass through untouched.
fn is_bucket_reference(clause: &str) -> bool {
    !clause.is_empty()
        && clause
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == ' ')
}

/// Split token content on `|`, honoring double quotes so guidance text may
/// contain pipes.
fn split_clauses(content: &str) -> Vec<String> {
    let mut clauses = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in content.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '|' if !in_quotes => {
                clauses.push(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(c),
        }
    }
    clauses.push(current.trim().to_string());
    clauses
}

/// Strip one layer of double quotes if present.
fn unquote(value: &str) -> &str {
    let v = value.trim();
    if v.len() >= 2 && v.starts_with('"') && v.ends_with('"') {
        &v[1..v.len() - 1]
    } else {
        v
    }
}

/// Find and validate every enhanced-variable token in a template.
///
/// Brace blocks that do not read as enhanced variables (dotted names,
/// empty braces) are ignored; blocks that do are fully validated here.
pub fn parse_tokens(template: &str) -> Result<Vec<ResolvedToken>, TemplateError> {
    // Brace blocks never nest; guidance text cannot contain braces.
    static BLOCK: OnceLock<Regex> = OnceLock::new();
    let block = BLOCK.get_or_init(|| Regex::new(r"\{[^{}]*\}").expect("static pattern"));

    let mut tokens = Vec::new();
    for found in block.find_iter(template) {
        let raw = found.as_str().to_string();
        let content = &raw[1..raw.len() - 1];
        let clauses = split_clauses(content);

        let bucket_ref = clauses[0].clone();
        if clauses.len() == 1 && !is_bucket_reference(&bucket_ref) {
            // Another collaborator's variable (dotted names etc.) — not ours.
            continue;
        }
        if bucket_ref.is_empty() {
            return Err(TemplateError::EmptyReference { token: raw });
        }
        if !is_bucket_reference(&bucket_ref) {
            return Err(TemplateError::MalformedToken {
                token: raw.clone(),
                reason: format!("'{bucket_ref}' is not a valid bucket reference"),
            });
        }

        let mut guidance: Option<String> = None;
        let mut mode: Option<QueryMode> = None;
        let mut focus: Option<u8> = None;

        for clause in &clauses[1..] {
            if clause.is_empty() {
                return Err(TemplateError::MalformedToken {
                    token: raw.clone(),
                    reason: "empty clause".into(),
                });
            }
            let Some((key, value)) = clause.split_once(':') else {
                return Err(TemplateError::MalformedToken {
                    token: raw.clone(),
                    reason: format!("clause '{clause}' is not key:value"),
                });
            };
            match key.trim() {
                "guidance" => {
                    if guidance.is_some() {
                        return Err(duplicate(&raw, "guidance"));
                    }
                    guidance = Some(unquote(value).to_string());
                }
                "mode" => {
                    if mode.is_some() {
                        return Err(duplicate(&raw, "mode"));
                    }
                    let name = unquote(value);
                    mode = Some(QueryMode::parse(name).ok_or_else(|| {
                        TemplateError::UnknownMode {
                            token: raw.clone(),
                            mode: name.to_string(),
                        }
                    })?);
                }
                "focus" => {
                    if focus.is_some() {
                        return Err(duplicate(&raw, "focus"));
                    }
                    let parsed: i64 = unquote(value).trim().parse().map_err(|_| {
                        TemplateError::MalformedToken {
                            token: raw.clone(),
                            reason: format!("focus '{}' is not an integer", value.trim()),
                        }
                    })?;
                    if parsed < FOCUS_MIN as i64 || parsed > FOCUS_MAX as i64 {
                        return Err(TemplateError::FocusOutOfRange {
                            token: raw.clone(),
                            focus: parsed,
                        });
                    }
                    focus = Some(parsed as u8);
                }
                other => {
                    return Err(TemplateError::MalformedToken {
                        token: raw.clone(),
                        reason: format!("unknown clause '{other}'"),
                    });
                }
            }
        }

        tokens.push(ResolvedToken {
            span: (found.start(), found.end()),
            bucket_ref,
            guidance: guidance.filter(|g| !g.is_empty()),
            mode: mode.unwrap_or_default(),
            focus: focus.unwrap_or(FOCUS_DEFAULT),
            raw,
        });
    }
    Ok(tokens)
}

fn duplicate(token: &str, clause: &str) -> TemplateError {
    TemplateError::MalformedToken {
        token: token.to_string(),
        reason: format!("duplicate {clause} clause"),
    }
}
