//! Template compilation: resolve every enhanced variable, dispatch the
//! queries with bounded parallelism, and substitute instruction blocks.
//!
//! Compilation is all-or-nothing. A malformed token, an invisible bucket,
//! a failed query, or a timeout fails the whole template naming the
//! offending token — a silently degraded prompt would change the caller's
//! creative output without their knowledge.

use std::sync::Arc;
use std::time::Duration;

use lore_core::config::OrchestratorConfig;
use lore_core::errors::{LoreResult, QueryError, TemplateError};
use lore_core::models::{QueryConfig, QueryResponse};
use lore_registry::ScopeManager;
use lore_retrieval::QueryEngine;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::blocks::format_block;
use crate::token::{parse_tokens, ResolvedToken};

/// One compilation request.
#[derive(Debug, Clone)]
pub struct CompileRequest {
    /// The calling project; bucket references resolve against its visible
    /// buckets only.
    pub project_id: String,
    /// Template text with zero or more enhanced-variable tokens.
    pub template: String,
    /// The creative context being drafted (scene description, beat notes).
    /// Used as the retrieval query text for every token.
    pub context: String,
}

/// A compiled template plus per-token diagnostics.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    pub prompt: String,
    /// Query responses in token order, for diagnostics and UI display.
    pub responses: Vec<QueryResponse>,
}

/// The retrieval orchestrator.
pub struct Orchestrator {
    scopes: Arc<ScopeManager>,
    engine: Arc<QueryEngine>,
    config: OrchestratorConfig,
    limiter: Arc<Semaphore>,
}

impl Orchestrator {
    pub fn new(
        scopes: Arc<ScopeManager>,
        engine: Arc<QueryEngine>,
        config: OrchestratorConfig,
    ) -> Self {
        let permits = config.max_parallel_tokens.max(1);
        Self {
            scopes,
            engine,
            config,
            limiter: Arc::new(Semaphore::new(permits)),
        }
    }

    pub fn engine(&self) -> &Arc<QueryEngine> {
        &self.engine
    }

    /// Compile a template for a project.
    ///
    /// Tokens are resolved concurrently (bounded by
    /// `max_parallel_tokens`) since they are independent reads.
    /// Cancellation is cooperative: dropping this future aborts the
    /// outstanding query tasks and discards already-resolved results.
    pub async fn compile(&self, request: &CompileRequest) -> LoreResult<CompiledTemplate> {
        let tokens = parse_tokens(&request.template)?;
        if tokens.is_empty() {
            debug!(project = %request.project_id, "no enhanced variables, template passes through");
            return Ok(CompiledTemplate {
                prompt: request.template.clone(),
                responses: Vec::new(),
            });
        }

        // Resolve every bucket reference before dispatching any query, so
        // an unknown bucket fails fast with its token named.
        let mut resolved = Vec::with_capacity(tokens.len());
        for token in tokens {
            let bucket = self
                .scopes
                .resolve_for_project(&request.project_id, &token.bucket_ref)
                .map_err(|_| TemplateError::UnknownBucket {
                    token: token.raw.clone(),
                    bucket: token.bucket_ref.clone(),
                    project: request.project_id.clone(),
                })?;
            resolved.push((token, bucket.id));
        }

        info!(
            project = %request.project_id,
            tokens = resolved.len(),
            "compiling template"
        );

        let responses = self.dispatch(&resolved, &request.context).await?;

        // Substitute back-to-front so earlier spans stay valid.
        let mut prompt = request.template.clone();
        for ((token, _), response) in resolved.iter().zip(&responses).rev() {
            let block = format_block(response);
            prompt.replace_range(token.span.0..token.span.1, &block);
        }

        Ok(CompiledTemplate {
            prompt,
            responses,
        })
    }

    /// Supplemental whole-library retrieval: query every active bucket of
    /// a project with one configuration.
    pub async fn query_project(
        &self,
        project_id: &str,
        context: &str,
        config: &QueryConfig,
    ) -> LoreResult<Vec<QueryResponse>> {
        let buckets = self.scopes.active_for_project(project_id)?;
        let targets: Vec<(ResolvedToken, String)> = buckets
            .into_iter()
            .map(|bucket| {
                (
                    ResolvedToken {
                        raw: format!("{{{}}}", bucket.name),
                        span: (0, 0),
                        bucket_ref: bucket.name.clone(),
                        guidance: config.guidance.clone(),
                        mode: config.mode,
                        focus: config.focus,
                    },
                    bucket.id,
                )
            })
            .collect();
        self.dispatch(&targets, context).await
    }

    /// Run one query per token with bounded parallelism and a per-query
    /// timeout. The first failure aborts the remaining tasks.
    async fn dispatch(
        &self,
        targets: &[(ResolvedToken, String)],
        context: &str,
    ) -> LoreResult<Vec<QueryResponse>> {
        let timeout = Duration::from_millis(self.config.query_timeout_ms);
        let mut set: JoinSet<(usize, Result<QueryResponse, TemplateError>)> = JoinSet::new();

        for (idx, (token, bucket_id)) in targets.iter().enumerate() {
            let limiter = Arc::clone(&self.limiter);
            let engine = Arc::clone(&self.engine);
            let bucket_id = bucket_id.clone();
            let token = token.clone();
            let context = context.to_string();

            set.spawn(async move {
                // Held for the duration of the query; the semaphore is
                // never closed, so acquire only fails on shutdown.
                let _permit = limiter.acquire_owned().await.ok();
                let raw = token.raw.clone();
                let config = token.query_config();
                let bucket_for_err = bucket_id.clone();

                let query = tokio::task::spawn_blocking(move || {
                    engine.query(&bucket_id, &context, &config)
                });
                let outcome = match tokio::time::timeout(timeout, query).await {
                    Err(_) => {
                        let timed_out = QueryError::Timeout {
                            id: bucket_for_err,
                            elapsed_ms: timeout.as_millis() as u64,
                        };
                        Err(TemplateError::QueryFailed {
                            token: raw,
                            bucket: token.bucket_ref.clone(),
                            reason: timed_out.to_string(),
                        })
                    }
                    Ok(Err(join_err)) => Err(TemplateError::QueryFailed {
                        token: raw,
                        bucket: token.bucket_ref.clone(),
                        reason: join_err.to_string(),
                    }),
                    Ok(Ok(Err(query_err))) => Err(TemplateError::QueryFailed {
                        token: raw,
                        bucket: token.bucket_ref.clone(),
                        reason: query_err.to_string(),
                    }),
                    Ok(Ok(Ok(response))) => Ok(response),
                };
                (idx, outcome)
            });
        }

        let mut responses: Vec<Option<QueryResponse>> = vec![None; targets.len()];
        while let Some(joined) = set.join_next().await {
            let (idx, outcome) = match joined {
                Ok(pair) => pair,
                Err(join_err) => {
                    // A panicked task: blame the first still-unresolved token.
                    set.abort_all();
                    let pending = responses
                        .iter()
                        .position(|r| r.is_none())
                        .unwrap_or(0);
                    return Err(TemplateError::QueryFailed {
                        token: targets[pending].0.raw.clone(),
                        bucket: targets[pending].0.bucket_ref.clone(),
                        reason: join_err.to_string(),
                    }
                    .into());
                }
            };
            match outcome {
                Ok(response) => responses[idx] = Some(response),
                Err(err) => {
                    // All-or-nothing: abort the rest, discard partials.
                    set.abort_all();
                    return Err(err.into());
                }
            }
        }

        Ok(responses.into_iter().flatten().collect())
    }
}
