//! Remote embedding provider speaking a minimal JSON contract.
//!
//! POST `{"inputs": ["...", ...]}` to the configured endpoint, expect
//! `{"vectors": [[...], ...]}`. Timeouts and connection failures map to
//! transient provider errors so ingestion retries once before failing.

use std::time::Duration;

use lore_core::errors::{IngestError, LoreError, LoreResult};
use lore_core::traits::IEmbeddingProvider;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    vectors: Vec<Vec<f32>>,
}

/// Embedding provider backed by an HTTP service.
pub struct RemoteEmbedder {
    endpoint: String,
    dimensions: usize,
    client: reqwest::blocking::Client,
}

impl RemoteEmbedder {
    pub fn new(endpoint: &str, dimensions: usize, timeout_ms: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .expect("reqwest client construction only fails on invalid TLS config");
        Self {
            endpoint: endpoint.to_string(),
            dimensions,
            client,
        }
    }

    fn provider_error(&self, transient: bool, reason: String) -> LoreError {
        LoreError::Ingest(IngestError::Provider {
            provider: "remote-embedder".into(),
            transient,
            reason,
        })
    }

    fn request(&self, inputs: &[String]) -> LoreResult<Vec<Vec<f32>>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&EmbedRequest { inputs })
            .send()
            .map_err(|e| {
                // Timeouts and connection resets are worth one retry;
                // anything else is treated as permanent.
                let transient = e.is_timeout() || e.is_connect();
                self.provider_error(transient, e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let transient = status.is_server_error();
            return Err(self.provider_error(transient, format!("HTTP {status}")));
        }

        let body: EmbedResponse = response
            .json()
            .map_err(|e| self.provider_error(false, format!("bad response body: {e}")))?;

        if body.vectors.len() != inputs.len() {
            return Err(self.provider_error(
                false,
                format!(
                    "expected {} vectors, got {}",
                    inputs.len(),
                    body.vectors.len()
                ),
            ));
        }
        for v in &body.vectors {
            if v.len() != self.dimensions {
                return Err(self.provider_error(
                    false,
                    format!("expected {} dimensions, got {}", self.dimensions, v.len()),
                ));
            }
        }
        Ok(body.vectors)
    }
}

impl IEmbeddingProvider for RemoteEmbedder {
    fn embed(&self, text: &str) -> LoreResult<Vec<f32>> {
        let inputs = vec![text.to_string()];
        Ok(self.request(&inputs)?.remove(0))
    }

    fn embed_batch(&self, texts: &[String]) -> LoreResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "remote-embedder"
    }

    fn is_available(&self) -> bool {
        !self.endpoint.is_empty()
    }
}
