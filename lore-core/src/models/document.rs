//! Ingested document records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ingested source file. The content hash makes re-ingestion idempotent:
/// an unchanged document must not duplicate graph entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// UUID v4.
    pub id: String,
    /// Display name (usually the source file name).
    pub name: String,
    /// blake3 hex digest of the raw content.
    pub content_hash: String,
    /// Raw content length in bytes.
    pub bytes: u64,
    pub ingested_at: DateTime<Utc>,
}

impl DocumentRecord {
    pub fn new(name: impl Into<String>, content: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            content_hash: content_digest(content),
            bytes: content.len() as u64,
            ingested_at: Utc::now(),
        }
    }
}

/// blake3 hex digest of document content, used for change detection.
pub fn content_digest(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}
