//! Portable bucket archives for export/import.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::graph::GraphSnapshot;
use crate::constants::ARCHIVE_FORMAT_VERSION;

/// A document carried inside an archive, content included, so the archive
/// is self-contained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedDocument {
    pub name: String,
    pub content: String,
}

/// Self-contained representation of a bucket: metadata, raw documents, and
/// the serialized graph. Importing recreates an equivalent bucket under a
/// freshly minted id — ids are never reused across processes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketArchive {
    pub format_version: u32,
    pub name: String,
    pub description: String,
    pub documents: Vec<ArchivedDocument>,
    pub snapshot: GraphSnapshot,
    pub exported_at: DateTime<Utc>,
}

impl BucketArchive {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        documents: Vec<ArchivedDocument>,
        snapshot: GraphSnapshot,
    ) -> Self {
        Self {
            format_version: ARCHIVE_FORMAT_VERSION,
            name: name.into(),
            description: description.into(),
            documents,
            snapshot,
            exported_at: Utc::now(),
        }
    }
}
