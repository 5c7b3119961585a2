//! Bucket metadata: identity, scope, stats, and indexing status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Visibility classification of a bucket.
///
/// - `library` buckets are shared: many projects may import them by
///   reference.
/// - `local` buckets are exclusive to one owning project.
/// - `legacy` buckets were discovered on disk without a registry entry and
///   migrated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketScope {
    Library,
    Local,
    Legacy,
}

impl BucketScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Library => "library",
            Self::Local => "local",
            Self::Legacy => "legacy",
        }
    }

    /// Whether buckets of this scope may be imported by other projects.
    pub fn is_shared(&self) -> bool {
        matches!(self, Self::Library)
    }
}

impl std::fmt::Display for BucketScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Indexing lifecycle of a bucket.
///
/// Transitions: `empty → ingesting → ready`; `ready → ingesting` on
/// re-ingestion; any ingestion failure → `failed` with the prior committed
/// snapshot preserved. `stale` marks a ready bucket whose document set
/// changed without re-ingestion (e.g. a document was removed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexStatus {
    Empty,
    Ingesting,
    Ready,
    Stale,
    Failed,
}

impl IndexStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Ingesting => "ingesting",
            Self::Ready => "ready",
            Self::Stale => "stale",
            Self::Failed => "failed",
        }
    }

    /// Whether an ingestion run may start from this status.
    /// `ingesting` is never entered twice concurrently.
    pub fn can_begin_ingest(&self) -> bool {
        !matches!(self, Self::Ingesting)
    }
}

impl std::fmt::Display for IndexStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle statistics, updated by ingestion workers (last-writer-wins).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketStats {
    /// Number of ingested documents.
    pub documents: usize,
    /// Number of graph entities (nodes).
    pub entities: usize,
    /// Number of graph relationships (edges).
    pub relationships: usize,
    /// Last time documents or the index changed.
    pub last_modified: DateTime<Utc>,
}

impl BucketStats {
    pub fn empty() -> Self {
        Self {
            documents: 0,
            entities: 0,
            relationships: 0,
            last_modified: Utc::now(),
        }
    }
}

/// A named, scoped collection of reference documents plus its derived
/// knowledge index. Owned by the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bucket {
    /// UUID v4, globally unique, never reused across processes.
    pub id: String,
    /// Human label, unique within a scope.
    pub name: String,
    pub scope: BucketScope,
    pub description: String,
    pub stats: BucketStats,
    pub status: IndexStatus,
    pub created_at: DateTime<Utc>,
    /// Whether the bucket ever reached `ready`. A `failed` bucket with a
    /// prior committed snapshot is still served stale; one without is not.
    pub has_committed_snapshot: bool,
    /// On-disk location override. `None` means the default
    /// `buckets/<id>` layout; migrated legacy buckets keep their original
    /// directory (files are never moved by migration).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<std::path::PathBuf>,
}

impl Bucket {
    pub fn new(name: impl Into<String>, scope: BucketScope, description: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            scope,
            description: description.into(),
            stats: BucketStats::empty(),
            status: IndexStatus::Empty,
            created_at: Utc::now(),
            has_committed_snapshot: false,
            location: None,
        }
    }

    /// Whether a query can be served right now — either the bucket is
    /// `ready`/`stale`, or it fell back to a prior committed snapshot.
    pub fn is_queryable(&self) -> bool {
        match self.status {
            IndexStatus::Ready | IndexStatus::Stale => true,
            IndexStatus::Ingesting | IndexStatus::Failed => self.has_committed_snapshot,
            IndexStatus::Empty => false,
        }
    }
}
