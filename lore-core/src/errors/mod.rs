//! Error taxonomy for the Lore system.
//!
//! Each subsystem has its own `thiserror` enum; `LoreError` aggregates them
//! for callers that cross subsystem boundaries.

pub mod ingest_error;
pub mod query_error;
pub mod registry_error;
pub mod template_error;

pub use ingest_error::IngestError;
pub use query_error::QueryError;
pub use registry_error::RegistryError;
pub use template_error::TemplateError;

/// Top-level error type: any subsystem failure.
#[derive(Debug, thiserror::Error)]
pub enum LoreError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Convenience result alias used throughout the workspace.
pub type LoreResult<T> = Result<T, LoreError>;
