/// Ingestion subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// A second ingestion was requested while one is in flight. The caller
    /// must wait for the in-flight run to settle; parallel ingestion of the
    /// same bucket is never allowed.
    #[error("ingestion already in progress for bucket '{id}'")]
    IngestionInProgress { id: String },

    /// Ingestion failed after any retry. The previously committed snapshot
    /// is retained on disk and remains reachable.
    #[error("ingestion failed for bucket '{id}' (previous snapshot retained): {reason}")]
    IngestionFailed { id: String, reason: String },

    #[error("no ingestible content in source '{src}'")]
    EmptySource { src: String },

    /// An embedding or extraction provider failed. `transient` failures
    /// (timeouts, connection resets) are retried once before the bucket
    /// settles into `failed` status.
    #[error("provider '{provider}' failed: {reason}")]
    Provider {
        provider: String,
        transient: bool,
        reason: String,
    },

    #[error("document store I/O at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl IngestError {
    /// Whether a single automatic retry is warranted.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Provider { transient: true, .. })
    }
}
