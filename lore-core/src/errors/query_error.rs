/// Query engine errors.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The bucket has no committed snapshot to serve: its status is `empty`,
    /// or it is `failed` without ever having reached `ready`.
    #[error("bucket '{id}' is not ready for queries (status {status})")]
    NotReady { id: String, status: String },

    #[error("query against bucket '{id}' timed out after {elapsed_ms}ms")]
    Timeout { id: String, elapsed_ms: u64 },

    #[error("unknown bucket '{reference}'")]
    UnknownBucket { reference: String },
}
