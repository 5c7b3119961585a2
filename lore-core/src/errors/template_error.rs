/// Template compilation errors.
///
/// Compilation is all-or-nothing: any malformed or unresolvable token fails
/// the whole template, and every variant names the offending token so the
/// caller can correct it. A partially compiled prompt is a correctness bug,
/// not a recoverable default.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("malformed token '{token}': {reason}")]
    MalformedToken { token: String, reason: String },

    #[error("token '{token}': unknown retrieval mode '{mode}'")]
    UnknownMode { token: String, mode: String },

    #[error("token '{token}': focus {focus} is outside 1..=10")]
    FocusOutOfRange { token: String, focus: i64 },

    #[error("token '{token}': empty bucket reference")]
    EmptyReference { token: String },

    #[error("token '{token}': bucket '{bucket}' is not visible to project '{project}'")]
    UnknownBucket {
        token: String,
        bucket: String,
        project: String,
    },

    #[error("token '{token}': retrieval from bucket '{bucket}' failed: {reason}")]
    QueryFailed {
        token: String,
        bucket: String,
        reason: String,
    },
}

impl TemplateError {
    /// The literal token text this error is about.
    pub fn token(&self) -> &str {
        match self {
            Self::MalformedToken { token, .. }
            | Self::UnknownMode { token, .. }
            | Self::FocusOutOfRange { token, .. }
            | Self::EmptyReference { token }
            | Self::UnknownBucket { token, .. }
            | Self::QueryFailed { token, .. } => token,
        }
    }
}
