/// Registry and scope-manager errors.
///
/// These are caller input errors and are surfaced directly — never retried.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("bucket name '{name}' already exists in {scope} scope")]
    DuplicateName { name: String, scope: String },

    #[error("bucket '{reference}' not found")]
    NotFound { reference: String },

    #[error("bucket '{id}' still has {count} project association(s); unlink them first")]
    HasAssociations { id: String, count: usize },

    #[error("bucket '{id}' is already imported into project '{project}'")]
    AlreadyImported { id: String, project: String },

    #[error("bucket '{id}' has {scope} scope; operation requires library scope")]
    NotLibraryScope { id: String, scope: String },

    #[error("bucket '{id}' is already library scope")]
    AlreadyLibraryScope { id: String },

    #[error("invalid status transition for bucket '{id}': {from} -> {to}")]
    InvalidTransition {
        id: String,
        from: String,
        to: String,
    },

    #[error("registry data corrupt at {path}: {reason}")]
    Corrupt { path: String, reason: String },

    #[error("registry I/O at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
