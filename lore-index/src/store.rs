//! Raw document storage inside a bucket directory.
//!
//! The store holds source files verbatim under `documents/`; the manifest
//! (`documents.json`) records what the committed graph was actually built
//! from. Files present on disk but absent from the manifest are pending
//! ingestion.

use std::path::{Path, PathBuf};

use lore_core::constants::DOCUMENTS_DIR;
use lore_core::errors::{IngestError, LoreResult};
use tracing::debug;

/// A source file staged for ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSource {
    pub name: String,
    pub content: String,
}

impl DocumentSource {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

fn io_err(path: &Path, source: std::io::Error) -> lore_core::LoreError {
    IngestError::Io {
        path: path.display().to_string(),
        source,
    }
    .into()
}

fn docs_dir(bucket_dir: &Path) -> PathBuf {
    bucket_dir.join(DOCUMENTS_DIR)
}

/// Write a source file into the bucket's documents directory. Overwrites a
/// same-named file; the content hash decides later whether re-ingestion has
/// work to do.
pub fn write_document(bucket_dir: &Path, source: &DocumentSource) -> LoreResult<()> {
    if source.content.trim().is_empty() {
        return Err(IngestError::EmptySource {
            src: source.name.clone(),
        }
        .into());
    }
    let dir = docs_dir(bucket_dir);
    std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
    let path = dir.join(&source.name);
    std::fs::write(&path, &source.content).map_err(|e| io_err(&path, e))?;
    debug!(name = %source.name, bytes = source.content.len(), "document stored");
    Ok(())
}

/// Remove a stored document file. Returns whether a file was deleted.
pub fn remove_document(bucket_dir: &Path, name: &str) -> LoreResult<bool> {
    let path = docs_dir(bucket_dir).join(name);
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(&path).map_err(|e| io_err(&path, e))?;
    Ok(true)
}

/// Read every stored document, sorted by name for deterministic builds.
pub fn read_all(bucket_dir: &Path) -> LoreResult<Vec<DocumentSource>> {
    let dir = docs_dir(bucket_dir);
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut sources = Vec::new();
    let entries = std::fs::read_dir(&dir).map_err(|e| io_err(&dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(&dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let content = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        sources.push(DocumentSource::new(name, content));
    }
    sources.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        write_document(dir.path(), &DocumentSource::new("b.txt", "beta")).unwrap();
        write_document(dir.path(), &DocumentSource::new("a.txt", "alpha")).unwrap();

        let all = read_all(dir.path()).unwrap();
        assert_eq!(all.len(), 2);
        // Sorted by name.
        assert_eq!(all[0].name, "a.txt");
        assert_eq!(all[1].content, "beta");
    }

    #[test]
    fn empty_content_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_document(dir.path(), &DocumentSource::new("x.txt", "  \n")).unwrap_err();
        assert!(err.to_string().contains("no ingestible content"));
    }

    #[test]
    fn remove_reports_presence() {
        let dir = tempfile::tempdir().unwrap();
        write_document(dir.path(), &DocumentSource::new("x.txt", "text")).unwrap();
        assert!(remove_document(dir.path(), "x.txt").unwrap());
        assert!(!remove_document(dir.path(), "x.txt").unwrap());
    }
}
