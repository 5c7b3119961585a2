//! Legacy bucket discovery.
//!
//! Before the registry existed, buckets were bare directories named after
//! the bucket, each holding a `documents/` folder and possibly a committed
//! `graph.json`. Discovery finds such directories so they can be migrated
//! in place — files are never moved.

use std::path::{Path, PathBuf};

use lore_core::constants::{DOCUMENTS_DIR, SNAPSHOT_FILE};
use lore_core::errors::{LoreResult, RegistryError};

/// A directory that looks like bucket data but has no registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyCandidate {
    pub path: PathBuf,
    /// Directory name, used as the migrated bucket's name.
    pub name: String,
}

/// Whether a directory holds bucket-shaped data.
pub fn is_bucket_dir(path: &Path) -> bool {
    path.is_dir() && (path.join(DOCUMENTS_DIR).is_dir() || path.join(SNAPSHOT_FILE).is_file())
}

/// Scan the buckets directory for data directories not claimed by any
/// registered bucket. `claimed` holds the directory paths of every
/// registered bucket (default layout and location overrides alike).
pub fn discover(buckets_dir: &Path, claimed: &[PathBuf]) -> LoreResult<Vec<LegacyCandidate>> {
    if !buckets_dir.exists() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(buckets_dir).map_err(|e| {
        lore_core::LoreError::from(RegistryError::Io {
            path: buckets_dir.display().to_string(),
            source: e,
        })
    })?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            lore_core::LoreError::from(RegistryError::Io {
                path: buckets_dir.display().to_string(),
                source: e,
            })
        })?;
        let path = entry.path();
        if !is_bucket_dir(&path) || claimed.iter().any(|c| c == &path) {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            candidates.push(LegacyCandidate {
                path: path.clone(),
                name: name.to_string(),
            });
        }
    }
    candidates.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_unclaimed_bucket_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let buckets = dir.path().join("buckets");

        // Legacy-shaped dir.
        std::fs::create_dir_all(buckets.join("old-scripts").join(DOCUMENTS_DIR)).unwrap();
        // Claimed dir (registered id layout).
        std::fs::create_dir_all(buckets.join("claimed-id").join(DOCUMENTS_DIR)).unwrap();
        // Not bucket-shaped.
        std::fs::create_dir_all(buckets.join("random")).unwrap();

        let claimed = vec![buckets.join("claimed-id")];
        let found = discover(&buckets, &claimed).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "old-scripts");
    }

    #[test]
    fn missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover(&dir.path().join("nope"), &[]).unwrap().is_empty());
    }

    #[test]
    fn snapshot_only_dir_counts() {
        let dir = tempfile::tempdir().unwrap();
        let b = dir.path().join("graph-only");
        std::fs::create_dir_all(&b).unwrap();
        std::fs::write(b.join(SNAPSHOT_FILE), "{}").unwrap();
        assert!(is_bucket_dir(&b));
    }
}
