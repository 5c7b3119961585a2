//! JSON persistence for registry and association state.
//!
//! Layout under the library root:
//! - `registry.json` — all bucket records
//! - `projects/<project>.json` — one association list per project
//! - `buckets/<id>/` — per-bucket data (documents, manifest, graph snapshot)
//!
//! Every write goes through a temp file plus rename so a crash never leaves
//! a half-written registry.

use std::path::{Path, PathBuf};

use lore_core::constants::{BUCKETS_DIR, PROJECTS_DIR, REGISTRY_FILE};
use lore_core::errors::{LoreResult, RegistryError};
use lore_core::models::{Bucket, ProjectAssociation};
use serde::{de::DeserializeOwned, Serialize};

/// Filesystem half of the registry. Owns path layout and atomic JSON I/O.
pub struct RegistryStore {
    root: PathBuf,
}

impl RegistryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn registry_path(&self) -> PathBuf {
        self.root.join(REGISTRY_FILE)
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.root.join(PROJECTS_DIR)
    }

    pub fn buckets_dir(&self) -> PathBuf {
        self.root.join(BUCKETS_DIR)
    }

    fn project_path(&self, project_id: &str) -> PathBuf {
        self.projects_dir().join(format!("{project_id}.json"))
    }

    /// Data directory for a bucket, honoring a legacy location override.
    pub fn bucket_dir(&self, bucket: &Bucket) -> PathBuf {
        bucket
            .location
            .clone()
            .unwrap_or_else(|| self.buckets_dir().join(&bucket.id))
    }

    /// Create the root/projects/buckets directories if absent.
    pub fn initialize(&self) -> LoreResult<()> {
        for dir in [self.root.clone(), self.projects_dir(), self.buckets_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
        }
        Ok(())
    }

    pub fn load_buckets(&self) -> LoreResult<Vec<Bucket>> {
        read_json_or_default(&self.registry_path())
    }

    pub fn save_buckets(&self, buckets: &[&Bucket]) -> LoreResult<()> {
        write_json_atomic(&self.registry_path(), &buckets)
    }

    pub fn load_associations(&self, project_id: &str) -> LoreResult<Vec<ProjectAssociation>> {
        read_json_or_default(&self.project_path(project_id))
    }

    pub fn save_associations(
        &self,
        project_id: &str,
        associations: &[ProjectAssociation],
    ) -> LoreResult<()> {
        let path = self.project_path(project_id);
        if associations.is_empty() {
            // A project with no links gets no file — matches project deletion.
            if path.exists() {
                std::fs::remove_file(&path).map_err(|e| io_err(&path, e))?;
            }
            return Ok(());
        }
        write_json_atomic(&path, &associations)
    }

    /// Ids of every project that has an association file.
    pub fn project_ids(&self) -> LoreResult<Vec<String>> {
        let dir = self.projects_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        let entries = std::fs::read_dir(&dir).map_err(|e| io_err(&dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| io_err(&dir, e))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

// --- Per-bucket data files (shared with the ingestion pipeline) ---

/// Read a bucket directory's document manifest (empty when absent).
pub fn read_manifest(bucket_dir: &Path) -> LoreResult<Vec<lore_core::models::DocumentRecord>> {
    read_json_or_default(&bucket_dir.join(lore_core::constants::MANIFEST_FILE))
}

/// Write a bucket directory's document manifest atomically.
pub fn write_manifest(
    bucket_dir: &Path,
    manifest: &[lore_core::models::DocumentRecord],
) -> LoreResult<()> {
    write_json_atomic(&bucket_dir.join(lore_core::constants::MANIFEST_FILE), &manifest)
}

/// Read a bucket's committed graph snapshot (default/empty when absent).
pub fn read_snapshot(bucket_dir: &Path) -> LoreResult<lore_core::models::GraphSnapshot> {
    read_json_or_default(&bucket_dir.join(lore_core::constants::SNAPSHOT_FILE))
}

/// Commit a graph snapshot: temp file plus rename, so a failure mid-write
/// leaves the previous committed snapshot intact and reachable.
pub fn write_snapshot(
    bucket_dir: &Path,
    snapshot: &lore_core::models::GraphSnapshot,
) -> LoreResult<()> {
    write_json_atomic(&bucket_dir.join(lore_core::constants::SNAPSHOT_FILE), snapshot)
}

fn io_err(path: &Path, source: std::io::Error) -> lore_core::LoreError {
    RegistryError::Io {
        path: path.display().to_string(),
        source,
    }
    .into()
}

/// Read a JSON file, treating a missing file as the type's default.
fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> LoreResult<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let text = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_json::from_str(&text).map_err(|e| {
        RegistryError::Corrupt {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Serialize to a sibling temp file, then rename into place.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> LoreResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let tmp = path.with_extension("json.tmp");
    let text = serde_json::to_string_pretty(value).map_err(lore_core::LoreError::from)?;
    std::fs::write(&tmp, text).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
    Ok(())
}
