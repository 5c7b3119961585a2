//! The scope manager: library/local/legacy rules, import/promote/export,
//! project associations, and legacy migration.
//!
//! Import is reference semantics — one underlying index, many readers.
//! Local buckets are exclusive to their owning project. Promotion is the
//! only path from local to shared, and it never re-ingests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lore_core::constants::DOCUMENTS_DIR;
use lore_core::errors::{LoreResult, RegistryError};
use lore_core::models::{
    ArchivedDocument, AssociationKind, Bucket, BucketArchive, BucketScope, BucketStats,
    IndexStatus, ProjectAssociation,
};
use tracing::{info, warn};

use crate::legacy::{self, LegacyCandidate};
use crate::registry::BucketRegistry;
use crate::store;

/// Buckets visible to one project, grouped the way callers present them.
#[derive(Debug, Default)]
pub struct ProjectBuckets {
    /// Owned local-scope buckets.
    pub local: Vec<Bucket>,
    /// Library buckets imported by reference.
    pub imported: Vec<Bucket>,
    /// Migrated legacy buckets the project owns.
    pub legacy: Vec<Bucket>,
    /// Legacy-shaped directories discovered on disk with no registry entry,
    /// offered for one-time migration.
    pub unregistered: Vec<LegacyCandidate>,
}

/// Scope and association operations over the registry.
pub struct ScopeManager {
    registry: Arc<BucketRegistry>,
}

impl ScopeManager {
    pub fn new(registry: Arc<BucketRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<BucketRegistry> {
        &self.registry
    }

    // --- Creation ---

    /// Create a local bucket owned exclusively by one project.
    pub fn create_local(
        &self,
        project_id: &str,
        name: &str,
        description: &str,
    ) -> LoreResult<Bucket> {
        let bucket = self
            .registry
            .register(name, BucketScope::Local, description)?;
        self.registry.add_association(ProjectAssociation::new(
            project_id,
            &bucket.id,
            AssociationKind::Owned,
        ))?;
        self.ensure_bucket_dir(&bucket)?;
        Ok(bucket)
    }

    /// Create a shared library bucket (not yet imported anywhere).
    pub fn create_library(&self, name: &str, description: &str) -> LoreResult<Bucket> {
        let bucket = self
            .registry
            .register(name, BucketScope::Library, description)?;
        self.ensure_bucket_dir(&bucket)?;
        Ok(bucket)
    }

    // --- Scope movement ---

    /// Import a library bucket into a project by reference — no copy, one
    /// underlying index shared by every importer.
    pub fn import_to_project(&self, project_id: &str, reference: &str) -> LoreResult<Bucket> {
        let bucket = self.registry.lookup(reference, Some(BucketScope::Library))?;
        if !bucket.scope.is_shared() {
            return Err(RegistryError::NotLibraryScope {
                id: bucket.id,
                scope: bucket.scope.to_string(),
            }
            .into());
        }
        self.registry.add_association(ProjectAssociation::new(
            project_id,
            &bucket.id,
            AssociationKind::Imported,
        ))?;
        info!(project_id, bucket = %bucket.id, name = %bucket.name, "library bucket imported");
        Ok(bucket)
    }

    /// Convert a project's local bucket to library scope in place. The
    /// graph is not rebuilt; the owning project keeps access through a
    /// reclassified `imported` association.
    pub fn promote_to_library(&self, project_id: &str, reference: &str) -> LoreResult<Bucket> {
        let bucket = self.resolve_for_project(project_id, reference)?;
        if bucket.scope == BucketScope::Library {
            return Err(RegistryError::AlreadyLibraryScope { id: bucket.id }.into());
        }
        let owned = self
            .registry
            .associations_for(project_id)
            .iter()
            .any(|a| a.bucket_id == bucket.id && a.kind == AssociationKind::Owned);
        if !owned {
            return Err(RegistryError::NotFound {
                reference: reference.to_string(),
            }
            .into());
        }

        let promoted = self.registry.set_scope(&bucket.id, BucketScope::Library)?;
        self.registry
            .reclassify_association(project_id, &bucket.id, AssociationKind::Imported)?;
        info!(project_id, bucket = %promoted.id, name = %promoted.name, "bucket promoted to library");
        Ok(promoted)
    }

    // --- Listing & resolution ---

    /// Everything a project can see, plus unmigrated legacy candidates.
    pub fn list_for_project(&self, project_id: &str) -> LoreResult<ProjectBuckets> {
        let mut out = ProjectBuckets::default();
        for association in self.registry.associations_for(project_id) {
            let Ok(bucket) = self.registry.get(&association.bucket_id) else {
                warn!(bucket = %association.bucket_id, "association references unknown bucket");
                continue;
            };
            match bucket.scope {
                BucketScope::Local => out.local.push(bucket),
                BucketScope::Library => out.imported.push(bucket),
                BucketScope::Legacy => out.legacy.push(bucket),
            }
        }
        out.unregistered = self.discover_legacy()?;
        Ok(out)
    }

    /// Resolve a bucket reference (name or id) against the project's
    /// visible buckets only — never another project's buckets.
    pub fn resolve_for_project(&self, project_id: &str, reference: &str) -> LoreResult<Bucket> {
        for association in self.registry.associations_for(project_id) {
            if let Ok(bucket) = self.registry.get(&association.bucket_id) {
                if bucket.id == reference || bucket.name == reference {
                    return Ok(bucket);
                }
            }
        }
        Err(RegistryError::NotFound {
            reference: reference.to_string(),
        }
        .into())
    }

    /// Buckets participating in whole-library retrieval for a project.
    pub fn active_for_project(&self, project_id: &str) -> LoreResult<Vec<Bucket>> {
        let mut buckets = Vec::new();
        for association in self.registry.associations_for(project_id) {
            if association.active {
                buckets.push(self.registry.get(&association.bucket_id)?);
            }
        }
        Ok(buckets)
    }

    /// Toggle a bucket's participation in whole-library retrieval.
    pub fn set_active(&self, project_id: &str, reference: &str, active: bool) -> LoreResult<()> {
        let bucket = self.resolve_for_project(project_id, reference)?;
        self.registry
            .set_association_active(project_id, &bucket.id, active)
    }

    // --- Unlink & delete ---

    /// Drop one project↔bucket link. The bucket's index is untouched.
    pub fn unlink(&self, project_id: &str, reference: &str) -> LoreResult<()> {
        let bucket = self.resolve_for_project(project_id, reference)?;
        self.registry.remove_association(project_id, &bucket.id)
    }

    /// Project-deletion hook: drop every association the project holds.
    /// Never deletes a library bucket's underlying index.
    pub fn unlink_all(&self, project_id: &str) -> LoreResult<usize> {
        self.registry.remove_all_associations(project_id)
    }

    /// Delete a bucket outright. Fails while associations remain; removes
    /// the data directory only for default-layout buckets (migrated legacy
    /// directories are left in place).
    pub fn delete_bucket(&self, reference: &str) -> LoreResult<()> {
        let bucket = self.registry.lookup(reference, None)?;
        let deleted = self.registry.delete(&bucket.id)?;
        if deleted.location.is_none() {
            let dir = self.registry.store().bucket_dir(&deleted);
            if dir.exists() {
                std::fs::remove_dir_all(&dir).map_err(|e| RegistryError::Io {
                    path: dir.display().to_string(),
                    source: e,
                })?;
            }
        } else {
            warn!(bucket = %deleted.id, "legacy bucket deleted from registry; files left in place");
        }
        Ok(())
    }

    // --- Legacy migration ---

    /// Legacy-shaped directories with no registry entry.
    pub fn discover_legacy(&self) -> LoreResult<Vec<LegacyCandidate>> {
        let store = self.registry.store();
        let claimed: Vec<PathBuf> = self
            .registry
            .list()
            .iter()
            .map(|b| store.bucket_dir(b))
            .collect();
        legacy::discover(&store.buckets_dir(), &claimed)
    }

    /// One-time migration of a legacy directory: registers it without
    /// moving files and links it to the requesting project.
    pub fn migrate_legacy(&self, project_id: &str, path: &Path) -> LoreResult<Bucket> {
        if !legacy::is_bucket_dir(path) {
            return Err(RegistryError::NotFound {
                reference: path.display().to_string(),
            }
            .into());
        }
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("legacy")
            .to_string();

        let manifest = store::read_manifest(path)?;
        let snapshot = store::read_snapshot(path)?;
        let has_snapshot = snapshot.built_at.is_some();

        let mut bucket = Bucket::new(&name, BucketScope::Legacy, "migrated legacy bucket");
        bucket.location = Some(path.to_path_buf());
        bucket.stats = BucketStats {
            documents: manifest.len(),
            entities: snapshot.entity_count(),
            relationships: snapshot.relationship_count(),
            last_modified: bucket.stats.last_modified,
        };
        bucket.status = if has_snapshot {
            IndexStatus::Ready
        } else {
            IndexStatus::Empty
        };
        bucket.has_committed_snapshot = has_snapshot;

        let bucket = self.registry.register_prebuilt(bucket)?;
        self.registry.add_association(ProjectAssociation::new(
            project_id,
            &bucket.id,
            AssociationKind::Owned,
        ))?;
        info!(project_id, bucket = %bucket.id, path = %path.display(), "legacy bucket migrated");
        Ok(bucket)
    }

    // --- Export / import ---

    /// Produce a self-contained archive: metadata, raw documents, and the
    /// committed graph snapshot.
    pub fn export_bucket(&self, reference: &str) -> LoreResult<BucketArchive> {
        let bucket = self.registry.lookup(reference, None)?;
        let dir = self.registry.store().bucket_dir(&bucket);
        let snapshot = store::read_snapshot(&dir)?;

        // Every stored file is archived, ingested or not; the snapshot's
        // records carry which of them the graph was built from.
        let mut documents = Vec::new();
        let docs_dir = dir.join(DOCUMENTS_DIR);
        if docs_dir.is_dir() {
            let entries = std::fs::read_dir(&docs_dir).map_err(|e| RegistryError::Io {
                path: docs_dir.display().to_string(),
                source: e,
            })?;
            for entry in entries {
                let entry = entry.map_err(|e| RegistryError::Io {
                    path: docs_dir.display().to_string(),
                    source: e,
                })?;
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                let content = std::fs::read_to_string(&path).map_err(|e| RegistryError::Io {
                    path: path.display().to_string(),
                    source: e,
                })?;
                documents.push(ArchivedDocument {
                    name: name.to_string(),
                    content,
                });
            }
            documents.sort_by(|a, b| a.name.cmp(&b.name));
        }

        info!(bucket = %bucket.id, documents = documents.len(), "bucket exported");
        Ok(BucketArchive::new(
            &bucket.name,
            &bucket.description,
            documents,
            snapshot,
        ))
    }

    /// Recreate an equivalent bucket from an archive under a freshly minted
    /// id. If the archived name collides in library scope, a short id
    /// suffix disambiguates — ids are never reused across processes.
    pub fn import_archive(&self, archive: &BucketArchive) -> LoreResult<Bucket> {
        let name_taken = self
            .registry
            .lookup(&archive.name, Some(BucketScope::Library))
            .is_ok();

        let mut bucket = Bucket::new(&archive.name, BucketScope::Library, &archive.description);
        if name_taken {
            let suffix: String = bucket.id.chars().take(8).collect();
            bucket.name = format!("{}-{suffix}", archive.name);
        }
        bucket.stats = BucketStats {
            documents: archive.snapshot.documents.len(),
            entities: archive.snapshot.entity_count(),
            relationships: archive.snapshot.relationship_count(),
            last_modified: bucket.stats.last_modified,
        };
        if archive.snapshot.built_at.is_some() {
            bucket.status = IndexStatus::Ready;
            bucket.has_committed_snapshot = true;
        }

        let bucket = self.registry.register_prebuilt(bucket)?;
        let dir = self.registry.store().bucket_dir(&bucket);

        let docs_dir = dir.join(DOCUMENTS_DIR);
        std::fs::create_dir_all(&docs_dir).map_err(|e| RegistryError::Io {
            path: docs_dir.display().to_string(),
            source: e,
        })?;
        for doc in &archive.documents {
            let path = docs_dir.join(&doc.name);
            std::fs::write(&path, &doc.content).map_err(|e| RegistryError::Io {
                path: path.display().to_string(),
                source: e,
            })?;
        }
        store::write_manifest(&dir, &archive.snapshot.documents)?;
        store::write_snapshot(&dir, &archive.snapshot)?;

        info!(bucket = %bucket.id, name = %bucket.name, "bucket imported from archive");
        Ok(bucket)
    }

    fn ensure_bucket_dir(&self, bucket: &Bucket) -> LoreResult<()> {
        let dir = self
            .registry
            .store()
            .bucket_dir(bucket)
            .join(DOCUMENTS_DIR);
        std::fs::create_dir_all(&dir).map_err(|e| {
            RegistryError::Io {
                path: dir.display().to_string(),
                source: e,
            }
            .into()
        })
    }
}
