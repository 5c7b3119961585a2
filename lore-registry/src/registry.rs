//! The bucket registry: metadata catalog and indexing-status state machine.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use lore_core::errors::{IngestError, LoreResult, RegistryError};
use lore_core::models::{
    AssociationKind, Bucket, BucketScope, BucketStats, IndexStatus, ProjectAssociation,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::store::RegistryStore;

/// Library-wide statistics.
#[derive(Debug, Clone, Serialize)]
pub struct LibraryStats {
    pub buckets: usize,
    pub projects: usize,
    pub documents: usize,
    pub entities: usize,
    pub relationships: usize,
}

#[derive(Default)]
struct RegistryState {
    /// Buckets by id.
    buckets: HashMap<String, Bucket>,
    /// Associations by project id.
    associations: HashMap<String, Vec<ProjectAssociation>>,
}

/// The single source of truth for bucket metadata and scope/association
/// state. Mutations serialize behind the write lock and persist before the
/// lock is released; reads take the read lock and see a consistent snapshot.
pub struct BucketRegistry {
    state: RwLock<RegistryState>,
    store: RegistryStore,
}

impl BucketRegistry {
    /// Open (or create) a registry rooted at the given library directory.
    pub fn open(store: RegistryStore) -> LoreResult<Self> {
        store.initialize()?;

        let mut state = RegistryState::default();
        for bucket in store.load_buckets()? {
            state.buckets.insert(bucket.id.clone(), bucket);
        }
        for project_id in store.project_ids()? {
            let associations = store.load_associations(&project_id)?;
            state.associations.insert(project_id, associations);
        }

        info!(
            buckets = state.buckets.len(),
            projects = state.associations.len(),
            root = %store.root().display(),
            "bucket registry opened"
        );

        Ok(Self {
            state: RwLock::new(state),
            store,
        })
    }

    pub fn store(&self) -> &RegistryStore {
        &self.store
    }

    // --- Catalog ---

    /// Register a new bucket. Names are unique within a scope.
    pub fn register(
        &self,
        name: &str,
        scope: BucketScope,
        description: &str,
    ) -> LoreResult<Bucket> {
        let mut state = self.write();
        if state
            .buckets
            .values()
            .any(|b| b.scope == scope && b.name == name)
        {
            return Err(RegistryError::DuplicateName {
                name: name.to_string(),
                scope: scope.to_string(),
            }
            .into());
        }

        let bucket = Bucket::new(name, scope, description);
        state.buckets.insert(bucket.id.clone(), bucket.clone());
        self.persist_buckets(&state)?;
        info!(id = %bucket.id, name, %scope, "bucket registered");
        Ok(bucket)
    }

    /// Register a pre-existing legacy directory in place.
    pub(crate) fn register_prebuilt(&self, bucket: Bucket) -> LoreResult<Bucket> {
        let mut state = self.write();
        if state
            .buckets
            .values()
            .any(|b| b.scope == bucket.scope && b.name == bucket.name)
        {
            return Err(RegistryError::DuplicateName {
                name: bucket.name.clone(),
                scope: bucket.scope.to_string(),
            }
            .into());
        }
        state.buckets.insert(bucket.id.clone(), bucket.clone());
        self.persist_buckets(&state)?;
        Ok(bucket)
    }

    /// Fetch a bucket by exact id.
    pub fn get(&self, id: &str) -> LoreResult<Bucket> {
        self.read()
            .buckets
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    /// Resolve a bucket by id or name, optionally constrained to a scope.
    ///
    /// When an unscoped name matches in several scopes, library wins over
    /// local over legacy (shared buckets are the common referent).
    pub fn lookup(&self, reference: &str, scope: Option<BucketScope>) -> LoreResult<Bucket> {
        let state = self.read();
        if let Some(bucket) = state.buckets.get(reference) {
            return Ok(bucket.clone());
        }

        let mut matches: Vec<&Bucket> = state
            .buckets
            .values()
            .filter(|b| b.name == reference && scope.map_or(true, |s| b.scope == s))
            .collect();
        matches.sort_by_key(|b| match b.scope {
            BucketScope::Library => 0,
            BucketScope::Local => 1,
            BucketScope::Legacy => 2,
        });
        matches
            .first()
            .map(|b| (*b).clone())
            .ok_or_else(|| not_found(reference))
    }

    pub fn list(&self) -> Vec<Bucket> {
        let mut buckets: Vec<Bucket> = self.read().buckets.values().cloned().collect();
        buckets.sort_by(|a, b| a.name.cmp(&b.name));
        buckets
    }

    /// Case-insensitive substring search over names and descriptions.
    pub fn search(&self, query: &str) -> Vec<Bucket> {
        let needle = query.to_lowercase();
        let mut hits: Vec<Bucket> = self
            .read()
            .buckets
            .values()
            .filter(|b| {
                b.name.to_lowercase().contains(&needle)
                    || b.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.name.cmp(&b.name));
        hits
    }

    pub fn library_stats(&self) -> LibraryStats {
        let state = self.read();
        LibraryStats {
            buckets: state.buckets.len(),
            projects: state.associations.len(),
            documents: state.buckets.values().map(|b| b.stats.documents).sum(),
            entities: state.buckets.values().map(|b| b.stats.entities).sum(),
            relationships: state.buckets.values().map(|b| b.stats.relationships).sum(),
        }
    }

    /// Delete a bucket record. Fails while any project still references it,
    /// forcing explicit unlink first.
    pub fn delete(&self, id: &str) -> LoreResult<Bucket> {
        let mut state = self.write();
        let count = state
            .associations
            .values()
            .flatten()
            .filter(|a| a.bucket_id == id)
            .count();
        if count > 0 {
            return Err(RegistryError::HasAssociations {
                id: id.to_string(),
                count,
            }
            .into());
        }
        let Some(bucket) = state.buckets.remove(id) else {
            return Err(not_found(id));
        };
        self.persist_buckets(&state)?;
        info!(id, name = %bucket.name, "bucket deleted from registry");
        Ok(bucket)
    }

    // --- Stats & status ---

    /// Update lifecycle stats. Idempotent, last-writer-wins; safe to call
    /// from concurrent ingestion workers. Status is untouched.
    pub fn update_stats(&self, id: &str, stats: BucketStats) -> LoreResult<()> {
        let mut state = self.write();
        let bucket = state.buckets.get_mut(id).ok_or_else(|| not_found(id))?;
        bucket.stats = stats;
        bucket.stats.last_modified = Utc::now();
        self.persist_buckets(&state)
    }

    /// Enter `ingesting`. Rejects with `IngestionInProgress` when an
    /// ingestion is already in flight — the same bucket is never ingested
    /// twice concurrently.
    pub fn begin_ingest(&self, id: &str) -> LoreResult<()> {
        let mut state = self.write();
        let bucket = state.buckets.get_mut(id).ok_or_else(|| not_found(id))?;
        if !bucket.status.can_begin_ingest() {
            return Err(IngestError::IngestionInProgress { id: id.to_string() }.into());
        }
        let from = bucket.status;
        bucket.status = IndexStatus::Ingesting;
        self.persist_buckets(&state)?;
        debug!(id, %from, "bucket entered ingesting");
        Ok(())
    }

    /// Leave `ingesting` after a successful commit.
    pub fn finish_ingest(&self, id: &str, stats: BucketStats) -> LoreResult<()> {
        let mut state = self.write();
        let bucket = state.buckets.get_mut(id).ok_or_else(|| not_found(id))?;
        if bucket.status != IndexStatus::Ingesting {
            return Err(invalid_transition(bucket, IndexStatus::Ready));
        }
        bucket.status = IndexStatus::Ready;
        bucket.has_committed_snapshot = true;
        bucket.stats = stats;
        bucket.stats.last_modified = Utc::now();
        self.persist_buckets(&state)?;
        info!(id, "bucket ready");
        Ok(())
    }

    /// Leave `ingesting` after a failure. The prior committed snapshot (if
    /// any) stays on disk and remains queryable.
    pub fn fail_ingest(&self, id: &str, reason: &str) -> LoreResult<()> {
        let mut state = self.write();
        let bucket = state.buckets.get_mut(id).ok_or_else(|| not_found(id))?;
        if bucket.status != IndexStatus::Ingesting {
            return Err(invalid_transition(bucket, IndexStatus::Failed));
        }
        bucket.status = IndexStatus::Failed;
        let stale_snapshot = bucket.has_committed_snapshot;
        self.persist_buckets(&state)?;
        warn!(
            id,
            reason,
            stale_snapshot,
            "bucket ingestion failed"
        );
        Ok(())
    }

    /// Mark a ready bucket stale (document set changed without
    /// re-ingestion). Still queryable from the last snapshot.
    pub fn mark_stale(&self, id: &str) -> LoreResult<()> {
        let mut state = self.write();
        let bucket = state.buckets.get_mut(id).ok_or_else(|| not_found(id))?;
        if bucket.status == IndexStatus::Ready {
            bucket.status = IndexStatus::Stale;
            self.persist_buckets(&state)?;
        }
        Ok(())
    }

    /// Reclassify a bucket's scope in place (promotion). No re-ingestion.
    pub(crate) fn set_scope(&self, id: &str, scope: BucketScope) -> LoreResult<Bucket> {
        let mut state = self.write();
        let bucket = state.buckets.get_mut(id).ok_or_else(|| not_found(id))?;
        bucket.scope = scope;
        let updated = bucket.clone();
        self.persist_buckets(&state)?;
        Ok(updated)
    }

    // --- Associations ---

    pub fn associations_for(&self, project_id: &str) -> Vec<ProjectAssociation> {
        self.read()
            .associations
            .get(project_id)
            .cloned()
            .unwrap_or_default()
    }

    /// How many projects reference a bucket.
    pub fn reference_count(&self, bucket_id: &str) -> usize {
        self.read()
            .associations
            .values()
            .flatten()
            .filter(|a| a.bucket_id == bucket_id)
            .count()
    }

    pub fn add_association(&self, association: ProjectAssociation) -> LoreResult<()> {
        let mut state = self.write();
        let list = state
            .associations
            .entry(association.project_id.clone())
            .or_default();
        if list.iter().any(|a| a.bucket_id == association.bucket_id) {
            return Err(RegistryError::AlreadyImported {
                id: association.bucket_id,
                project: association.project_id,
            }
            .into());
        }
        let project_id = association.project_id.clone();
        list.push(association);
        self.persist_associations(&state, &project_id)
    }

    pub fn remove_association(&self, project_id: &str, bucket_id: &str) -> LoreResult<()> {
        let mut state = self.write();
        let Some(list) = state.associations.get_mut(project_id) else {
            return Err(not_found(bucket_id));
        };
        let before = list.len();
        list.retain(|a| a.bucket_id != bucket_id);
        if list.len() == before {
            return Err(not_found(bucket_id));
        }
        if list.is_empty() {
            state.associations.remove(project_id);
        }
        self.persist_associations(&state, project_id)
    }

    /// Drop every association a project holds (project deletion hook).
    /// Never touches the underlying bucket indexes.
    pub fn remove_all_associations(&self, project_id: &str) -> LoreResult<usize> {
        let mut state = self.write();
        let removed = state
            .associations
            .remove(project_id)
            .map(|l| l.len())
            .unwrap_or(0);
        self.persist_associations(&state, project_id)?;
        debug!(project_id, removed, "project associations removed");
        Ok(removed)
    }

    /// Convert a project's `owned` link into `imported` (promotion keeps
    /// the originating project's access).
    pub(crate) fn reclassify_association(
        &self,
        project_id: &str,
        bucket_id: &str,
        kind: AssociationKind,
    ) -> LoreResult<()> {
        let mut state = self.write();
        let list = state
            .associations
            .get_mut(project_id)
            .ok_or_else(|| not_found(bucket_id))?;
        let association = list
            .iter_mut()
            .find(|a| a.bucket_id == bucket_id)
            .ok_or_else(|| not_found(bucket_id))?;
        association.kind = kind;
        self.persist_associations(&state, project_id)
    }

    /// Toggle a bucket's participation in whole-library retrieval for a
    /// project.
    pub fn set_association_active(
        &self,
        project_id: &str,
        bucket_id: &str,
        active: bool,
    ) -> LoreResult<()> {
        let mut state = self.write();
        let list = state
            .associations
            .get_mut(project_id)
            .ok_or_else(|| not_found(bucket_id))?;
        let association = list
            .iter_mut()
            .find(|a| a.bucket_id == bucket_id)
            .ok_or_else(|| not_found(bucket_id))?;
        association.active = active;
        self.persist_associations(&state, project_id)
    }

    // --- Internals ---

    fn read(&self) -> std::sync::RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn persist_buckets(&self, state: &RegistryState) -> LoreResult<()> {
        let mut buckets: Vec<&Bucket> = state.buckets.values().collect();
        buckets.sort_by(|a, b| a.id.cmp(&b.id));
        self.store.save_buckets(&buckets)
    }

    fn persist_associations(&self, state: &RegistryState, project_id: &str) -> LoreResult<()> {
        let list = state
            .associations
            .get(project_id)
            .cloned()
            .unwrap_or_default();
        self.store.save_associations(project_id, &list)
    }
}

fn not_found(reference: &str) -> lore_core::LoreError {
    RegistryError::NotFound {
        reference: reference.to_string(),
    }
    .into()
}

fn invalid_transition(bucket: &Bucket, to: IndexStatus) -> lore_core::LoreError {
    RegistryError::InvalidTransition {
        id: bucket.id.clone(),
        from: bucket.status.to_string(),
        to: to.to_string(),
    }
    .into()
}
