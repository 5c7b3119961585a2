//! Integration tests: ingestion lifecycle, idempotence, serialization,
//! and failure retention.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lore_core::config::IngestConfig;
use lore_core::errors::{IngestError, LoreError, LoreResult};
use lore_core::models::IndexStatus;
use lore_core::traits::{Extraction, IEntityExtractor};
use lore_embeddings::HashedTfIdf;
use lore_index::{DocumentSource, HeuristicExtractor, IngestOutcome, KnowledgeIndex};
use lore_registry::{BucketRegistry, RegistryStore, ScopeManager};

fn stack(dir: &std::path::Path) -> (ScopeManager, KnowledgeIndex) {
    let registry = Arc::new(BucketRegistry::open(RegistryStore::new(dir)).unwrap());
    let index = KnowledgeIndex::new(
        Arc::clone(&registry),
        Arc::new(HashedTfIdf::new(64)),
        Arc::new(HeuristicExtractor::new()),
        IngestConfig::default(),
    );
    (ScopeManager::new(registry), index)
}

fn sample_sources() -> Vec<DocumentSource> {
    vec![
        DocumentSource::new(
            "scene1.md",
            "Sarah enters the coffee shop. Sarah spots Jake at a corner table.",
        ),
        DocumentSource::new(
            "scene2.md",
            "Jake phones Sarah about the rewrite. Sarah laughs at Jake.",
        ),
    ]
}

#[test]
fn ingest_commits_and_updates_stats() {
    let dir = tempfile::tempdir().unwrap();
    let (scopes, index) = stack(dir.path());
    let bucket = scopes.create_library("scripts", "").unwrap();

    let outcome = index.ingest_documents("scripts", &sample_sources()).unwrap();
    let IngestOutcome::Committed(stats) = outcome else {
        panic!("expected a committed snapshot");
    };
    assert_eq!(stats.documents, 2);
    assert!(stats.entities >= 2);

    let refreshed = scopes.registry().get(&bucket.id).unwrap();
    assert_eq!(refreshed.status, IndexStatus::Ready);
    assert!(refreshed.has_committed_snapshot);

    let (_, snapshot) = index.snapshot("scripts").unwrap();
    assert!(snapshot.entities.contains_key("sarah"));
    assert!(snapshot.entities.contains_key("jake"));
}

#[test]
fn reingesting_unchanged_documents_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let (scopes, index) = stack(dir.path());
    scopes.create_library("scripts", "").unwrap();

    let IngestOutcome::Committed(first) =
        index.ingest_documents("scripts", &sample_sources()).unwrap()
    else {
        panic!("expected commit");
    };

    // Same content again: no new graph entries, snapshot stands.
    let outcome = index.ingest_documents("scripts", &sample_sources()).unwrap();
    assert_eq!(outcome, IngestOutcome::Unchanged);

    let bucket = scopes.registry().lookup("scripts", None).unwrap();
    assert_eq!(bucket.stats.entities, first.entities);
    assert_eq!(bucket.stats.relationships, first.relationships);
    assert_eq!(bucket.status, IndexStatus::Ready);
}

#[test]
fn changed_document_triggers_rebuild() {
    let dir = tempfile::tempdir().unwrap();
    let (scopes, index) = stack(dir.path());
    scopes.create_library("scripts", "").unwrap();
    index.ingest_documents("scripts", &sample_sources()).unwrap();

    let edited = DocumentSource::new(
        "scene1.md",
        "Sarah enters the bookstore. Maya greets Sarah warmly. Maya smiles.",
    );
    let outcome = index.ingest_documents("scripts", &[edited]).unwrap();
    assert!(matches!(outcome, IngestOutcome::Committed(_)));

    let (_, snapshot) = index.snapshot("scripts").unwrap();
    assert!(snapshot.entities.contains_key("maya"));
}

#[test]
fn removing_a_document_marks_stale_then_rebuild_drops_it() {
    let dir = tempfile::tempdir().unwrap();
    let (scopes, index) = stack(dir.path());
    scopes.create_library("scripts", "").unwrap();
    index.ingest_documents("scripts", &sample_sources()).unwrap();

    assert!(index.remove_document("scripts", "scene2.md").unwrap());
    let bucket = scopes.registry().lookup("scripts", None).unwrap();
    assert_eq!(bucket.status, IndexStatus::Stale);

    // Stale is still queryable from the last snapshot.
    assert!(index.snapshot("scripts").is_ok());

    let IngestOutcome::Committed(stats) = index.ingest("scripts").unwrap() else {
        panic!("expected commit");
    };
    assert_eq!(stats.documents, 1);
}

#[test]
fn empty_bucket_cannot_ingest_and_is_not_queryable() {
    let dir = tempfile::tempdir().unwrap();
    let (scopes, index) = stack(dir.path());
    scopes.create_library("blank", "").unwrap();

    let err = index.ingest("blank").unwrap_err();
    assert!(err.to_string().contains("no ingestible content"));

    let err = index.snapshot("blank").unwrap_err();
    assert!(err.to_string().contains("not ready"));
}

/// Extractor that blocks until released, for overlap testing.
struct SlowExtractor {
    delay: Duration,
    calls: AtomicUsize,
}

impl IEntityExtractor for SlowExtractor {
    fn extract(&self, _doc_name: &str, _chunks: &[String]) -> LoreResult<Extraction> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        Ok(Extraction::default())
    }

    fn name(&self) -> &str {
        "slow-extractor"
    }
}

#[test]
fn concurrent_ingestion_on_one_bucket_admits_exactly_one() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(BucketRegistry::open(RegistryStore::new(dir.path())).unwrap());
    let scopes = ScopeManager::new(Arc::clone(&registry));
    scopes.create_library("scripts", "").unwrap();

    let index = Arc::new(KnowledgeIndex::new(
        registry,
        Arc::new(HashedTfIdf::new(32)),
        Arc::new(SlowExtractor {
            delay: Duration::from_millis(300),
            calls: AtomicUsize::new(0),
        }),
        IngestConfig::default(),
    ));
    index
        .add_document("scripts", &DocumentSource::new("a.md", "Sarah waits."))
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..2 {
        let index = Arc::clone(&index);
        handles.push(std::thread::spawn(move || index.ingest("scripts")));
    }
    let results: Vec<LoreResult<IngestOutcome>> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();

    let committed = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| {
            matches!(
                r,
                Err(LoreError::Ingest(IngestError::IngestionInProgress { .. }))
            )
        })
        .count();
    assert_eq!(committed, 1, "exactly one ingestion proceeds");
    assert_eq!(rejected, 1, "the other is rejected, never run in parallel");
}

/// Extractor that fails a configurable number of times.
struct FlakyExtractor {
    failures: AtomicUsize,
    transient: bool,
}

impl IEntityExtractor for FlakyExtractor {
    fn extract(&self, _doc_name: &str, _chunks: &[String]) -> LoreResult<Extraction> {
        if self.failures.load(Ordering::SeqCst) > 0 {
            self.failures.fetch_sub(1, Ordering::SeqCst);
            return Err(IngestError::Provider {
                provider: "flaky-extractor".into(),
                transient: self.transient,
                reason: "synthetic failure".into(),
            }
            .into());
        }
        Ok(Extraction::default())
    }

    fn name(&self) -> &str {
        "flaky-extractor"
    }
}

fn flaky_stack(
    dir: &std::path::Path,
    failures: usize,
    transient: bool,
) -> (ScopeManager, KnowledgeIndex) {
    let registry = Arc::new(BucketRegistry::open(RegistryStore::new(dir)).unwrap());
    let index = KnowledgeIndex::new(
        Arc::clone(&registry),
        Arc::new(HashedTfIdf::new(32)),
        Arc::new(FlakyExtractor {
            failures: AtomicUsize::new(failures),
            transient,
        }),
        IngestConfig::default(),
    );
    (ScopeManager::new(registry), index)
}

#[test]
fn transient_failure_retries_once_and_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let (scopes, index) = flaky_stack(dir.path(), 1, true);
    scopes.create_library("scripts", "").unwrap();

    let outcome = index
        .ingest_documents("scripts", &[DocumentSource::new("a.md", "Sarah waits.")])
        .unwrap();
    assert!(matches!(outcome, IngestOutcome::Committed(_)));
}

#[test]
fn repeated_transient_failure_settles_failed() {
    let dir = tempfile::tempdir().unwrap();
    let (scopes, index) = flaky_stack(dir.path(), 2, true);
    scopes.create_library("scripts", "").unwrap();

    let err = index
        .ingest_documents("scripts", &[DocumentSource::new("a.md", "Sarah waits.")])
        .unwrap_err();
    assert!(err.to_string().contains("previous snapshot retained"));

    let bucket = scopes.registry().lookup("scripts", None).unwrap();
    assert_eq!(bucket.status, IndexStatus::Failed);
    // Never reached ready: not queryable.
    assert!(index.snapshot("scripts").is_err());
}

#[test]
fn failed_reingestion_retains_previous_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(BucketRegistry::open(RegistryStore::new(dir.path())).unwrap());
    let scopes = ScopeManager::new(Arc::clone(&registry));
    scopes.create_library("scripts", "").unwrap();

    // First ingestion succeeds with the real extractor.
    let good = KnowledgeIndex::new(
        Arc::clone(&registry),
        Arc::new(HashedTfIdf::new(32)),
        Arc::new(HeuristicExtractor::new()),
        IngestConfig::default(),
    );
    good.ingest_documents("scripts", &sample_sources()).unwrap();
    let (_, before) = good.snapshot("scripts").unwrap();

    // Re-ingestion with a permanently failing extractor.
    let bad = KnowledgeIndex::new(
        Arc::clone(&registry),
        Arc::new(HashedTfIdf::new(32)),
        Arc::new(FlakyExtractor {
            failures: AtomicUsize::new(usize::MAX),
            transient: false,
        }),
        IngestConfig::default(),
    );
    bad.add_document(
        "scripts",
        &DocumentSource::new("scene3.md", "Maya joins the story."),
    )
    .unwrap();
    assert!(bad.ingest("scripts").is_err());

    let bucket = registry.lookup("scripts", None).unwrap();
    assert_eq!(bucket.status, IndexStatus::Failed);
    assert!(bucket.has_committed_snapshot);

    // The stale-but-usable snapshot still serves, unchanged.
    let (_, after) = bad.snapshot("scripts").unwrap();
    assert_eq!(after.entity_count(), before.entity_count());
    assert_eq!(after.relationship_count(), before.relationship_count());

    // A later successful ingestion recovers.
    let outcome = good.ingest("scripts").unwrap();
    assert!(matches!(outcome, IngestOutcome::Committed(_)));
    assert_eq!(
        registry.lookup("scripts", None).unwrap().status,
        IndexStatus::Ready
    );
}
