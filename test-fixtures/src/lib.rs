//! Shared test fixtures: a small creative-reference corpus and builders
//! for a fully wired bucket-library stack, used by integration and
//! end-to-end tests across crates.

use std::sync::Arc;

use lore_core::config::IngestConfig;
use lore_embeddings::HashedTfIdf;
use lore_index::{DocumentSource, HeuristicExtractor, KnowledgeIndex};
use lore_registry::{BucketRegistry, RegistryStore, ScopeManager};

/// Embedding dimensions used across the test stack.
pub const TEST_DIMENSIONS: usize = 128;

/// Install a tracing subscriber honoring `RUST_LOG`, once per process.
/// Safe to call from every test; repeat installs are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A 45-line sample corpus: two screenplay excerpts and a craft reference.
pub fn sample_corpus() -> Vec<DocumentSource> {
    vec![
        DocumentSource::new(
            "meet_cute.md",
            "INT. COFFEE SHOP - DAY\n\n\
             Sarah enters the bustling coffee shop, scanning for an empty table. \
             Sarah spots Jake at a corner table, typing furiously on his laptop. \
             Their eyes meet. Jake waves Sarah over before he can stop himself.\n\n\
             SARAH teases him about the ending he will not talk about. \
             JAKE fires back about her habit of narrating strangers' lives. \
             Their banter is quick, warm, and a little too rehearsed.",
        ),
        DocumentSource::new(
            "rivalry.md",
            "EXT. THEATER STEPS - NIGHT\n\n\
             Maya corners Sarah outside the theater about the stolen premise. \
             Maya threatens to take it to the Writers Guild by Monday. \
             Sarah holds her ground against Maya, voice level, hands shaking.\n\n\
             Jake watches from the lobby doors, deciding which of them to follow.",
        ),
        DocumentSource::new(
            "craft_notes.md",
            "Dialogue reveals character through friction, not information. \
             A meet-cute lands when both characters want something else entirely.\n\n\
             Subtext beats exposition in every banter scene. \
             Let the audience finish the sentence the characters will not.",
        ),
    ]
}

/// A fully wired registry + scope manager + knowledge index over a temp
/// directory, using the offline embedding and extraction stack.
pub struct TestStack {
    pub registry: Arc<BucketRegistry>,
    pub scopes: Arc<ScopeManager>,
    pub index: Arc<KnowledgeIndex>,
}

/// Build the default test stack rooted at `dir`.
pub fn stack(dir: &std::path::Path) -> TestStack {
    init_tracing();
    let registry = Arc::new(
        BucketRegistry::open(RegistryStore::new(dir)).expect("registry opens on a temp dir"),
    );
    let scopes = Arc::new(ScopeManager::new(Arc::clone(&registry)));
    let index = Arc::new(KnowledgeIndex::new(
        Arc::clone(&registry),
        Arc::new(HashedTfIdf::new(TEST_DIMENSIONS)),
        Arc::new(HeuristicExtractor::new()),
        IngestConfig::default(),
    ));
    TestStack {
        registry,
        scopes,
        index,
    }
}

/// Create a library bucket named `name`, ingest the sample corpus, and
/// leave it `ready`.
pub fn build_ready_bucket(stack: &TestStack, name: &str) -> lore_core::models::Bucket {
    stack
        .scopes
        .create_library(name, "sample reference corpus")
        .expect("bucket registers");
    stack
        .index
        .ingest_documents(name, &sample_corpus())
        .expect("sample corpus ingests");
    stack
        .registry
        .lookup(name, None)
        .expect("bucket exists after ingestion")
}
