//! Integration tests: end-to-end template compilation against ingested
//! buckets.

use std::sync::Arc;

use lore_core::config::{IngestConfig, OrchestratorConfig, RetrievalConfig};
use lore_core::errors::{LoreError, TemplateError};
use lore_core::models::{QueryConfig, QueryMode};
use lore_embeddings::HashedTfIdf;
use lore_index::{DocumentSource, HeuristicExtractor, KnowledgeIndex};
use lore_orchestrator::{CompileRequest, Orchestrator};
use lore_registry::{BucketRegistry, RegistryStore, ScopeManager};
use lore_retrieval::QueryEngine;

struct Fixture {
    scopes: Arc<ScopeManager>,
    orchestrator: Orchestrator,
    _dir: tempfile::TempDir,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(BucketRegistry::open(RegistryStore::new(dir.path())).unwrap());
    let scopes = Arc::new(ScopeManager::new(Arc::clone(&registry)));

    let index = Arc::new(KnowledgeIndex::new(
        registry,
        Arc::new(HashedTfIdf::new(128)),
        Arc::new(HeuristicExtractor::new()),
        IngestConfig::default(),
    ));

    scopes.create_library("books", "craft references").unwrap();
    scopes.import_to_project("pilot", "books").unwrap();
    index
        .ingest_documents(
            "books",
            &[DocumentSource::new(
                "craft.md",
                "Good dialogue reveals character through conflict.\n\n\
                 Banter works when both speakers want different things. \
                 Sarah and Jake trade barbs over cold coffee.",
            )],
        )
        .unwrap();

    let engine = Arc::new(QueryEngine::new(index, RetrievalConfig::default()));
    let orchestrator = Orchestrator::new(
        Arc::clone(&scopes),
        engine,
        OrchestratorConfig::default(),
    );
    Fixture {
        scopes,
        orchestrator,
        _dir: dir,
    }
}

fn request(template: &str) -> CompileRequest {
    CompileRequest {
        project_id: "pilot".into(),
        template: template.into(),
        context: "a banter-heavy reunion scene".into(),
    }
}

#[tokio::test]
async fn token_expands_into_an_instruction_block() {
    let f = fixture();
    let compiled = f
        .orchestrator
        .compile(&request(
            r#"Write the scene.

{books|guidance:"find dialogue patterns"|mode:"mix"|focus:7}

Keep it under two pages."#,
        ))
        .await
        .unwrap();

    // The literal guidance text, the resolved mode, and the focus value
    // all appear, with bucket content embedded.
    assert!(compiled.prompt.contains("guidance: \"find dialogue patterns\""));
    assert!(compiled.prompt.contains("mode: hybrid"));
    assert!(compiled.prompt.contains("focus: 7"));
    assert!(compiled.prompt.contains("craft.md") || compiled.prompt.contains("Banter"));
    // Static text survives around the block.
    assert!(compiled.prompt.starts_with("Write the scene."));
    assert!(compiled.prompt.ends_with("Keep it under two pages."));
    // The raw token is gone.
    assert!(!compiled.prompt.contains("{books"));

    assert_eq!(compiled.responses.len(), 1);
    assert_eq!(compiled.responses[0].config.mode, QueryMode::Hybrid);
}

#[tokio::test]
async fn unknown_bucket_fails_compilation_naming_it() {
    let f = fixture();
    let err = f
        .orchestrator
        .compile(&request("Context: {nonexistent|focus:3}"))
        .await
        .unwrap_err();

    match err {
        LoreError::Template(TemplateError::UnknownBucket { bucket, token, project }) => {
            assert_eq!(bucket, "nonexistent");
            assert!(token.contains("nonexistent"));
            assert_eq!(project, "pilot");
        }
        other => panic!("expected UnknownBucket, got {other}"),
    }
}

#[tokio::test]
async fn another_projects_bucket_is_not_visible() {
    let f = fixture();
    // "private" belongs to another project entirely.
    f.scopes.create_local("other", "private", "").unwrap();

    let err = f
        .orchestrator
        .compile(&request("{private}"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LoreError::Template(TemplateError::UnknownBucket { .. })
    ));
}

#[tokio::test]
async fn malformed_token_fails_before_any_retrieval() {
    let f = fixture();
    let err = f
        .orchestrator
        .compile(&request("{books|focus:eleven}"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LoreError::Template(TemplateError::MalformedToken { .. })
    ));
}

#[tokio::test]
async fn template_without_tokens_passes_through() {
    let f = fixture();
    let compiled = f
        .orchestrator
        .compile(&request("No retrieval here, just {sql.characters} and prose."))
        .await
        .unwrap();
    assert_eq!(
        compiled.prompt,
        "No retrieval here, just {sql.characters} and prose."
    );
    assert!(compiled.responses.is_empty());
}

#[tokio::test]
async fn multiple_tokens_resolve_concurrently_in_order() {
    let f = fixture();
    f.scopes.create_library("scripts", "").unwrap();
    f.scopes.import_to_project("pilot", "scripts").unwrap();
    // Reuse the ingested corpus for the second bucket.
    let index = f.orchestrator_index();
    index
        .ingest_documents(
            "scripts",
            &[DocumentSource::new(
                "scene.md",
                "Sarah storms into the writers room. Jake follows Sarah.",
            )],
        )
        .unwrap();

    let compiled = f
        .orchestrator
        .compile(&request(
            "A: {books|mode:\"naive\"|focus:2}\nB: {scripts|mode:\"local\"|focus:4}",
        ))
        .await
        .unwrap();

    assert_eq!(compiled.responses.len(), 2);
    assert_eq!(compiled.responses[0].bucket_name, "books");
    assert_eq!(compiled.responses[1].bucket_name, "scripts");
    let a = compiled.prompt.find("\"books\"").unwrap();
    let b = compiled.prompt.find("\"scripts\"").unwrap();
    assert!(a < b, "blocks substitute in token order");
}

#[tokio::test]
async fn querying_an_empty_bucket_fails_the_whole_template() {
    let f = fixture();
    f.scopes.create_library("hollow", "").unwrap();
    f.scopes.import_to_project("pilot", "hollow").unwrap();

    let err = f
        .orchestrator
        .compile(&request("{books} plus {hollow}"))
        .await
        .unwrap_err();

    // The failure names the hollow bucket's token; no partial prompt.
    match err {
        LoreError::Template(TemplateError::QueryFailed { token, bucket, reason }) => {
            assert!(token.contains("hollow"));
            assert_eq!(bucket, "hollow");
            assert!(reason.contains("not ready"));
        }
        other => panic!("expected QueryFailed, got {other}"),
    }
}

#[tokio::test]
async fn query_project_hits_every_active_bucket() {
    let f = fixture();
    let responses = f
        .orchestrator
        .query_project("pilot", "banter", &QueryConfig::default())
        .await
        .unwrap();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].bucket_name, "books");

    f.scopes.set_active("pilot", "books", false).unwrap();
    let responses = f
        .orchestrator
        .query_project("pilot", "banter", &QueryConfig::default())
        .await
        .unwrap();
    assert!(responses.is_empty());
}

impl Fixture {
    /// The knowledge index behind the orchestrator's query engine.
    fn orchestrator_index(&self) -> Arc<KnowledgeIndex> {
        Arc::clone(self.orchestrator.engine().index())
    }
}
