use application::rag_service::RagService;
use infrastructure::vector_store::VectorStore;
use shared::types::RagError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tests::{test_config, RateLimitedCompletion, StubCompletion, StubEmbedder};

const REPORT: &str = "\
Total revenue was $100 million for the fiscal year, an increase of 12.5% over the prior year. \
Net income reached $20 million. Research and development expense was $8 million. \
Operating cash flow improved to $25 million. \
The company employed 1,250 people at year end across 5 offices. \
Total assets stood at $340 million and total liabilities at $120 million. \
Gross margin expanded to 64.2% driven by services revenue of $45 million.";

fn write_report(dir: &Path) -> PathBuf {
    let path = dir.join("annual_report.txt");
    fs::write(&path, REPORT).expect("write sample report");
    path
}

fn make_service(dir: &Path, reply: &str) -> (RagService, Arc<StubCompletion>) {
    let completion = Arc::new(StubCompletion::new(reply));
    let service = RagService::new(
        test_config(dir.join("index.db")),
        Arc::new(StubEmbedder),
        completion.clone(),
    );
    (service, completion)
}

#[tokio::test]
async fn ask_before_initialization_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (service, _) = make_service(dir.path(), "irrelevant");
    let err = service.ask("What was revenue?").await.unwrap_err();
    assert!(matches!(err, RagError::NotInitialized));
}

#[tokio::test]
async fn ingest_then_ask_produces_grounded_answer() {
    let dir = tempfile::tempdir().unwrap();
    let report_path = write_report(dir.path());
    let (mut service, completion) =
        make_service(dir.path(), "Total revenue was $100 million.");

    let report = service.load_and_index(&[report_path]).await.unwrap();
    assert!(report.failures.is_empty());
    assert_eq!(report.sources_indexed, 1);
    assert!(report.passages_indexed > 0);
    assert!(service.is_ready());

    let answer = service.ask("What was the total revenue?").await.unwrap();
    assert_eq!(answer.text, "Total revenue was $100 million.");
    assert!(!answer.sources.is_empty());
    assert!(answer.sources.len() <= 5);
    assert!(answer.sources.iter().all(|s| s.page == 1));

    let prompts = completion.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Question: What was the total revenue?"));
    // Retrieved passage text flows into the context block verbatim.
    assert!(prompts[0].contains(&answer.sources[0].text));
}

#[tokio::test]
async fn unreadable_source_is_reported_without_discarding_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_report(dir.path());
    let missing = dir.path().join("missing.pdf");
    let (mut service, _) = make_service(dir.path(), "ok");

    let report = service
        .load_and_index(&[good, missing.clone()])
        .await
        .unwrap();
    assert_eq!(report.sources_indexed, 1);
    assert!(report.passages_indexed > 0);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, missing);
    assert!(service.is_ready());
}

#[tokio::test]
async fn empty_ingest_yields_empty_retrieval_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let (mut service, completion) = make_service(
        dir.path(),
        "This information is not available in the provided context",
    );

    let report = service.load_and_index(&[]).await.unwrap();
    assert_eq!(report.passages_indexed, 0);
    assert!(service.is_ready());
    assert_eq!(service.passage_count().unwrap(), 0);

    // The model is still invoked with an empty context block.
    let answer = service.ask("What was net income?").await.unwrap();
    assert!(answer.sources.is_empty());
    let prompts = completion.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Context from annual report:"));
}

#[tokio::test]
async fn top_k_returns_exactly_k_when_index_is_large_enough() {
    let dir = tempfile::tempdir().unwrap();
    let report_path = write_report(dir.path());

    let mut config = test_config(dir.path().join("index.db"));
    // Small chunks so one document yields well over k passages.
    config.chunk_size = 80;
    config.chunk_overlap = 20;
    let mut service = RagService::new(
        config,
        Arc::new(StubEmbedder),
        Arc::new(StubCompletion::new("ok")),
    );

    let report = service.load_and_index(&[report_path]).await.unwrap();
    assert!(report.passages_indexed >= 5);

    let answer = service.ask("How much revenue did we earn?").await.unwrap();
    assert_eq!(answer.sources.len(), 5);
}

#[tokio::test]
async fn load_existing_index_fails_with_not_found_when_absent() {
    let dir = tempfile::tempdir().unwrap();
    let (mut service, _) = make_service(dir.path(), "ok");
    let err = service.load_existing_index().unwrap_err();
    assert!(matches!(err, RagError::NotFound(_)));
}

#[tokio::test]
async fn load_existing_index_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let report_path = write_report(dir.path());
    let (mut service, _) = make_service(dir.path(), "ok");
    let ingest = service.load_and_index(&[report_path]).await.unwrap();

    let (mut reloaded, _) = make_service(dir.path(), "ok");
    let first = reloaded.load_existing_index().unwrap();
    let second = reloaded.load_existing_index().unwrap();
    assert_eq!(first, ingest.passages_indexed);
    assert_eq!(first, second);

    let store_path = dir.path().join("index.db");
    let ids_a: Vec<String> = VectorStore::open_existing(&store_path)
        .unwrap()
        .load_all()
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    let ids_b: Vec<String> = VectorStore::open_existing(&store_path)
        .unwrap()
        .load_all()
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids_a, ids_b);
}

#[tokio::test]
async fn reingest_overwrites_the_persisted_index() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_report(dir.path());
    let second = dir.path().join("second_report.txt");
    fs::write(&second, "Revenue of the second filing was $7 million.").unwrap();

    let (mut service, _) = make_service(dir.path(), "ok");
    service.load_and_index(&[first]).await.unwrap();
    service.load_and_index(&[second]).await.unwrap();

    let store = VectorStore::open_existing(&dir.path().join("index.db")).unwrap();
    let sources: Vec<String> = store
        .load_all()
        .unwrap()
        .into_iter()
        .map(|p| p.passage.source_id)
        .collect();
    assert!(!sources.is_empty());
    assert!(sources.iter().all(|s| s == "second_report.txt"));
}

#[tokio::test]
async fn model_failures_surface_as_retryable_service_errors() {
    let dir = tempfile::tempdir().unwrap();
    let report_path = write_report(dir.path());
    let mut service = RagService::new(
        test_config(dir.path().join("index.db")),
        Arc::new(StubEmbedder),
        Arc::new(RateLimitedCompletion),
    );
    service.load_and_index(&[report_path]).await.unwrap();

    let err = service.ask("What was revenue?").await.unwrap_err();
    assert!(err.is_retryable());
    assert!(matches!(err, RagError::ExternalService { .. }));
}

#[tokio::test]
async fn validator_accepts_figures_present_in_the_context() {
    let dir = tempfile::tempdir().unwrap();
    let report_path = write_report(dir.path());
    let (mut service, _) =
        make_service(dir.path(), "Total revenue was $100 million.");
    service.load_and_index(&[report_path]).await.unwrap();

    let answer = service.ask("What was the total revenue?").await.unwrap();
    assert!(service.is_answer_supported(&answer));
}

#[tokio::test]
async fn validator_flags_figures_missing_from_the_context() {
    let dir = tempfile::tempdir().unwrap();
    let report_path = write_report(dir.path());
    let (mut service, _) =
        make_service(dir.path(), "Total revenue was $999 million.");
    service.load_and_index(&[report_path]).await.unwrap();

    let answer = service.ask("What was the total revenue?").await.unwrap();
    assert!(!service.is_answer_supported(&answer));
}
