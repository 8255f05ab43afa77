use crate::composer::AnswerComposer;
use crate::retriever::Retriever;
use domain::figures;
use domain::models::{Answer, Query};
use infrastructure::chunker::Chunker;
use infrastructure::config::Config;
use infrastructure::document_loader::DocumentLoader;
use infrastructure::embedder::Embedder;
use infrastructure::gemini_client::GeminiClient;
use infrastructure::ollama_client::OllamaClient;
use infrastructure::providers::{CompletionProvider, EmbeddingProvider};
use infrastructure::vector_store::VectorStore;
use shared::types::{RagError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Outcome of a bulk ingestion. Sources that could not be read are
/// reported here without discarding the ones already committed.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub sources_indexed: usize,
    pub passages_indexed: usize,
    pub failures: Vec<(PathBuf, String)>,
}

/// Orchestrates the pipeline: ingest -> chunk -> embed+index, then per
/// query retrieve -> compose -> (advisory) validate.
///
/// The session state machine is the presence of the retriever: before
/// an index is built or loaded, `ask` fails with `NotInitialized`.
/// There is no way back to the uninitialized state; re-ingesting
/// overwrites the persisted index at the same location.
pub struct RagService {
    config: Config,
    loader: DocumentLoader,
    chunker: Chunker,
    embedder: Embedder,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    composer: AnswerComposer,
    retriever: Option<Retriever>,
}

impl RagService {
    pub fn new(
        config: Config,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        completion_provider: Arc<dyn CompletionProvider>,
    ) -> Self {
        let chunker = Chunker::new(config.chunk_size, config.chunk_overlap);
        let embedder = Embedder::new(embedding_provider.clone());
        let composer = AnswerComposer::new(completion_provider, config.temperature);
        Self {
            config,
            loader: DocumentLoader::new(),
            chunker,
            embedder,
            embedding_provider,
            composer,
            retriever: None,
        }
    }

    /// Wire up the real capability clients from configuration.
    pub fn from_config(config: Config) -> Self {
        let embedding: Arc<dyn EmbeddingProvider> = Arc::new(OllamaClient::new(
            config.ollama_base_url.clone(),
            config.embed_model.clone(),
        ));
        let completion: Arc<dyn CompletionProvider> = Arc::new(GeminiClient::new(
            config.google_api_key.clone(),
            config.gemini_model.clone(),
        ));
        Self::new(config, embedding, completion)
    }

    pub fn is_ready(&self) -> bool {
        self.retriever.is_some()
    }

    pub fn index_location(&self) -> &Path {
        &self.config.index_db_path
    }

    pub fn has_persisted_index(&self) -> bool {
        self.config.index_db_path.exists()
    }

    /// Extract, chunk, embed and index the given documents into a fresh
    /// store at the configured location (last-writer-wins).
    ///
    /// Partial-success semantics: a source that fails to load is
    /// recorded in the report and skipped; sources already committed
    /// stay in the index. Capability failures (embedding service down)
    /// abort the whole ingest instead, so the caller can retry.
    pub async fn load_and_index(&mut self, paths: &[PathBuf]) -> Result<IngestReport> {
        // Close any handle we hold on the store before truncating it,
        // so its WAL sidecars are checkpointed and removed first.
        self.retriever = None;
        let store = VectorStore::create(&self.config.index_db_path)?;
        let mut report = IngestReport::default();

        for path in paths {
            match self.ingest_source(&store, path).await {
                Ok(passage_count) => {
                    report.sources_indexed += 1;
                    report.passages_indexed += passage_count;
                }
                Err(RagError::UnreadableDocument { reason, .. }) => {
                    report.failures.push((path.clone(), reason));
                }
                Err(other) => return Err(other),
            }
        }

        self.bind_retriever(store);
        Ok(report)
    }

    async fn ingest_source(&self, store: &VectorStore, path: &Path) -> Result<usize> {
        let source_id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let pages = self.loader.load(path)?;
        let passages = self.chunker.chunk(&pages, &source_id);
        if passages.is_empty() {
            return Ok(0);
        }
        let indexed = self.embedder.embed_passages(&passages).await?;
        store.insert(&indexed)?;
        Ok(indexed.len())
    }

    /// Rehydrate a previously persisted index. Fails with `NotFound`
    /// when nothing was persisted at the configured location; callers
    /// recover by falling back to a fresh ingest.
    pub fn load_existing_index(&mut self) -> Result<usize> {
        let store = VectorStore::open_existing(&self.config.index_db_path)?;
        let count = store.len()?;
        self.bind_retriever(store);
        Ok(count)
    }

    /// Entering the indexed state and becoming ready to answer happen
    /// together: binding the retriever is the transition.
    fn bind_retriever(&mut self, store: VectorStore) {
        self.retriever = Some(Retriever::new(store, self.embedding_provider.clone()));
    }

    /// Answer one question against the indexed document. Only valid
    /// once an index is built or loaded.
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let retriever = self.retriever.as_ref().ok_or(RagError::NotInitialized)?;
        let query = Query {
            question: question.to_string(),
            k: self.config.top_k,
        };
        let sources = retriever.retrieve(&query).await?;
        let text = self.composer.answer(question, &sources).await?;
        Ok(Answer {
            question: question.to_string(),
            text,
            sources,
        })
    }

    /// Advisory numeric check: does every figure in the answer appear
    /// verbatim in the retrieved context? Never blocks an answer;
    /// callers decide whether to surface a warning.
    pub fn is_answer_supported(&self, answer: &Answer) -> bool {
        let context = answer
            .sources
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        figures::is_supported(&answer.text, &context)
    }

    /// Number of passages in the bound index.
    pub fn passage_count(&self) -> Result<usize> {
        let retriever = self.retriever.as_ref().ok_or(RagError::NotInitialized)?;
        retriever.store().len()
    }
}
