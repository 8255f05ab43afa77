use domain::models::{Passage, Query};
use infrastructure::providers::EmbeddingProvider;
use infrastructure::search::SearchEngine;
use infrastructure::vector_store::VectorStore;
use shared::types::Result;
use std::sync::Arc;

/// Thin retrieval policy over the vector store: fixed similarity
/// search, top-k. No re-ranking, no filtering, no deduplication of
/// near-identical passages; those would be extension points, not part
/// of this contract.
pub struct Retriever {
    store: VectorStore,
    provider: Arc<dyn EmbeddingProvider>,
}

impl Retriever {
    pub fn new(store: VectorStore, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, provider }
    }

    /// Ranked passages for a query, similarity descending, at most
    /// `query.k` of them. Retrieval against an empty store returns an
    /// empty result, not an error.
    pub async fn retrieve(&self, query: &Query) -> Result<Vec<Passage>> {
        let k = query.k.max(1);
        let query_vector = self.provider.embed(&query.question).await?;
        let indexed = self.store.load_all()?;
        Ok(SearchEngine::top_k(&query_vector, &indexed, k))
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }
}
