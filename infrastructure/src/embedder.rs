use crate::providers::EmbeddingProvider;
use domain::models::{IndexedPassage, Passage};
use futures::stream::{self, StreamExt};
use shared::types::Result;
use std::sync::Arc;

/// Turns passages into indexed passages by computing embeddings in
/// bounded-concurrency batches. Passage order is preserved so ids and
/// insertion order stay deterministic.
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
}

impl Embedder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    pub async fn embed_passages(&self, passages: &[Passage]) -> Result<Vec<IndexedPassage>> {
        const BATCH_SIZE: usize = 32;
        let mut indexed = Vec::with_capacity(passages.len());

        for (batch_index, batch) in passages.chunks(BATCH_SIZE).enumerate() {
            let offset = batch_index * BATCH_SIZE;
            let batch_indexed = self.embed_batch(batch, offset).await?;
            indexed.extend(batch_indexed);
        }
        Ok(indexed)
    }

    async fn embed_batch(
        &self,
        passages: &[Passage],
        offset: usize,
    ) -> Result<Vec<IndexedPassage>> {
        let futures: Vec<_> = passages
            .iter()
            .enumerate()
            .map(|(i, passage)| {
                let provider = &self.provider;
                let ordinal = offset + i;
                async move {
                    let vector = provider.embed(&passage.text).await?;
                    Ok(IndexedPassage {
                        id: passage_id(passage, ordinal),
                        vector,
                        passage: passage.clone(),
                    })
                }
            })
            .collect();

        let results: Vec<Result<IndexedPassage>> =
            stream::iter(futures).buffered(8).collect().await;

        results.into_iter().collect()
    }
}

/// Stable identifier from source, page and chunk ordinal.
fn passage_id(passage: &Passage, ordinal: usize) -> String {
    let key = format!("{}:{}:{}", passage.source_id, passage.page, ordinal);
    format!("{:x}", md5::compute(key.as_bytes()))
}
