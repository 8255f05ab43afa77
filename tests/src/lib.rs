//! Deterministic stub capabilities for exercising the pipeline without
//! a running embedding service or language model.

use async_trait::async_trait;
use infrastructure::config::Config;
use infrastructure::providers::{CompletionProvider, EmbeddingProvider};
use shared::types::{RagError, Result, ServiceErrorKind};
use std::path::PathBuf;
use std::sync::Mutex;

pub const STUB_DIM: usize = 32;

/// Deterministic bag-of-words embedding: each word hashes into a fixed
/// bucket, so texts sharing vocabulary get similar vectors and repeated
/// calls always agree.
pub struct StubEmbedder;

fn bucket(word: &str) -> usize {
    // FNV-1a, stable across runs.
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in word.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    (hash % STUB_DIM as u64) as usize
}

pub fn stub_vector(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; STUB_DIM];
    for word in text.to_lowercase().split_whitespace() {
        vector[bucket(word)] += 1.0;
    }
    vector
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(stub_vector(text))
    }
}

/// Canned completion that records every prompt it receives.
pub struct StubCompletion {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl StubCompletion {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log poisoned").clone()
    }
}

#[async_trait]
impl CompletionProvider for StubCompletion {
    async fn complete(&self, prompt: &str, _temperature: f32) -> Result<String> {
        self.prompts
            .lock()
            .expect("prompt log poisoned")
            .push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

/// Always fails with a retryable rate-limit error.
pub struct RateLimitedCompletion;

#[async_trait]
impl CompletionProvider for RateLimitedCompletion {
    async fn complete(&self, _prompt: &str, _temperature: f32) -> Result<String> {
        Err(RagError::ExternalService {
            service: "stub llm",
            kind: ServiceErrorKind::RateLimited,
            message: "quota exhausted".to_string(),
        })
    }
}

pub fn test_config(index_db_path: PathBuf) -> Config {
    Config {
        google_api_key: "test-key".to_string(),
        gemini_model: "gemini-flash-latest".to_string(),
        ollama_base_url: "http://localhost:11434".to_string(),
        embed_model: "stub".to_string(),
        index_db_path,
        chunk_size: 1000,
        chunk_overlap: 200,
        top_k: 5,
        temperature: 0.0,
    }
}
