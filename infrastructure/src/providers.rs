use async_trait::async_trait;
use shared::types::Result;

/// Embedding capability: text in, fixed-length vector out. Deterministic
/// for identical input and configuration. The same provider instance
/// must serve both index build and querying within one process;
/// mixing embedding models silently corrupts similarity ranking.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Language-model capability. May fail with a retryable
/// `RagError::ExternalService`; the pipeline never retries on its own.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String>;
}
