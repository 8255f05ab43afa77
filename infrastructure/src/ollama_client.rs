use crate::providers::EmbeddingProvider;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use shared::types::{RagError, Result, ServiceErrorKind};
use std::sync::Arc;

#[derive(Serialize)]
struct EmbeddingRequest {
    model: String,
    prompt: String,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Local embedding capability served by Ollama's `/api/embeddings`.
#[derive(Clone)]
pub struct OllamaClient {
    client: Arc<Client>,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Arc::new(Client::new()),
            base_url: base_url.into(),
            model: model.into(),
        }
    }
}

const SERVICE: &str = "ollama embeddings";

fn service_error(kind: ServiceErrorKind, message: impl Into<String>) -> RagError {
    RagError::ExternalService {
        service: SERVICE,
        kind,
        message: message.into(),
    }
}

fn kind_for_status(status: StatusCode) -> ServiceErrorKind {
    if status == StatusCode::TOO_MANY_REQUESTS {
        ServiceErrorKind::RateLimited
    } else if status.is_server_error() {
        ServiceErrorKind::Unavailable
    } else {
        ServiceErrorKind::Protocol
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let request = EmbeddingRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        };
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| service_error(ServiceErrorKind::Unavailable, e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(service_error(
                kind_for_status(status),
                format!("HTTP {status}: {body}"),
            ));
        }
        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| service_error(ServiceErrorKind::Protocol, e.to_string()))?;
        Ok(parsed.embedding)
    }
}
