use crate::providers::CompletionProvider;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use shared::types::{RagError, Result, ServiceErrorKind};
use std::sync::Arc;

/// Language-model capability over the Gemini `generateContent` REST API.
#[derive(Clone)]
pub struct GeminiClient {
    client: Arc<Client>,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Arc::new(Client::new()),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

const SERVICE: &str = "gemini";

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
impl CompletionProvider for GeminiClient {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        );
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "contents": [{
                    "role": "user",
                    "parts": [{ "text": prompt }]
                }],
                "generationConfig": { "temperature": temperature }
            }))
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
        let body: Value = response
            .json()
            .await
            .map_err(|e| service_error(ServiceErrorKind::Protocol, e.to_string()))?;
        body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                service_error(
                    ServiceErrorKind::Protocol,
                    "response carried no candidate text",
                )
            })
    }
}
