use dotenvy::dotenv;
use shared::types::{RagError, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Credential for the language-model capability. Required.
    pub google_api_key: String,
    pub gemini_model: String,
    pub ollama_base_url: String,
    pub embed_model: String,
    /// Location of the persisted vector index.
    pub index_db_path: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    /// Low temperature keeps numeric transcription stable.
    pub temperature: f32,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenv().ok();
        let google_api_key = env::var("GOOGLE_API_KEY").map_err(|_| {
            RagError::Configuration(
                "GOOGLE_API_KEY not set; add it to the environment or a .env file".to_string(),
            )
        })?;
        Ok(Self {
            google_api_key,
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-flash-latest".to_string()),
            ollama_base_url: env::var("OLLAMA_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            embed_model: env::var("EMBED_MODEL")
                .unwrap_or_else(|_| "nomic-embed-text".to_string()),
            index_db_path: env::var("INDEX_DB_PATH")
                .unwrap_or_else(|_| "report_index.db".to_string())
                .into(),
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 5,
            temperature: 0.0,
        })
    }
}
