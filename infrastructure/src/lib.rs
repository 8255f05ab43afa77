pub mod chunker;
pub mod config;
pub mod document_loader;
pub mod embedder;
pub mod gemini_client;
pub mod ollama_client;
pub mod providers;
pub mod search;
pub mod vector_store;
