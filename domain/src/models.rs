use serde::{Deserialize, Serialize};

/// A bounded span of source text with page provenance. The unit of
/// retrieval; immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
    /// 1-indexed page of the source document this span came from.
    pub page: u32,
    pub source_id: String,
}

/// A passage plus its embedding vector, as stored in the vector index.
/// Insert-only; never mutated after insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedPassage {
    pub id: String,
    pub vector: Vec<f32>,
    pub passage: Passage,
}

/// A single question plus retrieval parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub question: String,
    pub k: usize,
}

pub const DEFAULT_TOP_K: usize = 5;

impl Query {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            k: DEFAULT_TOP_K,
        }
    }
}

/// Answer to one question, with the ranked passages it was grounded on.
/// Constructed per query; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub text: String,
    pub sources: Vec<Passage>,
}
