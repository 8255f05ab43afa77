use thiserror::Error;

/// How an external capability (embedding model, language model) failed.
/// Callers use this to decide whether a retry makes sense; the core
/// never retries on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    RateLimited,
    Unavailable,
    /// The service answered, but not in a shape we could use.
    Protocol,
}

impl ServiceErrorKind {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Unavailable)
    }
}

#[derive(Debug, Error)]
pub enum RagError {
    /// Missing credential or invalid persist location at startup. Fatal.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No persisted index at the given location. Recoverable by a fresh ingest.
    #[error("no persisted index found at {0}")]
    NotFound(String),

    /// `ask` called before an index was built or loaded.
    #[error("pipeline not initialized: ingest documents or load an existing index first")]
    NotInitialized,

    /// A source document could not be parsed. Reported per source.
    #[error("cannot read document {path}: {reason}")]
    UnreadableDocument { path: String, reason: String },

    /// Embedding or language-model capability failure.
    #[error("{service} error: {message}")]
    ExternalService {
        service: &'static str,
        kind: ServiceErrorKind,
        message: String,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RagError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ExternalService { kind, .. } => kind.is_retryable(),
            _ => false,
        }
    }
}

impl From<std::io::Error> for RagError {
    fn from(e: std::io::Error) -> Self {
        Self::Other(e.into())
    }
}

impl From<serde_json::Error> for RagError {
    fn from(e: serde_json::Error) -> Self {
        Self::Other(e.into())
    }
}

impl From<dialoguer::Error> for RagError {
    fn from(e: dialoguer::Error) -> Self {
        Self::Other(e.into())
    }
}

pub type Result<T> = std::result::Result<T, RagError>;
