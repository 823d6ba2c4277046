//! Error types for Scholar.
//!
//! A single error enum covers configuration, index loading, embedding,
//! search, I/O and serialization failures. Callers that want graceful
//! degradation (such as the chat-facing search entry point) log the error
//! and fall back to an empty result; everything else propagates it.

use thiserror::Error;

/// Unified error type for Scholar.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors (missing credential, unknown provider, bad config file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The persisted index could not be opened or does not match the embedder
    #[error("Index load error: {0}")]
    IndexLoad(String),

    /// Embedding provider failures (transport, HTTP status, malformed response)
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Invalid search input or store read failure during a search
    #[error("Search error: {0}")]
    Search(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
