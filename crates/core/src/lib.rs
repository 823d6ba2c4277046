//! Scholar Core Library
//!
//! This crate provides the foundational utilities shared by the Scholar crates:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management (including the embedding credential)

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, EmbeddingConfig, RetrievalConfig};
pub use error::{AppError, AppResult};
