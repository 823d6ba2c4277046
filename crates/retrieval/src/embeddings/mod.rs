//! Embedding providers.
//!
//! Query text must be embedded with the same model the index was built
//! with, so the provider is chosen from [`EmbeddingConfig`] and bound to the
//! index handle at load time.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
pub use scholar_core::config::EmbeddingConfig;
