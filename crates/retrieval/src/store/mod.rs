//! Passage store abstraction.
//!
//! A store hands back every stored passage with its embedding, and answers
//! unfiltered nearest-neighbour queries. Metadata filtering happens above it
//! so every backend shares the same semantics.

pub mod lance;
pub mod memory;

pub use lance::LanceDbStore;
pub use memory::MemoryStore;

use crate::search::rank;
use crate::types::{EmbeddedPassage, Passage};
use scholar_core::AppResult;

/// Trait for read-only passage store backends.
#[async_trait::async_trait]
pub trait PassageStore: Send + Sync {
    /// Backend name used in logs and `info` output.
    fn backend_name(&self) -> &str;

    /// Dimension of every stored embedding.
    fn dimensions(&self) -> usize;

    /// Number of stored passages.
    async fn count(&self) -> AppResult<usize>;

    /// All stored passages, in the store's stable order.
    async fn scan(&self) -> AppResult<Vec<EmbeddedPassage>>;

    /// Up to `k` passages closest to `query_embedding` by cosine similarity,
    /// best first. Defaults to ranking a full scan.
    async fn nearest(&self, query_embedding: &[f32], k: usize) -> AppResult<Vec<(Passage, f32)>> {
        Ok(rank(query_embedding, self.scan().await?, k, None))
    }
}
