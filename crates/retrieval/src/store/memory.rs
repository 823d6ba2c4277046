//! In-memory passage store.

use crate::store::PassageStore;
use crate::types::EmbeddedPassage;
use scholar_core::{AppError, AppResult};

/// Passage store held entirely in memory.
///
/// Useful for embedding the retrieval core in another process with a corpus
/// that is already loaded, and for tests.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    dimensions: usize,
    passages: Vec<EmbeddedPassage>,
}

impl MemoryStore {
    /// Build a store, rejecting vectors whose length differs from `dimensions`.
    pub fn new(dimensions: usize, passages: Vec<EmbeddedPassage>) -> AppResult<Self> {
        if let Some(bad) = passages.iter().find(|p| p.embedding.len() != dimensions) {
            return Err(AppError::IndexLoad(format!(
                "Passage '{}' has {} dimensions, expected {}",
                bad.passage.id,
                bad.embedding.len(),
                dimensions
            )));
        }

        Ok(Self {
            dimensions,
            passages,
        })
    }
}

#[async_trait::async_trait]
impl PassageStore for MemoryStore {
    fn backend_name(&self) -> &str {
        "memory"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.passages.len())
    }

    async fn scan(&self) -> AppResult<Vec<EmbeddedPassage>> {
        Ok(self.passages.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Passage;

    #[test]
    fn test_rejects_mismatched_dimensions() {
        let passages = vec![
            EmbeddedPassage::new(Passage::new("a", "first"), vec![1.0, 0.0]),
            EmbeddedPassage::new(Passage::new("b", "second"), vec![1.0, 0.0, 0.0]),
        ];

        let err = MemoryStore::new(2, passages).unwrap_err();
        assert!(err.to_string().contains("Passage 'b'"));
    }

    #[tokio::test]
    async fn test_scan_preserves_order() {
        let passages = vec![
            EmbeddedPassage::new(Passage::new("a", "first"), vec![1.0, 0.0]),
            EmbeddedPassage::new(Passage::new("b", "second"), vec![0.0, 1.0]),
        ];

        let store = MemoryStore::new(2, passages).unwrap();
        let ids: Vec<String> = store
            .scan()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.passage.id)
            .collect();

        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(store.count().await.unwrap(), 2);
    }
}
