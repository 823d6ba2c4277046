//! Similarity search over a loaded index.
//!
//! Unfiltered searches go to the store's nearest-neighbour search. Filtered
//! searches score every matching passage by cosine similarity before
//! truncating, so they still return up to `k` matching passages.

pub mod filter;

pub use filter::{FilterCondition, MetadataFilter};

use crate::loader::PassageIndex;
use crate::types::{EmbeddedPassage, Passage};
use scholar_core::{AppError, AppResult};

/// Result count used when the caller does not pick one.
pub const DEFAULT_TOP_K: usize = 5;

impl PassageIndex {
    /// Embed `query` and return the top `k` passages with their scores.
    ///
    /// # Errors
    /// * `AppError::Search` - If the query is blank, `k` is zero or the store cannot be read
    /// * `AppError::Embedding` - If the query cannot be embedded
    pub async fn search(
        &self,
        query: &str,
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> AppResult<Vec<(Passage, f32)>> {
        if query.trim().is_empty() {
            return Err(AppError::Search("Query cannot be empty".to_string()));
        }
        if k == 0 {
            return Err(AppError::Search("k must be at least 1".to_string()));
        }

        let query_embedding = self.embedder().embed(query).await?;
        if query_embedding.len() != self.store().dimensions() {
            return Err(AppError::Search(format!(
                "Query embedding has {} dimensions, index expects {}",
                query_embedding.len(),
                self.store().dimensions()
            )));
        }

        let results = match filter.filter(|f| !f.is_empty()) {
            // Filtered searches rank every matching passage so truncation
            // never drops eligible rows.
            Some(filter) => {
                let passages = self.store().scan().await?;
                let scanned = passages.len();
                let results = rank(&query_embedding, passages, k, Some(filter));
                tracing::debug!(
                    "Ranked {} of {} passages with {} filter conditions (k = {})",
                    results.len(),
                    scanned,
                    filter.len(),
                    k
                );
                results
            }
            None => {
                let results = self.store().nearest(&query_embedding, k).await?;
                tracing::debug!("Nearest search returned {} passages (k = {})", results.len(), k);
                results
            }
        };

        Ok(results)
    }
}

/// Score, filter and order passages against a query embedding.
///
/// The sort is stable, so equal scores keep store order. Non-finite scores
/// (from vectors holding NaN or infinity) rank last.
pub fn rank(
    query_embedding: &[f32],
    passages: Vec<EmbeddedPassage>,
    k: usize,
    filter: Option<&MetadataFilter>,
) -> Vec<(Passage, f32)> {
    let mut scored: Vec<(Passage, f32)> = passages
        .into_iter()
        .filter(|p| filter.map_or(true, |f| f.matches(&p.passage)))
        .map(|p| {
            let score = cosine_similarity(query_embedding, &p.embedding);
            let score = if score.is_finite() { score } else { f32::NEG_INFINITY };
            (p.passage, score)
        })
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(k);
    scored
}

/// Cosine similarity; zero when either vector has zero norm or lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Search and degrade to an empty list on any failure.
///
/// This is the entry point for a chat layer that should keep answering
/// when retrieval breaks; the error is logged, not returned.
pub async fn search_similar(
    index: &PassageIndex,
    query: &str,
    k: usize,
    filter: Option<&MetadataFilter>,
) -> Vec<Passage> {
    match index.search(query, k, filter).await {
        Ok(results) => results.into_iter().map(|(passage, _)| passage).collect(),
        Err(e) => {
            tracing::error!("Error during search: {}", e);
            Vec::new()
        }
    }
}
