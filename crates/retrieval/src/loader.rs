//! Index loading.

use crate::embeddings::{create_provider, EmbeddingProvider};
use crate::store::{LanceDbStore, PassageStore};
use scholar_core::{AppError, AppResult, EmbeddingConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A loaded, queryable passage index.
///
/// Pairs a read-only store with the embedding provider used for queries.
/// Cheap to clone and safe to share between tasks.
#[derive(Clone)]
pub struct PassageIndex {
    path: Option<PathBuf>,
    store: Arc<dyn PassageStore>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl std::fmt::Debug for PassageIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassageIndex")
            .field("path", &self.path)
            .field("backend", &self.store.backend_name())
            .field("dimensions", &self.store.dimensions())
            .field("embedder", &self.embedder)
            .finish()
    }
}

/// Summary of a loaded index, as printed by `scholar info`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexInfo {
    pub path: Option<PathBuf>,
    pub backend: String,
    pub passages: usize,
    pub dimensions: usize,
    pub provider: String,
    pub model: String,
}

impl PassageIndex {
    /// Bind an already opened store to an embedding provider.
    ///
    /// # Errors
    /// * `AppError::IndexLoad` - If the provider and store dimensions differ
    pub fn from_parts(
        store: Arc<dyn PassageStore>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        if store.dimensions() != embedder.dimensions() {
            return Err(AppError::IndexLoad(format!(
                "Embedding dimension mismatch: index stores {} dimensions but {} model '{}' produces {}",
                store.dimensions(),
                embedder.provider_name(),
                embedder.model_name(),
                embedder.dimensions()
            )));
        }

        Ok(Self {
            path: None,
            store,
            embedder,
        })
    }

    fn with_path(mut self, path: &Path) -> Self {
        self.path = Some(path.to_path_buf());
        self
    }

    /// Directory the index was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Store the passages are read from.
    pub fn store(&self) -> &dyn PassageStore {
        self.store.as_ref()
    }

    /// Provider used to embed queries.
    pub fn embedder(&self) -> &dyn EmbeddingProvider {
        self.embedder.as_ref()
    }

    /// Count passages and describe the bound provider.
    pub async fn info(&self) -> AppResult<IndexInfo> {
        Ok(IndexInfo {
            path: self.path.clone(),
            backend: self.store.backend_name().to_string(),
            passages: self.store.count().await?,
            dimensions: self.store.dimensions(),
            provider: self.embedder.provider_name().to_string(),
            model: self.embedder.model_name().to_string(),
        })
    }
}

/// Open the index at `path` and bind it to the configured embedding model.
///
/// Failures are logged here and returned, so the caller can tell a bad index
/// apart from an empty result.
pub async fn load_index(
    path: &Path,
    config: &EmbeddingConfig,
    api_key: Option<&str>,
) -> AppResult<PassageIndex> {
    tracing::info!("Loading index from {:?} (model: {})", path, config.model);

    match open_index(path, config, api_key).await {
        Ok(index) => {
            tracing::debug!("Loaded {:?}", index);
            Ok(index)
        }
        Err(e) => {
            tracing::error!("Error loading index from {:?}: {}", path, e);
            Err(e)
        }
    }
}

async fn open_index(
    path: &Path,
    config: &EmbeddingConfig,
    api_key: Option<&str>,
) -> AppResult<PassageIndex> {
    let embedder = create_provider(config, api_key)?;
    let store = LanceDbStore::open(path).await?;

    Ok(PassageIndex::from_parts(Arc::new(store), embedder)?.with_path(path))
}
