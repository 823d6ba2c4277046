//! LanceDB-backed passage store.
//!
//! The index directory is a LanceDB database holding a `passages` table:
//!
//! | column      | type                          |
//! |-------------|-------------------------------|
//! | `id`        | `Utf8`                        |
//! | `text`      | `Utf8`                        |
//! | `embedding` | `FixedSizeList<Float32, D>`   |
//! | `metadata`  | `Utf8` (JSON object)          |
//!
//! `D` is read from the table schema when the store is opened. Unfiltered
//! queries use LanceDB's vector search with cosine distance; the returned
//! rows are rescored locally so every backend reports the same scores.

use crate::search::rank;
use crate::store::PassageStore;
use crate::types::{EmbeddedPassage, Passage};
use arrow_array::{Array, FixedSizeListArray, Float32Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Schema};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{DistanceType, Table};
use scholar_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Table name inside the index directory.
pub const PASSAGES_TABLE: &str = "passages";

const ID_COLUMN: &str = "id";
const TEXT_COLUMN: &str = "text";
const EMBEDDING_COLUMN: &str = "embedding";
const METADATA_COLUMN: &str = "metadata";

/// Read-only LanceDB passage store.
pub struct LanceDbStore {
    table: Table,
    path: PathBuf,
    dimensions: usize,
}

impl std::fmt::Debug for LanceDbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanceDbStore")
            .field("path", &self.path)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

impl LanceDbStore {
    /// Open the `passages` table of an existing index directory.
    ///
    /// Never creates anything: a missing directory or table is an error.
    pub async fn open(path: &Path) -> AppResult<Self> {
        Self::open_table(path, PASSAGES_TABLE).await
    }

    /// Open a specific table of an existing index directory.
    pub async fn open_table(path: &Path, table_name: &str) -> AppResult<Self> {
        if !path.is_dir() {
            return Err(AppError::IndexLoad(format!(
                "Index directory does not exist: {:?}",
                path
            )));
        }

        let uri = path.to_string_lossy().to_string();
        let conn = lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| AppError::IndexLoad(format!("Failed to connect to LanceDB: {}", e)))?;

        let table_names = conn
            .table_names()
            .execute()
            .await
            .map_err(|e| AppError::IndexLoad(format!("Failed to list tables: {}", e)))?;

        if !table_names.iter().any(|name| name == table_name) {
            return Err(AppError::IndexLoad(format!(
                "Index at {:?} has no '{}' table",
                path, table_name
            )));
        }

        let table = conn
            .open_table(table_name)
            .execute()
            .await
            .map_err(|e| AppError::IndexLoad(format!("Failed to open table: {}", e)))?;

        let schema = table
            .schema()
            .await
            .map_err(|e| AppError::IndexLoad(format!("Failed to read table schema: {}", e)))?;

        let dimensions = validate_schema(&schema)?;

        tracing::debug!(
            "Opened LanceDB table '{}' at {:?} ({} dimensions)",
            table_name,
            path,
            dimensions
        );

        Ok(Self {
            table,
            path: path.to_path_buf(),
            dimensions,
        })
    }

    /// Directory this store was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Check the required columns and return the embedding dimension.
fn validate_schema(schema: &Schema) -> AppResult<usize> {
    for column in [ID_COLUMN, TEXT_COLUMN, METADATA_COLUMN] {
        let field = schema.field_with_name(column).map_err(|_| {
            AppError::IndexLoad(format!("Passages table is missing column '{}'", column))
        })?;
        if field.data_type() != &DataType::Utf8 {
            return Err(AppError::IndexLoad(format!(
                "Column '{}' must be Utf8, found {}",
                column,
                field.data_type()
            )));
        }
    }

    let embedding = schema.field_with_name(EMBEDDING_COLUMN).map_err(|_| {
        AppError::IndexLoad(format!(
            "Passages table is missing column '{}'",
            EMBEDDING_COLUMN
        ))
    })?;

    match embedding.data_type() {
        DataType::FixedSizeList(item, size)
            if item.data_type() == &DataType::Float32 && *size > 0 =>
        {
            Ok(*size as usize)
        }
        other => Err(AppError::IndexLoad(format!(
            "Column '{}' must be FixedSizeList<Float32>, found {}",
            EMBEDDING_COLUMN, other
        ))),
    }
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> AppResult<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| AppError::Search(format!("Invalid {} column", name)))
}

/// Convert every row of a batch, skipping rows that cannot be decoded.
fn batch_to_passages(batch: &RecordBatch) -> AppResult<Vec<EmbeddedPassage>> {
    let ids = string_column(batch, ID_COLUMN)?;
    let texts = string_column(batch, TEXT_COLUMN)?;
    let metadata = string_column(batch, METADATA_COLUMN)?;
    let embeddings = batch
        .column_by_name(EMBEDDING_COLUMN)
        .and_then(|c| c.as_any().downcast_ref::<FixedSizeListArray>())
        .ok_or_else(|| AppError::Search("Invalid embedding column".to_string()))?;

    let mut passages = Vec::with_capacity(batch.num_rows());

    for row in 0..batch.num_rows() {
        let id = ids.value(row).to_string();

        let metadata = if metadata.is_null(row) {
            serde_json::Map::new()
        } else {
            match serde_json::from_str(metadata.value(row)) {
                Ok(serde_json::Value::Object(map)) => map,
                Ok(_) | Err(_) => {
                    tracing::warn!("Skipping passage '{}': metadata is not a JSON object", id);
                    continue;
                }
            }
        };

        let vector_ref = embeddings.value(row);
        let Some(vector) = vector_ref.as_any().downcast_ref::<Float32Array>() else {
            tracing::warn!("Skipping passage '{}': embedding is not Float32", id);
            continue;
        };

        passages.push(EmbeddedPassage::new(
            Passage {
                id,
                text: texts.value(row).to_string(),
                metadata,
            },
            vector.values().to_vec(),
        ));
    }

    Ok(passages)
}

#[async_trait::async_trait]
impl PassageStore for LanceDbStore {
    fn backend_name(&self) -> &str {
        "lancedb"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn count(&self) -> AppResult<usize> {
        self.table
            .count_rows(None)
            .await
            .map_err(|e| AppError::Search(format!("Failed to count rows: {}", e)))
    }

    async fn scan(&self) -> AppResult<Vec<EmbeddedPassage>> {
        let total = self.count().await?;
        if total == 0 {
            return Ok(Vec::new());
        }

        let batches: Vec<RecordBatch> = self
            .table
            .query()
            .limit(total)
            .execute()
            .await
            .map_err(|e| AppError::Search(format!("Failed to scan passages: {}", e)))?
            .try_collect()
            .await
            .map_err(|e| AppError::Search(format!("Failed to collect passages: {}", e)))?;

        let mut passages = Vec::with_capacity(total);
        for batch in &batches {
            passages.extend(batch_to_passages(batch)?);
        }

        tracing::debug!("Scanned {} passages from {:?}", passages.len(), self.path);
        Ok(passages)
    }

    async fn nearest(&self, query_embedding: &[f32], k: usize) -> AppResult<Vec<(Passage, f32)>> {
        if k == 0 || self.count().await? == 0 {
            return Ok(Vec::new());
        }

        let batches: Vec<RecordBatch> = self
            .table
            .query()
            .nearest_to(query_embedding.to_vec())
            .map_err(|e| AppError::Search(format!("Failed to create query: {}", e)))?
            .distance_type(DistanceType::Cosine)
            .limit(k)
            .execute()
            .await
            .map_err(|e| AppError::Search(format!("Failed to execute search: {}", e)))?
            .try_collect()
            .await
            .map_err(|e| AppError::Search(format!("Failed to collect results: {}", e)))?;

        let mut candidates = Vec::with_capacity(k);
        for batch in &batches {
            candidates.extend(batch_to_passages(batch)?);
        }

        tracing::debug!("Vector search returned {} candidates from {:?}", candidates.len(), self.path);
        Ok(rank(query_embedding, candidates, k, None))
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{passages_schema, write_passages, write_table};
    use super::*;
    use arrow_schema::Field;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn sample() -> Vec<EmbeddedPassage> {
        vec![
            EmbeddedPassage::new(
                Passage::new("p1", "Core courses cover statistics and machine learning.")
                    .with_metadata("title", "Curriculum")
                    .with_metadata("chunk_index", 0),
                vec![1.0, 0.0, 0.0],
            ),
            EmbeddedPassage::new(
                Passage::new("p2", "The capstone project runs for two quarters.")
                    .with_metadata("title", "Capstone")
                    .with_metadata("source", "https://example.edu/capstone"),
                vec![0.0, 1.0, 0.0],
            ),
        ]
    }

    #[test]
    fn test_validate_schema_reads_dimension() {
        assert_eq!(validate_schema(&passages_schema(1536)).unwrap(), 1536);
    }

    #[test]
    fn test_validate_schema_missing_column() {
        let schema = Schema::new(vec![
            Field::new(ID_COLUMN, DataType::Utf8, false),
            Field::new(TEXT_COLUMN, DataType::Utf8, false),
        ]);

        let err = validate_schema(&schema).unwrap_err();
        assert!(err.to_string().contains("missing column 'metadata'"));
    }

    #[test]
    fn test_validate_schema_rejects_plain_list_embedding() {
        let schema = Schema::new(vec![
            Field::new(ID_COLUMN, DataType::Utf8, false),
            Field::new(TEXT_COLUMN, DataType::Utf8, false),
            Field::new(METADATA_COLUMN, DataType::Utf8, true),
            Field::new(
                EMBEDDING_COLUMN,
                DataType::List(Arc::new(Field::new("item", DataType::Float32, true))),
                false,
            ),
        ]);

        let err = validate_schema(&schema).unwrap_err();
        assert!(err.to_string().contains("FixedSizeList"));
    }

    #[tokio::test]
    async fn test_open_missing_directory() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");

        let err = LanceDbStore::open(&missing).await.unwrap_err();
        assert!(matches!(err, AppError::IndexLoad(_)));
    }

    #[tokio::test]
    async fn test_open_directory_without_table() {
        let temp = TempDir::new().unwrap();
        write_table(temp.path(), "chunks", 3, &sample()).await;

        let err = LanceDbStore::open(temp.path()).await.unwrap_err();
        assert!(err.to_string().contains("no 'passages' table"));
    }

    #[tokio::test]
    async fn test_nearest_uses_vector_search() {
        let temp = TempDir::new().unwrap();
        let mut passages = sample();
        passages.push(EmbeddedPassage::new(
            Passage::new("p3", "Tuition is billed per quarter."),
            vec![0.0, 0.0, 1.0],
        ));
        write_passages(temp.path(), 3, &passages).await;

        let store = LanceDbStore::open(temp.path()).await.unwrap();
        let results = store.nearest(&[0.1, 1.0, 0.0], 2).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0.id, "p2");
        assert_eq!(results[1].0.id, "p1");
        assert!(results[0].1 > results[1].1);
        assert_eq!(
            results[0].0.metadata_display("title").as_deref(),
            Some("Capstone")
        );
    }

    #[tokio::test]
    async fn test_nearest_on_empty_table() {
        let temp = TempDir::new().unwrap();
        write_passages(temp.path(), 3, &[]).await;

        let store = LanceDbStore::open(temp.path()).await.unwrap();
        assert!(store.nearest(&[1.0, 0.0, 0.0], 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scan_round_trips_rows() {
        let temp = TempDir::new().unwrap();
        write_passages(temp.path(), 3, &sample()).await;

        let store = LanceDbStore::open(temp.path()).await.unwrap();
        assert_eq!(store.dimensions(), 3);
        assert_eq!(store.count().await.unwrap(), 2);

        let rows = store.scan().await.unwrap();
        assert_eq!(rows.len(), 2);

        let capstone = rows.iter().find(|r| r.passage.id == "p2").unwrap();
        assert_eq!(capstone.embedding, vec![0.0, 1.0, 0.0]);
        assert_eq!(
            capstone.passage.metadata_display("source").as_deref(),
            Some("https://example.edu/capstone")
        );
        assert_eq!(
            rows.iter()
                .find(|r| r.passage.id == "p1")
                .unwrap()
                .passage
                .metadata["chunk_index"],
            serde_json::json!(0)
        );
    }
}
