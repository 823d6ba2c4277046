//! Retrieval core for the scholar assistant.
//!
//! Loads a persisted passage index, ranks passages against a free-text query
//! with optional metadata filters, and renders the results as a report for a
//! chat layer. Building the index is out of scope: the store is read-only.

pub mod embeddings;
pub mod format;
pub mod inspect;
pub mod loader;
pub mod search;
pub mod store;
pub mod types;


// Re-export commonly used types
pub use embeddings::{create_provider, EmbeddingProvider};
pub use format::{format_results, FormatOptions, NO_RESULTS};
pub use inspect::{inspect_metadata, MetadataSummary, DEFAULT_SAMPLE_QUERY, DEFAULT_SAMPLE_SIZE};
pub use loader::{load_index, IndexInfo, PassageIndex};
pub use search::{search_similar, FilterCondition, MetadataFilter, DEFAULT_TOP_K};
pub use store::{LanceDbStore, MemoryStore, PassageStore};
pub use types::{EmbeddedPassage, Passage};
