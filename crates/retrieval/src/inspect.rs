//! Metadata discovery for unfamiliar indexes.

use crate::loader::PassageIndex;
use crate::types::{display_value, Passage};
use scholar_core::AppResult;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Query used to pull a sample when none is given.
pub const DEFAULT_SAMPLE_QUERY: &str = "sample";

/// Passages sampled when no size is given.
pub const DEFAULT_SAMPLE_SIZE: usize = 100;

/// Metadata fields seen in a sample and the distinct values each takes.
///
/// Values are compared as JSON, so a stored `3` and a stored `"3"` stay
/// separate entries. They keep the order in which the sample surfaced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetadataSummary {
    /// Number of passages inspected
    pub sampled: usize,

    /// Field name -> distinct values
    pub fields: BTreeMap<String, Vec<Value>>,
}

impl MetadataSummary {
    pub fn from_passages(passages: &[Passage]) -> Self {
        let mut fields: BTreeMap<String, Vec<Value>> = BTreeMap::new();

        for passage in passages {
            for (key, value) in &passage.metadata {
                let values = fields.entry(key.clone()).or_default();
                if !values.contains(value) {
                    values.push(value.clone());
                }
            }
        }

        Self {
            sampled: passages.len(),
            fields,
        }
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Whether `value` was seen for `field`.
    pub fn contains_value(&self, field: &str, value: &Value) -> bool {
        self.fields
            .get(field)
            .is_some_and(|values| values.contains(value))
    }

    /// Human-readable report, one block per field.
    pub fn report(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MetadataSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Metadata Fields and Potential Values:")?;
        for (field, values) in &self.fields {
            write!(f, "\n\n{}:", field)?;
            for value in values {
                write!(f, "\n  - {}", display_value(value))?;
            }
        }
        Ok(())
    }
}

/// Run one sample search and summarize the metadata it surfaces.
///
/// Only passages the sample query reaches are inspected, so rare fields can
/// be missed on large indexes.
pub async fn inspect_metadata(
    index: &PassageIndex,
    sample_query: &str,
    sample_size: usize,
) -> AppResult<MetadataSummary> {
    tracing::info!(
        "Inspecting metadata with sample query '{}' (size {})",
        sample_query,
        sample_size
    );

    let passages: Vec<Passage> = index
        .search(sample_query, sample_size, None)
        .await?
        .into_iter()
        .map(|(passage, _)| passage)
        .collect();

    let summary = MetadataSummary::from_passages(&passages);

    tracing::debug!(
        "Sampled {} passages, found {} metadata fields",
        summary.sampled,
        summary.fields.len()
    );

    Ok(summary)
}
