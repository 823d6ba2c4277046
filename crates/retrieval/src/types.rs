//! Passage type definitions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A unit of retrievable text with its metadata.
///
/// Passages are written when the index is built and never modified here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// Row identifier in the store
    pub id: String,

    /// Text content
    pub text: String,

    /// Metadata (page_type, title, chunk_index, source, ...)
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Passage {
    /// Create a passage with empty metadata.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: Map::new(),
        }
    }

    /// Attach a metadata field.
    pub fn with_metadata(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(field.into(), value.into());
        self
    }

    /// Metadata value rendered for display, if the field is present.
    pub fn metadata_display(&self, field: &str) -> Option<String> {
        self.metadata.get(field).map(display_value)
    }
}

/// A passage together with its stored embedding vector.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedPassage {
    pub passage: Passage,
    pub embedding: Vec<f32>,
}

impl EmbeddedPassage {
    pub fn new(passage: Passage, embedding: Vec<f32>) -> Self {
        Self { passage, embedding }
    }
}

/// Render a metadata value for humans: strings unquoted, everything else as JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("Capstone")), "Capstone");
        assert_eq!(display_value(&json!(3)), "3");
        assert_eq!(display_value(&json!(true)), "true");
        assert_eq!(display_value(&json!(["a", "b"])), r#"["a","b"]"#);
    }

    #[test]
    fn test_metadata_display_missing_field() {
        let passage = Passage::new("p1", "text").with_metadata("title", "Admissions");
        assert_eq!(passage.metadata_display("title").as_deref(), Some("Admissions"));
        assert_eq!(passage.metadata_display("source"), None);
    }

    #[test]
    fn test_passage_deserializes_without_metadata() {
        let passage: Passage = serde_json::from_str(r#"{"id":"p1","text":"hello"}"#).unwrap();
        assert!(passage.metadata.is_empty());
    }
}
