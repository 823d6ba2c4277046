//! Plain-text rendering of search results.
//!
//! The report is what the chat layer pastes into its prompt:
//!
//! ```text
//! Found 2 relevant chunks:
//!
//!
//! Chunk 1:
//! ----------
//! Title: Capstone
//! Source: https://example.edu/capstone
//!
//! Content:
//! ----------
//! The capstone project runs for two quarters.
//! ----------
//! ```

use crate::types::Passage;
use scholar_core::config::{RetrievalConfig, DEFAULT_METADATA_FIELDS};

/// Returned instead of a report when there is nothing to show.
pub const NO_RESULTS: &str = "No results found.";

const RULE: &str = "----------";
const ELLIPSIS: &str = "...";

/// Options for [`format_results`].
#[derive(Debug, Clone, PartialEq)]
pub struct FormatOptions {
    /// Metadata fields to print, in order; absent fields are skipped.
    /// An empty list means the default fields.
    pub metadata_fields: Vec<String>,

    /// Print passage text
    pub include_content: bool,

    /// Cut passage text to this many characters and append `...`;
    /// `Some(0)` leaves it whole
    pub max_content_length: Option<usize>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            metadata_fields: DEFAULT_METADATA_FIELDS.iter().map(|f| f.to_string()).collect(),
            include_content: true,
            max_content_length: None,
        }
    }
}

impl From<&RetrievalConfig> for FormatOptions {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            metadata_fields: config.metadata_fields.clone(),
            include_content: true,
            max_content_length: config.max_content_length,
        }
    }
}

impl FormatOptions {
    pub fn with_metadata_fields<S: Into<String>>(
        mut self,
        fields: impl IntoIterator<Item = S>,
    ) -> Self {
        self.metadata_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_content(mut self, include_content: bool) -> Self {
        self.include_content = include_content;
        self
    }

    pub fn with_max_content_length(mut self, max_content_length: Option<usize>) -> Self {
        self.max_content_length = max_content_length;
        self
    }
}

/// Render passages as a numbered report, or [`NO_RESULTS`] when empty.
pub fn format_results(passages: &[Passage], options: &FormatOptions) -> String {
    if passages.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut parts: Vec<String> = Vec::with_capacity(passages.len() * 6 + 1);
    parts.push(format!("Found {} relevant chunks:\n", passages.len()));

    let fields: Vec<&str> = if options.metadata_fields.is_empty() {
        DEFAULT_METADATA_FIELDS.to_vec()
    } else {
        options.metadata_fields.iter().map(String::as_str).collect()
    };

    for (i, passage) in passages.iter().enumerate() {
        parts.push(format!("\nChunk {}:", i + 1));
        parts.push(RULE.to_string());

        let metadata_lines: Vec<String> = fields
            .iter()
            .filter_map(|field| {
                passage
                    .metadata_display(field)
                    .map(|value| format!("{}: {}", display_field_name(field), value))
            })
            .collect();
        parts.push(metadata_lines.join("\n"));

        if options.include_content {
            parts.push("\nContent:".to_string());
            parts.push(RULE.to_string());
            parts.push(truncate_content(&passage.text, options.max_content_length));
            parts.push(RULE.to_string());
        }
    }

    parts.join("\n")
}

/// `chunk_index` -> `Chunk Index`.
pub fn display_field_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut at_word_start = true;

    for c in field.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if at_word_start {
                name.extend(c.to_uppercase());
            } else {
                name.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            name.push(c);
            at_word_start = true;
        }
    }

    name
}

/// Cut on character boundaries, never inside a UTF-8 sequence. A zero
/// limit disables truncation.
fn truncate_content(text: &str, max_chars: Option<usize>) -> String {
    match max_chars.filter(|&max| max > 0) {
        Some(max) => match text.char_indices().nth(max) {
            Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
            None => text.to_string(),
        },
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capstone() -> Passage {
        Passage::new("p1", "Hello world")
            .with_metadata("source", "a.html")
            .with_metadata("title", "Capstone")
    }

    #[test]
    fn test_empty_input_is_sentinel() {
        assert_eq!(format_results(&[], &FormatOptions::default()), NO_RESULTS);

        let options = FormatOptions::default()
            .with_content(false)
            .with_max_content_length(Some(3))
            .with_metadata_fields(["title"]);
        assert_eq!(format_results(&[], &options), "No results found.");
    }

    #[test]
    fn test_exact_layout() {
        let report = format_results(&[capstone()], &FormatOptions::default());

        assert_eq!(
            report,
            "Found 1 relevant chunks:\n\n\nChunk 1:\n----------\nTitle: Capstone\nSource: a.html\n\nContent:\n----------\nHello world\n----------"
        );
    }

    #[test]
    fn test_without_content() {
        let options = FormatOptions::default().with_content(false);
        let report = format_results(&[capstone()], &options);

        assert!(!report.contains("Content:"));
        assert!(!report.contains("Hello world"));
        assert!(report.ends_with("Title: Capstone\nSource: a.html"));
    }

    #[test]
    fn test_field_order_follows_options() {
        let options = FormatOptions::default().with_metadata_fields(["source", "title"]);
        let report = format_results(&[capstone()], &options);

        let source = report.find("Source:").unwrap();
        let title = report.find("Title:").unwrap();
        assert!(source < title);
    }

    #[test]
    fn test_absent_field_omitted_for_that_passage_only() {
        let second = Passage::new("p2", "Second")
            .with_metadata("title", "Admissions")
            .with_metadata("chunk_index", 4);
        let report = format_results(&[capstone(), second], &FormatOptions::default());

        let (first, second) = report.split_at(report.find("\nChunk 2:").unwrap());
        assert!(first.contains("Title: Capstone\nSource: a.html"));
        assert!(!first.contains("Chunk Index"));
        assert!(second.contains("Title: Admissions\nChunk Index: 4"));
        assert!(!second.contains("Source:"));
    }

    #[test]
    fn test_truncation() {
        let passage = Passage::new("p1", "abcdefghij");
        let options = FormatOptions::default().with_max_content_length(Some(4));
        let report = format_results(&[passage.clone()], &options);
        assert!(report.contains("\nabcd...\n"));

        let options = FormatOptions::default().with_max_content_length(Some(10));
        let report = format_results(&[passage], &options);
        assert!(report.contains("\nabcdefghij\n"));
        assert!(!report.contains("..."));
    }

    #[test]
    fn test_truncation_counts_characters() {
        assert_eq!(truncate_content("héllo wörld", Some(7)), "héllo w...");
        assert_eq!(truncate_content("日本語のテキスト", Some(3)), "日本語...");
        assert_eq!(truncate_content("", Some(0)), "");
    }

    #[test]
    fn test_zero_length_limit_keeps_content() {
        assert_eq!(truncate_content("short", Some(0)), "short");

        let options = FormatOptions::default().with_max_content_length(Some(0));
        let report = format_results(&[capstone()], &options);
        assert!(report.contains("\nHello world\n"));
        assert!(!report.contains("..."));
    }

    #[test]
    fn test_empty_field_list_uses_defaults() {
        let empty: [&str; 0] = [];
        let options = FormatOptions::default().with_metadata_fields(empty);

        assert_eq!(
            format_results(&[capstone()], &options),
            format_results(&[capstone()], &FormatOptions::default())
        );
    }

    #[test]
    fn test_display_field_name() {
        assert_eq!(display_field_name("chunk_index"), "Chunk Index");
        assert_eq!(display_field_name("primary_category"), "Primary Category");
        assert_eq!(display_field_name("source"), "Source");
        assert_eq!(display_field_name("URL_path"), "Url Path");
    }

    #[test]
    fn test_non_string_values_render_as_json() {
        let passage = Passage::new("p1", "x")
            .with_metadata("total_chunks", 12)
            .with_metadata("title", "Quoted \"title\"");
        let options = FormatOptions::default().with_content(false);
        let report = format_results(&[passage], &options);

        assert!(report.contains("Title: Quoted \"title\""));
        assert!(report.contains("Total Chunks: 12"));
    }

    #[test]
    fn test_options_from_config() {
        let config = RetrievalConfig {
            metadata_fields: vec!["title".to_string()],
            max_content_length: Some(80),
            ..Default::default()
        };

        let options = FormatOptions::from(&config);
        assert_eq!(options.metadata_fields, vec!["title"]);
        assert_eq!(options.max_content_length, Some(80));
        assert!(options.include_content);
    }
}
