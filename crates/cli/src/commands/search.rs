//! Search command handler.
//!
//! Plain output goes through the degrading search path, so a broken
//! embedding call prints the empty-result report. `--json` and `--scores`
//! use the scored search and fail loudly instead.

use clap::Args;
use scholar_core::{config::AppConfig, AppResult};
use scholar_retrieval::{
    format_results, load_index, search_similar, FormatOptions, MetadataFilter, Passage,
};
use serde::Serialize;

/// Search the index
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Query text
    pub query: String,

    /// Number of passages to retrieve (default: retrieval.topK)
    #[arg(short = 'k', long = "top-k")]
    pub top_k: Option<usize>,

    /// Require metadata field=value (repeatable)
    #[arg(long, value_name = "FIELD=VALUE")]
    pub filter: Vec<String>,

    /// Require metadata field to be one of field=v1,v2 (repeatable)
    #[arg(long, value_name = "FIELD=V1,V2")]
    pub any: Vec<String>,

    /// Metadata field to print (repeatable; default: retrieval.metadataFields)
    #[arg(long, value_name = "NAME")]
    pub field: Vec<String>,

    /// Omit passage text
    #[arg(long)]
    pub no_content: bool,

    /// Truncate passage text to this many characters
    #[arg(long)]
    pub max_content_length: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Print similarity scores after the report
    #[arg(long)]
    pub scores: bool,
}

#[derive(Debug, Serialize)]
struct ScoredPassage<'a> {
    #[serde(flatten)]
    passage: &'a Passage,
    score: f32,
}

impl SearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing search command");

        let filter = self.build_filter()?;
        let filter = (!filter.is_empty()).then_some(filter);
        let k = self.top_k.unwrap_or(config.retrieval.top_k);

        let index = load_index(
            &config.index_path,
            &config.embedding,
            config.api_key.as_deref(),
        )
        .await?;

        let options = self.format_options(config);

        if self.json || self.scores {
            let results = index.search(&self.query, k, filter.as_ref()).await?;

            if self.json {
                let output: Vec<ScoredPassage> = results
                    .iter()
                    .map(|(passage, score)| ScoredPassage {
                        passage,
                        score: *score,
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                let passages: Vec<Passage> = results.iter().map(|(p, _)| p.clone()).collect();
                println!("{}", format_results(&passages, &options));

                if !results.is_empty() {
                    println!();
                    println!("Scores:");
                    for (i, (passage, score)) in results.iter().enumerate() {
                        println!("  {}. {} ({:.4})", i + 1, passage.id, score);
                    }
                }
            }
        } else {
            let passages = search_similar(&index, &self.query, k, filter.as_ref()).await;
            println!("{}", format_results(&passages, &options));
        }

        Ok(())
    }

    fn build_filter(&self) -> AppResult<MetadataFilter> {
        let filter = self
            .filter
            .iter()
            .try_fold(MetadataFilter::new(), |f, arg| f.parse_pair(arg))?;

        self.any
            .iter()
            .try_fold(filter, |f, arg| f.parse_any(arg))
    }

    fn format_options(&self, config: &AppConfig) -> FormatOptions {
        let mut options = FormatOptions::from(&config.retrieval).with_content(!self.no_content);

        if !self.field.is_empty() {
            options = options.with_metadata_fields(self.field.iter().cloned());
        }
        if self.max_content_length.is_some() {
            options = options.with_max_content_length(self.max_content_length);
        }

        options
    }
}
