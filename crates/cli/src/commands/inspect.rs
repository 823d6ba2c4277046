//! Inspect command handler.

use clap::Args;
use scholar_core::{config::AppConfig, AppResult};
use scholar_retrieval::{inspect_metadata, load_index};

/// Sample the index and list metadata fields
#[derive(Args, Debug)]
pub struct InspectCommand {
    /// Query used to pull the sample
    #[arg(long, default_value = "example")]
    pub query: String,

    /// Number of passages to sample
    #[arg(long, default_value_t = 500)]
    pub sample_size: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl InspectCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing inspect command");

        let index = load_index(
            &config.index_path,
            &config.embedding,
            config.api_key.as_deref(),
        )
        .await?;

        let summary = inspect_metadata(&index, &self.query, self.sample_size).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            println!("{}", summary.report());
        }

        Ok(())
    }
}
