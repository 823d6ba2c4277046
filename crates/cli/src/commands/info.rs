//! Info command handler.

use clap::Args;
use scholar_core::{config::AppConfig, AppResult};
use scholar_retrieval::load_index;

/// Show index details
#[derive(Args, Debug)]
pub struct InfoCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl InfoCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing info command");

        let index = load_index(
            &config.index_path,
            &config.embedding,
            config.api_key.as_deref(),
        )
        .await?;

        let info = index.info().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&info)?);
        } else {
            println!("Index:      {:?}", config.index_path);
            println!("Backend:    {}", info.backend);
            println!("Passages:   {}", info.passages);
            println!("Dimensions: {}", info.dimensions);
            println!("Provider:   {}", info.provider);
            println!("Model:      {}", info.model);
        }

        Ok(())
    }
}
