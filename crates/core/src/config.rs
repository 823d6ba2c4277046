//! Configuration management for Scholar.
//!
//! Configuration is assembled in layers, later layers winning:
//! - Built-in defaults
//! - A YAML config file (`--config`, `SCHOLAR_CONFIG`, or `./scholar.yaml`)
//! - Environment variables
//! - Command-line flags (applied with [`AppConfig::with_overrides`])
//!
//! The embedding credential is resolved once, here, and handed to the index
//! loader as an explicit value.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "scholar.yaml";

/// Embedding providers the retrieval crate knows how to build.
pub const KNOWN_PROVIDERS: [&str; 2] = ["openai", "mock"];

/// Metadata fields rendered in reports when the caller does not pick any.
pub const DEFAULT_METADATA_FIELDS: [&str; 7] = [
    "page_type",
    "primary_category",
    "subcategory",
    "title",
    "chunk_index",
    "total_chunks",
    "source",
];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Config file that was merged, if any
    pub config_file: Option<PathBuf>,

    /// Directory holding the persisted vector index
    pub index_path: PathBuf,

    /// Embedding provider settings
    pub embedding: EmbeddingConfig,

    /// Query and report defaults
    pub retrieval: RetrievalConfig,

    /// Resolved credential for the embedding provider
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Log filter override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Emit logs as JSON lines
    pub log_json: bool,
}

/// Embedding provider configuration.
///
/// The model must be the one the index was built with; query vectors are
/// compared against stored vectors directly. Fields missing from a config
/// file keep their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbeddingConfig {
    /// Provider name: "openai" or "mock"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Custom API base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            endpoint: None,
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EmbeddingConfig {
    /// Whether this provider needs a credential to run.
    pub fn requires_api_key(&self) -> bool {
        self.provider.eq_ignore_ascii_case("openai")
    }
}

/// Defaults applied to searches and reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfig {
    /// Number of passages to retrieve
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Metadata fields rendered per passage, in order
    #[serde(default = "default_metadata_fields")]
    pub metadata_fields: Vec<String>,

    /// Truncate passage content to this many characters
    #[serde(default)]
    pub max_content_length: Option<usize>,
}

fn default_top_k() -> usize {
    5
}

fn default_metadata_fields() -> Vec<String> {
    DEFAULT_METADATA_FIELDS.iter().map(|f| f.to_string()).collect()
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            metadata_fields: default_metadata_fields(),
            max_content_length: None,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    index: Option<IndexSection>,
    embedding: Option<EmbeddingConfig>,
    retrieval: Option<RetrievalConfig>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexSection {
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
    json: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            index_path: PathBuf::from("data").join("vectordb"),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            log_json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default config file and the environment.
    pub fn load() -> AppResult<Self> {
        Self::load_from(None)
    }

    /// Load configuration, merging `config_file` if given.
    ///
    /// Environment variables:
    /// - `SCHOLAR_CONFIG`: Path to config file (when `config_file` is `None`)
    /// - `SCHOLAR_INDEX_PATH`: Index directory
    /// - `SCHOLAR_EMBEDDING_PROVIDER`: Embedding provider
    /// - `SCHOLAR_EMBEDDING_MODEL`: Embedding model identifier
    /// - `SCHOLAR_API_KEY`: API key (takes precedence over `embedding.apiKeyEnv`)
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use scholar_core::config::AppConfig;
    ///
    /// let config = AppConfig::load_from(None).expect("Failed to load config");
    /// println!("Index: {:?}", config.index_path);
    /// ```
    pub fn load_from(config_file: Option<&Path>) -> AppResult<Self> {
        let mut config = Self::default();

        let explicit = config_file
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("SCHOLAR_CONFIG").ok().map(PathBuf::from));

        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                config = config.merge_yaml(&path)?;
            }
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    config = config.merge_yaml(&path)?;
                }
            }
        }

        // Environment variables override YAML config
        if let Ok(index_path) = std::env::var("SCHOLAR_INDEX_PATH") {
            config.index_path = PathBuf::from(index_path);
        }

        if let Ok(provider) = std::env::var("SCHOLAR_EMBEDDING_PROVIDER") {
            config.embedding.provider = provider;
        }

        if let Ok(model) = std::env::var("SCHOLAR_EMBEDDING_MODEL") {
            config.embedding.model = model;
        }

        if config.log_level.is_none() {
            config.log_level = std::env::var("RUST_LOG").ok();
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        config.api_key = config.resolve_api_key();

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();
        result.config_file = Some(path.to_path_buf());

        if let Some(index) = config_file.index {
            if let Some(index_path) = index.path {
                result.index_path = index_path;
            }
        }

        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }

        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(json) = logging.json {
                result.log_json = json;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        index_path: Option<PathBuf>,
        provider: Option<String>,
        embedding_model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
        log_json: bool,
    ) -> Self {
        if let Some(index_path) = index_path {
            self.index_path = index_path;
        }

        if let Some(provider) = provider {
            self.embedding.provider = provider;
        }

        if let Some(model) = embedding_model {
            self.embedding.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        if log_json {
            self.log_json = true;
        }

        self
    }

    /// Resolve the API key from `SCHOLAR_API_KEY` or the provider's key variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var("SCHOLAR_API_KEY")
            .ok()
            .or_else(|| std::env::var(&self.embedding.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }

    /// Validate configuration before anything touches the index.
    ///
    /// A missing credential for a provider that needs one is fatal.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.embedding.provider.to_lowercase();

        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if self.embedding.requires_api_key() && self.api_key.is_none() {
            return Err(AppError::Config(format!(
                "API key not found in environment variable: {}",
                self.embedding.api_key_env
            )));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(AppError::Config(
                "retrieval.topK must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.embedding.provider, "openai");
        assert_eq!(config.embedding.model, "text-embedding-3-small");
        assert_eq!(config.embedding.dimensions, 1536);
        assert_eq!(config.embedding.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.retrieval.metadata_fields.len(), 7);
        assert!(config.index_path.ends_with("vectordb"));
        assert!(!config.verbose);
    }

    #[test]
    fn test_merge_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
index:
  path: /srv/scholar/vectordb
embedding:
  provider: mock
  model: trigram-v1
  dimensions: 384
retrieval:
  topK: 3
  metadataFields: [title, source]
  maxContentLength: 200
logging:
  level: warn
  color: false
  json: true
"#
        )
        .unwrap();

        let config = AppConfig::default().merge_yaml(file.path()).unwrap();

        assert_eq!(config.index_path, PathBuf::from("/srv/scholar/vectordb"));
        assert_eq!(config.embedding.provider, "mock");
        assert_eq!(config.embedding.dimensions, 384);
        assert_eq!(config.embedding.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.embedding.timeout_secs, 30);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.retrieval.metadata_fields, vec!["title", "source"]);
        assert_eq!(config.retrieval.max_content_length, Some(200));
        assert_eq!(config.log_level.as_deref(), Some("warn"));
        assert!(config.no_color);
        assert!(config.log_json);
        assert_eq!(config.config_file.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_partial_embedding_section_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "embedding:\n  model: text-embedding-3-large\n  dimensions: 3072\n").unwrap();

        let config = AppConfig::default().merge_yaml(file.path()).unwrap();

        assert_eq!(config.embedding.provider, "openai");
        assert_eq!(config.embedding.model, "text-embedding-3-large");
        assert_eq!(config.embedding.dimensions, 3072);
        assert_eq!(config.retrieval, RetrievalConfig::default());
    }

    #[test]
    fn test_merge_yaml_rejects_malformed_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "embedding: 42").unwrap();

        let err = AppConfig::default().merge_yaml(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_load_from_missing_explicit_file() {
        let result = AppConfig::load_from(Some(Path::new("/definitely/not/here.yaml")));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default().with_overrides(
            Some(PathBuf::from("/tmp/index")),
            Some("mock".to_string()),
            Some("trigram-v1".to_string()),
            None,
            true,
            false,
            true,
        );

        assert_eq!(config.index_path, PathBuf::from("/tmp/index"));
        assert_eq!(config.embedding.provider, "mock");
        assert_eq!(config.embedding.model, "trigram-v1");
        assert!(config.verbose);
        assert!(config.log_json);
        assert_eq!(config.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.embedding.provider = "unknown".to_string();
        config.api_key = Some("sk-test".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_missing_api_key_is_fatal() {
        let mut config = AppConfig::default();
        config.api_key = None;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_validate_openai_with_key() {
        let mut config = AppConfig::default();
        config.api_key = Some("sk-test".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_mock_needs_no_key() {
        let mut config = AppConfig::default();
        config.embedding.provider = "mock".to_string();
        config.api_key = None;
        assert!(config.validate().is_ok());
    }
}
