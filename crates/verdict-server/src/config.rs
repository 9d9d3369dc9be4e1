//! Server configuration

use crate::cli::Cli;
use crate::stats::DEFAULT_TOP_WORDS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use verdict_core::dataset::CHURN_LABEL_COLUMN;
use verdict_core::SpamColumns;
use verdict_models::RegistryConfig;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listener and CORS settings
    #[serde(default)]
    pub server: ListenConfig,

    /// Base directory for relative artifact and dataset paths
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,

    /// Models to load
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Historical datasets used to seed statistics
    #[serde(default)]
    pub datasets: DatasetsConfig,

    /// Feedback sink
    #[serde(default)]
    pub feedback: FeedbackConfig,

    /// Statistics settings
    #[serde(default)]
    pub stats: StatsConfig,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides, then resolve
    /// relative paths against the artifacts directory
    pub fn load(config_path: &Path, cli: &Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config: Self = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        // Apply CLI overrides
        if let Some(listen) = &cli.listen {
            config.server.listen = listen.clone();
        }

        if let Some(port) = cli.port {
            config.server.port = port;
        }

        if let Some(dir) = &cli.artifacts_dir {
            config.artifacts_dir = dir.clone();
        }

        config.resolve_paths();
        Ok(config)
    }

    /// Join every relative path onto `artifacts_dir`
    pub fn resolve_paths(&mut self) {
        let base = self.artifacts_dir.clone();
        self.registry.resolve_paths(&base);
        self.datasets.spam.path = base.join(&self.datasets.spam.path);
        self.datasets.churn.path = base.join(&self.datasets.churn.path);
        self.feedback.path = base.join(&self.feedback.path);
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: ListenConfig::default(),
            artifacts_dir: default_artifacts_dir(),
            registry: RegistryConfig::default(),
            datasets: DatasetsConfig::default(),
            feedback: FeedbackConfig::default(),
            stats: StatsConfig::default(),
        }
    }
}

/// Listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by CORS
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

/// Dataset locations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetsConfig {
    #[serde(default)]
    pub spam: SpamDatasetConfig,

    #[serde(default)]
    pub churn: ChurnDatasetConfig,
}

/// Spam dataset location and column contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpamDatasetConfig {
    #[serde(default = "default_spam_path")]
    pub path: PathBuf,

    #[serde(default = "default_text_column")]
    pub text_column: String,

    #[serde(default = "default_label_column")]
    pub label_column: String,

    /// Number of most recent spam messages seeding the word table
    #[serde(default = "default_seed_sample")]
    pub seed_sample: usize,
}

impl SpamDatasetConfig {
    pub fn columns(&self) -> SpamColumns {
        SpamColumns {
            text: self.text_column.clone(),
            label: self.label_column.clone(),
        }
    }
}

impl Default for SpamDatasetConfig {
    fn default() -> Self {
        Self {
            path: default_spam_path(),
            text_column: default_text_column(),
            label_column: default_label_column(),
            seed_sample: default_seed_sample(),
        }
    }
}

/// Churn dataset location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnDatasetConfig {
    #[serde(default = "default_churn_path")]
    pub path: PathBuf,

    #[serde(default = "default_churn_label_column")]
    pub label_column: String,
}

impl Default for ChurnDatasetConfig {
    fn default() -> Self {
        Self {
            path: default_churn_path(),
            label_column: default_churn_label_column(),
        }
    }
}

/// Feedback sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    #[serde(default = "default_spam_path")]
    pub path: PathBuf,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            path: default_spam_path(),
        }
    }
}

/// Statistics settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default = "default_top_words")]
    pub top_words: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            top_words: default_top_words(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:3001".to_string(),
    ]
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("./artifacts")
}

fn default_spam_path() -> PathBuf {
    PathBuf::from("spam/spam_emails_data.csv")
}

fn default_churn_path() -> PathBuf {
    PathBuf::from("churn/customer_churn_large_dataset.csv")
}

fn default_text_column() -> String {
    SpamColumns::default().text
}

fn default_label_column() -> String {
    SpamColumns::default().label
}

fn default_churn_label_column() -> String {
    CHURN_LABEL_COLUMN.to_string()
}

fn default_seed_sample() -> usize {
    200
}

fn default_top_words() -> usize {
    DEFAULT_TOP_WORDS
}
