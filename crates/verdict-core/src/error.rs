//! Error types for Verdict

/// Result type alias using Verdict's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for Verdict operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No loaded model resolves for the given key
    #[error("Model {0} not loaded")]
    ModelUnavailable(String),

    /// Artifact loading or shape errors
    #[error("artifact error: {0}")]
    Artifact(String),

    /// Input does not match what a model expects
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Dataset parsing errors
    #[error("dataset error: {0}")]
    Dataset(String),

    /// Model fitting errors
    #[error("training error: {0}")]
    Training(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV read/write errors
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new model-unavailable error naming the key
    pub fn model_unavailable(key: impl Into<String>) -> Self {
        Self::ModelUnavailable(key.into())
    }

    /// Create a new artifact error
    pub fn artifact(msg: impl Into<String>) -> Self {
        Self::Artifact(msg.into())
    }

    /// Create a new invalid-input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new dataset error
    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    /// Create a new training error
    pub fn training(msg: impl Into<String>) -> Self {
        Self::Training(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
