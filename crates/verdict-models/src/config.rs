//! Configuration for the model registry

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which models to load and which key requests fall back to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Key substituted for unknown or absent spam model keys
    #[serde(default = "default_model_key")]
    pub default_model: String,

    /// Models to load, in order
    #[serde(default = "default_models")]
    pub models: Vec<ModelSpec>,
}

/// One configured model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Registry key
    pub key: String,

    /// Artifact locations
    #[serde(flatten)]
    pub source: ModelSourceSpec,
}

/// Artifact locations of a model (for config files)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelSourceSpec {
    /// Classifier over TF-IDF rows plus its vectorizer. `model` lists
    /// candidate files; the first that exists is loaded.
    Text {
        model: Vec<PathBuf>,
        vectorizer: PathBuf,
    },

    /// Self-contained pipeline over customer records
    Pipeline { path: PathBuf },
}

impl ModelSpec {
    /// Text model spec
    pub fn text(key: &str, model: &[&str], vectorizer: &str) -> Self {
        Self {
            key: key.to_string(),
            source: ModelSourceSpec::Text {
                model: model.iter().map(PathBuf::from).collect(),
                vectorizer: PathBuf::from(vectorizer),
            },
        }
    }

    /// Pipeline model spec
    pub fn pipeline(key: &str, path: &str) -> Self {
        Self {
            key: key.to_string(),
            source: ModelSourceSpec::Pipeline {
                path: PathBuf::from(path),
            },
        }
    }

    /// Resolve relative paths against `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        match &mut self.source {
            ModelSourceSpec::Text { model, vectorizer } => {
                for path in model.iter_mut() {
                    *path = base.join(&*path);
                }
                *vectorizer = base.join(&*vectorizer);
            }
            ModelSourceSpec::Pipeline { path } => *path = base.join(&*path),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_model: default_model_key(),
            models: default_models(),
        }
    }
}

impl RegistryConfig {
    /// Resolve every relative artifact path against `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        for spec in &mut self.models {
            spec.resolve_paths(base);
        }
    }
}

fn default_model_key() -> String {
    "svc".to_string()
}

fn default_models() -> Vec<ModelSpec> {
    const VECTORIZER: &str = "spam/vectorizer.json";
    vec![
        ModelSpec::text("svc", &["spam/model_svc.json", "spam/model.json"], VECTORIZER),
        ModelSpec::text("nb", &["spam/model_nb.json"], VECTORIZER),
        ModelSpec::text("rf", &["spam/model_rf.json"], VECTORIZER),
        ModelSpec::pipeline("churn_rf", "churn/churn_model_rf.json"),
        ModelSpec::pipeline("churn_lr", "churn/churn_model_lr.json"),
    ]
}
