//! Model registry initialization and lookup

use crate::artifact::{load_json, ClassifierArtifact, PipelineArtifact};
use crate::classifier::Model;
use crate::config::{ModelSourceSpec, RegistryConfig};
use crate::preprocessor::Preprocessor;
use crate::vectorizer::TfidfVectorizer;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use verdict_core::{CustomerRecord, Error, Result};

/// A loaded model and whatever it needs to consume raw input
#[derive(Clone)]
pub enum ModelEntry {
    /// Classifier over TF-IDF rows plus the vectorizer that produces them
    Text {
        classifier: Model<[f64]>,
        vectorizer: Arc<dyn Preprocessor<str>>,
    },

    /// Pipeline that encodes customer records itself
    Tabular { classifier: Model<CustomerRecord> },
}

impl ModelEntry {
    /// Whether this entry consumes text
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text { .. })
    }

    /// Name of the underlying classifier
    pub fn classifier_name(&self) -> &str {
        match self {
            Self::Text { classifier, .. } => classifier.name(),
            Self::Tabular { classifier } => classifier.name(),
        }
    }
}

impl std::fmt::Debug for ModelEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text { classifier, vectorizer } => f
                .debug_struct("Text")
                .field("classifier", classifier)
                .field("n_features", &vectorizer.n_features())
                .finish(),
            Self::Tabular { classifier } => {
                f.debug_struct("Tabular").field("classifier", classifier).finish()
            }
        }
    }
}

/// Registry of loaded models by key.
///
/// Populated at startup, then shared read-only. Lookups for keys that are
/// not loaded substitute the configured default key.
pub struct ModelRegistry {
    entries: HashMap<String, Arc<ModelEntry>>,
    default_key: String,
}

impl ModelRegistry {
    /// Create an empty registry
    pub fn new(default_key: impl Into<String>) -> Self {
        Self {
            entries: HashMap::new(),
            default_key: default_key.into(),
        }
    }

    /// Key substituted for unknown requests
    pub fn default_key(&self) -> &str {
        &self.default_key
    }

    /// Register an entry, replacing any previous one under the key
    pub fn insert(&mut self, key: impl Into<String>, entry: ModelEntry) {
        self.entries.insert(key.into(), Arc::new(entry));
    }

    /// Load a text model and its vectorizer.
    ///
    /// `model_paths` are tried in order and the first existing file is
    /// used. Failures are logged and reported as `false`.
    pub fn load(&mut self, key: &str, model_paths: &[PathBuf], vectorizer_path: &Path) -> bool {
        match load_text_entry(model_paths, vectorizer_path) {
            Ok(entry) => {
                debug!("Registered text model {} ({})", key, entry.classifier_name());
                self.insert(key, entry);
                true
            }
            Err(e) => {
                warn!("Failed to load model {}: {}", key, e);
                false
            }
        }
    }

    /// Load a customer-record pipeline.
    ///
    /// Pipelines that cannot emit probabilities are rejected. Failures are
    /// logged and reported as `false`.
    pub fn load_pipeline(&mut self, key: &str, path: &Path) -> bool {
        match load_tabular_entry(path) {
            Ok(entry) => {
                debug!("Registered pipeline {} ({})", key, entry.classifier_name());
                self.insert(key, entry);
                true
            }
            Err(e) => {
                warn!("Failed to load pipeline {}: {}", key, e);
                false
            }
        }
    }

    /// The key `get` would use for a request
    pub fn resolve_key<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        match requested {
            Some(key) if self.entries.contains_key(key) => key,
            _ => &self.default_key,
        }
    }

    /// Look up an entry, substituting the default key for unknown keys
    pub fn get(&self, requested: Option<&str>) -> Option<Arc<ModelEntry>> {
        self.entries.get(self.resolve_key(requested)).cloned()
    }

    /// Look up an entry without default substitution
    pub fn get_exact(&self, key: &str) -> Option<Arc<ModelEntry>> {
        self.entries.get(key).cloned()
    }

    /// Resolve a text model: the requested key when it is a loaded text
    /// entry, else the default key when that is one.
    pub fn resolve_text(&self, requested: Option<&str>) -> Result<(String, Arc<ModelEntry>)> {
        let text_entry = |key: &str| self.entries.get(key).filter(|e| e.is_text()).cloned();

        if let Some(key) = requested {
            if let Some(entry) = text_entry(key) {
                return Ok((key.to_string(), entry));
            }
        }

        text_entry(&self.default_key)
            .map(|entry| (self.default_key.clone(), entry))
            .ok_or_else(|| Error::model_unavailable(self.default_key.as_str()))
    }

    /// Check if a key is loaded
    pub fn has_model(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Loaded keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of loaded entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is loaded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn load_text_entry(model_paths: &[PathBuf], vectorizer_path: &Path) -> Result<ModelEntry> {
    let model_path = model_paths.iter().find(|p| p.exists()).ok_or_else(|| {
        let tried: Vec<String> = model_paths.iter().map(|p| p.display().to_string()).collect();
        Error::artifact(format!("no model file found (tried {})", tried.join(", ")))
    })?;

    let artifact: ClassifierArtifact = load_json(model_path)?;
    let vectorizer: TfidfVectorizer = load_json(vectorizer_path)?;

    if artifact.n_features() != vectorizer.n_features() {
        warn!(
            "Model {} expects {} features but vectorizer {} produces {}",
            model_path.display(),
            artifact.n_features(),
            vectorizer_path.display(),
            vectorizer.n_features()
        );
    }

    Ok(ModelEntry::Text {
        classifier: artifact.into_model()?,
        vectorizer: Arc::new(vectorizer),
    })
}

fn load_tabular_entry(path: &Path) -> Result<ModelEntry> {
    let artifact: PipelineArtifact = load_json(path)?;
    let classifier = artifact.into_pipeline()?.into_model();

    if !classifier.emits_probabilities() {
        return Err(Error::artifact(format!(
            "pipeline {} does not emit probabilities",
            path.display()
        )));
    }

    Ok(ModelEntry::Tabular { classifier })
}

/// Initialize the model registry from configuration.
///
/// Each model loads independently; a failure leaves only that key absent.
pub fn init_registry_from_config(config: &RegistryConfig) -> ModelRegistry {
    let mut registry = ModelRegistry::new(config.default_model.clone());

    info!("Initializing model registry with {} models", config.models.len());

    for spec in &config.models {
        let loaded = match &spec.source {
            ModelSourceSpec::Text { model, vectorizer } => {
                registry.load(&spec.key, model, vectorizer)
            }
            ModelSourceSpec::Pipeline { path } => registry.load_pipeline(&spec.key, path),
        };

        if loaded {
            info!("✓ Loaded model: {}", spec.key);
        } else {
            // Continue with other models rather than failing completely
            warn!("✗ Model {} unavailable", spec.key);
        }
    }

    if !registry.has_model(&config.default_model) {
        warn!(
            "Default model {} is not loaded; requests without a valid model key will fail",
            config.default_model
        );
    }

    info!(
        "Model registry initialized with {}/{} models",
        registry.len(),
        config.models.len()
    );

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;

    struct AlwaysHam;

    impl Classifier<[f64]> for AlwaysHam {
        fn predict(&self, _input: &[f64]) -> Result<usize> {
            Ok(0)
        }

        fn name(&self) -> &str {
            "always_ham"
        }
    }

    fn text_entry() -> ModelEntry {
        let vectorizer = TfidfVectorizer::fit(&["free money", "team meeting"], None).unwrap();
        ModelEntry::Text {
            classifier: Model::LabelOnly(Arc::new(AlwaysHam)),
            vectorizer: Arc::new(vectorizer),
        }
    }

    #[test]
    fn test_get_falls_back_to_default() {
        let mut registry = ModelRegistry::new("svc");
        registry.insert("svc", text_entry());

        assert_eq!(registry.resolve_key(Some("nope")), "svc");
        assert_eq!(registry.resolve_key(None), "svc");
        assert!(registry.get(Some("nope")).is_some());
        assert!(registry.get_exact("nope").is_none());
    }

    #[test]
    fn test_get_none_without_default() {
        let mut registry = ModelRegistry::new("svc");
        registry.insert("nb", text_entry());

        assert!(registry.get(Some("nb")).is_some());
        assert!(registry.get(Some("rf")).is_none());
        assert!(registry.get(None).is_none());
    }

    #[test]
    fn test_resolve_text_names_default_key() {
        let registry = ModelRegistry::new("svc");
        let err = registry.resolve_text(Some("unknown")).unwrap_err();
        assert_eq!(err.to_string(), "Model svc not loaded");
    }

    #[test]
    fn test_keys_sorted() {
        let mut registry = ModelRegistry::new("svc");
        registry.insert("svc", text_entry());
        registry.insert("nb", text_entry());
        assert_eq!(registry.keys(), vec!["nb", "svc"]);
    }

    #[test]
    fn test_load_missing_files_returns_false() {
        let mut registry = ModelRegistry::new("svc");
        let loaded = registry.load(
            "svc",
            &[PathBuf::from("/nonexistent/a.json")],
            Path::new("/nonexistent/v.json"),
        );
        assert!(!loaded);
        assert!(registry.is_empty());
        assert!(!registry.load_pipeline("churn_rf", Path::new("/nonexistent/p.json")));
    }
}
