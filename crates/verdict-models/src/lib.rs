//! Verdict Models
//!
//! Classifiers, preprocessors and the model registry behind the Verdict
//! prediction service.
//!
//! Models are fitted offline, written as JSON artifacts, and loaded once at
//! startup:
//! - Text models: a classifier over TF-IDF rows paired with its vectorizer
//! - Tabular models: a pipeline embedding its own column encoder
//!
//! Fitting and inference go through linfa; this crate wraps the fitted
//! linfa models behind the capability traits in [`classifier`]. All
//! inference is synchronous and runs on CPU.

pub mod artifact;
pub mod classifier;
pub mod config;
pub mod encoder;
pub mod forest;
pub mod linear;
pub mod naive_bayes;
pub mod pipeline;
pub mod preprocessor;
pub mod registry;
pub mod vectorizer;

pub use artifact::{load_json, save_json, ClassifierArtifact, PipelineArtifact};
pub use classifier::{Classifier, Model, Prediction, ProbabilisticClassifier};
pub use config::{ModelSourceSpec, ModelSpec, RegistryConfig};
pub use encoder::ColumnEncoder;
pub use forest::{RandomForest, RandomForestParams};
pub use linear::{LinearSvm, LinearSvmParams, LogisticRegression, LogisticRegressionParams};
pub use naive_bayes::{MultinomialNb, MultinomialNbParams};
pub use pipeline::Pipeline;
pub use preprocessor::Preprocessor;
pub use registry::{init_registry_from_config, ModelEntry, ModelRegistry};
pub use vectorizer::TfidfVectorizer;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{Classifier, Model, Prediction, ProbabilisticClassifier};
    pub use crate::preprocessor::Preprocessor;
    pub use crate::registry::{ModelEntry, ModelRegistry};
}
