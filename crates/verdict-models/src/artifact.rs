//! Serialized model artifacts
//!
//! Classifier artifacts are JSON objects internally tagged by `"kind"`.
//! Whether a loaded classifier emits probabilities is decided here, once,
//! from the artifact contents.

use crate::classifier::Model;
use crate::encoder::ColumnEncoder;
use crate::forest::RandomForest;
use crate::linear::{LinearSvm, LogisticRegression};
use crate::naive_bayes::MultinomialNb;
use crate::pipeline::Pipeline;
use crate::preprocessor::Preprocessor;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use verdict_core::{CustomerRecord, Error, Result};

/// A fitted classifier over dense feature rows
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    LinearSvm(LinearSvm),
    LogisticRegression(LogisticRegression),
    MultinomialNb(MultinomialNb),
    RandomForest(RandomForest),
}

impl ClassifierArtifact {
    /// Check internal consistency of the fitted parameters
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::LinearSvm(m) => m.validate(),
            Self::LogisticRegression(m) => m.validate(),
            Self::MultinomialNb(m) => m.validate(),
            Self::RandomForest(m) => m.validate(),
        }
    }

    /// Width of the feature rows the classifier expects
    pub fn n_features(&self) -> usize {
        match self {
            Self::LinearSvm(m) => m.n_features(),
            Self::LogisticRegression(m) => m.n_features(),
            Self::MultinomialNb(m) => m.n_features(),
            Self::RandomForest(m) => m.n_features(),
        }
    }

    /// Validate and resolve the capability variant.
    ///
    /// An uncalibrated linear SVM is label-only; everything else emits
    /// probabilities.
    pub fn into_model(self) -> Result<Model<[f64]>> {
        self.validate()?;
        Ok(match self {
            Self::LinearSvm(m) if !m.is_calibrated() => Model::LabelOnly(Arc::new(m)),
            Self::LinearSvm(m) => Model::Probabilistic(Arc::new(m)),
            Self::LogisticRegression(m) => Model::Probabilistic(Arc::new(m)),
            Self::MultinomialNb(m) => Model::Probabilistic(Arc::new(m)),
            Self::RandomForest(m) => Model::Probabilistic(Arc::new(m)),
        })
    }
}

impl From<LinearSvm> for ClassifierArtifact {
    fn from(m: LinearSvm) -> Self {
        Self::LinearSvm(m)
    }
}

impl From<LogisticRegression> for ClassifierArtifact {
    fn from(m: LogisticRegression) -> Self {
        Self::LogisticRegression(m)
    }
}

impl From<MultinomialNb> for ClassifierArtifact {
    fn from(m: MultinomialNb) -> Self {
        Self::MultinomialNb(m)
    }
}

impl From<RandomForest> for ClassifierArtifact {
    fn from(m: RandomForest) -> Self {
        Self::RandomForest(m)
    }
}

/// A column encoder and the classifier fitted on its output
#[derive(Debug, Serialize, Deserialize)]
pub struct PipelineArtifact {
    pub encoder: ColumnEncoder,
    pub classifier: ClassifierArtifact,
}

impl PipelineArtifact {
    /// Validate both halves and compose them
    pub fn into_pipeline(self) -> Result<Pipeline<CustomerRecord>> {
        self.encoder.validate()?;
        if self.classifier.n_features() != self.encoder.n_features() {
            return Err(Error::artifact(format!(
                "encoder produces {} features but classifier expects {}",
                self.encoder.n_features(),
                self.classifier.n_features()
            )));
        }
        let model = self.classifier.into_model()?;
        Ok(Pipeline::new(Arc::new(self.encoder), model))
    }
}

/// Read a JSON artifact
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| Error::artifact(format!("cannot open {}: {}", path.display(), e)))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| Error::artifact(format!("cannot parse {}: {}", path.display(), e)))
}

/// Write a JSON artifact, creating parent directories
pub fn save_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}
