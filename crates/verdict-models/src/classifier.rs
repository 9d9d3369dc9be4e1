//! Classifier capability traits and common types
//!
//! Every fitted model answers "which class?"; some also answer "with what
//! distribution?". The two capabilities are separate traits and a loaded
//! model records which one it has in [`Model`], decided when the artifact
//! is loaded rather than checked per request.

use ndarray::{Array1, Array2, ArrayView2};
use std::sync::Arc;
use verdict_core::{Error, Result, NEGATIVE_CLASS, POSITIVE_CLASS};

/// Label-only capability
pub trait Classifier<X: ?Sized>: Send + Sync {
    /// Predict the class index for one input
    fn predict(&self, input: &X) -> Result<usize>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Label plus per-class probability capability
pub trait ProbabilisticClassifier<X: ?Sized>: Classifier<X> {
    /// Probability of each class for one input; sums to 1
    fn predict_proba(&self, input: &X) -> Result<Vec<f64>>;
}

/// A loaded classifier with its capability resolved
pub enum Model<X: ?Sized> {
    /// Emits labels only; confidence is reported as certain
    LabelOnly(Arc<dyn Classifier<X>>),

    /// Emits labels and class probabilities
    Probabilistic(Arc<dyn ProbabilisticClassifier<X>>),
}

impl<X: ?Sized> Clone for Model<X> {
    fn clone(&self) -> Self {
        match self {
            Self::LabelOnly(c) => Self::LabelOnly(Arc::clone(c)),
            Self::Probabilistic(c) => Self::Probabilistic(Arc::clone(c)),
        }
    }
}

impl<X: ?Sized> std::fmt::Debug for Model<X> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LabelOnly(c) => f.debug_tuple("LabelOnly").field(&c.name()).finish(),
            Self::Probabilistic(c) => f.debug_tuple("Probabilistic").field(&c.name()).finish(),
        }
    }
}

impl<X: ?Sized> Model<X> {
    /// Predict the class index
    pub fn predict(&self, input: &X) -> Result<usize> {
        match self {
            Self::LabelOnly(c) => c.predict(input),
            Self::Probabilistic(c) => c.predict(input),
        }
    }

    /// Predict the class and the probability mass assigned to it.
    ///
    /// Label-only models report a confidence of 1.0.
    pub fn classify(&self, input: &X) -> Result<Prediction> {
        match self {
            Self::LabelOnly(c) => Ok(Prediction::new(c.predict(input)?, 1.0)),
            Self::Probabilistic(c) => {
                let label = c.predict(input)?;
                let proba = c.predict_proba(input)?;
                let confidence = proba.get(label).copied().ok_or_else(|| {
                    Error::internal(format!(
                        "{} predicted class {} but returned {} probabilities",
                        c.name(),
                        label,
                        proba.len()
                    ))
                })?;
                Ok(Prediction::new(label, confidence))
            }
        }
    }

    /// Whether this model emits probabilities
    pub fn emits_probabilities(&self) -> bool {
        matches!(self, Self::Probabilistic(_))
    }

    /// Get the classifier name
    pub fn name(&self) -> &str {
        match self {
            Self::LabelOnly(c) => c.name(),
            Self::Probabilistic(c) => c.name(),
        }
    }
}

/// Result of classifying one input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class index
    pub label: usize,

    /// Probability of the predicted class (0.0-1.0)
    pub confidence: f64,
}

impl Prediction {
    /// Create a new prediction
    pub fn new(label: usize, confidence: f64) -> Self {
        Self { label, confidence }
    }

    /// Confidence scaled to 0-100
    pub fn confidence_percent(&self) -> f64 {
        if self.confidence.is_nan() {
            return 0.0;
        }
        (self.confidence * 100.0).clamp(0.0, 100.0)
    }
}

/// Fail unless a feature row has the expected width
pub fn check_features(model: &str, expected: usize, row: &[f64]) -> Result<()> {
    if row.len() != expected {
        return Err(Error::invalid_input(format!(
            "{} expects {} features, got {}",
            model,
            expected,
            row.len()
        )));
    }
    Ok(())
}

/// Validate a training set and return its feature width
pub(crate) fn check_training_set(rows: &[Vec<f64>], labels: &[usize]) -> Result<usize> {
    if rows.is_empty() {
        return Err(Error::training("training set is empty"));
    }
    if rows.len() != labels.len() {
        return Err(Error::training(format!(
            "{} rows but {} labels",
            rows.len(),
            labels.len()
        )));
    }
    let width = rows[0].len();
    if let Some(i) = rows.iter().position(|r| r.len() != width) {
        return Err(Error::training(format!(
            "row {} has {} features, expected {}",
            i,
            rows[i].len(),
            width
        )));
    }
    Ok(width)
}

/// Stack validated training rows into a records matrix
pub(crate) fn training_records(rows: &[Vec<f64>], labels: &[usize]) -> Result<Array2<f64>> {
    let width = check_training_set(rows, labels)?;
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), width), flat).map_err(|e| Error::training(e.to_string()))
}

/// Fail unless both binary classes are present and no other label is
pub(crate) fn check_binary(labels: &[usize]) -> Result<()> {
    if let Some(other) = labels
        .iter()
        .find(|l| **l != POSITIVE_CLASS && **l != NEGATIVE_CLASS)
    {
        return Err(Error::training(format!("binary model got class label {}", other)));
    }
    if !labels.contains(&POSITIVE_CLASS) || !labels.contains(&NEGATIVE_CLASS) {
        return Err(Error::training("binary model needs both classes present"));
    }
    Ok(())
}

/// Binary targets with `true` for the positive class
pub(crate) fn positive_targets(labels: &[usize]) -> Array1<bool> {
    labels.iter().map(|l| *l == POSITIVE_CLASS).collect()
}

/// View one checked feature row as a single-sample matrix
pub(crate) fn single_row<'a>(model: &str, expected: usize, row: &'a [f64]) -> Result<ArrayView2<'a, f64>> {
    check_features(model, expected, row)?;
    ArrayView2::from_shape((1, row.len()), row).map_err(|e| Error::internal(e.to_string()))
}

/// Index of the largest value; ties go to the lowest index
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}
