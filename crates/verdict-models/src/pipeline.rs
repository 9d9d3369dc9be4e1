//! Preprocessor + classifier composition

use crate::classifier::{Classifier, Model, ProbabilisticClassifier};
use crate::preprocessor::Preprocessor;
use std::sync::Arc;
use verdict_core::{Error, Result};

/// A classifier over raw inputs: the preprocessor turns each input into a
/// feature row, then the inner model classifies it.
pub struct Pipeline<I: ?Sized> {
    name: String,
    preprocessor: Arc<dyn Preprocessor<I>>,
    model: Model<[f64]>,
}

impl<I: ?Sized> Pipeline<I> {
    /// Create a new pipeline
    pub fn new(preprocessor: Arc<dyn Preprocessor<I>>, model: Model<[f64]>) -> Self {
        Self {
            name: format!("pipeline({})", model.name()),
            preprocessor,
            model,
        }
    }

    /// Inner model operating on feature rows
    pub fn model(&self) -> &Model<[f64]> {
        &self.model
    }

    fn features(&self, input: &I) -> Result<Vec<f64>> {
        self.preprocessor.transform(input)
    }
}

impl<I: ?Sized + 'static> Pipeline<I> {
    /// Wrap as a loaded model with the inner model's capability
    pub fn into_model(self) -> Model<I> {
        if self.model.emits_probabilities() {
            Model::Probabilistic(Arc::new(self))
        } else {
            Model::LabelOnly(Arc::new(self))
        }
    }
}

impl<I: ?Sized> Classifier<I> for Pipeline<I> {
    fn predict(&self, input: &I) -> Result<usize> {
        self.model.predict(&self.features(input)?)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<I: ?Sized> ProbabilisticClassifier<I> for Pipeline<I> {
    fn predict_proba(&self, input: &I) -> Result<Vec<f64>> {
        match &self.model {
            Model::Probabilistic(c) => c.predict_proba(&self.features(input)?),
            Model::LabelOnly(c) => Err(Error::internal(format!(
                "{} does not emit probabilities",
                c.name()
            ))),
        }
    }
}
