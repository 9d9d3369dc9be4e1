//! Multinomial naive Bayes

use crate::classifier::{single_row, training_records, Classifier, ProbabilisticClassifier};
use linfa::prelude::*;
use linfa_bayes::NaiveBayes;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;
use verdict_core::{Error, Result};

/// Hyperparameters for [`MultinomialNb::fit`]
#[derive(Debug, Clone)]
pub struct MultinomialNbParams {
    /// Additive (Laplace) smoothing
    pub alpha: f64,
}

impl Default for MultinomialNbParams {
    fn default() -> Self {
        Self { alpha: 1.0 }
    }
}

/// Multinomial naive Bayes over non-negative feature rows
#[derive(Debug, Serialize, Deserialize)]
pub struct MultinomialNb {
    n_features: usize,
    n_classes: usize,
    model: linfa_bayes::MultinomialNb<f64, usize>,
}

impl MultinomialNb {
    pub fn validate(&self) -> Result<()> {
        if self.n_classes == 0 {
            return Err(Error::artifact("multinomial_nb has no classes"));
        }
        if self.n_features == 0 {
            return Err(Error::artifact("multinomial_nb has no features"));
        }
        Ok(())
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Fit class priors and smoothed per-class feature distributions.
    ///
    /// Classes are `0..=max(label)` and each must have at least one row.
    pub fn fit(rows: &[Vec<f64>], labels: &[usize], params: &MultinomialNbParams) -> Result<Self> {
        let records = training_records(rows, labels)?;
        if params.alpha <= 0.0 {
            return Err(Error::training("alpha must be positive"));
        }
        if records.iter().any(|x| *x < 0.0) {
            return Err(Error::training("multinomial naive Bayes needs non-negative features"));
        }

        let n_classes = labels.iter().max().map_or(0, |m| m + 1);
        if let Some(missing) = (0..n_classes).find(|c| !labels.contains(c)) {
            return Err(Error::training(format!("class {} has no training rows", missing)));
        }

        let n_features = records.ncols();
        let dataset = Dataset::new(records, Array1::from(labels.to_vec()));
        let model = linfa_bayes::MultinomialNb::params()
            .alpha(params.alpha)
            .fit(&dataset)
            .map_err(|e| Error::training(format!("multinomial_nb: {}", e)))?;

        debug!("Fitted multinomial NB on {} rows, {} classes", rows.len(), n_classes);
        Ok(Self {
            n_features,
            n_classes,
            model,
        })
    }
}

impl Classifier<[f64]> for MultinomialNb {
    fn predict(&self, input: &[f64]) -> Result<usize> {
        let x = single_row("multinomial_nb", self.n_features, input)?;
        let predicted: Array1<usize> = self.model.predict(&x);
        predicted
            .first()
            .copied()
            .ok_or_else(|| Error::internal("multinomial_nb returned no prediction"))
    }

    fn name(&self) -> &str {
        "multinomial_nb"
    }
}

impl ProbabilisticClassifier<[f64]> for MultinomialNb {
    /// Columns come back in sorted class order; scatter them by label
    fn predict_proba(&self, input: &[f64]) -> Result<Vec<f64>> {
        let x = single_row("multinomial_nb", self.n_features, input)?;
        let (proba, classes) = self.model.predict_proba(x.view());

        let mut out = vec![0.0; self.n_classes];
        for (column, class) in classes.iter().enumerate() {
            let slot = out.get_mut(**class).ok_or_else(|| {
                Error::internal(format!("multinomial_nb returned unknown class {}", class))
            })?;
            *slot = proba[[0, column]];
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> (Vec<Vec<f64>>, Vec<usize>) {
        // features: [free, money, meeting, agenda]
        let rows = vec![
            vec![2.0, 1.0, 0.0, 0.0],
            vec![1.0, 2.0, 0.0, 0.0],
            vec![0.0, 0.0, 1.0, 2.0],
            vec![0.0, 0.0, 2.0, 1.0],
        ];
        (rows, vec![1, 1, 0, 0])
    }

    #[test]
    fn test_fit_and_predict() {
        let (rows, labels) = corpus();
        let nb = MultinomialNb::fit(&rows, &labels, &Default::default()).unwrap();

        assert_eq!(nb.n_classes(), 2);
        assert_eq!(nb.predict(&[3.0, 0.0, 0.0, 0.0]).unwrap(), 1);
        assert_eq!(nb.predict(&[0.0, 0.0, 0.0, 3.0]).unwrap(), 0);
    }

    #[test]
    fn test_unseen_feature_keeps_both_classes_possible() {
        let (rows, labels) = corpus();
        let nb = MultinomialNb::fit(&rows, &labels, &Default::default()).unwrap();

        // "meeting" never occurs in class 1, smoothing keeps it above zero
        let proba = nb.predict_proba(&[0.0, 0.0, 1.0, 0.0]).unwrap();
        assert!(proba[1] > 0.0);
        assert!(proba[0] > proba[1]);
    }

    #[test]
    fn test_proba_sums_to_one() {
        let (rows, labels) = corpus();
        let nb = MultinomialNb::fit(&rows, &labels, &Default::default()).unwrap();
        let proba = nb.predict_proba(&[5.0, 5.0, 0.0, 0.0]).unwrap();

        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(proba[1] > 0.99);
    }

    #[test]
    fn test_rejects_negative_features() {
        let rows = vec![vec![-1.0], vec![1.0]];
        assert!(MultinomialNb::fit(&rows, &[0, 1], &Default::default()).is_err());
    }

    #[test]
    fn test_rejects_missing_class() {
        let rows = vec![vec![1.0], vec![2.0]];
        assert!(MultinomialNb::fit(&rows, &[0, 2], &Default::default()).is_err());
    }
}
