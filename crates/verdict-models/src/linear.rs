//! Linear models: SVM with optional Platt calibration, logistic regression

use crate::classifier::{
    check_binary, positive_targets, single_row, training_records, Classifier,
    ProbabilisticClassifier,
};
use linfa::dataset::Pr;
use linfa::prelude::*;
use linfa_logistic::FittedLogisticRegression;
use linfa_svm::Svm;
use ndarray::{Array1, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::debug;
use verdict_core::{Error, Result, NEGATIVE_CLASS, POSITIVE_CLASS};

fn class_of(positive: bool) -> usize {
    if positive {
        POSITIVE_CLASS
    } else {
        NEGATIVE_CLASS
    }
}

fn first<T: Copy>(model: &str, values: &Array1<T>) -> Result<T> {
    values
        .first()
        .copied()
        .ok_or_else(|| Error::internal(format!("{} returned no prediction", model)))
}

/// Hyperparameters for [`LinearSvm::fit`]
#[derive(Debug, Clone)]
pub struct LinearSvmParams {
    /// Penalty on margin violations, applied to both classes
    pub c: f64,
    /// Fit Platt scaling after training
    pub calibrate: bool,
}

impl Default for LinearSvmParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            calibrate: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "output", rename_all = "snake_case")]
enum SvmModel {
    /// Platt-calibrated; predicts the positive-class probability
    Probability { svm: Svm<f64, Pr> },
    /// Predicts the side of the hyperplane only
    Label { svm: Svm<f64, bool> },
}

/// Linear-kernel support vector machine.
///
/// Calibrated models predict the positive class when its probability
/// exceeds 0.5 and are loaded as probabilistic; uncalibrated ones are
/// label-only.
#[derive(Debug, Serialize, Deserialize)]
pub struct LinearSvm {
    n_features: usize,
    model: SvmModel,
}

impl LinearSvm {
    pub fn validate(&self) -> Result<()> {
        if self.n_features == 0 {
            return Err(Error::artifact("linear_svm has no features"));
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn is_calibrated(&self) -> bool {
        matches!(self.model, SvmModel::Probability { .. })
    }

    /// Fit with linfa's SMO solver on a linear kernel
    pub fn fit(rows: &[Vec<f64>], labels: &[usize], params: &LinearSvmParams) -> Result<Self> {
        let records = training_records(rows, labels)?;
        check_binary(labels)?;
        if params.c <= 0.0 {
            return Err(Error::training("C must be positive"));
        }

        let n_features = records.ncols();
        let dataset = Dataset::new(records, positive_targets(labels));

        let model = if params.calibrate {
            let svm = Svm::<f64, Pr>::params()
                .pos_neg_weights(params.c, params.c)
                .linear_kernel()
                .fit(&dataset)
                .map_err(|e| Error::training(format!("linear_svm: {}", e)))?;
            SvmModel::Probability { svm }
        } else {
            let svm = Svm::<f64, bool>::params()
                .pos_neg_weights(params.c, params.c)
                .linear_kernel()
                .fit(&dataset)
                .map_err(|e| Error::training(format!("linear_svm: {}", e)))?;
            SvmModel::Label { svm }
        };

        debug!(
            "Fitted linear SVM on {} rows x {} features (calibrated: {})",
            rows.len(),
            n_features,
            params.calibrate
        );
        Ok(Self { n_features, model })
    }

    fn positive_probability(svm: &Svm<f64, Pr>, x: &ArrayView2<f64>) -> Result<f64> {
        let predicted: Array1<Pr> = svm.predict(x);
        Ok(f64::from(*first("linear_svm", &predicted)?))
    }
}

impl Classifier<[f64]> for LinearSvm {
    fn predict(&self, input: &[f64]) -> Result<usize> {
        let x = single_row("linear_svm", self.n_features, input)?;
        let positive = match &self.model {
            SvmModel::Probability { svm } => Self::positive_probability(svm, &x)? > 0.5,
            SvmModel::Label { svm } => {
                let predicted: Array1<bool> = svm.predict(&x);
                first("linear_svm", &predicted)?
            }
        };
        Ok(class_of(positive))
    }

    fn name(&self) -> &str {
        "linear_svm"
    }
}

impl ProbabilisticClassifier<[f64]> for LinearSvm {
    fn predict_proba(&self, input: &[f64]) -> Result<Vec<f64>> {
        let x = single_row("linear_svm", self.n_features, input)?;
        match &self.model {
            SvmModel::Probability { svm } => {
                let p1 = Self::positive_probability(svm, &x)?;
                Ok(vec![1.0 - p1, p1])
            }
            SvmModel::Label { .. } => Err(Error::internal("linear_svm has no calibration")),
        }
    }
}

/// Hyperparameters for [`LogisticRegression::fit`]
#[derive(Debug, Clone)]
pub struct LogisticRegressionParams {
    /// Inverse L2 penalty
    pub c: f64,
    pub max_iter: u64,
    /// Stop once the gradient norm falls below this
    pub tolerance: f64,
}

impl Default for LogisticRegressionParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            tolerance: 1e-6,
        }
    }
}

/// Binary logistic regression
#[derive(Debug, Serialize, Deserialize)]
pub struct LogisticRegression {
    n_features: usize,
    model: FittedLogisticRegression<f64, usize>,
}

impl LogisticRegression {
    pub fn validate(&self) -> Result<()> {
        if self.n_features == 0 {
            return Err(Error::artifact("logistic_regression has no features"));
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Fit with linfa's L-BFGS solver; the intercept is not penalized
    pub fn fit(
        rows: &[Vec<f64>],
        labels: &[usize],
        params: &LogisticRegressionParams,
    ) -> Result<Self> {
        let records = training_records(rows, labels)?;
        check_binary(labels)?;
        if params.c <= 0.0 {
            return Err(Error::training("C must be positive"));
        }

        let n_features = records.ncols();
        let dataset = Dataset::new(records, Array1::from(labels.to_vec()));
        let model = linfa_logistic::LogisticRegression::default()
            .alpha(1.0 / params.c)
            .max_iterations(params.max_iter)
            .gradient_tolerance(params.tolerance)
            .fit(&dataset)
            .map_err(|e| Error::training(format!("logistic_regression: {}", e)))?;

        debug!(
            "Fitted logistic regression on {} rows x {} features",
            rows.len(),
            n_features
        );
        Ok(Self { n_features, model })
    }

    /// Predicted class and the probability of the positive class.
    ///
    /// linfa reports the probability of whichever class it fitted as
    /// positive, and predicts that class at 0.5 or above.
    fn label_and_p1(&self, input: &[f64]) -> Result<(usize, f64)> {
        let x = single_row("logistic_regression", self.n_features, input)?;
        let predicted: Array1<usize> = self.model.predict(&x);
        let label = first("logistic_regression", &predicted)?;
        let p = first("logistic_regression", &self.model.predict_probabilities(&x))?;

        let confidence = if p >= 0.5 { p } else { 1.0 - p };
        let p1 = if label == POSITIVE_CLASS {
            confidence
        } else {
            1.0 - confidence
        };
        Ok((label, p1))
    }
}

impl Classifier<[f64]> for LogisticRegression {
    fn predict(&self, input: &[f64]) -> Result<usize> {
        Ok(self.label_and_p1(input)?.0)
    }

    fn name(&self) -> &str {
        "logistic_regression"
    }
}

impl ProbabilisticClassifier<[f64]> for LogisticRegression {
    fn predict_proba(&self, input: &[f64]) -> Result<Vec<f64>> {
        let (_, p1) = self.label_and_p1(input)?;
        Ok(vec![1.0 - p1, p1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two well separated clusters along the first feature
    fn separable() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            let jitter = (i % 5) as f64 * 0.05;
            rows.push(vec![1.0 + jitter, 0.2 + jitter]);
            labels.push(1);
            rows.push(vec![-1.0 - jitter, 0.2 - jitter]);
            labels.push(0);
        }
        (rows, labels)
    }

    #[test]
    fn test_svm_fit_separable() {
        let (rows, labels) = separable();
        let svm = LinearSvm::fit(&rows, &labels, &LinearSvmParams::default()).unwrap();
        assert!(svm.is_calibrated());

        for (row, label) in rows.iter().zip(&labels) {
            assert_eq!(svm.predict(row).unwrap(), *label);
        }

        let proba = svm.predict_proba(&[1.2, 0.2]).unwrap();
        assert!(proba[1] > 0.5);
        assert!((proba[0] + proba[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_uncalibrated_svm_is_label_only() {
        let (rows, labels) = separable();
        let params = LinearSvmParams {
            calibrate: false,
            ..Default::default()
        };
        let svm = LinearSvm::fit(&rows, &labels, &params).unwrap();

        assert!(!svm.is_calibrated());
        assert_eq!(svm.predict(&[1.2, 0.2]).unwrap(), 1);
        assert_eq!(svm.predict(&[-1.2, 0.2]).unwrap(), 0);
        assert!(svm.predict_proba(&[1.2, 0.2]).is_err());
    }

    #[test]
    fn test_wrong_width_is_invalid_input() {
        let (rows, labels) = separable();
        let svm = LinearSvm::fit(&rows, &labels, &LinearSvmParams::default()).unwrap();
        assert!(matches!(svm.predict(&[1.0]), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_fit_rejects_single_class() {
        let rows = vec![vec![1.0], vec![2.0]];
        assert!(LinearSvm::fit(&rows, &[1, 1], &LinearSvmParams::default()).is_err());
        assert!(LogisticRegression::fit(&rows, &[0, 0], &Default::default()).is_err());
    }

    #[test]
    fn test_logistic_fit_separable() {
        let (rows, labels) = separable();
        let lr = LogisticRegression::fit(&rows, &labels, &Default::default()).unwrap();

        for (row, label) in rows.iter().zip(&labels) {
            assert_eq!(lr.predict(row).unwrap(), *label);
        }
        let proba = lr.predict_proba(&[-1.2, 0.2]).unwrap();
        assert!(proba[0] > 0.5);
        assert!((proba[0] + proba[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_serde_keeps_calibration() {
        let (rows, labels) = separable();
        let svm = LinearSvm::fit(&rows, &labels, &LinearSvmParams::default()).unwrap();
        let json = serde_json::to_string(&svm).unwrap();
        assert!(json.contains("\"output\":\"probability\""));

        let back: LinearSvm = serde_json::from_str(&json).unwrap();
        assert!(back.is_calibrated());
        assert_eq!(back.predict(&[1.2, 0.2]).unwrap(), svm.predict(&[1.2, 0.2]).unwrap());
    }
}
