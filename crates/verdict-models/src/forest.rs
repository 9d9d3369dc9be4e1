//! Random forest of bagged CART decision trees

use crate::classifier::{argmax, single_row, training_records, Classifier, ProbabilisticClassifier};
use linfa::prelude::*;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;
use verdict_core::{Error, Result};

/// Hyperparameters for [`RandomForest::fit`]
#[derive(Debug, Clone)]
pub struct RandomForestParams {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Tree `i` draws its bootstrap sample from `seed + i`
    pub seed: u64,
}

impl Default for RandomForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

/// Bagged ensemble of Gini trees; probabilities are vote fractions.
#[derive(Debug, Serialize, Deserialize)]
pub struct RandomForest {
    n_classes: usize,
    n_features: usize,
    trees: Vec<DecisionTree<f64, usize>>,
}

impl RandomForest {
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(Error::artifact("random_forest has no trees"));
        }
        if self.n_classes == 0 {
            return Err(Error::artifact("random_forest has no classes"));
        }
        if self.n_features == 0 {
            return Err(Error::artifact("random_forest has no features"));
        }
        Ok(())
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Grow trees in parallel, each on its own bootstrap sample
    pub fn fit(rows: &[Vec<f64>], labels: &[usize], params: &RandomForestParams) -> Result<Self> {
        let records = training_records(rows, labels)?;
        if params.n_trees == 0 {
            return Err(Error::training("random forest needs at least one tree"));
        }
        let n_features = records.ncols();
        if n_features == 0 {
            return Err(Error::training("random forest needs at least one feature"));
        }

        let n_classes = labels.iter().max().map_or(0, |m| m + 1);
        let targets = Array1::from(labels.to_vec());
        let n = rows.len();

        let trees: Vec<DecisionTree<f64, usize>> = (0..params.n_trees)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(i as u64));
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                let sample = Dataset::new(
                    records.select(Axis(0), &bootstrap),
                    targets.select(Axis(0), &bootstrap),
                );

                DecisionTree::params()
                    .split_quality(SplitQuality::Gini)
                    .max_depth(params.max_depth)
                    .min_weight_split(params.min_samples_split.max(2) as f32)
                    .fit(&sample)
                    .map_err(|e| Error::training(format!("random_forest tree {}: {}", i, e)))
            })
            .collect::<Result<_>>()?;

        debug!(
            "Fitted random forest of {} trees on {} rows x {} features",
            trees.len(),
            n,
            n_features
        );

        Ok(Self {
            n_classes,
            n_features,
            trees,
        })
    }
}

impl Classifier<[f64]> for RandomForest {
    fn predict(&self, input: &[f64]) -> Result<usize> {
        Ok(argmax(&self.predict_proba(input)?))
    }

    fn name(&self) -> &str {
        "random_forest"
    }
}

impl ProbabilisticClassifier<[f64]> for RandomForest {
    fn predict_proba(&self, input: &[f64]) -> Result<Vec<f64>> {
        let x = single_row("random_forest", self.n_features, input)?;

        let mut votes = vec![0.0; self.n_classes];
        for tree in &self.trees {
            let predicted: Array1<usize> = tree.predict(&x);
            for class in predicted.iter() {
                let slot = votes.get_mut(*class).ok_or_else(|| {
                    Error::internal(format!("random_forest tree voted for unknown class {}", class))
                })?;
                *slot += 1.0;
            }
        }

        let n_trees = self.trees.len() as f64;
        Ok(votes.into_iter().map(|v| v / n_trees).collect())
    }
}
