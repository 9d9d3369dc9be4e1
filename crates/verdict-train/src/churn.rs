//! Churn pipeline training

use crate::split::{accuracy, train_test_split};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use verdict_core::dataset::read_churn_dataset;
use verdict_core::{ChurnRow, CustomerRecord, Error, Result, NEGATIVE_CLASS, POSITIVE_CLASS};
use verdict_models::{
    load_json, save_json, ClassifierArtifact, ColumnEncoder, LogisticRegression,
    LogisticRegressionParams, PipelineArtifact, RandomForest, RandomForestParams,
};

/// Options of `verdict-train churn`
#[derive(Debug, Clone)]
pub struct ChurnTrainOptions {
    pub data: PathBuf,
    pub label_column: String,
    pub artifacts_dir: PathBuf,
    pub test_fraction: f64,
    pub seed: u64,
}

/// Held-out accuracy of each written pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct ChurnReport {
    pub train_rows: usize,
    pub test_rows: usize,
    pub accuracies: Vec<(String, f64)>,
}

fn class_of(row: &ChurnRow) -> usize {
    if row.churned {
        POSITIVE_CLASS
    } else {
        NEGATIVE_CLASS
    }
}

/// Fit the encoder on the training split, then a random-forest and a
/// logistic-regression pipeline on its output.
pub fn train_churn(options: &ChurnTrainOptions) -> Result<ChurnReport> {
    let rows = read_churn_dataset(&options.data, &options.label_column)?;
    if rows.is_empty() {
        return Err(Error::training(format!("no rows in {}", options.data.display())));
    }

    let (train, test) = train_test_split(rows, options.test_fraction, options.seed);
    info!("Churn split: {} train, {} test", train.len(), test.len());

    let records: Vec<&CustomerRecord> = train.iter().map(|row| &row.record).collect();
    let encoder = ColumnEncoder::fit(&records)?;

    let features: Vec<Vec<f64>> = train.iter().map(|row| encoder.encode(&row.record)).collect();
    let labels: Vec<usize> = train.iter().map(class_of).collect();

    let forest = RandomForest::fit(
        &features,
        &labels,
        &RandomForestParams {
            seed: options.seed,
            ..Default::default()
        },
    )?;
    let logistic = LogisticRegression::fit(&features, &labels, &LogisticRegressionParams::default())?;

    let out_dir = options.artifacts_dir.join("churn");
    let mut accuracies = Vec::new();

    for (name, classifier) in [
        ("rf", ClassifierArtifact::from(forest)),
        ("lr", ClassifierArtifact::from(logistic)),
    ] {
        let artifact = PipelineArtifact {
            encoder: encoder.clone(),
            classifier,
        };

        let path = out_dir.join(format!("churn_model_{}.json", name));
        save_json(&artifact, &path)?;
        info!("✓ Wrote churn_{} to {}", name, path.display());

        if let Some(score) = held_out_accuracy(&path, &test) {
            info!("churn_{} test accuracy: {:.4}", name, score);
            accuracies.push((name.to_string(), score));
        }
    }

    Ok(ChurnReport {
        train_rows: train.len(),
        test_rows: test.len(),
        accuracies,
    })
}

fn held_out_accuracy(path: &Path, test: &[ChurnRow]) -> Option<f64> {
    if test.is_empty() {
        return None;
    }

    let reloaded = load_json::<PipelineArtifact>(path).and_then(PipelineArtifact::into_pipeline);
    let pipeline = match reloaded {
        Ok(pipeline) => pipeline.into_model(),
        Err(e) => {
            warn!("Fitted pipeline does not reload: {}", e);
            return None;
        }
    };

    let predicted: Result<Vec<usize>> = test.iter().map(|row| pipeline.predict(&row.record)).collect();
    match predicted {
        Ok(predicted) => {
            let expected: Vec<usize> = test.iter().map(class_of).collect();
            Some(accuracy(&predicted, &expected))
        }
        Err(e) => {
            warn!("Failed to score pipeline: {}", e);
            None
        }
    }
}
