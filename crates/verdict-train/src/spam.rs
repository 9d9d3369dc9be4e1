//! Spam vectorizer and text classifier training

use crate::cli::SpamModelKind;
use crate::split::{accuracy, shuffle};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use verdict_core::dataset::read_spam_dataset;
use verdict_core::{clean_text, Error, Result, SpamColumns, SpamLabel, SpamRow};
use verdict_models::{
    load_json, save_json, ClassifierArtifact, LinearSvm, LinearSvmParams, MultinomialNb,
    MultinomialNbParams, RandomForest, RandomForestParams, TfidfVectorizer,
};

/// Options of `verdict-train spam`
#[derive(Debug, Clone)]
pub struct SpamTrainOptions {
    pub data: PathBuf,
    pub columns: SpamColumns,
    pub artifacts_dir: PathBuf,
    pub models: Vec<SpamModelKind>,
    pub max_features: usize,
    pub seed: u64,
}

/// Cleaned documents and their class indices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpamCorpus {
    pub documents: Vec<String>,
    pub labels: Vec<usize>,
}

/// Drop empty and unlabelled rows, shuffle, de-duplicate keeping the first
/// occurrence and clean the texts.
pub fn prepare_corpus(rows: Vec<SpamRow>, seed: u64) -> SpamCorpus {
    let total = rows.len();
    let mut labelled: Vec<(String, SpamLabel)> = rows
        .into_iter()
        .filter(|row| !row.text.trim().is_empty())
        .filter_map(|row| SpamLabel::parse(&row.label).map(|label| (row.text, label)))
        .collect();
    let dropped = total - labelled.len();

    shuffle(&mut labelled, seed);

    let mut seen = HashSet::new();
    labelled.retain(|row| seen.insert(row.clone()));

    info!(
        "Spam corpus: {} rows read, {} dropped, {} after de-duplication",
        total,
        dropped,
        labelled.len()
    );

    let documents = labelled.par_iter().map(|(text, _)| clean_text(text)).collect();
    let labels = labelled.iter().map(|(_, label)| label.class_index()).collect();

    SpamCorpus { documents, labels }
}

/// Train and write the vectorizer and the requested models.
///
/// Returns the written artifact paths.
pub fn train_spam(options: &SpamTrainOptions) -> Result<Vec<PathBuf>> {
    let rows = read_spam_dataset(&options.data, &options.columns)?;
    let corpus = prepare_corpus(rows, options.seed);
    if corpus.documents.is_empty() {
        return Err(Error::training(format!(
            "no usable rows in {}",
            options.data.display()
        )));
    }

    let vectorizer = TfidfVectorizer::fit(&corpus.documents, Some(options.max_features))?;
    info!("Vectorizer fitted with {} terms", vectorizer.vocabulary().len());

    let rows: Vec<Vec<f64>> = corpus
        .documents
        .par_iter()
        .map(|doc| vectorizer.transform_document(doc))
        .collect();

    let out_dir = options.artifacts_dir.join("spam");
    let mut written = Vec::new();

    let path = out_dir.join("vectorizer.json");
    save_json(&vectorizer, &path)?;
    written.push(path);

    for kind in dedup_kinds(&options.models) {
        let artifact = fit_model(kind, &rows, &corpus.labels, options.seed)?;

        let path = out_dir.join(kind.artifact_name());
        save_json(&artifact, &path)?;
        info!("✓ Wrote {} to {}", kind.key(), path.display());
        log_training_accuracy(kind, &path, &rows, &corpus.labels);
        written.push(path);
    }

    Ok(written)
}

fn dedup_kinds(kinds: &[SpamModelKind]) -> Vec<SpamModelKind> {
    let mut unique = Vec::new();
    for kind in kinds {
        if !unique.contains(kind) {
            unique.push(*kind);
        }
    }
    unique
}

fn fit_model(
    kind: SpamModelKind,
    rows: &[Vec<f64>],
    labels: &[usize],
    seed: u64,
) -> Result<ClassifierArtifact> {
    info!("Fitting {} on {} documents", kind.key(), rows.len());
    let artifact: ClassifierArtifact = match kind {
        SpamModelKind::Svc => LinearSvm::fit(rows, labels, &LinearSvmParams::default())?.into(),
        SpamModelKind::Nb => MultinomialNb::fit(rows, labels, &MultinomialNbParams::default())?.into(),
        SpamModelKind::Rf => {
            let params = RandomForestParams {
                seed,
                ..Default::default()
            };
            RandomForest::fit(rows, labels, &params)?.into()
        }
    };
    Ok(artifact)
}

/// Score the artifact as written, reloaded the way the server loads it
fn log_training_accuracy(kind: SpamModelKind, path: &Path, rows: &[Vec<f64>], labels: &[usize]) {
    let reloaded = load_json::<ClassifierArtifact>(path).and_then(ClassifierArtifact::into_model);
    let model = match reloaded {
        Ok(model) => model,
        Err(e) => {
            warn!("Fitted {} does not reload: {}", kind.key(), e);
            return;
        }
    };
    let predicted: Result<Vec<usize>> = rows.iter().map(|row| model.predict(row)).collect();
    match predicted {
        Ok(predicted) => info!(
            "{} training accuracy: {:.4}",
            kind.key(),
            accuracy(&predicted, labels)
        ),
        Err(e) => warn!("Failed to score {}: {}", kind.key(), e),
    }
}
