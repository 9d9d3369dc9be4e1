//! Registry integration tests against artifacts written to disk

use std::path::Path;
use tempfile::TempDir;

use verdict_core::CustomerRecord;
use verdict_models::{
    init_registry_from_config, save_json, ClassifierArtifact, ColumnEncoder, LinearSvm,
    LinearSvmParams, LogisticRegression, ModelEntry, PipelineArtifact, Preprocessor,
    RegistryConfig, TfidfVectorizer,
};

fn customer(age: i64, location: &str) -> CustomerRecord {
    CustomerRecord {
        age,
        gender: "Female".to_string(),
        location: location.to_string(),
        subscription_length_months: age / 5,
        monthly_bill: age as f64 * 1.5,
        total_usage_gb: age * 3,
    }
}

/// Write a vectorizer and a calibrated SVM under the legacy file name only
fn write_spam_artifacts(dir: &Path) {
    let texts = [
        "free prize money",
        "claim free cash prize",
        "win money now",
        "lunch meeting notes",
        "team meeting agenda",
        "project review notes",
    ];
    let labels: [usize; 6] = [1, 1, 1, 0, 0, 0];
    let vectorizer = TfidfVectorizer::fit(&texts, None).unwrap();
    let rows: Vec<Vec<f64>> = texts.iter().map(|t| vectorizer.transform_document(t)).collect();
    save_json(&vectorizer, dir.join("spam/vectorizer.json")).unwrap();

    let svm = LinearSvm::fit(&rows, &labels, &LinearSvmParams::default()).unwrap();
    save_json(&ClassifierArtifact::from(svm), dir.join("spam/model.json")).unwrap();
}

fn write_churn_artifacts(dir: &Path) {
    let customers: Vec<CustomerRecord> = [
        (22, "Miami"),
        (28, "Houston"),
        (35, "Miami"),
        (48, "Houston"),
        (55, "Miami"),
        (63, "Houston"),
    ]
    .into_iter()
    .map(|(age, location)| customer(age, location))
    .collect();
    let labels: Vec<usize> = customers.iter().map(|c| usize::from(c.age > 40)).collect();

    let refs: Vec<&CustomerRecord> = customers.iter().collect();
    let encoder = ColumnEncoder::fit(&refs).unwrap();
    let rows: Vec<Vec<f64>> = customers.iter().map(|c| encoder.encode(c)).collect();

    let lr = PipelineArtifact {
        encoder: encoder.clone(),
        classifier: LogisticRegression::fit(&rows, &labels, &Default::default()).unwrap().into(),
    };
    save_json(&lr, dir.join("churn/churn_model_lr.json")).unwrap();

    // label-only classifier: must be rejected for churn
    let params = LinearSvmParams {
        calibrate: false,
        ..Default::default()
    };
    let svm = PipelineArtifact {
        encoder,
        classifier: LinearSvm::fit(&rows, &labels, &params).unwrap().into(),
    };
    save_json(&svm, dir.join("churn/churn_model_rf.json")).unwrap();
}

fn config_in(dir: &Path) -> RegistryConfig {
    let mut config = RegistryConfig::default();
    config.resolve_paths(dir);
    config
}

#[test]
fn test_partial_availability() {
    let dir = TempDir::new().unwrap();
    write_spam_artifacts(dir.path());
    write_churn_artifacts(dir.path());

    let registry = init_registry_from_config(&config_in(dir.path()));

    // svc falls back to model.json; nb and rf are missing; churn_rf is label-only
    assert_eq!(registry.keys(), vec!["churn_lr", "svc"]);
}

#[test]
fn test_unknown_key_uses_default_text_model() {
    let dir = TempDir::new().unwrap();
    write_spam_artifacts(dir.path());

    let registry = init_registry_from_config(&config_in(dir.path()));
    let (key, entry) = registry.resolve_text(Some("nb")).unwrap();

    assert_eq!(key, "svc");
    match entry.as_ref() {
        ModelEntry::Text { classifier, vectorizer } => {
            let row = vectorizer.transform("free prize money").unwrap();
            let prediction = classifier.classify(&row).unwrap();
            assert_eq!(prediction.label, 1);
            assert!(prediction.confidence_percent() > 50.0);
        }
        other => panic!("expected a text entry, got {:?}", other),
    }
}

#[test]
fn test_tabular_entry_is_not_a_text_fallback() {
    let dir = TempDir::new().unwrap();
    write_churn_artifacts(dir.path());

    let mut config = config_in(dir.path());
    config.default_model = "churn_lr".to_string();
    let registry = init_registry_from_config(&config);

    assert!(registry.get(Some("svc")).is_some());
    let err = registry.resolve_text(Some("svc")).unwrap_err();
    assert_eq!(err.to_string(), "Model churn_lr not loaded");
}

#[test]
fn test_churn_pipeline_is_deterministic() {
    let dir = TempDir::new().unwrap();
    write_churn_artifacts(dir.path());

    let registry = init_registry_from_config(&config_in(dir.path()));
    let entry = registry.get_exact("churn_lr").unwrap();

    match entry.as_ref() {
        ModelEntry::Tabular { classifier } => {
            let record = customer(40, "Chicago");
            let first = classifier.classify(&record).unwrap();
            let second = classifier.classify(&record).unwrap();
            assert_eq!(first, second);
            assert!(classifier.emits_probabilities());
        }
        other => panic!("expected a tabular entry, got {:?}", other),
    }
}

#[test]
fn test_corrupt_artifact_is_skipped() {
    let dir = TempDir::new().unwrap();
    write_spam_artifacts(dir.path());
    std::fs::write(dir.path().join("spam/model_nb.json"), "{\"kind\":\"multinomial_nb\"").unwrap();

    let registry = init_registry_from_config(&config_in(dir.path()));
    assert!(!registry.has_model("nb"));
    assert!(registry.has_model("svc"));
}
