//! HTTP API tests driving the router in-process

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use verdict_core::{clean_text, CustomerRecord};
use verdict_models::{
    ClassifierArtifact, ColumnEncoder, LinearSvm, LinearSvmParams, LogisticRegression,
    ModelEntry, ModelRegistry, MultinomialNb, Pipeline, Preprocessor, TfidfVectorizer,
};
use verdict_server::{build_app, AppState, FeedbackStore, PredictionService, StatsCollector};

const SPAM: [&str; 3] = [
    "Free money prize, claim now!",
    "WIN free cash prize today",
    "Claim your free money reward",
];
const HAM: [&str; 3] = [
    "Meeting agenda for the project review",
    "Lunch with the team tomorrow?",
    "Project report review notes attached",
];

fn text_entries() -> (ModelEntry, ModelEntry) {
    let texts: Vec<String> = SPAM.iter().chain(HAM.iter()).map(|t| clean_text(t)).collect();
    let labels: Vec<usize> = vec![1, 1, 1, 0, 0, 0];

    let vectorizer = TfidfVectorizer::fit(&texts, Some(3000)).unwrap();
    let rows: Vec<Vec<f64>> = texts.iter().map(|t| vectorizer.transform_document(t)).collect();
    let vectorizer: Arc<dyn Preprocessor<str>> = Arc::new(vectorizer);

    let nb = ClassifierArtifact::from(MultinomialNb::fit(&rows, &labels, &Default::default()).unwrap());
    let svc = ClassifierArtifact::from(LinearSvm::fit(&rows, &labels, &LinearSvmParams::default()).unwrap());

    (
        ModelEntry::Text {
            classifier: svc.into_model().unwrap(),
            vectorizer: Arc::clone(&vectorizer),
        },
        ModelEntry::Text {
            classifier: nb.into_model().unwrap(),
            vectorizer,
        },
    )
}

fn churn_entry() -> ModelEntry {
    // churn follows the monthly bill; the other columns vary independently
    let customers: Vec<CustomerRecord> = [
        (22, 30.0, 3),
        (45, 40.0, 18),
        (31, 50.0, 7),
        (60, 55.0, 12),
        (27, 75.0, 20),
        (52, 85.0, 5),
        (38, 95.0, 15),
        (66, 100.0, 9),
    ]
    .into_iter()
    .map(|(age, bill, months)| customer(age, bill, months))
    .collect();
    let labels: Vec<usize> = customers.iter().map(|c| usize::from(c.monthly_bill > 60.0)).collect();

    let refs: Vec<&CustomerRecord> = customers.iter().collect();
    let encoder = ColumnEncoder::fit(&refs).unwrap();
    let rows: Vec<Vec<f64>> = customers.iter().map(|c| encoder.encode(c)).collect();
    let lr = ClassifierArtifact::from(LogisticRegression::fit(&rows, &labels, &Default::default()).unwrap());

    let pipeline: Pipeline<CustomerRecord> =
        Pipeline::new(Arc::new(encoder), lr.into_model().unwrap());
    ModelEntry::Tabular {
        classifier: pipeline.into_model(),
    }
}

fn customer(age: i64, bill: f64, months: i64) -> CustomerRecord {
    CustomerRecord {
        age,
        gender: "Male".to_string(),
        location: "Houston".to_string(),
        subscription_length_months: months,
        monthly_bill: bill,
        total_usage_gb: 100 + age * 4,
    }
}

fn state_with(registry: ModelRegistry, feedback: &Path) -> AppState {
    let service = PredictionService::new(
        Arc::new(registry),
        StatsCollector::default(),
        FeedbackStore::new(feedback),
    );
    AppState::new(service, None)
}

fn full_state(feedback: &Path) -> AppState {
    let (svc, nb) = text_entries();
    let mut registry = ModelRegistry::new("svc");
    registry.insert("svc", svc);
    registry.insert("nb", nb);
    registry.insert("churn_lr", churn_entry());
    state_with(registry, feedback)
}

fn app(state: &AppState) -> Router {
    build_app(state.clone(), &["http://localhost:3000".to_string()])
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_root_lists_sorted_models() {
    let dir = TempDir::new().unwrap();
    let state = full_state(&dir.path().join("feedback.csv"));

    let (status, body) = send(app(&state), "GET", "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");
    assert_eq!(body["available_models"], json!(["churn_lr", "nb", "svc"]));
}

#[tokio::test]
async fn test_health() {
    let dir = TempDir::new().unwrap();
    let state = full_state(&dir.path().join("feedback.csv"));

    let (status, body) = send(app(&state), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_predict_spam_updates_stats() {
    let dir = TempDir::new().unwrap();
    let state = full_state(&dir.path().join("feedback.csv"));

    let request = json!({ "text": "Claim your FREE prize money!", "model_type": "nb" });
    let (status, body) = send(app(&state), "POST", "/predict", Some(request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_spam"], true);
    assert_eq!(body["message"], "Spam detected");
    assert_eq!(body["model_used"], "nb");
    let confidence = body["confidence"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&confidence));

    let (_, stats) = send(app(&state), "GET", "/stats", None).await;
    assert_eq!(stats["total_processed"], 1);
    assert_eq!(stats["spam_count"], 1);
    let words: Vec<&str> = stats["top_words"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["name"].as_str().unwrap())
        .collect();
    assert_eq!(words, vec!["claim", "free", "prize", "money"]);
}

#[tokio::test]
async fn test_predict_ham() {
    let dir = TempDir::new().unwrap();
    let state = full_state(&dir.path().join("feedback.csv"));

    let request = json!({ "text": "project meeting agenda review", "model_version": "nb" });
    let (status, body) = send(app(&state), "POST", "/predict", Some(request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_spam"], false);
    assert_eq!(body["message"], "Likely Ham");

    let (_, stats) = send(app(&state), "GET", "/stats", None).await;
    assert_eq!(stats["total_processed"], 1);
    assert_eq!(stats["spam_count"], 0);
    assert_eq!(stats["top_words"], json!([]));
}

#[tokio::test]
async fn test_unknown_model_falls_back_to_default() {
    let dir = TempDir::new().unwrap();
    let state = full_state(&dir.path().join("feedback.csv"));

    let request = json!({ "text": "hello", "model_type": "xgboost" });
    let (status, body) = send(app(&state), "POST", "/predict", Some(request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_used"], "svc");
}

#[tokio::test]
async fn test_predict_without_default_is_503() {
    let dir = TempDir::new().unwrap();
    let state = state_with(ModelRegistry::new("svc"), &dir.path().join("feedback.csv"));

    let request = json!({ "text": "hello", "model_type": "unknown" });
    let (status, body) = send(app(&state), "POST", "/predict", Some(request)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({ "detail": "Model svc not loaded" }));

    let (_, stats) = send(app(&state), "GET", "/stats", None).await;
    assert_eq!(stats["total_processed"], 0);
}

#[tokio::test]
async fn test_predict_churn_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let state = full_state(&dir.path().join("feedback.csv"));

    let request = json!({
        "Age": 30,
        "Gender": "Female",
        "Location": "Miami",
        "Subscription_Length_Months": 12,
        "Monthly_Bill": 95,
        "Total_Usage_GB": 250,
        "model_type": "lr"
    });

    let (status, first) = send(app(&state), "POST", "/predict-churn", Some(request.clone())).await;
    let (_, second) = send(app(&state), "POST", "/predict-churn", Some(request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
    assert_eq!(first["is_churn"], true);
    assert_eq!(first["model_used"], "lr");

    let (_, stats) = send(app(&state), "GET", "/stats", None).await;
    assert_eq!(stats["churn_predictions"], 0);
}

#[tokio::test]
async fn test_predict_churn_unloaded_key_is_503() {
    let dir = TempDir::new().unwrap();
    let state = full_state(&dir.path().join("feedback.csv"));

    let request = json!({
        "Age": 30,
        "Gender": "Female",
        "Location": "Miami",
        "Subscription_Length_Months": 12,
        "Monthly_Bill": 50.5,
        "Total_Usage_GB": 250
    });
    let (status, body) = send(app(&state), "POST", "/predict-churn", Some(request)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["detail"], "Model churn_rf not loaded");
}

#[tokio::test]
async fn test_feedback_appends_rows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("feedback.csv");
    let state = full_state(&path);

    for (text, label) in [("win big, now", "Spam"), ("see you", "Ham")] {
        let request = json!({ "text": text, "label": label });
        let (status, body) = send(app(&state), "POST", "/feedback", Some(request)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "success", "message": "Feedback recorded" }));
    }

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content, "text,label\n\"win big, now\",Spam\nsee you,Ham\n");
}

#[tokio::test]
async fn test_feedback_write_failure_is_500() {
    let dir = TempDir::new().unwrap();
    let state = full_state(&dir.path().join("missing/feedback.csv"));

    let request = json!({ "text": "x", "label": "Ham" });
    let (status, body) = send(app(&state), "POST", "/feedback", Some(request)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().starts_with("Failed to save feedback"));
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let dir = TempDir::new().unwrap();
    let state = full_state(&dir.path().join("feedback.csv"));

    let (status, _) = send(app(&state), "POST", "/predict", Some(json!({ "model_type": "nb" }))).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_metrics_without_recorder_is_empty() {
    let dir = TempDir::new().unwrap();
    let state = full_state(&dir.path().join("feedback.csv"));

    let response = app(&state)
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());
}
