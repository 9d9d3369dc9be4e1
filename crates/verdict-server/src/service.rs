//! Prediction dispatch over the model registry

use crate::feedback::FeedbackStore;
use crate::stats::{StatsCollector, StatsSnapshot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;
use verdict_core::{clean_text, CustomerRecord, Error, Result, POSITIVE_CLASS};
use verdict_models::{ModelEntry, ModelRegistry};

/// Spam prediction request
#[derive(Debug, Clone, Deserialize)]
pub struct SpamRequest {
    pub text: String,

    /// Requested model key; unknown or absent keys use the default
    #[serde(default, alias = "model_version")]
    pub model_type: Option<String>,
}

/// Spam prediction response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpamResponse {
    pub is_spam: bool,
    pub confidence: f64,
    pub message: String,
    /// Key of the model that actually answered
    pub model_used: String,
}

/// Churn prediction request
#[derive(Debug, Clone, Deserialize)]
pub struct ChurnRequest {
    #[serde(flatten)]
    pub record: CustomerRecord,

    /// `rf` or `lr`
    #[serde(default = "default_churn_model")]
    pub model_type: String,
}

/// Churn prediction response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnResponse {
    pub is_churn: bool,
    pub confidence: f64,
    pub model_used: String,
}

/// User-submitted label for a message
#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    pub text: String,
    pub label: String,
}

fn default_churn_model() -> String {
    "rf".to_string()
}

/// Prefix joining churn model types to registry keys
pub const CHURN_KEY_PREFIX: &str = "churn_";

/// Owns the registry, statistics and feedback sink
pub struct PredictionService {
    registry: Arc<ModelRegistry>,
    stats: StatsCollector,
    feedback: FeedbackStore,
}

impl PredictionService {
    pub fn new(registry: Arc<ModelRegistry>, stats: StatsCollector, feedback: FeedbackStore) -> Self {
        Self {
            registry,
            stats,
            feedback,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn stats(&self) -> &StatsCollector {
        &self.stats
    }

    /// Loaded model keys, sorted
    pub fn available_models(&self) -> Vec<String> {
        self.registry.keys()
    }

    /// Current statistics
    pub fn snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Classify a message as spam or ham and update statistics
    pub fn predict_spam(&self, request: &SpamRequest) -> Result<SpamResponse> {
        let start = Instant::now();
        let (key, entry) = self.registry.resolve_text(request.model_type.as_deref())?;

        let ModelEntry::Text { classifier, vectorizer } = entry.as_ref() else {
            return Err(Error::internal(format!("model {} is not a text model", key)));
        };

        let cleaned = clean_text(&request.text);
        let row = vectorizer.transform(&cleaned)?;
        let prediction = classifier.classify(&row)?;
        let is_spam = prediction.label == POSITIVE_CLASS;

        self.stats.record_spam_prediction(is_spam, &cleaned);

        metrics::counter!("verdict_predictions_total", "kind" => "spam", "model" => key.clone())
            .increment(1);
        metrics::histogram!("verdict_prediction_latency_us", "kind" => "spam")
            .record(start.elapsed().as_micros() as f64);
        debug!("Spam prediction by {}: {} ({:.1}%)", key, is_spam, prediction.confidence_percent());

        Ok(SpamResponse {
            is_spam,
            confidence: prediction.confidence_percent(),
            message: if is_spam { "Spam detected" } else { "Likely Ham" }.to_string(),
            model_used: key,
        })
    }

    /// Predict churn with the exact `churn_<model_type>` pipeline
    pub fn predict_churn(&self, request: &ChurnRequest) -> Result<ChurnResponse> {
        let start = Instant::now();
        let key = format!("{}{}", CHURN_KEY_PREFIX, request.model_type);

        let entry = self
            .registry
            .get_exact(&key)
            .ok_or_else(|| Error::model_unavailable(key.as_str()))?;
        let ModelEntry::Tabular { classifier } = entry.as_ref() else {
            return Err(Error::model_unavailable(key));
        };

        let prediction = classifier.classify(&request.record)?;
        let is_churn = prediction.label == POSITIVE_CLASS;

        metrics::counter!("verdict_predictions_total", "kind" => "churn", "model" => key.clone())
            .increment(1);
        metrics::histogram!("verdict_prediction_latency_us", "kind" => "churn")
            .record(start.elapsed().as_micros() as f64);
        debug!("Churn prediction by {}: {}", key, is_churn);

        Ok(ChurnResponse {
            is_churn,
            confidence: prediction.confidence_percent(),
            model_used: request.model_type.clone(),
        })
    }

    /// Append a labelled message to the feedback file
    pub fn record_feedback(&self, request: &FeedbackRequest) -> Result<()> {
        self.feedback.append(&request.text, &request.label)?;
        metrics::counter!("verdict_feedback_total").increment(1);
        Ok(())
    }
}
