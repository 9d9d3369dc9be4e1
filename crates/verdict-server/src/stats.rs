//! In-memory prediction statistics

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Default length of the top words list
pub const DEFAULT_TOP_WORDS: usize = 30;

/// Word and its frequency among spam messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub name: String,
    pub count: u64,
}

/// Point-in-time view of the statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_processed: u64,
    pub spam_count: u64,
    pub uptime_seconds: f64,
    pub top_words: Vec<WordCount>,
    pub churn_predictions: u64,
    pub churn_detected: u64,
    pub retention_predicted: u64,
}

/// Collects spam and churn counters.
///
/// Word frequencies remember first-seen order so that equal counts rank
/// in the order the words first appeared.
pub struct StatsCollector {
    inner: RwLock<StatsInner>,
    started: Instant,
    top_words: usize,
}

#[derive(Default)]
struct StatsInner {
    total_processed: u64,
    spam_count: u64,
    spam_words: IndexMap<String, u64>,
    churn_predictions: u64,
    churn_detected: u64,
    retention_predicted: u64,
}

impl StatsInner {
    fn add_words(&mut self, cleaned: &str) {
        for word in cleaned.split_whitespace() {
            *self.spam_words.entry(word.to_string()).or_insert(0) += 1;
        }
    }

    fn top_words(&self, limit: usize) -> Vec<WordCount> {
        let mut words: Vec<(&String, &u64)> = self.spam_words.iter().collect();
        // stable sort keeps insertion order among equal counts
        words.sort_by(|a, b| b.1.cmp(a.1));
        words
            .into_iter()
            .take(limit)
            .map(|(name, count)| WordCount {
                name: name.clone(),
                count: *count,
            })
            .collect()
    }
}

impl StatsCollector {
    pub fn new(top_words: usize) -> Self {
        Self {
            inner: RwLock::new(StatsInner::default()),
            started: Instant::now(),
            top_words,
        }
    }

    /// Record one live spam prediction on already-cleaned text
    pub fn record_spam_prediction(&self, is_spam: bool, cleaned: &str) {
        let mut inner = self.inner.write();
        inner.total_processed += 1;
        if is_spam {
            inner.spam_count += 1;
            inner.add_words(cleaned);
        }
    }

    /// Add historical spam counts and the word frequencies of cleaned spam
    /// messages
    pub fn seed_spam<'a>(&self, total: u64, spam: u64, cleaned: impl IntoIterator<Item = &'a str>) {
        let mut inner = self.inner.write();
        inner.total_processed += total;
        inner.spam_count += spam;
        for text in cleaned {
            inner.add_words(text);
        }
    }

    /// Add historical churn counts
    pub fn seed_churn(&self, total: u64, churned: u64) {
        let mut inner = self.inner.write();
        inner.churn_predictions += total;
        inner.churn_detected += churned;
        inner.retention_predicted += total.saturating_sub(churned);
    }

    /// Most frequent spam words, count descending, ties in first-seen order
    pub fn top_words(&self, limit: usize) -> Vec<WordCount> {
        self.inner.read().top_words(limit)
    }

    /// Get current statistics, read under a single lock
    pub fn snapshot(&self) -> StatsSnapshot {
        let inner = self.inner.read();

        StatsSnapshot {
            total_processed: inner.total_processed,
            spam_count: inner.spam_count,
            uptime_seconds: self.started.elapsed().as_secs_f64(),
            top_words: inner.top_words(self.top_words),
            churn_predictions: inner.churn_predictions,
            churn_detected: inner.churn_detected,
            retention_predicted: inner.retention_predicted,
        }
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_WORDS)
    }
}
