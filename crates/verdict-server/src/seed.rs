//! Startup seeding of statistics from historical datasets

use crate::config::{ChurnDatasetConfig, SpamDatasetConfig};
use crate::stats::StatsCollector;
use std::collections::VecDeque;
use tracing::{info, warn};
use verdict_core::dataset::{read_churn_labels, read_spam_dataset};
use verdict_core::{clean_text, Result, SpamLabel};

/// Counts taken from the spam dataset
#[derive(Debug, Clone, PartialEq)]
pub struct SpamSeed {
    pub total: u64,
    pub spam: u64,
    /// Cleaned text of the last spam messages, oldest first
    pub recent_spam: Vec<String>,
}

/// Counts taken from the churn dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChurnSeed {
    pub total: u64,
    pub churned: u64,
}

/// Read spam counts, keeping the last `sample` spam messages for the word
/// table
pub fn read_spam_seed(config: &SpamDatasetConfig) -> Result<SpamSeed> {
    let rows = read_spam_dataset(&config.path, &config.columns())?;

    let mut spam = 0;
    let mut recent: VecDeque<&str> = VecDeque::with_capacity(config.seed_sample);
    for row in &rows {
        if SpamLabel::parse(&row.label) == Some(SpamLabel::Spam) {
            spam += 1;
            if config.seed_sample > 0 {
                if recent.len() == config.seed_sample {
                    recent.pop_front();
                }
                recent.push_back(&row.text);
            }
        }
    }

    Ok(SpamSeed {
        total: rows.len() as u64,
        spam,
        recent_spam: recent.into_iter().map(clean_text).collect(),
    })
}

/// Read churn counts
pub fn read_churn_seed(config: &ChurnDatasetConfig) -> Result<ChurnSeed> {
    let labels = read_churn_labels(&config.path, &config.label_column)?;
    Ok(ChurnSeed {
        total: labels.len() as u64,
        churned: labels.iter().filter(|c| **c).count() as u64,
    })
}

/// Seed statistics from both datasets. Missing or unreadable datasets are
/// logged and skipped.
pub fn seed_stats(stats: &StatsCollector, spam: &SpamDatasetConfig, churn: &ChurnDatasetConfig) {
    if spam.path.exists() {
        match read_spam_seed(spam) {
            Ok(seed) => {
                stats.seed_spam(seed.total, seed.spam, seed.recent_spam.iter().map(String::as_str));
                info!("Stats loaded: {} emails, {} spam", seed.total, seed.spam);
            }
            Err(e) => warn!("Failed to load spam stats from {}: {}", spam.path.display(), e),
        }
    } else {
        info!("Spam dataset {} not found, stats start empty", spam.path.display());
    }

    if churn.path.exists() {
        match read_churn_seed(churn) {
            Ok(seed) => {
                stats.seed_churn(seed.total, seed.churned);
                info!("Churn stats loaded: {} records", seed.total);
            }
            Err(e) => warn!("Failed to load churn stats from {}: {}", churn.path.display(), e),
        }
    } else {
        info!("Churn dataset {} not found, churn stats start empty", churn.path.display());
    }
}
