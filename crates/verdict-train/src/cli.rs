use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "verdict-train")]
#[command(author, version, about = "Fit Verdict models and write their artifacts")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Artifacts root; models are written under spam/ and churn/
    #[arg(short, long, global = true, default_value = "./artifacts")]
    pub artifacts_dir: PathBuf,

    /// Seed for shuffling, splitting and model fitting
    #[arg(long, global = true, default_value = "42")]
    pub seed: u64,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fit the spam vectorizer and text classifiers
    Spam {
        /// Spam dataset CSV
        #[arg(short, long, default_value = "./artifacts/spam/spam_emails_data.csv")]
        data: PathBuf,

        /// Message text column
        #[arg(long, default_value = "text")]
        text_column: String,

        /// Spam/Ham label column
        #[arg(long, default_value = "label")]
        label_column: String,

        /// Models to fit (comma-separated)
        #[arg(short, long, value_enum, value_delimiter = ',', default_value = "svc,nb,rf")]
        models: Vec<SpamModelKind>,

        /// Vocabulary cap of the TF-IDF vectorizer
        #[arg(long, default_value = "3000")]
        max_features: usize,
    },

    /// Fit the churn pipelines
    Churn {
        /// Churn dataset CSV
        #[arg(short, long, default_value = "./artifacts/churn/customer_churn_large_dataset.csv")]
        data: PathBuf,

        /// Label column
        #[arg(long, default_value = "Churn")]
        label_column: String,

        /// Fraction of rows held out for evaluation
        #[arg(long, default_value = "0.2")]
        test_fraction: f64,
    },
}

/// Text classifiers the trainer can fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SpamModelKind {
    /// Calibrated linear SVM
    Svc,
    /// Multinomial naive Bayes
    Nb,
    /// Random forest
    Rf,
}

impl SpamModelKind {
    /// Registry key and artifact file stem
    pub fn key(self) -> &'static str {
        match self {
            Self::Svc => "svc",
            Self::Nb => "nb",
            Self::Rf => "rf",
        }
    }

    pub fn artifact_name(self) -> String {
        format!("model_{}.json", self.key())
    }
}
