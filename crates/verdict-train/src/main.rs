//! Verdict Train
//!
//! Fits models from CSV datasets and writes JSON artifacts.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use verdict_core::SpamColumns;
use verdict_train::{
    train_churn, train_spam, ChurnTrainOptions, Cli, Commands, SpamTrainOptions,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match cli.command {
        Commands::Spam {
            data,
            text_column,
            label_column,
            models,
            max_features,
        } => {
            let options = SpamTrainOptions {
                data,
                columns: SpamColumns {
                    text: text_column,
                    label: label_column,
                },
                artifacts_dir: cli.artifacts_dir,
                models,
                max_features,
                seed: cli.seed,
            };
            let written = train_spam(&options)?;
            info!("Spam training complete: {} artifacts written", written.len());
        }
        Commands::Churn {
            data,
            label_column,
            test_fraction,
        } => {
            let options = ChurnTrainOptions {
                data,
                label_column,
                artifacts_dir: cli.artifacts_dir,
                test_fraction,
                seed: cli.seed,
            };
            let report = train_churn(&options)?;
            info!(
                "Churn training complete: {} train rows, {} test rows",
                report.train_rows, report.test_rows
            );
        }
    }

    Ok(())
}

/// Default per-crate log levels
fn log_directives(verbose: bool) -> &'static str {
    if verbose {
        "verdict_train=debug,verdict_models=debug,verdict_core=debug"
    } else {
        "verdict_train=info,verdict_models=info,verdict_core=info"
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new(log_directives(true))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_directives(false)))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
