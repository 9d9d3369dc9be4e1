//! Verdict Server
//!
//! Serves spam and churn predictions over HTTP.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use tracing::info;

use verdict_server::{build_app, build_service, run_server, AppState, Cli, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);

    info!("Starting Verdict server");

    // Load configuration
    let config = ServerConfig::load(&cli.config, &cli)?;
    info!("Configuration loaded successfully");
    info!("Artifacts: {}", config.artifacts_dir.display());
    info!("Default model: {}", config.registry.default_model);

    // Initialize metrics
    let metrics_handle = init_metrics()?;

    // Load models and seed statistics before accepting traffic
    let service = build_service(&config);
    info!("Available models: {:?}", service.available_models());

    let state = AppState::new(service, Some(metrics_handle));
    let app = build_app(state, &config.server.cors_origins);

    let addr: SocketAddr = format!("{}:{}", config.server.listen, config.server.port).parse()?;
    run_server(app, addr).await
}

/// Default per-crate log levels
fn log_directives(verbose: bool) -> &'static str {
    if verbose {
        "verdict_server=debug,verdict_models=debug,verdict_core=debug,tower_http=debug"
    } else {
        "verdict_server=info,verdict_models=info,verdict_core=info,tower_http=warn"
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

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "verdict_predictions_total",
        "Total number of predictions by kind and model"
    );
    metrics::describe_counter!("verdict_feedback_total", "Total number of feedback rows recorded");
    metrics::describe_counter!("verdict_errors_total", "Total number of errors by type");
    metrics::describe_histogram!(
        "verdict_prediction_latency_us",
        metrics::Unit::Microseconds,
        "Prediction latency in microseconds by kind"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directives_name_workspace_crates() {
        let this_crate = module_path!().split("::").next().unwrap();

        for verbose in [false, true] {
            let directives = log_directives(verbose);
            let targets: Vec<&str> = directives
                .split(',')
                .filter_map(|d| d.split('=').next())
                .collect();

            assert_eq!(targets, vec![this_crate, "verdict_models", "verdict_core", "tower_http"]);
            assert!(tracing_subscriber::EnvFilter::try_new(directives).is_ok());
        }
    }
}
