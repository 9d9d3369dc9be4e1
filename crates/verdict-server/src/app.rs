use crate::config::ServerConfig;
use crate::feedback::FeedbackStore;
use crate::routes;
use crate::seed::seed_stats;
use crate::service::PredictionService;
use crate::state::AppState;
use crate::stats::StatsCollector;
use axum::{http::HeaderValue, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use verdict_models::init_registry_from_config;

/// Load models, seed statistics and open the feedback sink
pub fn build_service(config: &ServerConfig) -> PredictionService {
    let registry = init_registry_from_config(&config.registry);

    let stats = StatsCollector::new(config.stats.top_words);
    seed_stats(&stats, &config.datasets.spam, &config.datasets.churn);

    let feedback = FeedbackStore::new(config.feedback.path.clone());
    info!("Feedback will be appended to {}", config.feedback.path.display());

    PredictionService::new(Arc::new(registry), stats, feedback)
}

/// Build the Axum application
pub fn build_app(state: AppState, cors_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    routes::create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Serve until SIGINT or SIGTERM
pub async fn run_server(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Verdict listening on http://{}", addr);

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
