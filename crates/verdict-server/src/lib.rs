//! Verdict Server
//!
//! JSON HTTP API serving spam and churn predictions from a model registry
//! loaded once at startup, with in-memory statistics and a feedback sink.

pub mod app;
pub mod cli;
pub mod config;
pub mod feedback;
pub mod routes;
pub mod seed;
pub mod service;
pub mod state;
pub mod stats;

pub use app::{build_app, build_service, run_server};
pub use cli::Cli;
pub use config::ServerConfig;
pub use feedback::FeedbackStore;
pub use routes::create_router;
pub use service::{
    ChurnRequest, ChurnResponse, FeedbackRequest, PredictionService, SpamRequest, SpamResponse,
};
pub use state::AppState;
pub use stats::{StatsCollector, StatsSnapshot, WordCount};
