use crate::service::PredictionService;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Registry, statistics and feedback sink
    pub service: Arc<PredictionService>,

    /// Installed Prometheus recorder, if any
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(service: PredictionService, metrics_handle: Option<PrometheusHandle>) -> Self {
        Self {
            service: Arc::new(service),
            metrics_handle,
        }
    }
}
