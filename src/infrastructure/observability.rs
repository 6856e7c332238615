//! Prometheus recorder for the counters emitted by `MetricsSubscriber`

use std::sync::Arc;

use metrics::gauge;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Current snapshot in Prometheus text format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the global recorder. Returns `None` if one is already installed.
pub fn init_metrics() -> Option<PrometheusMetrics> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("trustworthy_rag_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::debug!("Prometheus recorder installed");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}
