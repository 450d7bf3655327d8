// src/telemetry.rs
use axum::{routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Telemetry {
    pub handle: PrometheusHandle,
}

impl Telemetry {
    /// Install the Prometheus recorder. Call once at startup, before any
    /// counter is touched.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;
        Ok(Self { handle })
    }

    /// Router exposing `/admin/metrics` in the Prometheus exposition format.
    /// (`/metrics` itself belongs to the business API.)
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/admin/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
