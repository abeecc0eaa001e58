//! Prometheus metrics helpers for the Octolog relay.
//!
//! Centralizes recorder installation, metric descriptions, and the `/metrics`
//! endpoint so the relay binary only has to call [`init_metrics`] and
//! [`start_metrics_server`] once at startup.
//!
//! # Metric Naming Conventions
//!
//! - Prefix: `relay_` for pipeline metrics, `mapping_` for the lookup cache
//! - Suffix: `_total` for counters

use axum::{Router, routing::get};
use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;

/// Initialize the Prometheus metrics recorder.
///
/// Must be called once at startup before any metrics are recorded. Returns
/// the handle to pass to [`start_metrics_server`].
///
/// # Panics
///
/// Panics if a recorder is already installed.
pub fn init_metrics() -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    register_relay_metrics();

    handle
}

/// Like [`init_metrics`] but returns `None` when a recorder is already
/// installed instead of panicking. Used from tests.
pub fn try_init_metrics() -> Option<PrometheusHandle> {
    PrometheusBuilder::new().install_recorder().ok()
}

/// Start the Prometheus metrics HTTP server.
///
/// Serves `GET /metrics` on the given port from a background task and
/// returns immediately.
pub async fn start_metrics_server(
    port: u16,
    handle: PrometheusHandle,
) -> Result<(), std::io::Error> {
    let app = Router::new().route(
        "/metrics",
        get(move || {
            let handle = handle.clone();
            async move { handle.render() }
        }),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("metrics server listening on http://{}/metrics", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "metrics server exited");
        }
    });

    Ok(())
}

/// Register descriptions for the relay's metrics.
///
/// Called automatically by [`init_metrics`].
fn register_relay_metrics() {
    describe_counter!(
        "relay_events_received_total",
        "Inbound webhook requests that passed authorization"
    );
    describe_counter!(
        "relay_events_forwarded_total",
        "Events successfully delivered to the notification sink"
    );
    describe_counter!(
        "relay_events_duplicate_total",
        "Events skipped because their id was already recorded"
    );
    describe_counter!(
        "relay_requests_unauthorized_total",
        "Requests rejected for a missing or invalid token"
    );
    describe_counter!(
        "relay_requests_invalid_total",
        "Requests rejected for a missing or unparseable payload"
    );
    describe_counter!(
        "relay_delivery_failures_total",
        "Sink deliveries that failed with a transport error or non-2xx status"
    );
    describe_counter!(
        "mapping_loads_total",
        "Mapping-table loads from the document store"
    );
    describe_counter!(
        "mapping_load_failures_total",
        "Mapping-table loads that failed and cached nothing"
    );
}
