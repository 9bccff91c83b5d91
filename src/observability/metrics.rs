//! Metrics collection and exposition.
//!
//! # Metrics
//! - `failover_connect_attempts_total` (counter): attempts by endpoint
//! - `failover_connect_failures_total` (counter): failures by endpoint, kind
//! - `failover_connections_total` (counter): successful connects by endpoint
//! - `failover_disconnects_total` (counter): remote disconnects
//! - `failover_exhausted_total` (counter): supervisors that gave up
//! - `failover_connection_state` (gauge): numeric `ConnectionState`
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::endpoint::Endpoint;
use crate::supervisor::{ConnectionObserver, ConnectionState};
use crate::transport::{ConnectError, DisconnectReason};

/// Install the Prometheus recorder and its scrape endpoint. Needs a running
/// Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_connect_attempt(endpoint: &Endpoint) {
    counter!("failover_connect_attempts_total", "endpoint" => endpoint.to_string()).increment(1);
}

pub fn record_connect_failure(endpoint: &Endpoint, kind: &'static str) {
    counter!(
        "failover_connect_failures_total",
        "endpoint" => endpoint.to_string(),
        "kind" => kind
    )
    .increment(1);
}

pub fn record_connected(endpoint: &Endpoint) {
    counter!("failover_connections_total", "endpoint" => endpoint.to_string()).increment(1);
}

pub fn record_disconnect() {
    counter!("failover_disconnects_total").increment(1);
}

pub fn record_exhausted() {
    counter!("failover_exhausted_total").increment(1);
}

pub fn record_state(state: ConnectionState) {
    gauge!("failover_connection_state").set(state.as_gauge());
}

/// Observer that feeds the metrics above.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObserver;

impl ConnectionObserver for MetricsObserver {
    fn on_connecting(&mut self, endpoint: &Endpoint) {
        record_connect_attempt(endpoint);
        record_state(ConnectionState::Connecting);
    }

    fn on_connected(&mut self, endpoint: &Endpoint) {
        record_connected(endpoint);
        record_state(ConnectionState::Connected);
    }

    fn on_connect_failed(&mut self, endpoint: &Endpoint, error: &ConnectError) {
        record_connect_failure(endpoint, error.kind());
        record_state(ConnectionState::Reconnecting);
    }

    fn on_disconnected(&mut self, _reason: &DisconnectReason) {
        record_disconnect();
        record_state(ConnectionState::Reconnecting);
    }

    fn on_exhausted(&mut self) {
        record_exhausted();
        record_state(ConnectionState::Failed);
    }

    fn on_stopped(&mut self) {
        record_state(ConnectionState::Idle);
    }
}
