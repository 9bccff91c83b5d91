//! Lifecycle observer interface.
//!
//! Every state change of a supervisor invokes exactly one of these callbacks,
//! synchronously, before the next event is processed.

use crate::endpoint::Endpoint;
use crate::transport::{ConnectError, DisconnectReason};

/// Receives connection lifecycle notifications. All methods default to no-ops.
pub trait ConnectionObserver {
    /// A connect attempt to `endpoint` is starting.
    fn on_connecting(&mut self, _endpoint: &Endpoint) {}

    /// The connection to `endpoint` is open.
    fn on_connected(&mut self, _endpoint: &Endpoint) {}

    /// The attempt to `endpoint` failed or timed out.
    fn on_connect_failed(&mut self, _endpoint: &Endpoint, _error: &ConnectError) {}

    /// An established connection dropped.
    fn on_disconnected(&mut self, _reason: &DisconnectReason) {}

    /// The attempt limit was reached; the supervisor is now `Failed`.
    fn on_exhausted(&mut self) {}

    /// `stop()` moved the supervisor to `Idle`.
    fn on_stopped(&mut self) {}
}

impl ConnectionObserver for () {}

impl<O: ConnectionObserver + ?Sized> ConnectionObserver for Box<O> {
    fn on_connecting(&mut self, endpoint: &Endpoint) {
        (**self).on_connecting(endpoint)
    }
    fn on_connected(&mut self, endpoint: &Endpoint) {
        (**self).on_connected(endpoint)
    }
    fn on_connect_failed(&mut self, endpoint: &Endpoint, error: &ConnectError) {
        (**self).on_connect_failed(endpoint, error)
    }
    fn on_disconnected(&mut self, reason: &DisconnectReason) {
        (**self).on_disconnected(reason)
    }
    fn on_exhausted(&mut self) {
        (**self).on_exhausted()
    }
    fn on_stopped(&mut self) {
        (**self).on_stopped()
    }
}

/// Fan out to two observers, left first.
impl<A: ConnectionObserver, B: ConnectionObserver> ConnectionObserver for (A, B) {
    fn on_connecting(&mut self, endpoint: &Endpoint) {
        self.0.on_connecting(endpoint);
        self.1.on_connecting(endpoint);
    }
    fn on_connected(&mut self, endpoint: &Endpoint) {
        self.0.on_connected(endpoint);
        self.1.on_connected(endpoint);
    }
    fn on_connect_failed(&mut self, endpoint: &Endpoint, error: &ConnectError) {
        self.0.on_connect_failed(endpoint, error);
        self.1.on_connect_failed(endpoint, error);
    }
    fn on_disconnected(&mut self, reason: &DisconnectReason) {
        self.0.on_disconnected(reason);
        self.1.on_disconnected(reason);
    }
    fn on_exhausted(&mut self) {
        self.0.on_exhausted();
        self.1.on_exhausted();
    }
    fn on_stopped(&mut self) {
        self.0.on_stopped();
        self.1.on_stopped();
    }
}

/// Writes every notification to the `tracing` log.
#[derive(Debug, Clone)]
pub struct LoggingObserver {
    container_id: String,
}

impl LoggingObserver {
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
        }
    }
}

impl ConnectionObserver for LoggingObserver {
    fn on_connecting(&mut self, endpoint: &Endpoint) {
        tracing::info!(container = %self.container_id, endpoint = %endpoint, "Connecting");
    }

    fn on_connected(&mut self, endpoint: &Endpoint) {
        tracing::info!(container = %self.container_id, endpoint = %endpoint, "Connected to {}", endpoint);
    }

    fn on_connect_failed(&mut self, endpoint: &Endpoint, error: &ConnectError) {
        tracing::warn!(
            container = %self.container_id,
            endpoint = %endpoint,
            kind = error.kind(),
            error = %error,
            "Connect attempt failed"
        );
    }

    fn on_disconnected(&mut self, reason: &DisconnectReason) {
        tracing::warn!(container = %self.container_id, reason = %reason, "Disconnected from broker");
    }

    fn on_exhausted(&mut self) {
        tracing::error!(container = %self.container_id, "Reconnect attempts exhausted, giving up");
    }

    fn on_stopped(&mut self) {
        tracing::info!(container = %self.container_id, "Connection supervisor stopped");
    }
}
