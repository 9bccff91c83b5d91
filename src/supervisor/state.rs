//! Connection lifecycle state.
//!
//! # State Transitions
//! ```text
//! Idle/Failed  → Connecting:   start()
//! Connecting   → Connected:    connect succeeded
//! Connecting   → Reconnecting: connect failed or timed out
//! Reconnecting → Connecting:   backoff elapsed (next endpoint)
//! Connected    → Reconnecting: remote disconnect
//! Reconnecting → Failed:       attempt limit reached
//! any but Failed → Idle:       stop()
//! ```

use std::fmt;

/// State of the single logical connection owned by a supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Connected,
    Reconnecting,
    Failed,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Failed => "failed",
        }
    }

    /// Numeric code exported on the state gauge.
    pub fn as_gauge(self) -> f64 {
        match self {
            ConnectionState::Idle => 0.0,
            ConnectionState::Connecting => 1.0,
            ConnectionState::Connected => 2.0,
            ConnectionState::Reconnecting => 3.0,
            ConnectionState::Failed => 4.0,
        }
    }

    /// States from which `start()` is accepted.
    pub fn can_start(self) -> bool {
        matches!(self, ConnectionState::Idle | ConnectionState::Failed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
