//! Transport collaborator interface.
//!
//! # Responsibilities
//! - Open a connection to one endpoint (`Transport::connect`)
//! - Report, exactly once, when an established connection drops
//!   (`Connection::closed`)
//!
//! # Design Decisions
//! - The supervisor never touches sockets; it only sees these traits
//! - Connect deadlines are applied by the driver, not by transports
//! - Wire protocol, SASL and TLS belong to the transport implementation

pub mod tcp;

use std::fmt;
use std::future::Future;
use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::endpoint::Endpoint;

pub use tcp::{TcpConnection, TcpTransport};

/// Failure of a single connect attempt. Always recoverable by retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// The broker actively refused the connection.
    #[error("connection refused: {0}")]
    Refused(String),

    /// The attempt did not complete within the connect deadline.
    #[error("connect timed out after {0:?}")]
    Timeout(Duration),

    /// Any other transport-level failure (DNS, routing, handshake).
    #[error("transport error: {0}")]
    Io(String),
}

impl ConnectError {
    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ConnectError::Refused(_) => "refused",
            ConnectError::Timeout(_) => "timeout",
            ConnectError::Io(_) => "io",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ConnectError::Timeout(_))
    }
}

impl From<io::Error> for ConnectError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => ConnectError::Refused(err.to_string()),
            _ => ConnectError::Io(err.to_string()),
        }
    }
}

/// Why an established connection went away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The peer closed the connection.
    Closed,
    /// The connection failed with an error.
    Error(String),
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisconnectReason::Closed => write!(f, "connection closed by peer"),
            DisconnectReason::Error(e) => write!(f, "connection error: {}", e),
        }
    }
}

/// Opens connections to broker endpoints.
pub trait Transport {
    type Connection: Connection;

    /// Attempt to connect. Resolves exactly once.
    fn connect(
        &self,
        endpoint: &Endpoint,
    ) -> impl Future<Output = Result<Self::Connection, ConnectError>>;
}

/// An established connection handle.
pub trait Connection {
    /// Resolves once the connection drops. One-shot: not polled again after it resolves.
    fn closed(&mut self) -> impl Future<Output = DisconnectReason>;
}
