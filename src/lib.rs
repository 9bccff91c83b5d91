//! Reconnecting broker client with ordered failover.
//!
//! A [`Supervisor`] owns one logical connection. It dials the primary
//! endpoint, fails over through the backup endpoints in priority order,
//! backs off exponentially between attempts, and reports every lifecycle
//! change to a [`ConnectionObserver`].

// Core subsystems
pub mod config;
pub mod endpoint;
pub mod supervisor;
pub mod transport;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::ClientConfig;
pub use endpoint::{Endpoint, EndpointList, EndpointSelector};
pub use lifecycle::Shutdown;
pub use resilience::BackoffPolicy;
pub use supervisor::{ConnectionObserver, ConnectionState, Supervisor, SupervisorError};
pub use transport::{ConnectError, DisconnectReason, TcpTransport, Transport};
