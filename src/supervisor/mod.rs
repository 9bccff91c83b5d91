//! Connection supervision subsystem.
//!
//! # Data Flow
//! ```text
//! start()
//!     → machine.rs: Idle → Connecting, emit on_connecting(primary)
//!     → driver.rs:  transport.connect() under the connect timeout
//!         ok   → Connected, emit on_connected, reset backoff + cursor
//!                → wait for Connection::closed() → Reconnecting
//!         fail → Reconnecting, emit on_connect_failed
//!                → attempt limit? → Failed, emit on_exhausted
//!                → sleep backoff → selector.advance() → Connecting
//! ```
//!
//! # Design Decisions
//! - The state machine is synchronous and I/O free; the driver does the waiting
//! - Exactly one observer callback per state change, emitted inline
//! - Attempt ids guard against late results after `stop()`
//! - Connect errors are absorbed; only exhaustion is returned to the caller

pub mod driver;
pub mod machine;
pub mod observer;
pub mod state;

use thiserror::Error;

use crate::config::validation::ValidationError;
use crate::endpoint::EndpointError;

pub use crate::config::schema::ResumePolicy;
pub use driver::run;
pub use machine::{Action, AttemptId, Supervisor};
pub use observer::{ConnectionObserver, LoggingObserver};
pub use state::ConnectionState;

/// Errors returned to the owner of a supervisor.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The configuration failed semantic validation; the supervisor cannot start.
    #[error("invalid configuration: {}", join_errors(.0))]
    Config(Vec<ValidationError>),

    /// The endpoint configuration is unusable; the supervisor cannot start.
    #[error("invalid endpoint configuration: {0}")]
    Endpoints(#[from] EndpointError),

    /// The configured attempt limit was reached.
    #[error("reconnect attempts exhausted after {attempts} consecutive failures")]
    AttemptsExhausted { attempts: u32 },

    /// `start()` was called while a connection is already being managed.
    #[error("supervisor already running (state: {0})")]
    AlreadyRunning(ConnectionState),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for supervisor operations.
pub type SupervisorResult<T> = Result<T, SupervisorError>;
