//! Broker endpoint subsystem.
//!
//! # Data Flow
//! ```text
//! config (primary + failover strings)
//!     → address.rs (parse into Endpoint, apply default scheme/port)
//!     → selector.rs (EndpointList + cursor)
//!     → supervisor asks current()/advance()/reset()
//! ```
//!
//! # Design Decisions
//! - The list is validated once, at construction; it never changes during a run
//! - Ordering is strictly priority order: primary, then failovers, then wrap
//! - A single-address list is valid and simply repeats

pub mod address;
pub mod selector;

use thiserror::Error;

pub use address::{Endpoint, Scheme};
pub use selector::{EndpointList, EndpointSelector};

/// Errors raised while building the endpoint list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    /// No addresses were supplied at all.
    #[error("endpoint list is empty")]
    EmptyEndpointList,

    /// An address could not be parsed into an endpoint.
    #[error("invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },
}

/// Result type for endpoint operations.
pub type EndpointResult<T> = Result<T, EndpointError>;
