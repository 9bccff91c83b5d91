//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Connect attempt:
//!     → timeouts.rs (bound the attempt by the connect deadline)
//!     → On failure: backoff.rs (how long to wait, whether to give up)
//!     → supervisor advances the endpoint cursor and retries
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every connect attempt has a deadline
//! - A timeout is just another connect failure
//! - Backoff is a pure function of the consecutive failure count

pub mod backoff;
pub mod timeouts;

pub use backoff::BackoffPolicy;
