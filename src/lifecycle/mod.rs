//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Init logging/metrics → Start supervisor
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → driver calls stop() → supervisor Idle
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: configuration errors are fatal before any connect
//! - Stopping a supervisor invalidates its in-flight attempt

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
