//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Supervisor lifecycle events:
//!     → LoggingObserver (structured log events, see supervisor::observer)
//!     → metrics.rs MetricsObserver (counters, state gauge)
//!
//! Consumers:
//!     → stdout via tracing-subscriber (logging.rs)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Container id flows through every log line of a supervisor
//! - Metrics are cheap; without a recorder they cost nothing

pub mod logging;
pub mod metrics;

pub use self::metrics::MetricsObserver;
