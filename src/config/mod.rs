//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) and/or command line
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → Supervisor::from_config
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; endpoints never change during a run
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::ClientConfig;
pub use schema::EndpointsConfig;
pub use schema::ReconnectConfig;
pub use schema::ResumePolicy;
