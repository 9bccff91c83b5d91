//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Every endpoint address parses
//! - Validate value ranges (multiplier > 1, delays ordered, timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ClientConfig;
use crate::endpoint::Endpoint;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g. `reconnect.multiplier`).
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.endpoints.primary.trim().is_empty() {
        errors.push(ValidationError::new("endpoints.primary", "primary address is required"));
    } else if let Err(e) = Endpoint::parse(&config.endpoints.primary) {
        errors.push(ValidationError::new("endpoints.primary", e.to_string()));
    }

    for (i, address) in config.endpoints.failover.iter().enumerate() {
        if let Err(e) = Endpoint::parse(address) {
            errors.push(ValidationError::new(format!("endpoints.failover[{}]", i), e.to_string()));
        }
    }

    let reconnect = &config.reconnect;
    if !(reconnect.multiplier.is_finite() && reconnect.multiplier > 1.0) {
        errors.push(ValidationError::new(
            "reconnect.multiplier",
            format!("must be greater than 1.0, got {}", reconnect.multiplier),
        ));
    }
    if reconnect.max_delay_ms < reconnect.initial_delay_ms {
        errors.push(ValidationError::new(
            "reconnect.max_delay_ms",
            format!(
                "must be at least initial_delay_ms ({} < {})",
                reconnect.max_delay_ms, reconnect.initial_delay_ms
            ),
        ));
    }
    if reconnect.max_attempts == Some(0) {
        errors.push(ValidationError::new(
            "reconnect.max_attempts",
            "must be at least 1 (omit it to retry forever)",
        ));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::new("timeouts.connect_secs", "must be greater than 0"));
    }

    let obs = &config.observability;
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", obs.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
