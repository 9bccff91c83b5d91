//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for a failover client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Identity used to correlate log lines. A random UUID when unset.
    pub container_id: Option<String>,

    /// Broker addresses (primary + failover).
    pub endpoints: EndpointsConfig,

    /// Reconnect and backoff behaviour.
    pub reconnect: ReconnectConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Broker addresses in priority order.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointsConfig {
    /// Preferred broker (e.g., "amqp://broker-a:5672").
    pub primary: String,

    /// Backup brokers, tried in order after the primary.
    pub failover: Vec<String>,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            primary: "amqp://localhost:5672".to_string(),
            failover: Vec::new(),
        }
    }
}

/// Where to resume after an established connection drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumePolicy {
    /// Continue with the endpoint after the cursor.
    #[default]
    Next,
    /// Retry the primary first.
    Primary,
}

/// Reconnect configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// Base delay for exponential backoff in milliseconds.
    pub initial_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Growth factor per consecutive failure (must be > 1.0).
    pub multiplier: f64,

    /// Consecutive failures before giving up. Unlimited when absent.
    pub max_attempts: Option<u32>,

    /// Add up to 10% random jitter to each delay.
    pub jitter: bool,

    /// Resume policy after a dropped connection.
    pub resume: ResumePolicy,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 10,
            max_delay_ms: 10_000,
            multiplier: 2.0,
            max_attempts: None,
            jitter: false,
            resume: ResumePolicy::Next,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { connect_secs: 5 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
