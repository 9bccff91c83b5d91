//! Exponential reconnect backoff with optional jitter.

use std::time::Duration;
use rand::Rng;

use crate::config::schema::ReconnectConfig;

/// Delay schedule between reconnect attempts.
///
/// `delay(n) = min(max_delay, initial_delay * multiplier^n)` where `n` is the
/// number of consecutive failures since the last successful connection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    /// Give up after this many consecutive failures. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            max_attempts: None,
        }
    }
}

impl From<&ReconnectConfig> for BackoffPolicy {
    fn from(config: &ReconnectConfig) -> Self {
        Self {
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            multiplier: config.multiplier,
            max_attempts: config.max_attempts,
        }
    }
}

impl BackoffPolicy {
    /// Delay to wait after `failures` consecutive failed attempts.
    ///
    /// A multiplier that yields a non-positive or non-finite delay falls back
    /// to `max_delay`.
    pub fn delay(&self, failures: u32) -> Duration {
        if self.initial_delay.is_zero() {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(failures).unwrap_or(i32::MAX);
        let scaled = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let max = self.max_delay.as_secs_f64();

        if !scaled.is_finite() || scaled <= 0.0 || scaled >= max {
            return self.max_delay;
        }
        Duration::from_secs_f64(scaled)
    }

    /// `delay` plus up to 10% random jitter, still capped at `max_delay`.
    pub fn jittered_delay(&self, failures: u32) -> Duration {
        let base = self.delay(failures);
        let jitter = rand::thread_rng().gen_range(0.0..=0.1) * base.as_secs_f64();
        (base + Duration::from_secs_f64(jitter)).min(self.max_delay)
    }

    /// True once `failures` reaches the configured attempt limit.
    pub fn is_exhausted(&self, failures: u32) -> bool {
        matches!(self.max_attempts, Some(max) if failures >= max)
    }
}
