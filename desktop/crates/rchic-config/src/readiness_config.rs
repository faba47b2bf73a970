use crate::{ConfigError, ConfigErrorResult};

use std::time::Duration;

use serde::Deserialize;

// Readiness constraints
pub const MIN_MAX_ATTEMPTS: u32 = 1;
pub const MAX_MAX_ATTEMPTS: u32 = 600;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;

pub const MIN_ATTEMPT_TIMEOUT_MS: u64 = 50;
pub const MAX_ATTEMPT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_ATTEMPT_TIMEOUT_MS: u64 = 1000;

pub const MAX_INTERVAL_MS: u64 = 10_000;
pub const DEFAULT_INTERVAL_MS: u64 = 500;

/// Health probe schedule used after the process has started.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Total number of health requests before giving up
    pub max_attempts: u32,
    /// Timeout of a single health request
    pub attempt_timeout_ms: u64,
    /// Pause between two attempts
    pub interval_ms: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            attempt_timeout_ms: DEFAULT_ATTEMPT_TIMEOUT_MS,
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

impl ReadinessConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.max_attempts < MIN_MAX_ATTEMPTS || self.max_attempts > MAX_MAX_ATTEMPTS {
            return Err(ConfigError::invalid("readiness", format!(
                "readiness.max_attempts must be {}-{}, got {}",
                MIN_MAX_ATTEMPTS, MAX_MAX_ATTEMPTS, self.max_attempts
            )));
        }

        if self.attempt_timeout_ms < MIN_ATTEMPT_TIMEOUT_MS
            || self.attempt_timeout_ms > MAX_ATTEMPT_TIMEOUT_MS
        {
            return Err(ConfigError::invalid("readiness", format!(
                "readiness.attempt_timeout_ms must be {}-{}, got {}",
                MIN_ATTEMPT_TIMEOUT_MS, MAX_ATTEMPT_TIMEOUT_MS, self.attempt_timeout_ms
            )));
        }

        if self.interval_ms > MAX_INTERVAL_MS {
            return Err(ConfigError::invalid("readiness", format!(
                "readiness.interval_ms must be <= {}, got {}",
                MAX_INTERVAL_MS, self.interval_ms
            )));
        }

        Ok(())
    }
}
