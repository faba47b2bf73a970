use crate::{CleanExitPolicy, ConfigError, ConfigErrorResult};

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_SETTLE_DELAY_MS: u64 = 1000;
pub const MAX_SETTLE_DELAY_MS: u64 = 10_000;

pub const DEFAULT_GRACE_PERIOD_MS: u64 = 5000;
pub const MIN_GRACE_PERIOD_MS: u64 = 100;
pub const MAX_GRACE_PERIOD_MS: u64 = 120_000;

pub const DEFAULT_STDERR_CAPACITY: usize = 50;
pub const MIN_STDERR_CAPACITY: usize = 2;
pub const MAX_STDERR_CAPACITY: usize = 10_000;

/// Timers and policies applied while the backend process is starting.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StartupConfig {
    /// Delay between a ready line and settling the start
    pub settle_delay_ms: u64,
    /// Last-resort timer that settles the start successfully
    pub grace_period_ms: u64,
    /// Number of stderr lines kept for crash diagnostics
    pub stderr_capacity: usize,
    /// Handling of an exit code 0 before any ready signal
    pub clean_exit: CleanExitPolicy,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            grace_period_ms: DEFAULT_GRACE_PERIOD_MS,
            stderr_capacity: DEFAULT_STDERR_CAPACITY,
            clean_exit: CleanExitPolicy::default(),
        }
    }
}

impl StartupConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.settle_delay_ms > MAX_SETTLE_DELAY_MS {
            return Err(ConfigError::invalid("startup", format!(
                "startup.settle_delay_ms must be <= {}, got {}",
                MAX_SETTLE_DELAY_MS, self.settle_delay_ms
            )));
        }

        if self.grace_period_ms < MIN_GRACE_PERIOD_MS || self.grace_period_ms > MAX_GRACE_PERIOD_MS
        {
            return Err(ConfigError::invalid("startup", format!(
                "startup.grace_period_ms must be {}-{}, got {}",
                MIN_GRACE_PERIOD_MS, MAX_GRACE_PERIOD_MS, self.grace_period_ms
            )));
        }

        if self.stderr_capacity < MIN_STDERR_CAPACITY || self.stderr_capacity > MAX_STDERR_CAPACITY
        {
            return Err(ConfigError::invalid("startup", format!(
                "startup.stderr_capacity must be {}-{}, got {}",
                MIN_STDERR_CAPACITY, MAX_STDERR_CAPACITY, self.stderr_capacity
            )));
        }

        Ok(())
    }
}
