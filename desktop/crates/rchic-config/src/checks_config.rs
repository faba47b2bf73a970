use crate::{ConfigError, ConfigErrorResult};

use serde::Deserialize;

pub const DEFAULT_MEMORY_SOFT_MIN_MB: u64 = 1024;
pub const DEFAULT_MEMORY_HARD_MIN_MB: u64 = 256;
pub const DEFAULT_DISK_SOFT_MIN_MB: u64 = 500;
pub const DEFAULT_DISK_HARD_MIN_MB: u64 = 100;

/// Thresholds for the advisory host checks run before locating R.
///
/// Below the soft minimum the check reports a warning, below the hard
/// minimum it reports an error. Neither blocks the boot.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChecksConfig {
    pub memory_soft_min_mb: u64,
    pub memory_hard_min_mb: u64,
    pub disk_soft_min_mb: u64,
    pub disk_hard_min_mb: u64,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            memory_soft_min_mb: DEFAULT_MEMORY_SOFT_MIN_MB,
            memory_hard_min_mb: DEFAULT_MEMORY_HARD_MIN_MB,
            disk_soft_min_mb: DEFAULT_DISK_SOFT_MIN_MB,
            disk_hard_min_mb: DEFAULT_DISK_HARD_MIN_MB,
        }
    }
}

impl ChecksConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.memory_hard_min_mb > self.memory_soft_min_mb {
            return Err(ConfigError::invalid("checks", format!(
                "checks.memory_hard_min_mb ({}) must not exceed memory_soft_min_mb ({})",
                self.memory_hard_min_mb, self.memory_soft_min_mb
            )));
        }

        if self.disk_hard_min_mb > self.disk_soft_min_mb {
            return Err(ConfigError::invalid("checks", format!(
                "checks.disk_hard_min_mb ({}) must not exceed disk_soft_min_mb ({})",
                self.disk_hard_min_mb, self.disk_soft_min_mb
            )));
        }

        Ok(())
    }
}
