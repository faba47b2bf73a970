use crate::{
    APP_DIR_NAME, BackendConfig, CONFIG_DIR_ENV, CONFIG_FILENAME, ChecksConfig, ConfigError,
    ConfigErrorResult, LoggingConfig, ReadinessConfig, ServerConfig, StartupConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LauncherConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub startup: StartupConfig,
    pub readiness: ReadinessConfig,
    pub checks: ChecksConfig,
    pub logging: LoggingConfig,
}

impl LauncherConfig {
    /// Load config from the default config directory.
    ///
    /// Loading order:
    /// 1. RCHIC_CONFIG_DIR env var, else the platform config dir + `rchic`
    /// 2. Auto-create config directory if it doesn't exist
    /// 3. Load config.toml if it exists, else use defaults
    /// 4. Apply RCHIC_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;
        Self::load_from(&config_dir)
    }

    /// Load config from an explicit directory.
    pub fn load_from(config_dir: &Path) -> ConfigErrorResult<Self> {
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.to_path_buf(),
                source: e,
            })?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            LauncherConfig::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: RCHIC_CONFIG_DIR env var > <platform config dir>/rchic
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(ConfigError::NoConfigDir {
                var: CONFIG_DIR_ENV,
            })
    }

    /// Validate all configuration.
    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.server.validate()?;
        self.backend.validate()?;
        self.startup.validate()?;
        self.readiness.validate()?;
        self.checks.validate()?;

        Ok(())
    }

    /// Resolve the log directory against the config directory.
    pub fn log_dir(&self, config_dir: &Path) -> PathBuf {
        let dir = Path::new(&self.logging.directory);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            config_dir.join(dir)
        }
    }

    /// Log configuration summary.
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  server: {} preferred port {} (range {}-{})",
            self.server.host,
            self.server.preferred_port,
            self.server.port_range.0,
            self.server.port_range.1
        );
        info!(
            "  backend: home override ${}, entry script {}",
            self.backend.home_env_var, self.backend.entry_script
        );
        info!(
            "  startup: settle={}ms, grace={}ms, stderr tail={}, clean exit={:?}",
            self.startup.settle_delay_ms,
            self.startup.grace_period_ms,
            self.startup.stderr_capacity,
            self.startup.clean_exit
        );
        info!(
            "  readiness: attempts={}, timeout={}ms, interval={}ms",
            self.readiness.max_attempts,
            self.readiness.attempt_timeout_ms,
            self.readiness.interval_ms
        );
        info!(
            "  checks: memory {}/{}MB, disk {}/{}MB (soft/hard)",
            self.checks.memory_soft_min_mb,
            self.checks.memory_hard_min_mb,
            self.checks.disk_soft_min_mb,
            self.checks.disk_hard_min_mb
        );
        info!(
            "  logging: {} in {}",
            self.logging.level, self.logging.directory
        );
    }

    fn apply_env_overrides(&mut self) {
        // Server
        Self::apply_env_string("RCHIC_SERVER_HOST", &mut self.server.host);
        Self::apply_env_parse("RCHIC_SERVER_PORT", &mut self.server.preferred_port);

        // Backend
        Self::apply_env_string(
            "RCHIC_BACKEND_HOME_ENV_VAR",
            &mut self.backend.home_env_var,
        );
        Self::apply_env_string(
            "RCHIC_BACKEND_ENTRY_SCRIPT",
            &mut self.backend.entry_script,
        );

        // Startup
        Self::apply_env_parse(
            "RCHIC_STARTUP_SETTLE_DELAY_MS",
            &mut self.startup.settle_delay_ms,
        );
        Self::apply_env_parse(
            "RCHIC_STARTUP_GRACE_PERIOD_MS",
            &mut self.startup.grace_period_ms,
        );
        Self::apply_env_parse(
            "RCHIC_STARTUP_STDERR_CAPACITY",
            &mut self.startup.stderr_capacity,
        );
        Self::apply_env_parse("RCHIC_STARTUP_CLEAN_EXIT", &mut self.startup.clean_exit);

        // Readiness
        Self::apply_env_parse(
            "RCHIC_READINESS_MAX_ATTEMPTS",
            &mut self.readiness.max_attempts,
        );
        Self::apply_env_parse(
            "RCHIC_READINESS_ATTEMPT_TIMEOUT_MS",
            &mut self.readiness.attempt_timeout_ms,
        );
        Self::apply_env_parse(
            "RCHIC_READINESS_INTERVAL_MS",
            &mut self.readiness.interval_ms,
        );

        // Checks
        Self::apply_env_parse(
            "RCHIC_CHECKS_MEMORY_SOFT_MIN_MB",
            &mut self.checks.memory_soft_min_mb,
        );
        Self::apply_env_parse(
            "RCHIC_CHECKS_MEMORY_HARD_MIN_MB",
            &mut self.checks.memory_hard_min_mb,
        );
        Self::apply_env_parse(
            "RCHIC_CHECKS_DISK_SOFT_MIN_MB",
            &mut self.checks.disk_soft_min_mb,
        );
        Self::apply_env_parse(
            "RCHIC_CHECKS_DISK_HARD_MIN_MB",
            &mut self.checks.disk_hard_min_mb,
        );

        // Logging
        Self::apply_env_parse("RCHIC_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_string("RCHIC_LOG_DIR", &mut self.logging.directory);
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }
}
