mod backend_config;
mod checks_config;
mod clean_exit_policy;
mod config;
mod error;
mod log_level;
mod logging_config;
mod readiness_config;
mod server_config;
mod startup_config;

#[cfg(test)]
mod tests;

pub use backend_config::BackendConfig;
pub use checks_config::ChecksConfig;
pub use clean_exit_policy::CleanExitPolicy;
pub use config::LauncherConfig;
pub use error::{ConfigError, ConfigErrorResult};
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use readiness_config::ReadinessConfig;
pub use server_config::ServerConfig;
pub use startup_config::StartupConfig;

pub const CONFIG_DIR_ENV: &str = "RCHIC_CONFIG_DIR";
pub const CONFIG_FILENAME: &str = "config.toml";
const APP_DIR_NAME: &str = "rchic";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PREFERRED_PORT: u16 = 8484;
const DEFAULT_PORT_RANGE_START: u16 = 8484;
const DEFAULT_PORT_RANGE_END: u16 = 8584;
const MIN_PORT: u16 = 1024;

const DEFAULT_HOME_ENV_VAR: &str = "R_HOME";
const DEFAULT_ENTRY_SCRIPT: &str = "start-server.R";

const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "logs";
