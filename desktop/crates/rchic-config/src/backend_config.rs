use crate::{ConfigError, ConfigErrorResult, DEFAULT_ENTRY_SCRIPT, DEFAULT_HOME_ENV_VAR};

use serde::Deserialize;

/// How the R backend is found and invoked.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Installation-root override variable, checked before system paths
    pub home_env_var: String,
    /// Entry script file name inside the primary resource directory
    pub entry_script: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            home_env_var: String::from(DEFAULT_HOME_ENV_VAR),
            entry_script: String::from(DEFAULT_ENTRY_SCRIPT),
        }
    }
}

impl BackendConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.home_env_var.trim().is_empty() {
            return Err(ConfigError::invalid("backend", "home_env_var must not be empty"));
        }

        if self.entry_script.trim().is_empty() {
            return Err(ConfigError::invalid("backend", "entry_script must not be empty"));
        }

        let script = std::path::Path::new(&self.entry_script);
        if script.is_absolute() || self.entry_script.contains("..") {
            return Err(ConfigError::invalid(
                "backend",
                "entry_script must be a relative file name without '..'",
            ));
        }

        Ok(())
    }
}
