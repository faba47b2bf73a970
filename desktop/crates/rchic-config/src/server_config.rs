use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_HOST, DEFAULT_PORT_RANGE_END,
    DEFAULT_PORT_RANGE_START, DEFAULT_PREFERRED_PORT, MIN_PORT,
};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Loopback host the backend binds and the probe targets
    pub host: String,
    /// Base value for the dynamic port search
    pub preferred_port: u16,
    /// Inclusive range scanned when the preferred port is taken
    pub port_range: (u16, u16),
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from(DEFAULT_HOST),
            preferred_port: DEFAULT_PREFERRED_PORT,
            port_range: (DEFAULT_PORT_RANGE_START, DEFAULT_PORT_RANGE_END),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.host != DEFAULT_HOST && self.host != "localhost" {
            return Err(ConfigError::invalid("server", format!(
                "server.host must be {DEFAULT_HOST} or localhost, got {}",
                self.host
            )));
        }

        if self.preferred_port < MIN_PORT {
            return Err(ConfigError::invalid("server", format!(
                "server.preferred_port must be >= {}, got {}",
                MIN_PORT, self.preferred_port
            )));
        }

        let (start, end) = self.port_range;
        if start > end {
            return Err(ConfigError::invalid("server", format!(
                "server.port_range start ({start}) must not exceed end ({end})"
            )));
        }

        if start < MIN_PORT {
            return Err(ConfigError::invalid("server", format!(
                "server.port_range must start at >= {MIN_PORT}, got {start}"
            )));
        }

        if self.preferred_port < start || self.preferred_port > end {
            return Err(ConfigError::invalid("server", format!(
                "server.preferred_port {} is outside port_range {start}-{end}",
                self.preferred_port
            )));
        }

        Ok(())
    }
}
