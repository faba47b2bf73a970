//! Port allocation and availability checking.

use crate::SupervisorError;
use crate::error::Result as SupervisorResult;

use std::panic::Location;

use error_location::ErrorLocation;
use rchic_config::ServerConfig;

/// Chooses the port the backend listens on.
pub trait PortAllocator: Send + Sync {
    fn allocate(&self) -> SupervisorResult<u16>;
}

pub struct PortManager {
    host: String,
    preferred: u16,
    range: (u16, u16),
}

impl PortManager {
    pub fn new(host: impl Into<String>, preferred: u16, range: (u16, u16)) -> Self {
        Self {
            host: host.into(),
            preferred,
            range,
        }
    }

    /// Find an available port, preferring the configured one.
    ///
    /// Algorithm:
    /// 1. Try preferred port first
    /// 2. If unavailable, scan range sequentially
    /// 3. Return first available port
    pub fn find_available(&self) -> SupervisorResult<u16> {
        if self.is_available(self.preferred) {
            return Ok(self.preferred);
        }

        for port in self.range.0..=self.range.1 {
            if port != self.preferred && self.is_available(port) {
                return Ok(port);
            }
        }

        Err(SupervisorError::NoAvailablePort {
            start: self.range.0,
            end: self.range.1,
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// A port is free if we can bind it; the listener is dropped right away.
    pub fn is_available(&self, port: u16) -> bool {
        std::net::TcpListener::bind((self.host.as_str(), port)).is_ok()
    }
}

impl From<&ServerConfig> for PortManager {
    fn from(config: &ServerConfig) -> Self {
        Self::new(config.host.clone(), config.preferred_port, config.port_range)
    }
}

impl PortAllocator for PortManager {
    fn allocate(&self) -> SupervisorResult<u16> {
        self.find_available()
    }
}
