use std::panic::Location;
use std::path::PathBuf;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Failed to launch R at {path}: {source} {location}")]
    SpawnFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("R exited with code {code:?} before the server was ready: {diagnostic} {location}")]
    CrashBeforeReady {
        code: Option<i32>,
        diagnostic: String,
        location: ErrorLocation,
    },

    #[error("R exited cleanly before the server signalled readiness {location}")]
    CleanExitRejected { location: ErrorLocation },

    #[error("A backend process is already running (PID {pid}) {location}")]
    AlreadyRunning { pid: u32, location: ErrorLocation },

    #[error("No available port in range {start}-{end} {location}")]
    NoAvailablePort {
        start: u16,
        end: u16,
        location: ErrorLocation,
    },

    #[error("Backend startup aborted: {message} {location}")]
    StartupAborted {
        message: String,
        location: ErrorLocation,
    },

    #[error("HTTP error: {source} {location}")]
    Http {
        #[source]
        source: reqwest::Error,
        location: ErrorLocation,
    },

    #[error("IO error: {source} {location}")]
    Io {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Configuration error: {source} {location}")]
    Config {
        #[source]
        source: rchic_config::ConfigError,
        location: ErrorLocation,
    },
}

impl SupervisorError {
    /// Whether this error ends the boot sequence.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::SpawnFailure { .. } | Self::CrashBeforeReady { .. } | Self::CleanExitRejected { .. }
        )
    }

    /// Short message for the splash screen.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::SpawnFailure { .. } => "Unable to launch R",
            Self::CrashBeforeReady { .. } => "R stopped during startup",
            Self::CleanExitRejected { .. } => "R exited before the server started",
            Self::AlreadyRunning { .. } => "The R server is already running",
            Self::NoAvailablePort { .. } => "No free local port for the R server",
            Self::StartupAborted { .. } => "R server startup was interrupted",
            Self::Http { .. } => "Could not reach the R server",
            Self::Io { .. } => "File system error",
            Self::Config { .. } => "Invalid configuration",
        }
    }

    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::SpawnFailure { .. } => {
                "R could not be started. Install R from https://cran.r-project.org \
                   or set R_HOME to your R installation."
            }
            Self::CrashBeforeReady { .. } => {
                "The R server crashed while starting. \
                   Check that the required R packages (plumber, jsonlite) are installed."
            }
            Self::CleanExitRejected { .. } => {
                "R finished without starting the server. \
                   Check the logs for the output of the start script."
            }
            Self::AlreadyRunning { .. } => {
                "RCHIC is already running. Close the other window first."
            }
            Self::NoAvailablePort { .. } => {
                "No available ports found in the configured range. \
                   Close other applications or change server.port_range."
            }
            Self::Config { .. } => {
                "Configuration file has invalid settings. \
                   Check the logs for details or delete the config file to use defaults."
            }
            _ => "An unexpected error occurred. Please check the logs for details.",
        }
    }
}

impl From<std::io::Error> for SupervisorError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<reqwest::Error> for SupervisorError {
    #[track_caller]
    fn from(source: reqwest::Error) -> Self {
        Self::Http {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<rchic_config::ConfigError> for SupervisorError {
    #[track_caller]
    fn from(source: rchic_config::ConfigError) -> Self {
        Self::Config {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SupervisorError>;
