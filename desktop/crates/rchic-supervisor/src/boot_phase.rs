use std::fmt;

/// Where the boot sequence stands. Published on a watch channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootPhase {
    Init,
    EnvironmentChecks,
    Locating,
    Spawning,
    AwaitingReady,
    /// `degraded` when the health endpoint never answered
    Ready { port: u16, degraded: bool },
    Failed { error: String },
    /// Teardown ran
    Stopped,
}

impl BootPhase {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready { .. } | Self::Failed { .. } | Self::Stopped)
    }
}

impl fmt::Display for BootPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::EnvironmentChecks => write!(f, "environment checks"),
            Self::Locating => write!(f, "locating R"),
            Self::Spawning => write!(f, "starting R"),
            Self::AwaitingReady => write!(f, "waiting for R server"),
            Self::Ready { port, degraded: false } => write!(f, "ready on port {port}"),
            Self::Ready { port, degraded: true } => write!(f, "ready on port {port} (unconfirmed)"),
            Self::Failed { error } => write!(f, "failed: {error}"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Why teardown was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownTrigger {
    ExplicitQuit,
    AllWindowsClosed,
    /// Uncaught fault in the host
    Fault,
    /// OS signal number
    Signal(i32),
}

impl fmt::Display for ShutdownTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExplicitQuit => write!(f, "explicit quit"),
            Self::AllWindowsClosed => write!(f, "all windows closed"),
            Self::Fault => write!(f, "uncaught fault"),
            Self::Signal(signal) => write!(f, "signal {signal}"),
        }
    }
}
