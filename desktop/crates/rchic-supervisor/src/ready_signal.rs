use std::fmt;

/// What resolved the startup race in favour of proceeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyTrigger {
    /// A ready line was seen and the settle delay passed
    OutputSignal,
    /// The grace period ran out with the process still alive
    GracePeriod,
    /// The process exited with code 0 and policy allows proceeding
    CleanExit,
}

impl fmt::Display for ReadyTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::OutputSignal => "ready signal",
            Self::GracePeriod => "grace period",
            Self::CleanExit => "clean exit",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadySignal {
    pub port: u16,
    pub trigger: ReadyTrigger,
}
