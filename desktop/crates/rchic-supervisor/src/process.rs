use crate::SharedStderrTail;
use crate::stderr_tail::snapshot;

use std::path::PathBuf;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Spawned, startup not yet settled
    Starting,
    /// Startup settled in favour of proceeding
    Running,
}

/// The live backend child, owned by the supervisor's slot.
#[derive(Debug, Clone)]
pub struct SupervisedProcess {
    pub pid: u32,
    pub program: PathBuf,
    pub port: u16,
    pub started_at: DateTime<Utc>,
    pub state: ProcessState,
    stderr: SharedStderrTail,
}

impl SupervisedProcess {
    pub(crate) fn new(pid: u32, program: PathBuf, port: u16, stderr: SharedStderrTail) -> Self {
        Self {
            pid,
            program,
            port,
            started_at: Utc::now(),
            state: ProcessState::Starting,
            stderr,
        }
    }

    /// Most recent stderr lines, oldest first.
    pub fn recent_stderr(&self) -> Vec<String> {
        snapshot(&self.stderr)
    }
}
