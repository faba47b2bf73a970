//! Decides how a backend launch ends.
//!
//! The monitor is a plain state machine. The supervisor feeds it events
//! from the output readers, the exit watcher and timers, and carries out
//! the actions it returns. Exactly one `Settle` action is ever produced.

use crate::stderr_tail::{push_line, snapshot};
use crate::{OutputPatterns, ReadyTrigger, STEP_BACKEND_OUTPUT, SharedStderrTail, StartupStep};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rchic_config::CleanExitPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    Line { stream: OutputStream, text: String },
    /// The OS could not run or wait on the process
    ProcessError { message: String },
    /// `code` is `None` when a signal ended the process
    Exited { code: Option<i32> },
    SettleDelayElapsed,
    GracePeriodElapsed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Ready(ReadyTrigger),
    SpawnFailed { message: String },
    Crashed { code: Option<i32>, diagnostic: String },
    CleanExitRejected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorAction {
    ArmSettleDelay(Duration),
    Report(StartupStep),
    Settle(Settlement),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Starting,
    ReadySignaled,
    Settled,
}

pub struct StartupMonitor {
    phase: Phase,
    patterns: Arc<OutputPatterns>,
    tail: SharedStderrTail,
    settle_delay: Duration,
    clean_exit: CleanExitPolicy,
    warned: bool,
}

impl StartupMonitor {
    pub fn new(
        patterns: Arc<OutputPatterns>,
        tail: SharedStderrTail,
        settle_delay: Duration,
        clean_exit: CleanExitPolicy,
    ) -> Self {
        Self {
            phase: Phase::Starting,
            patterns,
            tail,
            settle_delay,
            clean_exit,
            warned: false,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.phase == Phase::Settled
    }

    pub fn handle(&mut self, event: MonitorEvent) -> Vec<MonitorAction> {
        match event {
            MonitorEvent::Line { stream, text } => self.on_line(stream, &text),
            MonitorEvent::ProcessError { message } => {
                self.settle(Settlement::SpawnFailed { message })
            }
            MonitorEvent::Exited { code } => self.on_exit(code),
            MonitorEvent::SettleDelayElapsed => {
                if self.phase == Phase::ReadySignaled {
                    self.settle(Settlement::Ready(ReadyTrigger::OutputSignal))
                } else {
                    Vec::new()
                }
            }
            MonitorEvent::GracePeriodElapsed => {
                let trigger = match self.phase {
                    Phase::ReadySignaled => ReadyTrigger::OutputSignal,
                    _ => ReadyTrigger::GracePeriod,
                };
                self.settle(Settlement::Ready(trigger))
            }
        }
    }

    fn on_line(&mut self, stream: OutputStream, text: &str) -> Vec<MonitorAction> {
        // The tail keeps collecting after settlement for later diagnostics
        if stream == OutputStream::Stderr {
            push_line(&self.tail, text);
        }

        if self.phase == Phase::Settled {
            return Vec::new();
        }

        if self.patterns.is_ready_signal(text) {
            if self.phase == Phase::Starting {
                self.phase = Phase::ReadySignaled;
                return vec![MonitorAction::ArmSettleDelay(self.settle_delay)];
            }
            return Vec::new();
        }

        if !self.warned && self.patterns.is_error_line(text) {
            self.warned = true;
            let step = StartupStep::warning(STEP_BACKEND_OUTPUT, "R reported a problem while starting")
                .with_detail(text.trim());
            return vec![MonitorAction::Report(step)];
        }

        Vec::new()
    }

    fn on_exit(&mut self, code: Option<i32>) -> Vec<MonitorAction> {
        match code {
            Some(0) => match self.clean_exit {
                CleanExitPolicy::Proceed => self.settle(Settlement::Ready(ReadyTrigger::CleanExit)),
                CleanExitPolicy::Fail => self.settle(Settlement::CleanExitRejected),
            },
            _ => {
                let lines = snapshot(&self.tail);
                let diagnostic = self
                    .patterns
                    .summarize(lines.iter().map(String::as_str))
                    .unwrap_or_else(|| match code {
                        Some(code) => format!("exit code {code}"),
                        None => "terminated by signal".to_string(),
                    });
                self.settle(Settlement::Crashed { code, diagnostic })
            }
        }
    }

    fn settle(&mut self, settlement: Settlement) -> Vec<MonitorAction> {
        if self.phase == Phase::Settled {
            return Vec::new();
        }
        self.phase = Phase::Settled;
        vec![MonitorAction::Settle(settlement)]
    }
}
