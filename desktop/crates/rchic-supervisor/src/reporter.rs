use crate::{StartupStep, StepStatus};

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Sink for startup progress. Reporting never fails the caller.
pub trait StatusReporter: Send + Sync {
    fn report(&self, step: StartupStep);
}

/// Forwards steps to an attached observer, dropping them while detached.
#[derive(Debug, Default)]
pub struct ChannelReporter {
    observer: RwLock<Option<mpsc::UnboundedSender<StartupStep>>>,
}

impl ChannelReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new observer, replacing any previous one.
    pub fn attach(&self) -> mpsc::UnboundedReceiver<StartupStep> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.observer.write().unwrap_or_else(PoisonError::into_inner) = Some(tx);
        rx
    }

    pub fn detach(&self) {
        *self.observer.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn is_attached(&self) -> bool {
        self.observer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }
}

impl StatusReporter for ChannelReporter {
    fn report(&self, step: StartupStep) {
        let guard = self.observer.read().unwrap_or_else(PoisonError::into_inner);

        match guard.as_ref() {
            Some(tx) => {
                if tx.send(step).is_err() {
                    debug!("Startup observer is gone, dropping step");
                }
            }
            None => debug!("No startup observer attached, dropping step {}", step.id),
        }
    }
}

/// Writes each step to the log at a level matching its status.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl StatusReporter for LogReporter {
    fn report(&self, step: StartupStep) {
        let detail = step.detail.as_deref().unwrap_or("");
        match step.status {
            StepStatus::Pending => info!("[{}] {}...", step.id, step.message),
            StepStatus::Success => info!("[{}] {} {}", step.id, step.message, detail),
            StepStatus::Warning => warn!("[{}] {} {}", step.id, step.message, detail),
            StepStatus::Error => error!("[{}] {} {}", step.id, step.message, detail),
        }
    }
}

/// Sends each step to several reporters in order.
#[derive(Default)]
pub struct FanoutReporter {
    reporters: Vec<Arc<dyn StatusReporter>>,
}

impl FanoutReporter {
    pub fn new(reporters: Vec<Arc<dyn StatusReporter>>) -> Self {
        Self { reporters }
    }

    pub fn with(mut self, reporter: Arc<dyn StatusReporter>) -> Self {
        self.reporters.push(reporter);
        self
    }
}

impl StatusReporter for FanoutReporter {
    fn report(&self, step: StartupStep) {
        for reporter in &self.reporters {
            reporter.report(step.clone());
        }
    }
}
