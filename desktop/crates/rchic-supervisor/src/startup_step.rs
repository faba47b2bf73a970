use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Success,
    Warning,
    Error,
}

impl StepStatus {
    /// Anything but pending closes the step.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// One progress update for the splash screen. Later updates with the same
/// id replace earlier ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartupStep {
    pub id: String,
    pub status: StepStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl StartupStep {
    pub fn new(id: impl Into<String>, status: StepStatus, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status,
            message: message.into(),
            detail: None,
            timestamp: Utc::now(),
        }
    }

    pub fn pending(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(id, StepStatus::Pending, message)
    }

    pub fn success(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(id, StepStatus::Success, message)
    }

    pub fn warning(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(id, StepStatus::Warning, message)
    }

    pub fn error(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(id, StepStatus::Error, message)
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
