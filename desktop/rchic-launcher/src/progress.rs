//! JSON-lines progress for a display layer reading our stdout.

use rchic_supervisor::StartupStep;

use std::io::Write;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ProgressEvent<'a> {
    Step(&'a StartupStep),
    Ready {
        url: &'a str,
        port: u16,
        degraded: bool,
    },
    Failed {
        summary: &'a str,
        hint: &'a str,
        detail: String,
    },
}

pub fn to_line(event: &ProgressEvent<'_>) -> serde_json::Result<String> {
    serde_json::to_string(event)
}

/// Write one event to stdout. Output errors are logged, never fatal.
pub fn emit(event: &ProgressEvent<'_>) {
    let line = match to_line(event) {
        Ok(line) => line,
        Err(e) => {
            warn!("Failed to serialize progress event: {e}");
            return;
        }
    };

    let mut out = std::io::stdout().lock();
    if let Err(e) = writeln!(out, "{line}").and_then(|()| out.flush()) {
        warn!("Failed to write progress event: {e}");
    }
}

/// Print every step until the reporter detaches.
pub fn spawn_printer(mut steps: mpsc::UnboundedReceiver<StartupStep>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(step) = steps.recv().await {
            emit(&ProgressEvent::Step(&step));
        }
    })
}
