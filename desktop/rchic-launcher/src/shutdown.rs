//! Teardown triggers outside the normal end of a run.

use rchic_supervisor::{LifecycleController, ShutdownTrigger};

use std::sync::{Arc, Weak};

use tokio::sync::mpsc;
use tracing::{error, info};

/// Delivers the first external stop request to `main`, after the backend
/// has already been torn down by the listener.
pub struct ShutdownSignals {
    rx: mpsc::UnboundedReceiver<ShutdownTrigger>,
}

impl ShutdownSignals {
    /// Start listening for SIGINT/SIGTERM (Ctrl-C on Windows).
    pub fn listen(controller: Arc<LifecycleController>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        spawn_listener(controller, tx);
        Self { rx }
    }

    pub async fn recv(&mut self) -> ShutdownTrigger {
        match self.rx.recv().await {
            Some(trigger) => trigger,
            // Listener never came up
            None => {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to wait for Ctrl-C: {e}");
                }
                ShutdownTrigger::ExplicitQuit
            }
        }
    }
}

#[cfg(unix)]
fn spawn_listener(controller: Arc<LifecycleController>, tx: mpsc::UnboundedSender<ShutdownTrigger>) {
    std::thread::spawn(move || {
        use signal_hook::consts::{SIGINT, SIGTERM};
        use signal_hook::iterator::Signals;

        let mut signals = match Signals::new([SIGINT, SIGTERM]) {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to register signal handlers: {e}");
                return;
            }
        };

        if let Some(sig) = signals.forever().next() {
            info!("Received signal {sig}, shutting down...");

            let trigger = ShutdownTrigger::Signal(sig);
            controller.shutdown(trigger);
            let _ = tx.send(trigger);
        }
    });
}

#[cfg(not(unix))]
fn spawn_listener(controller: Arc<LifecycleController>, tx: mpsc::UnboundedSender<ShutdownTrigger>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl-C, shutting down...");
                controller.shutdown(ShutdownTrigger::ExplicitQuit);
                let _ = tx.send(ShutdownTrigger::ExplicitQuit);
            }
            Err(e) => error!("Failed to listen for Ctrl-C: {e}"),
        }
    });
}

/// Tear the backend down before the default hook reports a panic.
pub fn install_panic_hook(controller: Weak<LifecycleController>) {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |info| {
        if let Some(controller) = controller.upgrade() {
            controller.shutdown(ShutdownTrigger::Fault);
        }
        default_hook(info);
    }));
}
