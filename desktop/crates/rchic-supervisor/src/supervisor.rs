//! Backend process ownership: spawn, startup race, teardown.

use crate::error::Result as SupervisorResult;
use crate::{
    BinaryCandidate, LaunchPlan, MonitorAction, MonitorEvent, OutputPatterns, OutputStream,
    ProcessState, ReadySignal, ResourcePaths, SettleOnce, Settlement, StartupMonitor,
    StatusReporter, StderrTail, SupervisedProcess, SupervisorError,
};

use std::panic::Location;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use error_location::ErrorLocation;
use rchic_config::{CleanExitPolicy, LauncherConfig};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// How long to wait for output readers to drain after the process exits.
const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

type ProcessSlot = Arc<Mutex<Option<SupervisedProcess>>>;

#[derive(Debug, Clone)]
pub struct SupervisorSettings {
    pub settle_delay: Duration,
    pub grace_period: Duration,
    pub stderr_capacity: usize,
    pub clean_exit: CleanExitPolicy,
    pub home_env_var: String,
}

impl From<&LauncherConfig> for SupervisorSettings {
    fn from(config: &LauncherConfig) -> Self {
        Self {
            settle_delay: config.startup.settle_delay(),
            grace_period: config.startup.grace_period(),
            stderr_capacity: config.startup.stderr_capacity,
            clean_exit: config.startup.clean_exit,
            home_env_var: config.backend.home_env_var.clone(),
        }
    }
}

/// Owns at most one backend child at a time.
///
/// Dropping the supervisor terminates the child.
pub struct ProcessSupervisor {
    settings: SupervisorSettings,
    patterns: Arc<OutputPatterns>,
    reporter: Arc<dyn StatusReporter>,
    slot: ProcessSlot,
}

impl ProcessSupervisor {
    pub fn new(settings: SupervisorSettings, reporter: Arc<dyn StatusReporter>) -> Self {
        Self {
            settings,
            patterns: Arc::new(OutputPatterns::default()),
            reporter,
            slot: Arc::new(Mutex::new(None)),
        }
    }

    pub fn settings(&self) -> &SupervisorSettings {
        &self.settings
    }

    /// Launch the backend for `candidate` and wait until startup settles.
    pub async fn start(
        &self,
        candidate: &BinaryCandidate,
        port: u16,
        resources: &ResourcePaths,
    ) -> SupervisorResult<ReadySignal> {
        let plan = LaunchPlan::for_host(candidate, port, resources, &self.settings.home_env_var);
        self.launch(plan, port).await
    }

    /// Spawn from a prepared plan and wait until startup settles.
    pub async fn launch(&self, plan: LaunchPlan, port: u16) -> SupervisorResult<ReadySignal> {
        let tail = StderrTail::shared(self.settings.stderr_capacity);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let pid = {
            let mut slot = self.lock_slot();
            if let Some(existing) = slot.as_ref() {
                return Err(SupervisorError::AlreadyRunning {
                    pid: existing.pid,
                    location: ErrorLocation::from(Location::caller()),
                });
            }

            info!("Starting R: {} {:?}", plan.program.display(), plan.args);
            info!("  working directory: {}", plan.cwd.display());
            for (key, value) in &plan.env {
                info!("  {}={}", key.to_string_lossy(), value.to_string_lossy());
            }

            let mut child = match build_command(&plan).spawn() {
                Ok(child) => child,
                Err(source) => {
                    error!("Failed to launch {}: {source}", plan.program.display());
                    return Err(SupervisorError::SpawnFailure {
                        path: plan.program.clone(),
                        source,
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            };

            let pid = child.id().unwrap_or_default();
            info!("Spawned R with PID {pid} on port {port}");

            let mut readers = Vec::new();
            if let Some(stdout) = child.stdout.take() {
                readers.push(spawn_reader(stdout, OutputStream::Stdout, event_tx.clone()));
            }
            if let Some(stderr) = child.stderr.take() {
                readers.push(spawn_reader(stderr, OutputStream::Stderr, event_tx.clone()));
            }

            spawn_exit_watcher(child, readers, event_tx.clone());

            *slot = Some(SupervisedProcess::new(pid, plan.program.clone(), port, tail.clone()));
            pid
        };

        let grace_tx = event_tx.clone();
        let grace_period = self.settings.grace_period;
        tokio::spawn(async move {
            tokio::time::sleep(grace_period).await;
            let _ = grace_tx.send(MonitorEvent::GracePeriodElapsed);
        });

        let monitor = StartupMonitor::new(
            self.patterns.clone(),
            tail,
            self.settings.settle_delay,
            self.settings.clean_exit,
        );
        let (settle, outcome_rx) = SettleOnce::new();

        // The driver only keeps a weak handle so the channel closes once
        // every producer is done.
        let weak_tx = event_tx.downgrade();
        drop(event_tx);

        tokio::spawn(drive_monitor(
            monitor,
            event_rx,
            weak_tx,
            settle,
            self.reporter.clone(),
            self.slot.clone(),
            pid,
        ));

        let settlement = outcome_rx.await.map_err(|_| SupervisorError::StartupAborted {
            message: "startup monitor stopped before the launch settled".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.finish(settlement, pid, port, plan.program)
    }

    fn finish(
        &self,
        settlement: Settlement,
        pid: u32,
        port: u16,
        program: PathBuf,
    ) -> SupervisorResult<ReadySignal> {
        match settlement {
            Settlement::Ready(trigger) => {
                if let Some(process) = self.lock_slot().as_mut().filter(|p| p.pid == pid) {
                    process.state = ProcessState::Running;
                }
                info!("R server on port {port} settled: {trigger}");
                Ok(ReadySignal { port, trigger })
            }
            Settlement::SpawnFailed { message } => {
                self.clear_slot(pid);
                Err(SupervisorError::SpawnFailure {
                    path: program,
                    source: std::io::Error::other(message),
                    location: ErrorLocation::from(Location::caller()),
                })
            }
            Settlement::Crashed { code, diagnostic } => {
                self.clear_slot(pid);
                error!("R exited with code {code:?} during startup: {diagnostic}");
                Err(SupervisorError::CrashBeforeReady {
                    code,
                    diagnostic,
                    location: ErrorLocation::from(Location::caller()),
                })
            }
            Settlement::CleanExitRejected => {
                self.clear_slot(pid);
                Err(SupervisorError::CleanExitRejected {
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }

    /// Terminate the backend and its descendants. Returns whether a process
    /// was signalled; calling again is a no-op.
    pub fn stop(&self) -> bool {
        let Some(process) = self.lock_slot().take() else {
            debug!("No R process to stop");
            return false;
        };

        info!("Stopping R server (PID {})", process.pid);
        terminate_tree(process.pid);
        true
    }

    pub fn is_running(&self) -> bool {
        self.lock_slot().is_some()
    }

    pub fn pid(&self) -> Option<u32> {
        self.lock_slot().as_ref().map(|p| p.pid)
    }

    /// Recent stderr of the supervised child; empty when none is tracked.
    pub fn recent_stderr(&self) -> Vec<String> {
        self.lock_slot()
            .as_ref()
            .map(SupervisedProcess::recent_stderr)
            .unwrap_or_default()
    }

    /// Snapshot of the supervised child, if any.
    pub fn process(&self) -> Option<SupervisedProcess> {
        self.lock_slot().clone()
    }

    fn clear_slot(&self, pid: u32) {
        clear_slot(&self.slot, pid);
    }

    fn lock_slot(&self) -> MutexGuard<'_, Option<SupervisedProcess>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ProcessSupervisor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn build_command(plan: &LaunchPlan) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(&plan.program);
    cmd.args(&plan.args)
        .current_dir(&plan.cwd)
        .envs(plan.env.iter().map(|(key, value)| (key, value)))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    // Own process group so teardown reaches R's children too
    #[cfg(unix)]
    cmd.process_group(0);

    #[cfg(windows)]
    cmd.creation_flags(CREATE_NO_WINDOW);

    cmd
}

fn spawn_reader<R>(
    stream: R,
    kind: OutputStream,
    tx: mpsc::UnboundedSender<MonitorEvent>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(text)) => {
                    if tx.send(MonitorEvent::Line { stream: kind, text }).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    debug!("R {kind} closed: {e}");
                    break;
                }
            }
        }
    })
}

fn spawn_exit_watcher(
    mut child: tokio::process::Child,
    readers: Vec<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<MonitorEvent>,
) {
    tokio::spawn(async move {
        let event = match child.wait().await {
            Ok(status) => {
                // Let buffered output reach the monitor before the exit does
                let drain = async {
                    for reader in readers {
                        let _ = reader.await;
                    }
                };
                if tokio::time::timeout(OUTPUT_DRAIN_TIMEOUT, drain).await.is_err() {
                    debug!("R output still open after exit, not waiting further");
                }
                MonitorEvent::Exited {
                    code: status.code(),
                }
            }
            Err(e) => MonitorEvent::ProcessError {
                message: e.to_string(),
            },
        };
        let _ = tx.send(event);
    });
}

async fn drive_monitor(
    mut monitor: StartupMonitor,
    mut events: mpsc::UnboundedReceiver<MonitorEvent>,
    weak_tx: mpsc::WeakUnboundedSender<MonitorEvent>,
    settle: SettleOnce<Settlement>,
    reporter: Arc<dyn StatusReporter>,
    slot: ProcessSlot,
    pid: u32,
) {
    while let Some(event) = events.recv().await {
        match &event {
            MonitorEvent::Line { stream, text } => info!(target: "rchic::backend", "[{stream}] {text}"),
            MonitorEvent::Exited { code } => {
                if monitor.is_settled() {
                    warn!("R server (PID {pid}) exited with code {code:?}");
                }
                clear_slot(&slot, pid);
            }
            MonitorEvent::ProcessError { message } => {
                error!("Lost track of R process (PID {pid}): {message}");
                clear_slot(&slot, pid);
            }
            MonitorEvent::SettleDelayElapsed | MonitorEvent::GracePeriodElapsed => {}
        }

        for action in monitor.handle(event) {
            match action {
                MonitorAction::ArmSettleDelay(delay) => {
                    if let Some(tx) = weak_tx.upgrade() {
                        tokio::spawn(async move {
                            tokio::time::sleep(delay).await;
                            let _ = tx.send(MonitorEvent::SettleDelayElapsed);
                        });
                    }
                }
                MonitorAction::Report(step) => reporter.report(step),
                MonitorAction::Settle(settlement) => {
                    if !settle.settle(settlement) {
                        debug!("Launch already settled, ignoring");
                    }
                }
            }
        }
    }

    debug!("Startup monitor for PID {pid} finished");
}

fn clear_slot(slot: &ProcessSlot, pid: u32) {
    let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
    if guard.as_ref().is_some_and(|p| p.pid == pid) {
        *guard = None;
    }
}

#[cfg(unix)]
fn terminate_tree(pid: u32) {
    use nix::sys::signal::{Signal, kill, killpg};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        warn!("PID {pid} out of range, cannot signal");
        return;
    };

    if let Err(e) = killpg(Pid::from_raw(raw), Signal::SIGTERM) {
        debug!("killpg({raw}) failed: {e}, signalling the process directly");
        if let Err(e) = kill(Pid::from_raw(raw), Signal::SIGTERM) {
            debug!("kill({raw}) failed: {e}");
        }
    }
}

#[cfg(windows)]
fn terminate_tree(pid: u32) {
    let result = std::process::Command::new("taskkill")
        .args(["/pid", &pid.to_string(), "/f", "/t"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    if let Err(e) = result {
        error!("Failed to run taskkill for PID {pid}: {e}");
    }
}
