//! Boot sequencing and teardown.

use crate::error::Result as SupervisorResult;
use crate::{
    BinaryCandidate, BootPhase, ExecutableLocator, HostResources, PortAllocator, ProbeSchedule,
    ProcessSupervisor, ReadinessProbe, ReadinessState, ReadyTrigger, ResourcePaths, STEP_LOCATE,
    STEP_SPAWN, ShutdownTrigger, StartupStep, StatusReporter, SupervisorError,
    SupervisorSettings, check_host_resources,
};

use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use error_location::ErrorLocation;
use rchic_config::LauncherConfig;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Everything the controller needs from the host besides configuration.
pub struct BootContext {
    pub resources: ResourcePaths,
    pub locator: ExecutableLocator,
    pub ports: Box<dyn PortAllocator>,
    pub host_resources: Box<dyn HostResources>,
}

/// A successful boot, ready to hand to the display layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootOutcome {
    pub port: u16,
    pub url: String,
    pub readiness: ReadinessState,
    pub trigger: ReadyTrigger,
    pub candidate: BinaryCandidate,
}

/// Drives one backend from environment checks to a confirmed URL, and
/// owns teardown.
pub struct LifecycleController {
    config: LauncherConfig,
    context: BootContext,
    reporter: Arc<dyn StatusReporter>,
    supervisor: ProcessSupervisor,
    probe: ReadinessProbe,
    phase_tx: watch::Sender<BootPhase>,
    phase_rx: watch::Receiver<BootPhase>,
    port: Mutex<Option<u16>>,
    shut_down: AtomicBool,
}

impl LifecycleController {
    pub fn new(
        config: LauncherConfig,
        context: BootContext,
        reporter: Arc<dyn StatusReporter>,
    ) -> SupervisorResult<Self> {
        let probe = ReadinessProbe::new(config.server.host.clone())?;
        let supervisor = ProcessSupervisor::new(SupervisorSettings::from(&config), reporter.clone());
        let (phase_tx, phase_rx) = watch::channel(BootPhase::Init);

        Ok(Self {
            config,
            context,
            reporter,
            supervisor,
            probe,
            phase_tx,
            phase_rx,
            port: Mutex::new(None),
            shut_down: AtomicBool::new(false),
        })
    }

    /// Run the boot sequence. After `shutdown` this never leaves a backend
    /// running: it refuses to spawn, and stops anything spawned meanwhile.
    pub async fn boot(&self) -> SupervisorResult<BootOutcome> {
        self.ensure_not_shut_down("before boot")?;

        // 1. Environment checks never abort the boot
        self.set_phase(BootPhase::EnvironmentChecks);
        for step in check_host_resources(self.context.host_resources.as_ref(), &self.config.checks) {
            self.reporter.report(step);
        }

        // 2. Locate R
        self.set_phase(BootPhase::Locating);
        self.reporter.report(StartupStep::pending(STEP_LOCATE, "Looking for R"));
        let candidate = self.context.locator.locate();
        self.reporter.report(locate_step(&candidate));

        // 3. Spawn
        self.set_phase(BootPhase::Spawning);
        self.reporter.report(StartupStep::pending(STEP_SPAWN, "Starting the R server"));

        let port = match self.context.ports.allocate() {
            Ok(port) => port,
            Err(e) => return Err(self.fail(e)),
        };
        *self.lock_port() = Some(port);
        info!("Using port {port}");

        self.ensure_not_shut_down("before the R server was started")?;
        let started = self
            .supervisor
            .start(&candidate, port, &self.context.resources)
            .await;
        self.ensure_not_shut_down("while the R server was starting")?;

        let signal = match started {
            Ok(signal) => signal,
            Err(e) => return Err(self.fail(e)),
        };
        self.reporter.report(spawn_step(signal.trigger));

        // 4. Confirm over HTTP
        self.set_phase(BootPhase::AwaitingReady);
        let schedule = ProbeSchedule::from(&self.config.readiness);
        let readiness = self
            .probe
            .wait_until_ready(port, schedule, self.reporter.as_ref())
            .await;

        self.ensure_not_shut_down("while waiting for the R server")?;

        if !readiness.ready {
            warn!("Server may not be fully ready, proceeding anyway");
        }

        // 5. Hand off
        let url = self.url_for(port);
        self.set_phase(BootPhase::Ready {
            port,
            degraded: !readiness.ready,
        });
        info!("RCHIC backend ready at {url}");

        Ok(BootOutcome {
            port,
            url,
            readiness,
            trigger: signal.trigger,
            candidate,
        })
    }

    /// Stop the backend. Safe to call repeatedly and from any thread.
    pub fn shutdown(&self, trigger: ShutdownTrigger) -> bool {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            info!("Shutdown ({trigger}) requested again, nothing left to do");
            return self.supervisor.stop();
        }

        info!("Shutting down ({trigger})");
        let stopped = self.supervisor.stop();
        self.set_phase(BootPhase::Stopped);
        stopped
    }

    /// Abort the boot once shutdown was requested, stopping any backend
    /// that was spawned in the meantime.
    fn ensure_not_shut_down(&self, stage: &str) -> SupervisorResult<()> {
        if !self.is_shut_down() {
            return Ok(());
        }

        if self.supervisor.stop() {
            info!("Stopped R server that came up after shutdown was requested");
        }
        info!("Boot cancelled {stage}: shutdown requested");

        Err(SupervisorError::StartupAborted {
            message: format!("shutdown requested {stage}"),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    fn fail(&self, e: SupervisorError) -> SupervisorError {
        error!("Boot failed: {e}");

        self.reporter
            .report(StartupStep::error(STEP_SPAWN, e.summary()).with_detail(failure_detail(&e)));

        self.set_phase(BootPhase::Failed {
            error: e.to_string(),
        });
        e
    }

    fn set_phase(&self, phase: BootPhase) {
        // Stopped is final
        if phase != BootPhase::Stopped && self.is_shut_down() {
            debug!("Ignoring boot phase {phase} after shutdown");
            return;
        }
        info!("Boot phase: {phase}");
        self.phase_tx.send_replace(phase);
    }

    fn url_for(&self, port: u16) -> String {
        format!("http://{}:{port}/", self.config.server.host)
    }

    fn lock_port(&self) -> std::sync::MutexGuard<'_, Option<u16>> {
        self.port.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe to phase changes.
    pub fn subscribe(&self) -> watch::Receiver<BootPhase> {
        self.phase_rx.clone()
    }

    pub fn phase(&self) -> BootPhase {
        self.phase_rx.borrow().clone()
    }

    pub fn port(&self) -> Option<u16> {
        *self.lock_port()
    }

    /// Base URL of the backend once a port was chosen.
    pub fn url(&self) -> Option<String> {
        self.port().map(|port| self.url_for(port))
    }

    pub fn supervisor(&self) -> &ProcessSupervisor {
        &self.supervisor
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }
}

fn locate_step(candidate: &BinaryCandidate) -> StartupStep {
    let path = candidate.path.display().to_string();

    if candidate.is_fallback() {
        StartupStep::warning(STEP_LOCATE, "R not found in standard locations")
            .with_detail(format!("Trying `{path}` from PATH"))
    } else if candidate.needs_arch_warning() {
        StartupStep::warning(STEP_LOCATE, "Using R built for another architecture").with_detail(path)
    } else {
        StartupStep::success(STEP_LOCATE, format!("Found {} R", candidate.origin)).with_detail(path)
    }
}

fn spawn_step(trigger: ReadyTrigger) -> StartupStep {
    match trigger {
        ReadyTrigger::OutputSignal => StartupStep::success(STEP_SPAWN, "R server started"),
        ReadyTrigger::GracePeriod => StartupStep::success(STEP_SPAWN, "R server launched")
            .with_detail("No startup message yet, checking the health endpoint"),
        ReadyTrigger::CleanExit => StartupStep::warning(STEP_SPAWN, "R exited before confirming startup")
            .with_detail("The server may still be reachable"),
    }
}

fn failure_detail(e: &SupervisorError) -> String {
    match e {
        SupervisorError::SpawnFailure { path, source, .. } => {
            format!("{}: {source}", path.display())
        }
        SupervisorError::CrashBeforeReady { diagnostic, .. } => diagnostic.clone(),
        _ => e.recovery_hint().to_string(),
    }
}
