//! rchic-launcher - headless host for the RCHIC R backend
//!
//! Finds an R runtime, starts the Plumber API on a free local port, waits
//! until it answers and prints the URL for the display layer. The backend
//! is torn down on SIGINT/SIGTERM, on a panic, or at the end of the run.
//!
//! # Examples
//!
//! ```bash
//! # Packaged layout next to the executable
//! rchic-launcher
//!
//! # From a repository checkout, progress as JSON lines
//! rchic-launcher --dev ~/src/Rchic --progress json
//!
//! # Smoke test: boot, print the URL, tear down
//! rchic-launcher --resources ./resources --exit-after-ready
//! ```

mod cli;
mod logging;
mod progress;
mod shutdown;

#[cfg(test)]
mod tests;

use crate::{
    cli::{Cli, ProgressFormat},
    logging::{current_log_path, setup_logging},
    progress::ProgressEvent,
    shutdown::ShutdownSignals,
};

use rchic_config::LauncherConfig;
use rchic_supervisor::locator::StaticSource;
use rchic_supervisor::{
    BootContext, BootOutcome, CandidateOrigin, ChannelReporter, ExecutableLocator, FanoutReporter,
    LifecycleController, LogReporter, PortManager, ReadyTrigger, ShutdownTrigger, StatusReporter,
    SupervisorError, SystemResources,
};

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

const RESOURCES_DIR_NAME: &str = "resources";
const LOG_FILE_PREFIX: &str = "rchic-launcher";
const BACKEND_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Config dir: explicit flag > RCHIC_CONFIG_DIR > platform default
    let config_dir = match cli.config_dir.clone() {
        Some(dir) => dir,
        None => match LauncherConfig::config_dir() {
            Ok(dir) => dir,
            Err(e) => {
                print_failure(&SupervisorError::from(e), cli.progress);
                return ExitCode::FAILURE;
            }
        },
    };

    let config = match LauncherConfig::load_from(&config_dir).and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            print_failure(&SupervisorError::from(e), cli.progress);
            return ExitCode::FAILURE;
        }
    };

    let log_dir = config.log_dir(&config_dir);
    if let Err(e) = setup_logging(&log_dir, config.logging.level) {
        eprintln!("Failed to set up logging in {}: {e}", log_dir.display());
        return ExitCode::FAILURE;
    }

    info!("Starting RCHIC launcher v{}", env!("CARGO_PKG_VERSION"));
    info!("Config directory: {}", config_dir.display());
    config.log_summary();

    run(cli, config, &log_dir).await
}

async fn run(cli: Cli, config: LauncherConfig, log_dir: &Path) -> ExitCode {
    let resources = match cli.resource_paths(&config.backend.entry_script) {
        Ok(resources) => resources,
        Err(e) => {
            report_failure(&SupervisorError::from(e), cli.progress, log_dir);
            return ExitCode::FAILURE;
        }
    };
    info!("Entry script: {}", resources.entry_script.display());

    let mut locator = ExecutableLocator::for_host(
        resources.bundled_runtime.clone(),
        &config.backend.home_env_var,
    );
    if let Some(rscript) = &cli.rscript {
        locator = locator.prepend_source(StaticSource::new(
            "command line",
            vec![rscript.clone()],
            CandidateOrigin::System,
        ));
    }

    let channel = Arc::new(ChannelReporter::new());
    let mut printer = None;
    let reporter: Arc<dyn StatusReporter> = match cli.progress {
        ProgressFormat::Log => Arc::new(LogReporter),
        ProgressFormat::Json => {
            printer = Some(progress::spawn_printer(channel.attach()));
            Arc::new(
                FanoutReporter::new(vec![Arc::new(LogReporter) as Arc<dyn StatusReporter>])
                    .with(channel.clone()),
            )
        }
    };

    let context = BootContext {
        resources,
        locator,
        ports: Box::new(PortManager::from(&config.server)),
        host_resources: Box::new(SystemResources),
    };

    let controller = match LifecycleController::new(config, context, reporter) {
        Ok(controller) => Arc::new(controller),
        Err(e) => {
            finish_progress(&channel, printer).await;
            report_failure(&e, cli.progress, log_dir);
            return ExitCode::FAILURE;
        }
    };

    shutdown::install_panic_hook(Arc::downgrade(&controller));
    let mut signals = ShutdownSignals::listen(controller.clone());

    let result = tokio::select! {
        result = controller.boot() => result,
        trigger = signals.recv() => {
            info!("Startup interrupted ({trigger})");
            controller.shutdown(trigger);
            finish_progress(&channel, printer).await;
            return ExitCode::SUCCESS;
        }
    };

    // Every step is on stdout before the final event
    finish_progress(&channel, printer).await;

    let code = match result {
        Ok(outcome) => {
            announce_ready(&outcome, cli.progress);

            let watch = watches_backend(outcome.trigger, controller.supervisor().is_running());
            if cli.exit_after_ready {
                info!("Exiting after ready as requested");
                ExitCode::SUCCESS
            } else {
                wait_for_stop(&controller, &mut signals, watch).await
            }
        }
        Err(e) => {
            report_failure(&e, cli.progress, log_dir);
            ExitCode::FAILURE
        }
    };

    controller.shutdown(ShutdownTrigger::ExplicitQuit);
    code
}

/// Whether an exit of the backend after ready should end the run.
///
/// A clean exit before ready leaves nothing to watch; the health probe
/// already had its say.
fn watches_backend(trigger: ReadyTrigger, running_at_ready: bool) -> bool {
    trigger != ReadyTrigger::CleanExit && running_at_ready
}

/// Block until a stop request, or fail if a watched backend goes away on
/// its own.
async fn wait_for_stop(
    controller: &LifecycleController,
    signals: &mut ShutdownSignals,
    watch_backend: bool,
) -> ExitCode {
    if !watch_backend {
        info!("R backend is not running under supervision, waiting for a stop request");
        let trigger = signals.recv().await;
        info!("Stopping ({trigger})");
        return ExitCode::SUCCESS;
    }

    let mut ticker = tokio::time::interval(BACKEND_POLL_INTERVAL);

    loop {
        tokio::select! {
            trigger = signals.recv() => {
                info!("Stopping ({trigger})");
                return ExitCode::SUCCESS;
            }
            _ = ticker.tick() => {
                if !controller.supervisor().is_running() {
                    error!("R backend exited unexpectedly");
                    return ExitCode::FAILURE;
                }
            }
        }
    }
}

/// Stop forwarding steps and wait for the printer to drain.
async fn finish_progress(channel: &ChannelReporter, printer: Option<JoinHandle<()>>) {
    channel.detach();

    if let Some(printer) = printer
        && let Err(e) = printer.await
    {
        warn!("Progress printer failed: {e}");
    }
}

fn announce_ready(outcome: &BootOutcome, format: ProgressFormat) {
    let degraded = !outcome.readiness.ready;
    if degraded {
        warn!(
            "Backend did not answer {} after {} attempts, opening anyway",
            rchic_supervisor::HEALTH_PATH,
            outcome.readiness.attempts
        );
    }

    match format {
        ProgressFormat::Json => progress::emit(&ProgressEvent::Ready {
            url: &outcome.url,
            port: outcome.port,
            degraded,
        }),
        ProgressFormat::Log => println!("{}", outcome.url),
    }
}

fn report_failure(e: &SupervisorError, format: ProgressFormat, log_dir: &Path) {
    error!("{}: {e}", e.summary());
    print_failure(e, format);
    eprintln!("Details: {}", current_log_path(log_dir).display());
}

/// Failure for the display layer and the terminal; works before logging is up.
fn print_failure(e: &SupervisorError, format: ProgressFormat) {
    if format == ProgressFormat::Json {
        progress::emit(&ProgressEvent::Failed {
            summary: e.summary(),
            hint: e.recovery_hint(),
            detail: e.to_string(),
        });
    }

    eprintln!("{}: {e}", e.summary());
    eprintln!("{}", e.recovery_hint());
}
