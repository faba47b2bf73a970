//! Locates, launches, monitors and tears down the R backend behind the RCHIC
//! desktop front end.

mod boot_phase;
mod candidate;
mod error;
mod host_resources;
mod launch_plan;
mod lifecycle;
pub mod locator;
mod patterns;
mod platform;
mod port;
mod probe;
mod process;
mod ready_signal;
mod reporter;
mod resource_paths;
mod settle;
mod startup_monitor;
mod startup_step;
mod stderr_tail;
mod supervisor;

#[cfg(test)]
mod tests;

pub use boot_phase::{BootPhase, ShutdownTrigger};
pub use candidate::{ArchTag, BinaryCandidate, CandidateOrigin, EntryFlavor};
pub use error::{Result as SupervisorResult, SupervisorError};
pub use host_resources::{HostResources, SystemResources, check_host_resources};
pub use launch_plan::{LaunchPlan, derive_home};
pub use lifecycle::{BootContext, BootOutcome, LifecycleController};
pub use locator::{CandidateSource, ExecutableLocator, FileSystem, RealFileSystem};
pub use patterns::{ERROR_PATTERNS, OutputPatterns, READY_SIGNALS};
pub use platform::{Arch, Platform};
pub use port::{PortAllocator, PortManager};
pub use probe::{ProbeSchedule, ReadinessProbe, ReadinessState};
pub use process::{ProcessState, SupervisedProcess};
pub use ready_signal::{ReadySignal, ReadyTrigger};
pub use reporter::{ChannelReporter, FanoutReporter, LogReporter, StatusReporter};
pub use resource_paths::ResourcePaths;
pub use settle::SettleOnce;
pub use startup_monitor::{MonitorAction, MonitorEvent, OutputStream, Settlement, StartupMonitor};
pub use startup_step::{StartupStep, StepStatus};
pub use stderr_tail::{SharedStderrTail, StderrTail};
pub use supervisor::{ProcessSupervisor, SupervisorSettings};

/// Health endpoint served by the Plumber backend.
pub const HEALTH_PATH: &str = "/api/health";

// Stable StartupStep ids (must match the splash screen)
pub const STEP_MEMORY: &str = "memory";
pub const STEP_DISK: &str = "disk";
pub const STEP_LOCATE: &str = "locate";
pub const STEP_SPAWN: &str = "spawn";
pub const STEP_BACKEND_OUTPUT: &str = "backend-output";
pub const STEP_READY: &str = "ready";

const BUNDLED_RUNTIME_DIR: &str = "R-portable";
const PRIMARY_RESOURCE_DIR: &str = "plumber";
const SECONDARY_RESOURCE_DIR: &str = "web";
