#![allow(dead_code)]

use rchic_supervisor::{
    HostResources, PortAllocator, ResourcePaths, StartupStep, StatusReporter, SupervisorResult,
    SupervisorSettings,
};

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use rchic_config::CleanExitPolicy;
use tempfile::TempDir;

/// Write an executable shell script standing in for the R backend.
pub fn write_backend(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

/// Production resource layout inside a temp dir, with the primary dir created.
pub fn resources(temp: &TempDir) -> ResourcePaths {
    let resources = ResourcePaths::production(temp.path(), "start-server.R");
    std::fs::create_dir_all(&resources.primary).unwrap();
    std::fs::create_dir_all(&resources.secondary).unwrap();
    resources
}

pub fn fast_settings(grace: Duration) -> SupervisorSettings {
    SupervisorSettings {
        settle_delay: Duration::from_millis(100),
        grace_period: grace,
        stderr_capacity: 50,
        clean_exit: CleanExitPolicy::Proceed,
        home_env_var: "R_HOME".to_string(),
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    steps: Mutex<Vec<StartupStep>>,
}

impl RecordingReporter {
    pub fn steps(&self) -> Vec<StartupStep> {
        self.steps.lock().unwrap().clone()
    }

    pub fn last_for(&self, id: &str) -> Option<StartupStep> {
        self.steps().into_iter().rev().find(|s| s.id == id)
    }
}

impl StatusReporter for RecordingReporter {
    fn report(&self, step: StartupStep) {
        self.steps.lock().unwrap().push(step);
    }
}

pub struct FixedPort(pub u16);

impl PortAllocator for FixedPort {
    fn allocate(&self) -> SupervisorResult<u16> {
        Ok(self.0)
    }
}

pub struct AmpleHost;

impl HostResources for AmpleHost {
    fn available_memory_mb(&self) -> Option<u64> {
        Some(16_384)
    }

    fn available_temp_disk_mb(&self) -> Option<u64> {
        Some(100_000)
    }
}

/// Whether a process with this pid still exists.
pub fn process_alive(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    kill(Pid::from_raw(pid as i32), None).is_ok()
}

/// Poll until the process is gone (and reaped) or the timeout passes.
pub async fn wait_until_dead(pid: u32, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if !process_alive(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    !process_alive(pid)
}
