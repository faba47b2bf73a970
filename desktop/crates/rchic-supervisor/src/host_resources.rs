//! Free memory and temp-disk checks run before launching R.

use crate::{STEP_DISK, STEP_MEMORY, StartupStep};

use std::path::Path;

use rchic_config::ChecksConfig;
use sysinfo::{Disks, System};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Host measurements the environment checks need.
pub trait HostResources: Send + Sync {
    /// Available physical memory in MB, `None` if unknown.
    fn available_memory_mb(&self) -> Option<u64>;

    /// Free space in MB on the volume holding the temp directory.
    fn available_temp_disk_mb(&self) -> Option<u64>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResources;

impl HostResources for SystemResources {
    fn available_memory_mb(&self) -> Option<u64> {
        let mut system = System::new();
        system.refresh_memory();
        match system.available_memory() {
            0 => None,
            bytes => Some(bytes / BYTES_PER_MB),
        }
    }

    fn available_temp_disk_mb(&self) -> Option<u64> {
        let temp = std::env::temp_dir();
        let temp = temp.canonicalize().unwrap_or(temp);
        let disks = Disks::new_with_refreshed_list();

        disks
            .list()
            .iter()
            .filter(|disk| temp.starts_with(disk.mount_point()))
            .max_by_key(|disk| mount_depth(disk.mount_point()))
            .map(|disk| disk.available_space() / BYTES_PER_MB)
    }
}

fn mount_depth(path: &Path) -> usize {
    path.components().count()
}

/// Run both checks and return one terminal step each.
pub fn check_host_resources(host: &dyn HostResources, checks: &ChecksConfig) -> Vec<StartupStep> {
    vec![
        threshold_step(
            STEP_MEMORY,
            "memory",
            host.available_memory_mb(),
            checks.memory_soft_min_mb,
            checks.memory_hard_min_mb,
        ),
        threshold_step(
            STEP_DISK,
            "temporary disk space",
            host.available_temp_disk_mb(),
            checks.disk_soft_min_mb,
            checks.disk_hard_min_mb,
        ),
    ]
}

fn threshold_step(
    id: &str,
    what: &str,
    available: Option<u64>,
    soft_min: u64,
    hard_min: u64,
) -> StartupStep {
    let Some(mb) = available else {
        return StartupStep::warning(id, format!("Could not measure available {what}"));
    };

    let detail = format!("{mb} MB available");
    if mb < hard_min {
        StartupStep::error(id, format!("Very little {what} available"))
            .with_detail(format!("{detail}, at least {hard_min} MB needed"))
    } else if mb < soft_min {
        StartupStep::warning(id, format!("Low {what}"))
            .with_detail(format!("{detail}, {soft_min} MB recommended"))
    } else {
        StartupStep::success(id, format!("Enough {what}")).with_detail(detail)
    }
}
