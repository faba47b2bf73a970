mod patterns;

use crate::{FileSystem, HostResources, StartupStep, StatusReporter};

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// In-memory tree: a set of files, directories inferred from their parents.
#[derive(Default)]
pub(crate) struct FakeFileSystem {
    files: BTreeSet<PathBuf>,
}

impl FakeFileSystem {
    pub(crate) fn with_files(paths: &[&str]) -> Self {
        Self {
            files: paths.iter().map(PathBuf::from).collect(),
        }
    }
}

impl FileSystem for FakeFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.files.iter().any(|file| file.starts_with(path) && file != path)
    }

    fn list_dir(&self, path: &Path) -> Vec<String> {
        let names: BTreeSet<String> = self
            .files
            .iter()
            .filter_map(|file| file.strip_prefix(path).ok())
            .filter_map(|rest| rest.components().next())
            .map(|first| first.as_os_str().to_string_lossy().into_owned())
            .collect();
        names.into_iter().collect()
    }
}

/// Keeps every reported step in order.
#[derive(Default)]
pub(crate) struct RecordingReporter {
    steps: Mutex<Vec<StartupStep>>,
}

impl RecordingReporter {
    pub(crate) fn steps(&self) -> Vec<StartupStep> {
        self.steps.lock().unwrap().clone()
    }
}

impl StatusReporter for RecordingReporter {
    fn report(&self, step: StartupStep) {
        self.steps.lock().unwrap().push(step);
    }
}

pub(crate) struct FixedHost {
    pub(crate) memory_mb: Option<u64>,
    pub(crate) disk_mb: Option<u64>,
}

impl HostResources for FixedHost {
    fn available_memory_mb(&self) -> Option<u64> {
        self.memory_mb
    }

    fn available_temp_disk_mb(&self) -> Option<u64> {
        self.disk_mb
    }
}
