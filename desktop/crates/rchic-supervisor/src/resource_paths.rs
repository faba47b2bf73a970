use crate::{BUNDLED_RUNTIME_DIR, PRIMARY_RESOURCE_DIR, SECONDARY_RESOURCE_DIR};

use std::path::{Path, PathBuf};

/// Filesystem locations handed to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePaths {
    /// Script the runner executes
    pub entry_script: PathBuf,
    /// API sources; also the working directory of the child
    pub primary: PathBuf,
    /// Static web assets
    pub secondary: PathBuf,
    /// Root of the bundled runtime, searched first when present
    pub bundled_runtime: Option<PathBuf>,
}

impl ResourcePaths {
    /// Installed application layout under a resources directory.
    pub fn production(resources_dir: &Path, entry_script: &str) -> Self {
        let primary = resources_dir.join(PRIMARY_RESOURCE_DIR);
        Self {
            entry_script: primary.join(entry_script),
            primary,
            secondary: resources_dir.join(SECONDARY_RESOURCE_DIR),
            bundled_runtime: Some(resources_dir.join(BUNDLED_RUNTIME_DIR)),
        }
    }

    /// Source checkout layout. No bundled runtime is searched.
    pub fn development(project_root: &Path, entry_script: &str) -> Self {
        let inst = project_root.join("inst");
        Self {
            entry_script: project_root.join("electron").join("src").join(entry_script),
            primary: inst.join(PRIMARY_RESOURCE_DIR),
            secondary: inst.join(SECONDARY_RESOURCE_DIR),
            bundled_runtime: None,
        }
    }
}
