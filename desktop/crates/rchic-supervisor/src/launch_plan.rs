use crate::{BinaryCandidate, CandidateOrigin, EntryFlavor, Platform, ResourcePaths};

use std::ffi::OsString;
use std::path::{Path, PathBuf};

const DYLD_DEFAULT_FALLBACK_DIRS: &[&str] = &["/usr/local/lib", "/lib", "/usr/lib"];

/// Everything needed to spawn the backend, computed before spawning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub cwd: PathBuf,
    /// Variables set on top of the inherited environment
    pub env: Vec<(OsString, OsString)>,
}

impl LaunchPlan {
    /// Build a plan. `lookup` reads the inherited environment.
    pub fn build(
        candidate: &BinaryCandidate,
        port: u16,
        resources: &ResourcePaths,
        platform: Platform,
        home_env_var: &str,
        lookup: &dyn Fn(&str) -> Option<OsString>,
    ) -> Self {
        let port_arg = OsString::from(port.to_string());
        let primary = resources.primary.clone().into_os_string();
        let secondary = resources.secondary.clone().into_os_string();

        let args = match candidate.flavor {
            EntryFlavor::ScriptRunner => vec![
                resources.entry_script.clone().into_os_string(),
                port_arg,
                primary,
                secondary,
            ],
            EntryFlavor::Interpreter => {
                let mut file_arg = OsString::from("--file=");
                file_arg.push(&resources.entry_script);
                vec![
                    OsString::from("--no-echo"),
                    OsString::from("--no-restore"),
                    file_arg,
                    OsString::from("--args"),
                    port_arg,
                    primary,
                    secondary,
                ]
            }
            EntryFlavor::Standalone => vec![port_arg, primary, secondary],
        };

        Self {
            program: candidate.path.clone(),
            args,
            cwd: resources.primary.clone(),
            env: derived_env(candidate, platform, home_env_var, lookup),
        }
    }

    /// Plan against the running host's platform and environment.
    pub fn for_host(
        candidate: &BinaryCandidate,
        port: u16,
        resources: &ResourcePaths,
        home_env_var: &str,
    ) -> Self {
        Self::build(
            candidate,
            port,
            resources,
            Platform::current(),
            home_env_var,
            &|name| std::env::var_os(name),
        )
    }

    pub fn env_value(&self, name: &str) -> Option<&OsString> {
        self.env
            .iter()
            .find(|(key, _)| key.as_os_str() == name)
            .map(|(_, value)| value)
    }
}

/// Installation home for an executable: the parent of its nearest `bin` ancestor.
pub fn derive_home(executable: &Path) -> Option<PathBuf> {
    executable
        .ancestors()
        .skip(1)
        .find(|dir| dir.file_name().is_some_and(|name| name == "bin"))
        .and_then(Path::parent)
        .map(Path::to_path_buf)
}

// Only bundled runtimes get a home and library path; host installs know their own.
fn derived_env(
    candidate: &BinaryCandidate,
    platform: Platform,
    home_env_var: &str,
    lookup: &dyn Fn(&str) -> Option<OsString>,
) -> Vec<(OsString, OsString)> {
    if candidate.origin != CandidateOrigin::Bundled {
        return Vec::new();
    }
    let Some(home) = derive_home(&candidate.path) else {
        return Vec::new();
    };

    let mut env = vec![(OsString::from(home_env_var), home.clone().into_os_string())];

    if let Some(var) = platform.library_path_var() {
        let lib_dir = home.join("lib");
        let mut dirs = vec![lib_dir.clone()];

        match lookup(var).filter(|existing| !existing.is_empty()) {
            Some(existing) => dirs.extend(std::env::split_paths(&existing)),
            // Setting the variable replaces dyld's own fallback list
            None if platform == Platform::MacOs => {
                if let Some(user_home) = lookup("HOME").filter(|h| !h.is_empty()) {
                    dirs.push(PathBuf::from(user_home).join("lib"));
                }
                dirs.extend(DYLD_DEFAULT_FALLBACK_DIRS.iter().map(PathBuf::from));
            }
            None => {}
        }

        let value = std::env::join_paths(dirs).unwrap_or_else(|_| lib_dir.into_os_string());
        env.push((OsString::from(var), value));
    }

    env
}
