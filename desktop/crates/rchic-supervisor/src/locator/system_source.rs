use crate::locator::{CandidateSource, FileSystem, join_all, sort_newest_first};
use crate::{BinaryCandidate, CandidateOrigin, Platform};

use std::ffi::OsString;
use std::path::PathBuf;

const UNIX_BIN_DIRS: &[&str] = &["/usr/bin", "/usr/local/bin", "/opt/R/bin", "/opt/homebrew/bin"];
const MACOS_FRAMEWORK_RSCRIPT: &str = "/Library/Frameworks/R.framework/Resources/bin/Rscript";
// Env var and its usual value, 64-bit first
const WINDOWS_PROGRAM_FILES: &[(&str, &str)] = &[
    ("ProgramFiles", "C:\\Program Files"),
    ("ProgramFiles(x86)", "C:\\Program Files (x86)"),
];

/// Conventional host install locations.
pub struct SystemSource {
    platform: Platform,
    program_files: Vec<PathBuf>,
}

impl SystemSource {
    pub fn new(platform: Platform) -> Self {
        Self::with_env(platform, &|name| std::env::var_os(name))
    }

    /// Resolve the Program Files roots through `lookup` instead of the
    /// process environment.
    pub fn with_env(platform: Platform, lookup: &dyn Fn(&str) -> Option<OsString>) -> Self {
        Self {
            platform,
            program_files: program_files_dirs(lookup),
        }
    }

    /// Scan these directories for `R-x.y.z` installs instead of Program Files.
    pub fn with_program_files(mut self, dirs: Vec<PathBuf>) -> Self {
        self.program_files = dirs;
        self
    }

    fn windows_candidates(&self, fs: &dyn FileSystem) -> Vec<BinaryCandidate> {
        let mut candidates = Vec::new();

        for base in &self.program_files {
            let mut installs: Vec<String> = fs
                .list_dir(base)
                .into_iter()
                .filter(|name| name.starts_with("R-"))
                .collect();
            sort_newest_first(&mut installs);

            for install in installs {
                let home = base.join(install);
                for parts in [&["bin", "x64", "Rscript.exe"][..], &["bin", "Rscript.exe"][..]] {
                    candidates.push(BinaryCandidate::new(
                        join_all(&home, parts),
                        CandidateOrigin::System,
                    ));
                }
            }
        }

        candidates
    }
}

/// `<Program Files>\\R` for both the 64-bit and 32-bit roots, without duplicates.
fn program_files_dirs(lookup: &dyn Fn(&str) -> Option<OsString>) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    for (var, default) in WINDOWS_PROGRAM_FILES {
        let root = lookup(var)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(default));
        let dir = root.join("R");
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }

    dirs
}

impl CandidateSource for SystemSource {
    fn name(&self) -> &str {
        "system install"
    }

    fn candidates(&self, fs: &dyn FileSystem) -> Vec<BinaryCandidate> {
        match self.platform {
            Platform::Windows => self.windows_candidates(fs),
            Platform::Linux | Platform::MacOs => {
                let mut candidates: Vec<BinaryCandidate> = UNIX_BIN_DIRS
                    .iter()
                    .map(|dir| BinaryCandidate::new(PathBuf::from(dir).join("Rscript"), CandidateOrigin::System))
                    .collect();

                if self.platform == Platform::MacOs {
                    candidates.push(BinaryCandidate::new(MACOS_FRAMEWORK_RSCRIPT, CandidateOrigin::System));
                }

                candidates
            }
        }
    }
}
