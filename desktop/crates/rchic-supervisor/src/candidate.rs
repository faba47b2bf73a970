use std::fmt;
use std::path::{Path, PathBuf};

/// Where a candidate executable came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOrigin {
    /// Shipped next to the application
    Bundled,
    /// Installed on the host (override variable or conventional location)
    System,
    /// Bare name left to the inherited PATH
    PathFallback,
}

impl fmt::Display for CandidateOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Bundled => "bundled",
            Self::System => "system",
            Self::PathFallback => "path-fallback",
        };
        f.write_str(label)
    }
}

/// How a candidate relates to the running CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchTag {
    /// Layout carries no architecture information
    Universal,
    /// Built for the running architecture
    Native,
    /// Built for the other architecture, runs under emulation
    Alternate,
    /// Version directory with no recognisable architecture
    Untagged,
}

/// Shape of the resolved entry point, which decides the argument layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFlavor {
    /// `Rscript`: takes the script path as first argument
    ScriptRunner,
    /// `R`: needs `--file=` and `--args`
    Interpreter,
    /// Self-contained server executable, no entry script
    Standalone,
}

impl EntryFlavor {
    pub fn detect(path: &Path) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match stem.as_str() {
            "rscript" => Self::ScriptRunner,
            "r" => Self::Interpreter,
            _ => Self::Standalone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryCandidate {
    pub path: PathBuf,
    pub origin: CandidateOrigin,
    pub arch: ArchTag,
    pub flavor: EntryFlavor,
}

impl BinaryCandidate {
    pub fn new(path: impl Into<PathBuf>, origin: CandidateOrigin) -> Self {
        let path = path.into();
        let flavor = EntryFlavor::detect(&path);
        Self {
            path,
            origin,
            arch: ArchTag::Universal,
            flavor,
        }
    }

    pub fn with_arch(mut self, arch: ArchTag) -> Self {
        self.arch = arch;
        self
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == CandidateOrigin::PathFallback
    }

    /// Selected from the alternate-architecture or catch-all pass.
    pub fn needs_arch_warning(&self) -> bool {
        matches!(self.arch, ArchTag::Alternate | ArchTag::Untagged)
    }
}
