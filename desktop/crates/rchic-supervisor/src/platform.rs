/// Host operating system families the launcher supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Linux
        }
    }

    /// Name of the script runner, resolved through PATH as a last resort.
    pub fn fallback_executable(&self) -> &'static str {
        match self {
            Self::Windows => "Rscript.exe",
            _ => "Rscript",
        }
    }

    /// Variable the dynamic loader searches for bundled libraries.
    pub fn library_path_var(&self) -> Option<&'static str> {
        match self {
            Self::Windows => None,
            Self::MacOs => Some("DYLD_FALLBACK_LIBRARY_PATH"),
            Self::Linux => Some("LD_LIBRARY_PATH"),
        }
    }
}

/// CPU architectures R ships separate macOS builds for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86_64,
    Aarch64,
}

impl Arch {
    /// Running architecture, if it is one R is built for.
    pub fn current() -> Option<Self> {
        match std::env::consts::ARCH {
            "x86_64" => Some(Self::X86_64),
            "aarch64" => Some(Self::Aarch64),
            _ => None,
        }
    }

    /// The other architecture; arm64 Macs can run x86_64 builds under emulation.
    pub fn alternate(self) -> Self {
        match self {
            Self::X86_64 => Self::Aarch64,
            Self::Aarch64 => Self::X86_64,
        }
    }

    /// Architecture encoded in an R.framework version directory name.
    ///
    /// `4.3-arm64` is arm64, `4.3-x86_64` is Intel, plain `4.3` is untagged.
    pub fn from_version_tag(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        if lower.contains("arm64") || lower.contains("aarch64") {
            Some(Self::Aarch64)
        } else if lower.contains("x86_64") || lower.contains("x64") || lower.contains("intel") {
            Some(Self::X86_64)
        } else {
            None
        }
    }
}
