use crate::locator::{CandidateSource, FileSystem, join_all};
use crate::{BinaryCandidate, CandidateOrigin, Platform};

use std::path::PathBuf;

/// Installation named by the home override variable (R_HOME by default).
pub struct EnvOverrideSource {
    home: PathBuf,
    platform: Platform,
}

impl EnvOverrideSource {
    pub fn new(home: PathBuf, platform: Platform) -> Self {
        Self { home, platform }
    }
}

impl CandidateSource for EnvOverrideSource {
    fn name(&self) -> &str {
        "home override"
    }

    fn candidates(&self, _fs: &dyn FileSystem) -> Vec<BinaryCandidate> {
        let layouts: &[&[&str]] = match self.platform {
            Platform::Windows => &[&["bin", "x64", "Rscript.exe"], &["bin", "Rscript.exe"]],
            _ => &[&["bin", "Rscript"]],
        };

        layouts
            .iter()
            .map(|parts| BinaryCandidate::new(join_all(&self.home, parts), CandidateOrigin::System))
            .collect()
    }
}
