use crate::locator::{CandidateSource, FileSystem, join_all, sort_newest_first};
use crate::{Arch, ArchTag, BinaryCandidate, CandidateOrigin, Platform};

use std::path::{Path, PathBuf};

/// Portable R shipped inside the application resources (`R-portable`).
pub struct BundledSource {
    root: PathBuf,
    platform: Platform,
    arch: Option<Arch>,
}

impl BundledSource {
    pub fn new(root: PathBuf, platform: Platform) -> Self {
        Self {
            root,
            platform,
            arch: Arch::current(),
        }
    }

    /// Search as if running on `arch`.
    pub fn with_arch(mut self, arch: Option<Arch>) -> Self {
        self.arch = arch;
        self
    }

    fn candidate(&self, parts: &[&str]) -> BinaryCandidate {
        BinaryCandidate::new(join_all(&self.root, parts), CandidateOrigin::Bundled)
    }

    /// R.framework layouts, ordered native arch, alternate arch, then anything.
    fn framework_candidates(&self, fs: &dyn FileSystem) -> Vec<BinaryCandidate> {
        let framework = self.root.join("R.framework");
        let versions_dir = framework.join("Versions");

        let listing = if fs.is_dir(&versions_dir) {
            fs.list_dir(&versions_dir)
        } else {
            Vec::new()
        };
        let mut versions: Vec<String> = listing
            .into_iter()
            .filter(|name| !name.starts_with('.') && name != "Current")
            .collect();
        sort_newest_first(&mut versions);

        let native = self.arch;
        let alternate = self.arch.map(Arch::alternate);

        let mut native_pass = Vec::new();
        let mut alternate_pass = Vec::new();
        let mut untagged_pass = Vec::new();

        for version in &versions {
            let path = version_rscript(&versions_dir, version);
            let tag = Arch::from_version_tag(version);

            match tag {
                Some(arch) if Some(arch) == native => {
                    native_pass.push(BinaryCandidate::new(path, CandidateOrigin::Bundled).with_arch(ArchTag::Native));
                }
                Some(arch) if Some(arch) == alternate => {
                    alternate_pass.push(
                        BinaryCandidate::new(path, CandidateOrigin::Bundled).with_arch(ArchTag::Alternate),
                    );
                }
                _ => {
                    untagged_pass.push(
                        BinaryCandidate::new(path, CandidateOrigin::Bundled).with_arch(ArchTag::Untagged),
                    );
                }
            }
        }

        let mut candidates = native_pass;
        candidates.extend(alternate_pass);
        candidates.extend(untagged_pass);
        candidates.push(BinaryCandidate::new(
            join_all(&framework, &["Resources", "bin", "Rscript"]),
            CandidateOrigin::Bundled,
        ));
        candidates.push(self.candidate(&["bin", "Rscript"]));
        candidates
    }
}

fn version_rscript(versions_dir: &Path, version: &str) -> PathBuf {
    join_all(versions_dir, &[version, "Resources", "bin", "Rscript"])
}

impl CandidateSource for BundledSource {
    fn name(&self) -> &str {
        "bundled runtime"
    }

    fn candidates(&self, fs: &dyn FileSystem) -> Vec<BinaryCandidate> {
        match self.platform {
            Platform::Windows => vec![
                self.candidate(&["bin", "x64", "Rscript.exe"]),
                self.candidate(&["bin", "Rscript.exe"]),
            ],
            Platform::Linux => vec![self.candidate(&["bin", "Rscript"])],
            Platform::MacOs => self.framework_candidates(fs),
        }
    }
}
