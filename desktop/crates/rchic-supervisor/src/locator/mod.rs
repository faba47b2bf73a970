//! Resolves which R executable to launch.
//!
//! Sources are consulted in priority order and the first candidate that
//! exists wins. When nothing exists the locator hands back a bare
//! `Rscript` so the inherited PATH gets a chance.

mod bundled_source;
mod env_override_source;
mod file_system;
mod static_source;
mod system_source;

pub use bundled_source::BundledSource;
pub use env_override_source::EnvOverrideSource;
pub use file_system::{FileSystem, RealFileSystem};
pub use static_source::StaticSource;
pub use system_source::SystemSource;

pub(crate) use file_system::{join_all, sort_newest_first};

use crate::{BinaryCandidate, CandidateOrigin, Platform};

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

/// One place R may be installed, expanded into concrete candidates.
pub trait CandidateSource: Send + Sync {
    fn name(&self) -> &str;

    /// Candidates in the order they should be tried.
    fn candidates(&self, fs: &dyn FileSystem) -> Vec<BinaryCandidate>;
}

pub struct ExecutableLocator {
    sources: Vec<Box<dyn CandidateSource>>,
    fs: Arc<dyn FileSystem>,
    fallback: BinaryCandidate,
}

impl ExecutableLocator {
    /// Locator with no sources; it always falls back to PATH.
    pub fn new(fs: Arc<dyn FileSystem>, platform: Platform) -> Self {
        Self {
            sources: Vec::new(),
            fs,
            fallback: BinaryCandidate::new(
                platform.fallback_executable(),
                CandidateOrigin::PathFallback,
            ),
        }
    }

    pub fn with_source(mut self, source: impl CandidateSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Standard search order for a platform: bundled runtime, the home
    /// override, then conventional system locations.
    pub fn standard(
        platform: Platform,
        bundled_root: Option<PathBuf>,
        home_override: Option<PathBuf>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        let mut locator = Self::new(fs, platform);

        if let Some(root) = bundled_root {
            locator = locator.with_source(BundledSource::new(root, platform));
        }
        if let Some(home) = home_override {
            locator = locator.with_source(EnvOverrideSource::new(home, platform));
        }

        locator.with_source(SystemSource::new(platform))
    }

    /// Standard search order on the running host, reading the override
    /// from `home_env_var`.
    pub fn for_host(bundled_root: Option<PathBuf>, home_env_var: &str) -> Self {
        let home_override = std::env::var_os(home_env_var)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        Self::standard(
            Platform::current(),
            bundled_root,
            home_override,
            Arc::new(RealFileSystem),
        )
    }

    /// Put a source ahead of every other one.
    pub fn prepend_source(mut self, source: impl CandidateSource + 'static) -> Self {
        self.sources.insert(0, Box::new(source));
        self
    }

    pub fn locate(&self) -> BinaryCandidate {
        let mut searched = Vec::new();

        for source in &self.sources {
            for candidate in source.candidates(self.fs.as_ref()) {
                if self.fs.is_file(&candidate.path) {
                    if candidate.needs_arch_warning() {
                        warn!(
                            "Using R at {} which may not match this machine's architecture",
                            candidate.path.display()
                        );
                    }
                    info!(
                        "Using {} R from {} ({})",
                        candidate.origin,
                        candidate.path.display(),
                        source.name()
                    );
                    return candidate;
                }

                debug!("Not found: {}", candidate.path.display());
                searched.push(candidate.path);
            }
        }

        warn!("R not found in standard locations, trying PATH");
        if !searched.is_empty() {
            let listing: Vec<String> = searched.iter().map(|p| p.display().to_string()).collect();
            warn!("Searched paths: {}", listing.join(", "));
        }

        self.fallback.clone()
    }

    /// Every path the locator would check, in order.
    pub fn search_paths(&self) -> Vec<PathBuf> {
        self.sources
            .iter()
            .flat_map(|source| source.candidates(self.fs.as_ref()))
            .map(|candidate| candidate.path)
            .collect()
    }
}
