use crate::locator::{CandidateSource, FileSystem};
use crate::{BinaryCandidate, CandidateOrigin};

use std::path::PathBuf;

/// A fixed list of paths, such as an explicit `--rscript` argument.
pub struct StaticSource {
    name: String,
    paths: Vec<PathBuf>,
    origin: CandidateOrigin,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, paths: Vec<PathBuf>, origin: CandidateOrigin) -> Self {
        Self {
            name: name.into(),
            paths,
            origin,
        }
    }
}

impl CandidateSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn candidates(&self, _fs: &dyn FileSystem) -> Vec<BinaryCandidate> {
        self.paths
            .iter()
            .map(|path| BinaryCandidate::new(path.clone(), self.origin))
            .collect()
    }
}
