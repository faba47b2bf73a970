use crate::RESOURCES_DIR_NAME;

use rchic_supervisor::ResourcePaths;

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "rchic-launcher")]
#[command(about = "Starts the RCHIC R backend and hands its URL to the display layer")]
#[command(version)]
pub struct Cli {
    /// Run from a repository checkout rooted here instead of packaged resources
    #[arg(long, value_name = "ROOT", conflicts_with = "resources")]
    pub(crate) dev: Option<PathBuf>,

    /// Packaged resources directory (defaults to `resources/` next to the executable)
    #[arg(long, value_name = "DIR")]
    pub(crate) resources: Option<PathBuf>,

    /// Config directory (defaults to RCHIC_CONFIG_DIR, then the platform config dir)
    #[arg(long, value_name = "DIR")]
    pub(crate) config_dir: Option<PathBuf>,

    /// How startup progress is reported
    #[arg(long, value_enum, default_value_t = ProgressFormat::Log)]
    pub(crate) progress: ProgressFormat,

    /// Try this Rscript before any other candidate
    #[arg(long, value_name = "PATH")]
    pub(crate) rscript: Option<PathBuf>,

    /// Tear the backend down as soon as it is ready
    #[arg(long)]
    pub(crate) exit_after_ready: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProgressFormat {
    /// One JSON object per line on stdout
    Json,
    /// Progress goes to the log only
    Log,
}

impl Cli {
    /// Resource layout for this run.
    pub(crate) fn resource_paths(&self, entry_script: &str) -> std::io::Result<ResourcePaths> {
        if let Some(root) = &self.dev {
            return Ok(ResourcePaths::development(root, entry_script));
        }

        let dir = match &self.resources {
            Some(dir) => dir.clone(),
            None => default_resources_dir()?,
        };

        Ok(ResourcePaths::production(&dir, entry_script))
    }
}

fn default_resources_dir() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let dir = exe.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok(dir.join(RESOURCES_DIR_NAME))
}
