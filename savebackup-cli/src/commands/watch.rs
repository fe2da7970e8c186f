//! `savebackup watch` — run the backup controller in the foreground.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use savebackup_daemon::start_blocking;

use super::{absolutize, OptionOverrides};

/// Arguments for `savebackup watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Directories to watch recursively (default: `watch` from config).
    pub paths: Vec<PathBuf>,

    #[command(flatten)]
    pub overrides: OptionOverrides,
}

impl WatchArgs {
    pub fn run(self) -> Result<()> {
        let mut options = self.overrides.resolve()?;
        if !self.paths.is_empty() {
            options.watch = self
                .paths
                .iter()
                .map(|p| absolutize(p))
                .collect::<Result<_>>()?;
        }

        start_blocking(options).context("backup runtime exited with error")
    }
}
