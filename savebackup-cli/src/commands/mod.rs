pub mod config;
pub mod preview;
pub mod watch;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use savebackup_core::BackupOptions;

/// Flags that override `~/.SaveBackup/config.yaml`.
#[derive(Args, Debug, Default)]
pub struct OptionOverrides {
    /// Root directory for backup copies.
    #[arg(long, value_name = "DIR")]
    pub backup_root: Option<PathBuf>,

    /// Minimum gap between processed change batches, in milliseconds.
    #[arg(long, value_name = "N")]
    pub interval_ms: Option<u64>,
}

impl OptionOverrides {
    /// Load options for the current user and apply the overrides on top.
    pub fn resolve(&self) -> Result<BackupOptions> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let mut options = BackupOptions::load_at(&home).context("failed to load config")?;

        if let Some(root) = &self.backup_root {
            options.backup_root = absolutize(root)?;
        }
        if let Some(interval) = self.interval_ms {
            options.minimum_interval_millis = interval;
        }
        Ok(options)
    }
}

/// Resolve `path` against the working directory when it is relative.
/// An empty path is returned unchanged.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() || path.as_os_str().is_empty() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("could not determine working directory")?;
    Ok(cwd.join(path))
}
