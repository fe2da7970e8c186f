//! `savebackup preview` — show where a file would be backed up.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;

use savebackup_core::{format_timestamp, PathMapper};

use super::OptionOverrides;

/// Arguments for `savebackup preview`.
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Absolute path of the file whose backup destination should be printed.
    pub file: PathBuf,

    /// Timestamp to embed instead of the current time (`yyyy-MM-dd_HH-mm-ss`).
    #[arg(long)]
    pub timestamp: Option<String>,

    #[command(flatten)]
    pub overrides: OptionOverrides,
}

impl PreviewArgs {
    pub fn run(self) -> Result<()> {
        let options = self.overrides.resolve()?;
        let mapper = PathMapper::from_options(&options);
        let timestamp = self
            .timestamp
            .unwrap_or_else(|| format_timestamp(&Local::now()));

        let destination = mapper
            .derive(&self.file, &timestamp)
            .with_context(|| format!("cannot derive a backup path for {}", self.file.display()))?;

        println!("{}", destination.display());
        Ok(())
    }
}
