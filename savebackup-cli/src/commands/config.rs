//! `savebackup config` — print effective options.

use anyhow::{Context, Result};
use clap::Args;

use super::OptionOverrides;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub overrides: OptionOverrides,
}

impl ConfigArgs {
    pub fn run(self) -> Result<()> {
        let options = self.overrides.resolve()?;
        let yaml = options
            .to_yaml()
            .context("failed to render options as YAML")?;
        print!("{yaml}");
        Ok(())
    }
}
