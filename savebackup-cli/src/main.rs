//! SaveBackup — timestamped copies of every file you save.
//!
//! # Usage
//!
//! ```text
//! savebackup watch [PATHS]... [--interval-ms <N>] [--backup-root <DIR>]
//! savebackup preview <FILE> [--timestamp <TS>] [--backup-root <DIR>]
//! savebackup config [--interval-ms <N>] [--backup-root <DIR>]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{config::ConfigArgs, preview::PreviewArgs, watch::WatchArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "savebackup",
    version,
    about = "Write a timestamped backup copy every time a watched file is saved",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Watch directories in the foreground and back up every saved file.
    Watch(WatchArgs),

    /// Print the backup path a file would be copied to.
    Preview(PreviewArgs),

    /// Print the effective options as YAML.
    Config(ConfigArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Watch(args) => args.run(),
        Commands::Preview(args) => args.run(),
        Commands::Config(args) => args.run(),
    }
}
