//! Error types for savebackup-core.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to derive a backup destination for a source path.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    /// The source path is empty, relative, or not representable as UTF-8.
    #[error("invalid source path '{path}': {reason}")]
    InvalidPath { path: PathBuf, reason: &'static str },
}

/// All errors that can arise while loading [`crate::BackupOptions`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure reading the config file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load — includes the file path.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// YAML serialization error (printing effective options).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// `dirs::home_dir()` returned `None` — cannot locate `~/.SaveBackup/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}
