//! Backup controller options and their optional YAML file.
//!
//! # Storage layout
//!
//! ```text
//! ~/.SaveBackup/
//!   config.yaml      (optional; every field has a default)
//!   <mirrored source tree with timestamped copies>
//! ```
//!
//! # API pattern
//!
//! - `load_at(home)` — explicit home; used in tests with `TempDir`
//! - `load()` — derives home from `dirs::home_dir()`, delegates to `load_at`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::paths::{self, DEFAULT_MINIMUM_INTERVAL_MILLIS, DEFAULT_SETTLE_MILLIS};

/// Plain options structure consumed by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupOptions {
    /// Batches arriving closer than this to the previous one are dropped.
    #[serde(default = "default_minimum_interval_millis")]
    pub minimum_interval_millis: u64,

    /// How long a path must stay quiet before its changes count as one
    /// finished save.
    #[serde(default = "default_settle_millis")]
    pub settle_millis: u64,

    /// Root of the mirrored backup tree.
    pub backup_root: PathBuf,

    /// Insert a separator between the root and the mirrored path. Needed
    /// where absolute paths start with a drive letter instead of a separator.
    #[serde(default = "default_extra_separator_after_root")]
    pub extra_separator_after_root: bool,

    /// Directories to watch recursively.
    #[serde(default)]
    pub watch: Vec<PathBuf>,
}

/// On-disk shape: every field optional so a partial file is valid.
#[derive(Debug, Default, Deserialize)]
struct OptionsFile {
    minimum_interval_millis: Option<u64>,
    settle_millis: Option<u64>,
    backup_root: Option<PathBuf>,
    extra_separator_after_root: Option<bool>,
    #[serde(default)]
    watch: Vec<PathBuf>,
}

fn default_minimum_interval_millis() -> u64 {
    DEFAULT_MINIMUM_INTERVAL_MILLIS
}

fn default_settle_millis() -> u64 {
    DEFAULT_SETTLE_MILLIS
}

fn default_extra_separator_after_root() -> bool {
    cfg!(windows)
}

impl BackupOptions {
    /// Defaults rooted at `<home>/.SaveBackup`.
    pub fn with_home(home: &Path) -> Self {
        Self {
            minimum_interval_millis: default_minimum_interval_millis(),
            settle_millis: default_settle_millis(),
            backup_root: paths::backup_root(home),
            extra_separator_after_root: default_extra_separator_after_root(),
            watch: Vec::new(),
        }
    }

    /// Load `<home>/.SaveBackup/config.yaml`, falling back to defaults for a
    /// missing file or missing fields.
    ///
    /// Returns [`ConfigError::Parse`] (with path) if the YAML is malformed.
    pub fn load_at(home: &Path) -> Result<Self, ConfigError> {
        let path = paths::config_path(home);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::with_home(home));
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };

        // An empty file deserializes to unit, not a map.
        let file: OptionsFile = if contents.trim().is_empty() {
            OptionsFile::default()
        } else {
            serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })?
        };

        let defaults = Self::with_home(home);
        Ok(Self {
            minimum_interval_millis: file
                .minimum_interval_millis
                .unwrap_or(defaults.minimum_interval_millis),
            settle_millis: file.settle_millis.unwrap_or(defaults.settle_millis),
            backup_root: file.backup_root.unwrap_or(defaults.backup_root),
            extra_separator_after_root: file
                .extra_separator_after_root
                .unwrap_or(defaults.extra_separator_after_root),
            watch: file.watch,
        })
    }

    /// `load_at` convenience wrapper.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_at(&home()?)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}
