use std::path::{Path, PathBuf};
use std::time::Duration;

pub const BACKUP_DIR_NAME: &str = ".SaveBackup";
pub const CONFIG_FILE: &str = "config.yaml";

pub const DEFAULT_MINIMUM_INTERVAL_MILLIS: u64 = 1000;
pub const DEFAULT_SETTLE_MILLIS: u64 = 300;
/// Upper bound on how long shutdown waits for queued backups to finish.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

pub fn backup_root(home: &Path) -> PathBuf {
    home.join(BACKUP_DIR_NAME)
}

pub fn config_path(home: &Path) -> PathBuf {
    backup_root(home).join(CONFIG_FILE)
}
