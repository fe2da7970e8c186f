//! Source path → timestamped backup destination.
//!
//! ```text
//! source      /home/u/proj/a.txt
//! backup root /home/u/.SaveBackup
//! timestamp   2024-01-02_03-04-05
//! destination /home/u/.SaveBackup/home/u/proj/a-2024-01-02_03-04-05.txt
//! ```
//!
//! The mirrored segment is the source path with every `:` removed, so drive
//! letters become plain directory names (`C:/x/a.txt` → `<root>/C/x/...`).
//! Derivation is pure: no directories are created here.

use std::fmt;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use chrono::{DateTime, TimeZone};

use crate::error::MapError;
use crate::options::BackupOptions;

/// `yyyy-MM-dd_HH-mm-ss`, second resolution.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Render `at` as [`TIMESTAMP_FORMAT`] (`yyyy-MM-dd_HH-mm-ss`) in its own zone.
pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Derives destinations under one backup root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapper {
    backup_root: PathBuf,
    extra_separator_after_root: bool,
}

impl PathMapper {
    pub fn new(backup_root: impl Into<PathBuf>, extra_separator_after_root: bool) -> Self {
        Self {
            backup_root: backup_root.into(),
            extra_separator_after_root,
        }
    }

    pub fn from_options(options: &BackupOptions) -> Self {
        Self::new(
            options.backup_root.clone(),
            options.extra_separator_after_root,
        )
    }

    pub fn backup_root(&self) -> &Path {
        &self.backup_root
    }

    pub fn derive(&self, source: &Path, timestamp: &str) -> Result<PathBuf, MapError> {
        derive(
            source,
            &self.backup_root,
            timestamp,
            self.extra_separator_after_root,
        )
    }

    /// `true` when `path` is itself inside the backup tree.
    pub fn is_backup_path(&self, path: &Path) -> bool {
        path.starts_with(&self.backup_root)
    }
}

/// Build `<root>[sep]<source without ':'>` and splice `-<timestamp>` in
/// front of the file extension (or append it when there is none).
///
/// # Errors
/// [`MapError::InvalidPath`] when `source` is empty, not absolute, or either
/// path is not valid UTF-8.
pub fn derive(
    source: &Path,
    backup_root: &Path,
    timestamp: &str,
    extra_separator_after_root: bool,
) -> Result<PathBuf, MapError> {
    let raw = source
        .to_str()
        .ok_or_else(|| invalid(source, "path is not valid UTF-8"))?;
    if raw.is_empty() {
        return Err(invalid(source, "path is empty"));
    }
    if !is_absolute(raw) {
        return Err(invalid(source, "path is not absolute"));
    }
    let root = backup_root
        .to_str()
        .ok_or_else(|| invalid(backup_root, "backup root is not valid UTF-8"))?;

    let mirrored: String = raw.chars().filter(|c| *c != ':').collect();

    let mut dest = String::with_capacity(root.len() + mirrored.len() + timestamp.len() + 2);
    dest.push_str(root);
    // A stripped drive path (`C/x/...`) has no leading separator of its own.
    if extra_separator_after_root || !mirrored.starts_with(['/', '\\']) {
        dest.push(MAIN_SEPARATOR);
    }
    dest.push_str(&mirrored);

    let backslash = cfg!(windows) || is_drive_path(raw);
    match extension(&dest, backslash).map(str::len) {
        Some(ext_len) => {
            // Split at the final `.` and re-join as `<stem>-<ts>.<ext>`.
            let dot = dest.len() - ext_len - 1;
            let ext = dest.split_off(dot);
            dest.push('-');
            dest.push_str(timestamp);
            dest.push_str(&ext);
        }
        None => {
            dest.push('-');
            dest.push_str(timestamp);
        }
    }

    Ok(PathBuf::from(dest))
}

fn invalid(path: &Path, reason: &'static str) -> MapError {
    MapError::InvalidPath {
        path: path.to_path_buf(),
        reason,
    }
}

fn is_absolute(raw: &str) -> bool {
    Path::new(raw).is_absolute() || is_drive_path(raw)
}

/// `X:/...` or `X:\...` regardless of host platform.
fn is_drive_path(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'/' || bytes[2] == b'\\')
}

/// Extension of the last path component. Leading-dot names have none.
fn extension(path: &str, backslash_is_separator: bool) -> Option<&str> {
    let name_start = path
        .rfind(|c| c == '/' || (backslash_is_separator && c == '\\'))
        .map(|i| i + 1)
        .unwrap_or(0);
    let name = &path[name_start..];
    match name.rfind('.') {
        Some(0) | None => None,
        Some(i) => Some(&name[i + 1..]),
    }
}
