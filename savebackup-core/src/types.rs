//! Domain types flowing through the backup controller.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// What happened to a resource in a change batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Modified => "modified",
        };
        f.write_str(s)
    }
}

/// One node of a hierarchical change delta.
///
/// Directory nodes may carry `children`; leaf file nodes normally have none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub resource_path: PathBuf,
    pub kind: ChangeKind,
    pub is_directory: bool,
    pub children: Vec<ChangeEvent>,
}

impl ChangeEvent {
    /// A leaf event for a regular file.
    pub fn file(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            resource_path: path.into(),
            kind,
            is_directory: false,
            children: Vec::new(),
        }
    }

    /// A directory node wrapping nested changes.
    pub fn directory(
        path: impl Into<PathBuf>,
        kind: ChangeKind,
        children: Vec<ChangeEvent>,
    ) -> Self {
        Self {
            resource_path: path.into(),
            kind,
            is_directory: true,
            children,
        }
    }

    /// `true` for an in-place modification of a regular file.
    pub fn is_file_modification(&self) -> bool {
        self.kind == ChangeKind::Modified && !self.is_directory
    }
}

/// A single copy job: `source_path` → `destination_path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupTask {
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
}

impl BackupTask {
    pub fn new(source_path: impl Into<PathBuf>, destination_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            destination_path: destination_path.into(),
        }
    }

    /// Directory the worker must create before copying.
    pub fn destination_parent(&self) -> Option<&Path> {
        self.destination_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
    }
}
