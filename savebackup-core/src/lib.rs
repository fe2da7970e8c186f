//! SaveBackup core library — domain types, path mapping, options, errors.
//!
//! Public API surface:
//! - [`types`] — change events and backup tasks
//! - [`mapper`] — source path + timestamp → backup destination
//! - [`options`] — [`BackupOptions`] and its YAML loader
//! - [`paths`] — fixed names and locations
//! - [`error`] — [`MapError`], [`ConfigError`]

pub mod error;
pub mod mapper;
pub mod options;
pub mod paths;
pub mod types;

pub use error::{ConfigError, MapError};
pub use mapper::{format_timestamp, PathMapper, TIMESTAMP_FORMAT};
pub use options::BackupOptions;
pub use types::{BackupTask, ChangeEvent, ChangeKind};
