//! SaveBackup runtime: debounce gate, serial backup worker, change
//! dispatcher, and a filesystem event source that waits for saves to settle.

pub mod clock;
pub mod debounce;
pub mod dispatcher;
mod error;
mod runtime;
pub mod settle;
pub mod source;
pub mod worker;

pub use clock::{Clock, SystemClock};
pub use debounce::{DebounceState, Debouncer};
pub use dispatcher::ChangeDispatcher;
pub use error::DaemonError;
pub use runtime::{run, run_until, start_blocking};
pub use settle::PendingChanges;
pub use source::{batch_from_event, WatchSource};
pub use worker::{BackupSubmitter, BackupWorker, CopyFile, FsCopy, TaskSink, WorkerReport};
