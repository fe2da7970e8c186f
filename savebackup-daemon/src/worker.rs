//! Single-lane backup executor.
//!
//! Tasks travel over one unbounded channel to one consumer loop which awaits
//! each copy before taking the next, so execution order is submission order
//! and no two backups ever touch the filesystem at the same time. Submission
//! never blocks the caller.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use savebackup_core::BackupTask;

use crate::error::DaemonError;

/// Byte-copy primitive: read all of `from`, create/truncate `to`.
pub trait CopyFile: Send + Sync + 'static {
    fn copy(&self, from: &Path, to: &Path) -> std::io::Result<u64>;
}

/// [`CopyFile`] backed by `std::fs::copy`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsCopy;

impl CopyFile for FsCopy {
    fn copy(&self, from: &Path, to: &Path) -> std::io::Result<u64> {
        std::fs::copy(from, to)
    }
}

/// Anything that accepts backup tasks without blocking.
pub trait TaskSink: Send + Sync {
    fn submit(&self, task: BackupTask);
}

#[derive(Debug)]
enum WorkerMessage {
    Backup(BackupTask),
    Shutdown,
}

/// Cloneable, non-blocking handle onto the worker queue.
#[derive(Debug, Clone)]
pub struct BackupSubmitter {
    tx: mpsc::UnboundedSender<WorkerMessage>,
}

impl TaskSink for BackupSubmitter {
    fn submit(&self, task: BackupTask) {
        if let Err(err) = self.tx.send(WorkerMessage::Backup(task)) {
            if let WorkerMessage::Backup(task) = err.0 {
                tracing::warn!(
                    source = %task.source_path.display(),
                    "backup worker has stopped; dropping task",
                );
            }
        }
    }
}

/// Outcome counts of a drained worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub completed: usize,
    pub failed: usize,
}

pub struct BackupWorker {
    submitter: BackupSubmitter,
    handle: JoinHandle<WorkerReport>,
}

impl BackupWorker {
    /// Start the consumer loop on the current tokio runtime.
    pub fn spawn<C: CopyFile>(copier: C) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(worker_loop(Arc::new(copier), rx));
        Self {
            submitter: BackupSubmitter { tx },
            handle,
        }
    }

    pub fn submitter(&self) -> BackupSubmitter {
        self.submitter.clone()
    }

    pub fn submit(&self, task: BackupTask) {
        self.submitter.submit(task);
    }

    /// Let every task queued so far finish, then stop.
    ///
    /// Tasks submitted after this call are dropped. Returns `None` if the
    /// drain does not finish within `timeout`.
    pub async fn shutdown(self, timeout: Duration) -> Option<WorkerReport> {
        // FIFO queue: Shutdown is only seen after everything ahead of it.
        let _ = self.submitter.tx.send(WorkerMessage::Shutdown);

        match tokio::time::timeout(timeout, self.handle).await {
            Ok(Ok(report)) => {
                tracing::info!(
                    completed = report.completed,
                    failed = report.failed,
                    "backup worker drained",
                );
                Some(report)
            }
            Ok(Err(err)) => {
                tracing::error!(error = %err, "backup worker join failure");
                None
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "backup worker did not drain in time",
                );
                None
            }
        }
    }
}

async fn worker_loop<C: CopyFile>(
    copier: Arc<C>,
    mut rx: mpsc::UnboundedReceiver<WorkerMessage>,
) -> WorkerReport {
    let mut report = WorkerReport::default();

    while let Some(message) = rx.recv().await {
        let task = match message {
            WorkerMessage::Backup(task) => task,
            WorkerMessage::Shutdown => break,
        };

        let copier = copier.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            let result = execute(copier.as_ref(), &task);
            (task, result)
        })
        .await;

        match outcome {
            Ok((task, Ok(bytes))) => {
                report.completed += 1;
                tracing::info!(
                    source = %task.source_path.display(),
                    destination = %task.destination_path.display(),
                    bytes,
                    "backup written",
                );
            }
            Ok((task, Err(err))) => {
                report.failed += 1;
                tracing::warn!(
                    source = %task.source_path.display(),
                    error = %err,
                    "backup failed",
                );
            }
            Err(err) => {
                report.failed += 1;
                tracing::error!(error = %err, "backup task join failure");
            }
        }
    }

    report
}

/// Create the destination's parent directories, then copy.
///
/// Directory creation is idempotent: an existing parent is not an error.
pub fn execute<C: CopyFile + ?Sized>(copier: &C, task: &BackupTask) -> Result<u64, DaemonError> {
    if let Some(parent) = task.destination_parent() {
        std::fs::create_dir_all(parent).map_err(|source| DaemonError::DirectoryCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    copier
        .copy(&task.source_path, &task.destination_path)
        .map_err(|source| DaemonError::Copy {
            from: task.source_path.clone(),
            to: task.destination_path.clone(),
            source,
        })
}
