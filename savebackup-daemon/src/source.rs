//! Filesystem event source: `notify` events → settled change batches.
//!
//! The watcher callback only forwards raw events over a channel. A settle
//! task folds them into [`PendingChanges`] and hands each group of paths
//! that has gone quiet to the dispatcher as one batch, so a save is seen
//! once it is finished rather than at its first write.
//!
//! Where the backend reports closing a file opened for writing (inotify),
//! that close is the save signal and raw data writes are ignored.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::event::{AccessKind, AccessMode, CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use savebackup_core::{ChangeEvent, ChangeKind};

use crate::dispatcher::ChangeDispatcher;
use crate::error::{io_err, DaemonError};
use crate::settle::PendingChanges;

/// Backends that emit an event when a file opened for writing is closed.
const CLOSE_WRITE_ENDS_SAVE: bool = cfg!(any(target_os = "linux", target_os = "android"));

/// Live subscription. Call [`WatchSource::close`] to stop it.
pub struct WatchSource {
    watcher: RecommendedWatcher,
    roots: Vec<PathBuf>,
    stop: oneshot::Sender<()>,
    settler: JoinHandle<()>,
}

impl WatchSource {
    /// Watch every reachable root recursively and feed settled batches to
    /// `dispatcher`. Must be called inside a tokio runtime.
    ///
    /// Roots that cannot be resolved or watched are logged and skipped. It is
    /// an error only when roots were given and none of them could be watched.
    pub fn subscribe(
        roots: &[PathBuf],
        settle: Duration,
        dispatcher: Arc<ChangeDispatcher>,
    ) -> Result<Self, DaemonError> {
        let (event_tx, event_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
        let mut watcher = recommended_watcher(move |event| {
            let _ = event_tx.send(event);
        })?;

        let mut watched = Vec::with_capacity(roots.len());
        for root in roots {
            match attach(&mut watcher, root) {
                Ok(real) => {
                    tracing::info!(path = %real.display(), "watching for saves");
                    watched.push(real);
                }
                Err(err) => {
                    tracing::error!(path = %root.display(), error = %err, "cannot watch path; skipping");
                }
            }
        }
        if watched.is_empty() && !roots.is_empty() {
            return Err(DaemonError::Subscription(notify::Error::generic(
                "none of the watch paths could be attached",
            )));
        }

        let (stop, stop_rx) = oneshot::channel();
        let settler = tokio::spawn(settle_loop(event_rx, stop_rx, dispatcher, settle));

        Ok(Self {
            watcher,
            roots: watched,
            stop,
            settler,
        })
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Stop watching, then hand over whatever was still settling.
    pub async fn close(self) {
        drop(self.watcher);
        let _ = self.stop.send(());
        if let Err(err) = self.settler.await {
            tracing::error!(error = %err, "settle task join failure");
        }
    }
}

fn attach(watcher: &mut RecommendedWatcher, root: &Path) -> Result<PathBuf, DaemonError> {
    // Events arrive as real paths (e.g. /private/var/... on macOS).
    let real = fs::canonicalize(root).map_err(|e| io_err(root, e))?;
    watcher.watch(&real, RecursiveMode::Recursive)?;
    Ok(real)
}

async fn settle_loop(
    mut events: mpsc::UnboundedReceiver<notify::Result<Event>>,
    mut stop: oneshot::Receiver<()>,
    dispatcher: Arc<ChangeDispatcher>,
    settle: Duration,
) {
    let mut pending = PendingChanges::new(settle);

    loop {
        let deadline = pending.next_deadline();
        tokio::select! {
            _ = &mut stop => break,
            received = events.recv() => match received {
                Some(Ok(event)) => pending.record(batch_from_event(&event), Instant::now()),
                Some(Err(err)) => tracing::warn!(error = %err, "watcher event error"),
                None => break,
            },
            _ = sleep_until(deadline) => {
                deliver(&dispatcher, pending.take_settled(Instant::now()));
            }
        }
    }

    deliver(&dispatcher, pending.take_all());
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn deliver(dispatcher: &ChangeDispatcher, batch: Vec<ChangeEvent>) {
    if !batch.is_empty() {
        dispatcher.on_change_batch(&batch);
    }
}

/// Translate one notify event. Access and metadata-only events yield an
/// empty batch, except a close-after-write which counts as a modification.
pub fn batch_from_event(event: &Event) -> Vec<ChangeEvent> {
    let leaf = |path: &PathBuf, kind: ChangeKind| ChangeEvent {
        resource_path: path.clone(),
        kind,
        is_directory: is_directory(&event.kind, path),
        children: Vec::new(),
    };
    let all = |kind: ChangeKind| -> Vec<ChangeEvent> {
        event.paths.iter().map(|p| leaf(p, kind)).collect()
    };

    match &event.kind {
        EventKind::Create(_) => all(ChangeKind::Added),
        EventKind::Remove(_) => all(ChangeKind::Removed),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => all(ChangeKind::Removed),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => all(ChangeKind::Added),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => event
            .paths
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let kind = if i == 0 {
                    ChangeKind::Removed
                } else {
                    ChangeKind::Added
                };
                leaf(p, kind)
            })
            .collect(),
        EventKind::Modify(ModifyKind::Name(_)) | EventKind::Modify(ModifyKind::Metadata(_)) => {
            Vec::new()
        }
        EventKind::Modify(ModifyKind::Data(_)) if CLOSE_WRITE_ENDS_SAVE => Vec::new(),
        EventKind::Modify(_) => all(ChangeKind::Modified),
        EventKind::Access(AccessKind::Close(AccessMode::Write)) => all(ChangeKind::Modified),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}

fn is_directory(kind: &EventKind, path: &Path) -> bool {
    match kind {
        EventKind::Create(CreateKind::Folder) | EventKind::Remove(RemoveKind::Folder) => true,
        EventKind::Remove(_) => false,
        _ => path.is_dir(),
    }
}
