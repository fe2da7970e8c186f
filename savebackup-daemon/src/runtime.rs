use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use savebackup_core::paths::DRAIN_TIMEOUT;
use savebackup_core::BackupOptions;

use crate::dispatcher::ChangeDispatcher;
use crate::error::{io_err, DaemonError};
use crate::source::WatchSource;
use crate::worker::{BackupWorker, FsCopy, WorkerReport};

/// Start the backup runtime and block the current thread until it exits.
pub fn start_blocking(options: BackupOptions) -> Result<(), DaemonError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(options)).map(|_| ())
}

/// Run until Ctrl-C (or SIGTERM on unix).
pub async fn run(options: BackupOptions) -> Result<Option<WorkerReport>, DaemonError> {
    run_until(options, shutdown_signal()).await
}

/// Run until `shutdown` resolves, then stop watching and drain the worker.
///
/// A failed subscription is logged and leaves the runtime inert: no backups
/// are taken but the call still waits for `shutdown`.
pub async fn run_until<F>(
    options: BackupOptions,
    shutdown: F,
) -> Result<Option<WorkerReport>, DaemonError>
where
    F: Future<Output = ()>,
{
    tracing::info!("starting SaveBackup...");
    let options = ensure_backup_root(options)?;

    let worker = BackupWorker::spawn(FsCopy);
    let dispatcher = Arc::new(ChangeDispatcher::from_options(
        &options,
        Arc::new(worker.submitter()),
    ));

    if options.watch.is_empty() {
        tracing::warn!("no watch paths configured; nothing will be backed up");
    }
    let settle = Duration::from_millis(options.settle_millis);
    let source = match WatchSource::subscribe(&options.watch, settle, dispatcher) {
        Ok(source) => Some(source),
        Err(err) => {
            tracing::error!(error = %err, "event subscription failed; backups disabled");
            None
        }
    };

    tracing::info!(
        backup_root = %options.backup_root.display(),
        minimum_interval_ms = options.minimum_interval_millis,
        settle_ms = options.settle_millis,
        "backup controller ready",
    );
    shutdown.await;
    tracing::info!("shutting down SaveBackup");

    // Stop new batches before draining what is already queued.
    if let Some(source) = source {
        source.close().await;
    }
    Ok(worker.shutdown(DRAIN_TIMEOUT).await)
}

/// Create the backup root and resolve it to the same form watcher-reported
/// paths take.
fn ensure_backup_root(options: BackupOptions) -> Result<BackupOptions, DaemonError> {
    let root = &options.backup_root;
    if !root.exists() {
        fs::create_dir_all(root).map_err(|e| io_err(root, e))?;
    }
    let backup_root = real_path(root)?;
    Ok(BackupOptions {
        backup_root,
        ..options
    })
}

#[cfg(unix)]
fn real_path(path: &Path) -> Result<PathBuf, DaemonError> {
    fs::canonicalize(path).map_err(|e| io_err(path, e))
}

// canonicalize yields verbatim `\\?\` paths on Windows, which reject the
// forward slashes of mirrored drive paths.
#[cfg(not(unix))]
fn real_path(path: &Path) -> Result<PathBuf, DaemonError> {
    Ok(path.to_path_buf())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    result = tokio::signal::ctrl_c() => log_ctrl_c(result),
                    _ = terminate.recv() => tracing::info!("received SIGTERM"),
                }
                return;
            }
            Err(err) => tracing::warn!(error = %err, "SIGTERM handler unavailable"),
        }
    }
    log_ctrl_c(tokio::signal::ctrl_c().await);
}

fn log_ctrl_c(result: std::io::Result<()>) {
    match result {
        Ok(()) => tracing::info!("received ctrl-c"),
        Err(err) => tracing::error!(error = %err, "ctrl-c handler failed"),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
