//! Change batch → backup tasks.
//!
//! Per batch: one debounce decision, then a depth-first walk of the delta
//! tree. Every Modified regular file outside the backup root becomes one
//! [`BackupTask`]. The dispatcher does no I/O of its own; directory creation
//! and copying belong to the worker.

use std::sync::Arc;

use savebackup_core::{format_timestamp, BackupOptions, BackupTask, ChangeEvent, PathMapper};

use crate::clock::{Clock, SystemClock};
use crate::debounce::Debouncer;
use crate::worker::TaskSink;

pub struct ChangeDispatcher {
    debouncer: Debouncer,
    mapper: PathMapper,
    sink: Arc<dyn TaskSink>,
    clock: Arc<dyn Clock>,
}

impl ChangeDispatcher {
    pub fn new(
        debouncer: Debouncer,
        mapper: PathMapper,
        sink: Arc<dyn TaskSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            debouncer,
            mapper,
            sink,
            clock,
        }
    }

    /// Dispatcher on the system clock, configured from `options`.
    pub fn from_options(options: &BackupOptions, sink: Arc<dyn TaskSink>) -> Self {
        Self::new(
            Debouncer::new(options.minimum_interval_millis),
            PathMapper::from_options(options),
            sink,
            Arc::new(SystemClock),
        )
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    /// Handle one notification batch; returns the number of tasks submitted.
    ///
    /// A batch that arrives inside the debounce window is dropped whole, even
    /// if it carries real modifications.
    pub fn on_change_batch(&self, events: &[ChangeEvent]) -> usize {
        let now = self.clock.now();
        if !self.debouncer.decide(now.timestamp_millis()) {
            tracing::debug!(events = events.len(), "change batch suppressed");
            return 0;
        }

        let timestamp = format_timestamp(&now);
        let mut submitted = 0;

        // Pre-order walk; children pushed reversed so siblings keep their order.
        let mut stack: Vec<&ChangeEvent> = events.iter().rev().collect();
        while let Some(event) = stack.pop() {
            stack.extend(event.children.iter().rev());
            if event.is_file_modification() && self.dispatch(event, &timestamp) {
                submitted += 1;
            }
        }

        submitted
    }

    fn dispatch(&self, event: &ChangeEvent, timestamp: &str) -> bool {
        let source = &event.resource_path;
        if self.mapper.is_backup_path(source) {
            tracing::trace!(path = %source.display(), "ignoring change inside backup root");
            return false;
        }

        match self.mapper.derive(source, timestamp) {
            Ok(destination) => {
                tracing::debug!(
                    source = %source.display(),
                    destination = %destination.display(),
                    "queueing backup",
                );
                self.sink.submit(BackupTask::new(source.clone(), destination));
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "skipping change");
                false
            }
        }
    }
}
