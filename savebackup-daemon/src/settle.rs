//! Per-path quiet-period coalescing.
//!
//! Raw notifications for a path are held until none has arrived for the
//! settle period. Paths that settle together are released as one batch, so
//! a save made of truncate, writes and close surfaces as a single change
//! once the file is complete.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use tokio::time::Instant;

use savebackup_core::{ChangeEvent, ChangeKind};

#[derive(Debug)]
struct Pending {
    event: ChangeEvent,
    last_seen: Instant,
    seq: u64,
}

/// Changes still waiting for their path to go quiet.
#[derive(Debug)]
pub struct PendingChanges {
    settle: Duration,
    entries: HashMap<PathBuf, Pending>,
    next_seq: u64,
}

impl PendingChanges {
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            entries: HashMap::new(),
            next_seq: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fold `events` in at `now`. Each event restarts its path's quiet period.
    pub fn record(&mut self, events: Vec<ChangeEvent>, now: Instant) {
        for event in events {
            let path = event.resource_path.clone();
            let (seq, event) = match self.entries.remove(&path) {
                Some(previous) => match merge(previous.event, event) {
                    Some(merged) => (previous.seq, merged),
                    None => continue,
                },
                None => {
                    let seq = self.next_seq;
                    self.next_seq += 1;
                    (seq, event)
                }
            };
            self.entries.insert(
                path,
                Pending {
                    event,
                    last_seen: now,
                    seq,
                },
            );
        }
    }

    /// Earliest instant at which some pending path settles.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries
            .values()
            .map(|pending| pending.last_seen + self.settle)
            .min()
    }

    /// Remove every change whose path has been quiet for the full settle
    /// period, in first-seen order.
    pub fn take_settled(&mut self, now: Instant) -> Vec<ChangeEvent> {
        let settle = self.settle;
        let ready: Vec<PathBuf> = self
            .entries
            .iter()
            .filter(|(_, pending)| now.saturating_duration_since(pending.last_seen) >= settle)
            .map(|(path, _)| path.clone())
            .collect();
        let settled = ready
            .iter()
            .filter_map(|path| self.entries.remove(path))
            .collect();
        in_first_seen_order(settled)
    }

    /// Remove everything regardless of quiet time.
    pub fn take_all(&mut self) -> Vec<ChangeEvent> {
        let all = self.entries.drain().map(|(_, pending)| pending).collect();
        in_first_seen_order(all)
    }
}

fn in_first_seen_order(mut pending: Vec<Pending>) -> Vec<ChangeEvent> {
    pending.sort_by_key(|p| p.seq);
    pending.into_iter().map(|p| p.event).collect()
}

/// Combine two changes to the same path; `None` when they cancel out.
fn merge(previous: ChangeEvent, next: ChangeEvent) -> Option<ChangeEvent> {
    let kind = match (previous.kind, next.kind) {
        (ChangeKind::Added, ChangeKind::Removed) => return None,
        (ChangeKind::Added, _) => ChangeKind::Added,
        (ChangeKind::Removed, ChangeKind::Added) => ChangeKind::Modified,
        (_, kind) => kind,
    };
    Some(ChangeEvent { kind, ..next })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTLE: Duration = Duration::from_millis(300);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn kinds(events: &[ChangeEvent]) -> Vec<(PathBuf, ChangeKind)> {
        events
            .iter()
            .map(|e| (e.resource_path.clone(), e.kind))
            .collect()
    }

    #[test]
    fn a_burst_on_one_path_settles_once_after_the_last_event() {
        let start = Instant::now();
        let mut pending = PendingChanges::new(SETTLE);

        for offset in [0, 100, 200] {
            pending.record(
                vec![ChangeEvent::file("/w/a.txt", ChangeKind::Modified)],
                start + ms(offset),
            );
        }

        assert_eq!(pending.next_deadline(), Some(start + ms(500)));
        assert!(pending.take_settled(start + ms(499)).is_empty());

        let settled = pending.take_settled(start + ms(500));
        assert_eq!(
            kinds(&settled),
            vec![(PathBuf::from("/w/a.txt"), ChangeKind::Modified)]
        );
        assert!(pending.is_empty());
        assert_eq!(pending.next_deadline(), None);
    }

    #[test]
    fn quiet_paths_are_released_while_busy_ones_keep_waiting() {
        let start = Instant::now();
        let mut pending = PendingChanges::new(SETTLE);

        pending.record(vec![ChangeEvent::file("/w/a.txt", ChangeKind::Modified)], start);
        pending.record(
            vec![ChangeEvent::file("/w/b.txt", ChangeKind::Modified)],
            start + ms(250),
        );

        let settled = pending.take_settled(start + ms(300));
        assert_eq!(
            kinds(&settled),
            vec![(PathBuf::from("/w/a.txt"), ChangeKind::Modified)]
        );
        assert_eq!(pending.next_deadline(), Some(start + ms(550)));
    }

    #[test]
    fn settled_batch_keeps_first_seen_order() {
        let start = Instant::now();
        let mut pending = PendingChanges::new(SETTLE);
        pending.record(
            vec![
                ChangeEvent::file("/w/z.txt", ChangeKind::Modified),
                ChangeEvent::file("/w/a.txt", ChangeKind::Modified),
                ChangeEvent::file("/w/m.txt", ChangeKind::Modified),
            ],
            start,
        );
        pending.record(
            vec![ChangeEvent::file("/w/z.txt", ChangeKind::Modified)],
            start + ms(10),
        );

        let paths: Vec<PathBuf> = pending
            .take_settled(start + ms(400))
            .into_iter()
            .map(|e| e.resource_path)
            .collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/w/z.txt"),
                PathBuf::from("/w/a.txt"),
                PathBuf::from("/w/m.txt"),
            ]
        );
    }

    #[test]
    fn merging_follows_the_net_effect_on_the_path() {
        let start = Instant::now();
        let mut pending = PendingChanges::new(SETTLE);
        let record = |pending: &mut PendingChanges, path: &str, kind| {
            pending.record(vec![ChangeEvent::file(path, kind)], start);
        };

        // Created then written: still a new file.
        record(&mut pending, "/w/new.txt", ChangeKind::Added);
        record(&mut pending, "/w/new.txt", ChangeKind::Modified);
        // Created then deleted: nothing happened.
        record(&mut pending, "/w/tmp.swp", ChangeKind::Added);
        record(&mut pending, "/w/tmp.swp", ChangeKind::Removed);
        // Deleted then recreated: replaced content.
        record(&mut pending, "/w/doc.md", ChangeKind::Removed);
        record(&mut pending, "/w/doc.md", ChangeKind::Added);
        // Written then deleted: gone.
        record(&mut pending, "/w/old.txt", ChangeKind::Modified);
        record(&mut pending, "/w/old.txt", ChangeKind::Removed);

        assert_eq!(
            kinds(&pending.take_all()),
            vec![
                (PathBuf::from("/w/new.txt"), ChangeKind::Added),
                (PathBuf::from("/w/doc.md"), ChangeKind::Modified),
                (PathBuf::from("/w/old.txt"), ChangeKind::Removed),
            ]
        );
    }

    #[test]
    fn take_all_ignores_quiet_time() {
        let mut pending = PendingChanges::new(SETTLE);
        pending.record(
            vec![ChangeEvent::file("/w/a.txt", ChangeKind::Modified)],
            Instant::now(),
        );
        assert_eq!(pending.take_all().len(), 1);
        assert!(pending.is_empty());
    }
}
