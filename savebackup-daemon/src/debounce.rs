//! Process-wide trigger gate.
//!
//! A batch is accepted when at least `minimum_interval_millis` have passed
//! since the previous call. The clock is advanced on every call, accepted or
//! not, so a continuous stream of triggers spaced closer than the interval
//! stays suppressed until a quiet gap of a full interval occurs.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Sentinel for "never triggered": any real `now` is accepted against it.
const NEVER: i64 = i64::MIN;

/// Shared, injectable debounce clock.
#[derive(Debug)]
pub struct DebounceState {
    last_accepted_at_millis: AtomicI64,
    minimum_interval_millis: i64,
}

impl DebounceState {
    pub fn new(minimum_interval_millis: u64) -> Self {
        Self {
            last_accepted_at_millis: AtomicI64::new(NEVER),
            minimum_interval_millis: i64::try_from(minimum_interval_millis).unwrap_or(i64::MAX),
        }
    }

    /// Millis of the most recent call, `None` before the first one.
    pub fn last_accepted_at_millis(&self) -> Option<i64> {
        match self.last_accepted_at_millis.load(Ordering::Acquire) {
            NEVER => None,
            millis => Some(millis),
        }
    }

    pub fn minimum_interval_millis(&self) -> i64 {
        self.minimum_interval_millis
    }
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    state: Arc<DebounceState>,
}

impl Debouncer {
    pub fn new(minimum_interval_millis: u64) -> Self {
        Self::with_state(Arc::new(DebounceState::new(minimum_interval_millis)))
    }

    pub fn with_state(state: Arc<DebounceState>) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &Arc<DebounceState> {
        &self.state
    }

    /// Record a trigger at `now_millis` and report whether it passes.
    ///
    /// The read-modify-write is a single atomic swap, so of several
    /// overlapping callers at most one observes the old window as expired.
    pub fn decide(&self, now_millis: i64) -> bool {
        let previous = self
            .state
            .last_accepted_at_millis
            .swap(now_millis, Ordering::AcqRel);
        now_millis.saturating_sub(previous) >= self.state.minimum_interval_millis
    }
}
