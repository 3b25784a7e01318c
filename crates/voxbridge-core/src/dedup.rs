//! Deduplication decision logic — pure, no locking.
//!
//! The mutex and timeout that guard concurrent access live in
//! `voxbridge-pipeline`; this module only decides, given a snapshot of the
//! prior state and the current instant, whether a text is a duplicate.

use std::time::{Duration, Instant};

/// A text is a duplicate iff it matches the last-seen text and arrived
/// within this window of the last-seen time.
pub const DEDUP_WINDOW: Duration = Duration::from_secs(1);

/// Last-seen text and timestamp. `Default` starts empty (never a duplicate).
#[derive(Debug, Clone, Default)]
pub struct DedupState {
    last_text: Option<String>,
    last_time: Option<Instant>,
}

impl DedupState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `text` against the recorded state as of `now`. If it is not a
    /// duplicate, the state is updated to `(text, now)` before returning —
    /// one atomic check-and-update, matching the original's single critical
    /// section under `_dedup_lock`.
    pub fn check_and_update(&mut self, text: &str, now: Instant) -> bool {
        let within_window = self
            .last_time
            .is_some_and(|t| now.saturating_duration_since(t) <= DEDUP_WINDOW);
        let is_duplicate = within_window && self.last_text.as_deref() == Some(text);

        if !is_duplicate {
            self.last_text = Some(text.to_string());
            self.last_time = Some(now);
        }

        is_duplicate
    }
}
