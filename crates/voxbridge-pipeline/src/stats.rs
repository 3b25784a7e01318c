//! Atomic pipeline counters — one `AtomicU64` per stat, no lock, cheap to
//! bump from any worker. Mirrors the original's `self.stats` dict, just
//! safe to mutate from three concurrent tasks.

use std::sync::atomic::{AtomicU64, Ordering};

use voxbridge_core::types::PipelineStats;

#[derive(Debug, Default)]
pub struct StatsCounters {
    translation_processed: AtomicU64,
    translation_failed: AtomicU64,
    tts_processed: AtomicU64,
    tts_failed: AtomicU64,
    playback_processed: AtomicU64,
    playback_failed: AtomicU64,
}

impl StatsCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_translation_processed(&self) {
        self.translation_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_translation_failed(&self) {
        self.translation_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_tts_processed(&self) {
        self.tts_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_tts_failed(&self) {
        self.tts_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_playback_processed(&self) {
        self.playback_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_playback_failed(&self) {
        self.playback_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PipelineStats {
        PipelineStats {
            translation_processed: self.translation_processed.load(Ordering::Relaxed),
            translation_failed: self.translation_failed.load(Ordering::Relaxed),
            tts_processed: self.tts_processed.load(Ordering::Relaxed),
            tts_failed: self.tts_failed.load(Ordering::Relaxed),
            playback_processed: self.playback_processed.load(Ordering::Relaxed),
            playback_failed: self.playback_failed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_increments() {
        let stats = StatsCounters::new();
        stats.inc_translation_processed();
        stats.inc_translation_processed();
        stats.inc_tts_failed();
        let snap = stats.snapshot();
        assert_eq!(snap.translation_processed, 2);
        assert_eq!(snap.tts_failed, 1);
        assert_eq!(snap.playback_processed, 0);
    }
}
