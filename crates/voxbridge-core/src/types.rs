//! Shared types for the voxbridge translate+speak pipeline.
//!
//! Kept dependency-free (no tokio, no reqwest) so both the pipeline engine
//! and the HTTP layer can share them without pulling in an async runtime.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A request accepted by the HTTP ingress, queued for stage T (translate).
#[derive(Debug, Clone)]
pub struct TranslationJob {
    pub request_id: String,
    pub source_text: String,
    /// True iff `source_text` is wrapped in `『…』` and should bypass the
    /// translation model entirely.
    pub pre_translated: bool,
    /// If true, the job terminates after stage S with the WAV retained on
    /// disk; no playback is scheduled.
    pub return_audio: bool,
}

/// Produced by the translate-worker, queued for stage S (synthesize).
#[derive(Debug, Clone)]
pub struct SynthesisJob {
    pub request_id: String,
    pub japanese_text: String,
    pub return_audio: bool,
}

/// Produced by the synth-worker, queued for stage P (play).
#[derive(Debug, Clone)]
pub struct PlaybackJob {
    pub request_id: String,
    pub wav_path: PathBuf,
    pub delete_after_play: bool,
}

/// Supervisor lifecycle state. Transitions are monotonic:
/// `Idle -> Starting -> Running -> Stopping -> Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    Idle,
    Starting,
    Running,
    Stopping,
    Stopped,
}

/// A point-in-time snapshot of the six monotone pipeline counters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineStats {
    pub translation_processed: u64,
    pub translation_failed: u64,
    pub tts_processed: u64,
    pub tts_failed: u64,
    pub playback_processed: u64,
    pub playback_failed: u64,
}
