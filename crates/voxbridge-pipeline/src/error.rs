//! Typed errors for the collaborator clients, classified per `spec.md` §7 so
//! workers can pick the right log level without string-matching.

use std::time::Duration;

use thiserror::Error;

/// Errors from the translation collaborator (C1).
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The collaborator rejected the input itself (e.g. empty text). Logged
    /// at warning level, job dropped, never retried.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Any other failure: network error, non-2xx response, etc. Logged at
    /// error level with the full error chain.
    #[error("translation request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The collaborator responded but not in the expected shape.
    #[error("unexpected translator response: {0}")]
    Protocol(String),
}

/// Errors from the TTS collaborator (C2).
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The collaborator exceeded its configured time budget. Logged
    /// concisely, without a full trace.
    #[error("tts request timed out after {0:?}")]
    Timeout(Duration),
    #[error("tts request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected tts response: {0}")]
    Protocol(String),
    #[error("failed to write audio file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the player collaborator (C3). Only spawn failures surface
/// here — a non-zero exit status is treated as a silent no-op per spec.
#[derive(Debug, Error)]
pub enum PlayError {
    #[error("failed to run audio player: {0}")]
    Spawn(#[from] std::io::Error),
}

/// The dedup lock could not be acquired within its timeout.
#[derive(Debug, Error)]
#[error("deduplication lock acquisition timed out")]
pub struct DedupTimeout;

/// Errors from submitting a job to the supervisor.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("pipeline supervisor is not running")]
    NotRunning,
    #[error("translation queue closed")]
    QueueClosed,
}
