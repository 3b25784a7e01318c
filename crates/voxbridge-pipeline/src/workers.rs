//! Stage workers: translate (T, pool of N), synthesize (S, pinned to 1),
//! play (P, pool of M).
//!
//! Each stage shares its input receiver behind `Arc<tokio::sync::Mutex<..>>`
//! so any number of worker tasks can pull from one queue — the same pattern
//! `nayru-lib::tts::fetcher_task` uses to run `PREFETCH_DEPTH` fetchers off
//! a single job channel. A short poll timeout on `recv()` keeps each worker
//! responsive to cancellation without needing to wake it explicitly.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use voxbridge_core::text_prep::normalize;
use voxbridge_core::types::{PlaybackJob, SynthesisJob, TranslationJob};

use crate::error::{PlayError, TranslateError, TtsError};
use crate::player;
use crate::queues::QueueHandle;
use crate::stats::StatsCounters;
use crate::translator::TranslatorClient;
use crate::tts::TtsClient;

/// How long a worker waits on an empty queue before re-checking for
/// cancellation. Short enough to shut down promptly, long enough to avoid
/// busy-polling.
const DEQUEUE_POLL: Duration = Duration::from_secs(1);

/// Brief pause after each synthesis call, giving the TTS engine a moment to
/// release GPU/VRAM resources before the next request lands.
const SYNTH_COOLDOWN: Duration = Duration::from_millis(100);

/// Pull the next item from a shared receiver, polling with a short timeout
/// so cancellation is observed even while the queue is empty. Returns
/// `None` once cancelled or once the channel is closed and drained.
async fn next_job<T>(
    rx: &Arc<Mutex<mpsc::Receiver<T>>>,
    cancel: &CancellationToken,
) -> Option<T> {
    loop {
        if cancel.is_cancelled() {
            return None;
        }
        let mut guard = rx.lock().await;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return None,
            res = tokio::time::timeout(DEQUEUE_POLL, guard.recv()) => {
                match res {
                    Ok(Some(job)) => return Some(job),
                    Ok(None) => return None,
                    Err(_) => {
                        drop(guard);
                        continue;
                    }
                }
            }
        }
    }
}

/// Stage T: translate source text to Japanese (or pass it through verbatim
/// if pre-translated), normalize, and forward to stage S.
pub async fn translate_worker(
    worker_id: usize,
    rx: Arc<Mutex<mpsc::Receiver<TranslationJob>>>,
    synth_queue: QueueHandle<SynthesisJob>,
    translator: Arc<TranslatorClient>,
    stats: Arc<StatsCounters>,
    cancel: CancellationToken,
) {
    tracing::info!(worker_id, "translate worker started");
    while let Some(job) = next_job(&rx, &cancel).await {
        let request_id = job.request_id.clone();

        let japanese_text = if job.pre_translated {
            tracing::info!(request_id, "pre-translated text, skipping model call");
            job.source_text.clone()
        } else {
            match translator.translate(&job.source_text).await {
                Ok(raw) => normalize(&raw),
                Err(TranslateError::InvalidInput(msg)) => {
                    tracing::warn!(request_id, %msg, "translation validation failed");
                    stats.inc_translation_failed();
                    continue;
                }
                Err(e) => {
                    tracing::error!(request_id, error = %e, "translation failed");
                    stats.inc_translation_failed();
                    continue;
                }
            }
        };

        let synth_job = SynthesisJob {
            request_id: request_id.clone(),
            japanese_text,
            return_audio: job.return_audio,
        };
        if synth_queue.send(synth_job).await.is_err() {
            tracing::warn!(request_id, "synthesis queue closed, stopping");
            break;
        }
        stats.inc_translation_processed();
    }
    tracing::info!(worker_id, "translate worker stopped");
}

/// Stage S: synthesize Japanese text to a WAV file and forward to stage P.
/// Exactly one instance of this worker is ever spawned — concurrency 1 is
/// enforced structurally rather than with a semaphore, since only one task
/// ever calls into the TTS collaborator.
pub async fn synth_worker(
    rx: Arc<Mutex<mpsc::Receiver<SynthesisJob>>>,
    play_queue: QueueHandle<PlaybackJob>,
    tts: Arc<TtsClient>,
    stats: Arc<StatsCounters>,
    cancel: CancellationToken,
) {
    tracing::info!("synthesis worker started");
    while let Some(job) = next_job(&rx, &cancel).await {
        let request_id = job.request_id.clone();
        match tts.synthesize_to_file(&job.japanese_text, &request_id).await {
            Ok(wav_path) => {
                stats.inc_tts_processed();
                if job.return_audio {
                    tracing::info!(
                        request_id,
                        path = %wav_path.display(),
                        "return_audio set, retaining file without playback"
                    );
                } else {
                    let play_job = PlaybackJob {
                        request_id: request_id.clone(),
                        wav_path,
                        delete_after_play: true,
                    };
                    if play_queue.send(play_job).await.is_err() {
                        tracing::warn!(request_id, "playback queue closed, stopping");
                        break;
                    }
                }
            }
            Err(TtsError::Timeout(d)) => {
                tracing::warn!(request_id, timeout = ?d, "tts timed out");
                stats.inc_tts_failed();
            }
            Err(TtsError::InvalidInput(msg)) => {
                tracing::warn!(request_id, %msg, "tts validation failed");
                stats.inc_tts_failed();
            }
            Err(e) => {
                tracing::error!(request_id, error = %e, "tts failed");
                stats.inc_tts_failed();
            }
        }
        tokio::time::sleep(SYNTH_COOLDOWN).await;
    }
    tracing::info!("synthesis worker stopped");
}

/// Stage P: play a WAV file and delete it afterward.
pub async fn play_worker(
    worker_id: usize,
    rx: Arc<Mutex<mpsc::Receiver<PlaybackJob>>>,
    stats: Arc<StatsCounters>,
    cancel: CancellationToken,
) {
    tracing::info!(worker_id, "playback worker started");
    while let Some(job) = next_job(&rx, &cancel).await {
        match run_playback(&job).await {
            Ok(()) => stats.inc_playback_processed(),
            Err(e) => {
                tracing::error!(request_id = job.request_id, error = %e, "playback failed");
                stats.inc_playback_failed();
            }
        }
    }
    tracing::info!(worker_id, "playback worker stopped");
}

async fn run_playback(job: &PlaybackJob) -> Result<(), PlayError> {
    player::play(&job.wav_path).await?;
    if job.delete_after_play {
        match tokio::fs::remove_file(&job.wav_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %job.wav_path.display(),
                    "wav file already gone at play time"
                );
            }
            Err(e) => {
                tracing::warn!(
                    path = %job.wav_path.display(),
                    error = %e,
                    "failed to delete temporary wav file"
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn next_job_returns_none_once_cancelled_on_empty_queue() {
        let (_tx, rx) = mpsc::channel::<u32>(1);
        let rx = Arc::new(Mutex::new(rx));
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(next_job(&rx, &cancel).await, None);
    }

    #[tokio::test]
    async fn next_job_returns_item_without_waiting_for_poll_timeout() {
        let (tx, rx) = mpsc::channel::<u32>(1);
        let rx = Arc::new(Mutex::new(rx));
        let cancel = CancellationToken::new();
        tx.send(42).await.unwrap();
        let job = tokio::time::timeout(Duration::from_millis(100), next_job(&rx, &cancel))
            .await
            .expect("should not hit the outer test timeout");
        assert_eq!(job, Some(42));
    }

    #[tokio::test]
    async fn next_job_returns_none_when_channel_closed() {
        let (tx, rx) = mpsc::channel::<u32>(1);
        let rx = Arc::new(Mutex::new(rx));
        let cancel = CancellationToken::new();
        drop(tx);
        assert_eq!(next_job(&rx, &cancel).await, None);
    }

    #[tokio::test]
    async fn play_worker_stops_cleanly_on_cancellation() {
        let (_tx, rx) = mpsc::channel::<PlaybackJob>(1);
        let rx = Arc::new(Mutex::new(rx));
        let stats = Arc::new(StatsCounters::new());
        let cancel = CancellationToken::new();
        let ran = Arc::new(AtomicBool::new(false));
        let ran2 = ran.clone();
        cancel.cancel();
        let handle = tokio::spawn(async move {
            play_worker(0, rx, stats, cancel).await;
            ran2.store(true, Ordering::SeqCst);
        });
        tokio::time::timeout(Duration::from_millis(200), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(ran.load(Ordering::SeqCst));
    }
}
