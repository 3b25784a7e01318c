//! Pipeline supervisor — owns the three queues, starts/stops the worker
//! pools, and exposes submission + health snapshots to the HTTP layer.
//!
//! Lifecycle is a monotonic state machine (`Idle -> Starting -> Running ->
//! Stopping -> Stopped`), grounded on the original
//! `TranslationTTSWorkerSystem.start()/stop()` plus the `PipelineState`
//! pattern common across the example pack's orchestrators.

use std::sync::Arc;
use std::sync::RwLock;

use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use voxbridge_core::types::{
    PipelineState, PipelineStats, PlaybackJob, SynthesisJob, TranslationJob,
};

use crate::config::Config;
use crate::dedup::Deduplicator;
use crate::error::{DedupTimeout, SubmitError};
use crate::queues::QueueHandle;
use crate::stats::StatsCounters;
use crate::translator::TranslatorClient;
use crate::tts::TtsClient;
use crate::workers::{play_worker, synth_worker, translate_worker};

/// A point-in-time view of supervisor health, served by `GET /health`.
#[derive(Debug, Clone)]
pub struct HealthSnapshot {
    pub state: PipelineState,
    pub translation_queue_size: usize,
    pub tts_queue_size: usize,
    pub playback_queue_size: usize,
    pub stats: PipelineStats,
}

pub struct Supervisor {
    state: RwLock<PipelineState>,
    translation_queue: QueueHandle<TranslationJob>,
    synthesis_queue: QueueHandle<SynthesisJob>,
    playback_queue: QueueHandle<PlaybackJob>,
    dedup: Deduplicator,
    stats: Arc<StatsCounters>,
    tts: Arc<TtsClient>,
    drain_timeout: std::time::Duration,
    cancel_t: CancellationToken,
    cancel_s: CancellationToken,
    cancel_p: CancellationToken,
    handles: AsyncMutex<Vec<JoinHandle<()>>>,
}

impl Supervisor {
    /// Build the collaborator clients, run a TTS health check, and spawn
    /// the T/S/P worker pools. Fails hard (no workers spawned) if the TTS
    /// engine is unreachable.
    pub async fn start(config: &Config) -> anyhow::Result<Arc<Self>> {
        let translator = Arc::new(TranslatorClient::new(&config.translator));
        let tts = Arc::new(TtsClient::new(&config.tts, config.audio.temp_dir.clone()));

        if !tts.check_health().await {
            anyhow::bail!(
                "tts engine at {} is unreachable; refusing to start",
                config.tts.base_url
            );
        }

        let (translation_tx, translation_rx) =
            QueueHandle::channel(config.queues.translation_capacity);
        let (synthesis_tx, synthesis_rx) = QueueHandle::channel(config.queues.synthesis_capacity);
        let (playback_tx, playback_rx) = QueueHandle::channel(config.queues.playback_capacity);

        let stats = Arc::new(StatsCounters::new());
        let cancel_t = CancellationToken::new();
        let cancel_s = CancellationToken::new();
        let cancel_p = CancellationToken::new();

        let mut handles = Vec::new();

        let translation_rx = Arc::new(AsyncMutex::new(translation_rx));
        let n_translate = config.concurrency.translate_workers.max(1);
        for worker_id in 0..n_translate {
            let rx = translation_rx.clone();
            let synth_queue = synthesis_tx.clone();
            let translator = translator.clone();
            let stats = stats.clone();
            let cancel = cancel_t.clone();
            handles.push(tokio::spawn(async move {
                translate_worker(worker_id, rx, synth_queue, translator, stats, cancel).await;
            }));
        }

        let synthesis_rx = Arc::new(AsyncMutex::new(synthesis_rx));
        {
            let rx = synthesis_rx.clone();
            let play_queue = playback_tx.clone();
            let tts = tts.clone();
            let stats = stats.clone();
            let cancel = cancel_s.clone();
            handles.push(tokio::spawn(async move {
                synth_worker(rx, play_queue, tts, stats, cancel).await;
            }));
        }

        let playback_rx = Arc::new(AsyncMutex::new(playback_rx));
        // Playback concurrency is hard-pinned to 1, same as synthesis: only
        // one audio device, so only one worker is ever spawned.
        {
            let rx = playback_rx.clone();
            let stats = stats.clone();
            let cancel = cancel_p.clone();
            handles.push(tokio::spawn(async move {
                play_worker(0, rx, stats, cancel).await;
            }));
        }

        let supervisor = Arc::new(Self {
            state: RwLock::new(PipelineState::Running),
            translation_queue: translation_tx,
            synthesis_queue: synthesis_tx,
            playback_queue: playback_tx,
            dedup: Deduplicator::new(),
            stats,
            tts,
            drain_timeout: config.shutdown.drain_timeout(),
            cancel_t,
            cancel_s,
            cancel_p,
            handles: AsyncMutex::new(handles),
        });

        tracing::info!(
            translate_workers = n_translate,
            "pipeline supervisor running"
        );
        Ok(supervisor)
    }

    pub fn state(&self) -> PipelineState {
        *self.state.read().unwrap()
    }

    /// Check `text` against the dedup window. A lock timeout is treated as
    /// "not a duplicate" by the caller (proceed rather than silently drop).
    pub async fn check_duplicate(&self, text: &str) -> Result<bool, DedupTimeout> {
        self.dedup.check(text).await
    }

    /// Enqueue a translation job for stage T. Blocks (applying backpressure
    /// to the caller) if the translation queue is full.
    pub async fn submit(&self, job: TranslationJob) -> Result<(), SubmitError> {
        if self.state() != PipelineState::Running {
            return Err(SubmitError::NotRunning);
        }
        self.translation_queue
            .send(job)
            .await
            .map_err(|_| SubmitError::QueueClosed)
    }

    pub fn health(&self) -> HealthSnapshot {
        HealthSnapshot {
            state: self.state(),
            translation_queue_size: self.translation_queue.len(),
            tts_queue_size: self.synthesis_queue.len(),
            playback_queue_size: self.playback_queue.len(),
            stats: self.stats.snapshot(),
        }
    }

    /// Cancel the worker pools in reverse stage order (P, then S, then T),
    /// drain with a bounded timeout, and dispose of the TTS client. Any
    /// jobs still sitting in a queue when the timeout fires are abandoned —
    /// their WAV files, if already on disk, are left behind.
    pub async fn shutdown(&self) {
        if self.state() != PipelineState::Running {
            return;
        }
        *self.state.write().unwrap() = PipelineState::Stopping;
        tracing::info!("stopping pipeline supervisor");

        self.cancel_p.cancel();
        self.cancel_s.cancel();
        self.cancel_t.cancel();

        let mut handles = self.handles.lock().await;
        let joined = tokio::time::timeout(self.drain_timeout, futures_join_all(handles.drain(..)));
        if joined.await.is_err() {
            tracing::warn!("worker drain timeout exceeded, proceeding with shutdown");
        }
        drop(handles);

        *self.state.write().unwrap() = PipelineState::Stopped;
        let stats = self.stats.snapshot();
        tracing::info!(?stats, "pipeline supervisor stopped");
    }
}

/// `futures::future::join_all` without pulling in the `futures` crate for a
/// single call site.
async fn futures_join_all(handles: impl IntoIterator<Item = JoinHandle<()>>) {
    for handle in handles {
        let _ = handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn running_tts_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/version"))
            .respond_with(ResponseTemplate::new(200).set_body_string("0.14.0"))
            .mount(&server)
            .await;
        server
    }

    fn test_config(tts_base_url: String) -> Config {
        let mut config = Config::default();
        config.tts.base_url = tts_base_url;
        config.audio.temp_dir = std::env::temp_dir().join("voxbridge-supervisor-tests");
        config
    }

    #[tokio::test]
    async fn start_fails_when_tts_is_unreachable() {
        let mut config = Config::default();
        config.tts.base_url = "http://127.0.0.1:1".to_string();
        let result = Supervisor::start(&config).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn start_succeeds_and_reports_running_when_tts_is_healthy() {
        let server = running_tts_server().await;
        let config = test_config(server.uri());
        let supervisor = Supervisor::start(&config).await.unwrap();
        assert_eq!(supervisor.state(), PipelineState::Running);
        let health = supervisor.health();
        assert_eq!(health.translation_queue_size, 0);
        supervisor.shutdown().await;
        assert_eq!(supervisor.state(), PipelineState::Stopped);
    }

    #[tokio::test]
    async fn submit_after_shutdown_is_rejected() {
        let server = running_tts_server().await;
        let config = test_config(server.uri());
        let supervisor = Supervisor::start(&config).await.unwrap();
        supervisor.shutdown().await;

        let job = TranslationJob {
            request_id: "r1".to_string(),
            source_text: "hello".to_string(),
            pre_translated: false,
            return_audio: false,
        };
        let err = supervisor.submit(job).await.unwrap_err();
        assert!(matches!(err, SubmitError::NotRunning));
    }

    #[tokio::test]
    async fn duplicate_submission_is_detected_via_dedup() {
        let server = running_tts_server().await;
        let config = test_config(server.uri());
        let supervisor = Supervisor::start(&config).await.unwrap();

        assert!(!supervisor.check_duplicate("hello").await.unwrap());
        assert!(supervisor.check_duplicate("hello").await.unwrap());

        supervisor.shutdown().await;
    }
}
