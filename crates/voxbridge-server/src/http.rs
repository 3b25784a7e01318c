//! HTTP ingress — axum router mirroring the original FastAPI surface:
//! `POST /translate_and_speak`, `GET /health`, `GET /`.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use voxbridge_core::text_prep::is_pre_translated;
use voxbridge_core::types::{PipelineState, TranslationJob};
use voxbridge_pipeline::error::SubmitError;
use voxbridge_pipeline::supervisor::Supervisor;

use crate::dto::{
    ErrorResponse, HealthResponse, RootEndpoints, RootResponse, TranslateAndSpeakRequest,
    TranslateAndSpeakResponse,
};

pub fn router(supervisor: Arc<Supervisor>) -> Router {
    Router::new()
        .route("/translate_and_speak", post(translate_and_speak))
        .route("/health", get(health))
        .route("/", get(root))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(supervisor)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            status: "error",
            message: message.into(),
        }),
    )
        .into_response()
}

/// Short, non-cryptographic request id — enough to correlate log lines.
fn short_request_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

async fn translate_and_speak(
    State(supervisor): State<Arc<Supervisor>>,
    Json(req): Json<TranslateAndSpeakRequest>,
) -> Response {
    let text = req.text.trim();
    if text.is_empty() {
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, "text must not be empty");
    }

    if supervisor.state() != PipelineState::Running {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "translation+tts system not initialized (check server logs for errors)",
        );
    }

    let is_duplicate = match supervisor.check_duplicate(text).await {
        Ok(dup) => dup,
        Err(_) => {
            tracing::warn!(text_preview = %preview(text), "dedup lock timed out, rejecting request");
            return error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "server busy (deduplication lock timeout)",
            );
        }
    };

    if is_duplicate {
        tracing::info!(text_preview = %preview(text), "skipping duplicate request");
        return (
            StatusCode::OK,
            Json(TranslateAndSpeakResponse {
                status: "skipped",
                message: Some("duplicate request ignored".to_string()),
                queue_position: Some(0),
            }),
        )
            .into_response();
    }

    let request_id = short_request_id();
    let pre_translated = is_pre_translated(text);
    tracing::info!(request_id, text_preview = %preview(text), "translate_and_speak request accepted");

    let job = TranslationJob {
        request_id: request_id.clone(),
        source_text: text.to_string(),
        pre_translated,
        return_audio: req.return_audio,
    };

    match supervisor.submit(job).await {
        Ok(()) => {
            let queue_position = supervisor.health().translation_queue_size;
            tracing::info!(request_id, queue_position, "request queued");
            (
                StatusCode::ACCEPTED,
                Json(TranslateAndSpeakResponse {
                    status: "queued",
                    message: Some("request queued for translation and tts".to_string()),
                    queue_position: Some(queue_position),
                }),
            )
                .into_response()
        }
        Err(SubmitError::NotRunning) => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "translation+tts system not initialized",
        ),
        Err(SubmitError::QueueClosed) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "translation queue closed")
        }
    }
}

async fn health(State(supervisor): State<Arc<Supervisor>>) -> Response {
    if supervisor.state() != PipelineState::Running {
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "server not fully initialized");
    }

    let snapshot = supervisor.health();
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            translation_queue_size: snapshot.translation_queue_size,
            tts_queue_size: snapshot.tts_queue_size,
            playback_queue_size: snapshot.playback_queue_size,
            stats: snapshot.stats,
        }),
    )
        .into_response()
}

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "voxbridge - translate and speak server",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: RootEndpoints {
            health: "/health (GET)",
            translate_and_speak: "/translate_and_speak (POST)",
        },
    })
}

fn preview(text: &str) -> String {
    text.chars().take(50).collect()
}
