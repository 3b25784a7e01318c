//! Request/response bodies for the HTTP ingress, mirroring the original
//! service's Pydantic models field-for-field.

use serde::{Deserialize, Serialize};
use voxbridge_core::types::PipelineStats;

#[derive(Debug, Deserialize)]
pub struct TranslateAndSpeakRequest {
    pub text: String,
    #[serde(default)]
    pub return_audio: bool,
}

#[derive(Debug, Serialize)]
pub struct TranslateAndSpeakResponse {
    pub status: &'static str,
    pub message: Option<String>,
    pub queue_position: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub translation_queue_size: usize,
    pub tts_queue_size: usize,
    pub playback_queue_size: usize,
    pub stats: PipelineStats,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: RootEndpoints,
}

#[derive(Debug, Serialize)]
pub struct RootEndpoints {
    pub health: &'static str,
    pub translate_and_speak: &'static str,
}
