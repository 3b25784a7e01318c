//! TTS collaborator (C2) — a VOICEVOX-style two-step HTTP client.
//!
//! Step 1: POST `/audio_query?text=...&speaker=...` -> AudioQuery JSON.
//! Step 2: POST `/synthesis?speaker=...` with that JSON body -> WAV bytes.
//!
//! Grounded on the original `VoicevoxEngine`: same two-step protocol, same
//! `tts_{request_id}.wav` naming, same `check_health`/`cleanup` surface.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;

use crate::config::TtsConfig;
use crate::error::TtsError;

pub struct TtsClient {
    http: reqwest::Client,
    base_url: String,
    speaker_id: u32,
    timeout: Duration,
    temp_dir: PathBuf,
}

impl TtsClient {
    pub fn new(config: &TtsConfig, temp_dir: PathBuf) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .expect("tts http client configuration is valid");

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            speaker_id: config.speaker_id,
            timeout: config.timeout(),
            temp_dir,
        }
    }

    /// Liveness probe used once at supervisor startup. A non-2xx or
    /// unreachable engine both count as unhealthy.
    pub async fn check_health(&self) -> bool {
        let url = format!("{}/version", self.base_url);
        matches!(
            self.http.get(&url).timeout(Duration::from_secs(5)).send().await,
            Ok(resp) if resp.status().is_success()
        )
    }

    /// Synthesize `text` and write the resulting WAV to
    /// `{temp_dir}/tts_{request_id}.wav`, returning its path.
    pub async fn synthesize_to_file(
        &self,
        text: &str,
        request_id: &str,
    ) -> Result<PathBuf, TtsError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TtsError::InvalidInput("text is required".to_string()));
        }

        let wav_bytes = self.synthesize(text).await?;

        tokio::fs::create_dir_all(&self.temp_dir).await?;
        let path = self.temp_dir.join(format!("tts_{request_id}.wav"));
        tokio::fs::write(&path, &wav_bytes).await?;
        Ok(path)
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, TtsError> {
        let audio_query = self.fetch_audio_query(text).await?;

        let synth_url = format!("{}/synthesis", self.base_url);
        let resp = self
            .http
            .post(&synth_url)
            .query(&[("speaker", self.speaker_id.to_string())])
            .json(&audio_query)
            .send()
            .await
            .map_err(classify(self.timeout))?;
        let resp = resp.error_for_status().map_err(classify(self.timeout))?;
        let bytes = resp.bytes().await.map_err(classify(self.timeout))?;
        Ok(bytes.to_vec())
    }

    async fn fetch_audio_query(&self, text: &str) -> Result<Value, TtsError> {
        let url = format!("{}/audio_query", self.base_url);
        let resp = self
            .http
            .post(&url)
            .query(&[("text", text), ("speaker", &self.speaker_id.to_string())])
            .send()
            .await
            .map_err(classify(self.timeout))?;
        let resp = resp.error_for_status().map_err(classify(self.timeout))?;
        resp.json().await.map_err(classify(self.timeout))
    }

    /// Close any pooled connections. `reqwest::Client` has no explicit
    /// close, so dropping it is the Rust equivalent of the original's
    /// `aiohttp.ClientSession.close()`.
    pub async fn cleanup(self) {
        drop(self);
    }
}

/// Classify a `reqwest::Error` into the right `TtsError` variant — a timeout
/// (either ours via `tokio::time::timeout`-style client builder, or
/// reqwest's own deadline) gets its own quiet log path; everything else is a
/// generic request failure logged with its full chain.
fn classify(timeout: Duration) -> impl Fn(reqwest::Error) -> TtsError {
    move |e| {
        if e.is_timeout() {
            TtsError::Timeout(timeout)
        } else {
            TtsError::Request(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use wiremock::matchers::{method, path as path_matcher, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> TtsConfig {
        TtsConfig {
            base_url,
            speaker_id: 20,
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn rejects_empty_text_without_a_request() {
        let dir = tempdir().unwrap();
        let client = TtsClient::new(
            &test_config("http://localhost:1".to_string()),
            dir.path().to_path_buf(),
        );
        let err = client.synthesize_to_file("  ", "req1").await.unwrap_err();
        assert!(matches!(err, TtsError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn synthesizes_and_writes_named_wav_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_matcher("/audio_query"))
            .and(query_param("speaker", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "speedScale": 1.0
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path_matcher("/synthesis"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"RIFF....WAVEfmt ".to_vec()))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let client = TtsClient::new(&test_config(server.uri()), dir.path().to_path_buf());
        let wav_path = client
            .synthesize_to_file("こんにちは", "abc12345")
            .await
            .unwrap();

        assert_eq!(wav_path.file_name().unwrap(), "tts_abc12345.wav");
        let bytes = tokio::fs::read(&wav_path).await.unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
    }

    #[tokio::test]
    async fn audio_query_failure_is_classified_as_request_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_matcher("/audio_query"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let client = TtsClient::new(&test_config(server.uri()), dir.path().to_path_buf());
        let err = client
            .synthesize_to_file("text", "req1")
            .await
            .unwrap_err();
        assert!(matches!(err, TtsError::Request(_)));
    }

    #[tokio::test]
    async fn check_health_false_when_unreachable() {
        let client = TtsClient::new(
            &test_config("http://127.0.0.1:1".to_string()),
            tempdir().unwrap().path().to_path_buf(),
        );
        assert!(!client.check_health().await);
    }

    #[tokio::test]
    async fn check_health_true_on_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_matcher("/version"))
            .respond_with(ResponseTemplate::new(200).set_body_string("0.14.0"))
            .mount(&server)
            .await;

        let client = TtsClient::new(&test_config(server.uri()), tempdir().unwrap().path().to_path_buf());
        assert!(client.check_health().await);
    }
}
