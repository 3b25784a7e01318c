//! Translation collaborator (C1) — an Ollama-style chat completion client.
//!
//! Grounded on the original `translate_to_japanese()`: a single POST to
//! `/api/chat` with a fixed prompt template, non-streaming.

use serde::{Deserialize, Serialize};

use crate::config::TranslatorConfig;
use crate::error::TranslateError;

pub struct TranslatorClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl TranslatorClient {
    pub fn new(config: &TranslatorConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .expect("translator http client configuration is valid");

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    /// Translate `text` to Japanese. Callers are responsible for checking
    /// `is_pre_translated` first — this always invokes the model.
    pub async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TranslateError::InvalidInput("text is required".to_string()));
        }

        let url = format!("{}/api/chat", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: format!("Translate to Japanese:\n\n{text}"),
            }],
            stream: false,
        };

        let resp = self.http.post(&url).json(&body).send().await?;
        let resp = resp.error_for_status()?;
        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| TranslateError::Protocol(e.to_string()))?;

        let translated = parsed.message.content.trim().to_string();
        if translated.is_empty() {
            return Err(TranslateError::Protocol(
                "translator returned empty content".to_string(),
            ));
        }
        Ok(translated)
    }
}
