//! Layered configuration: defaults < TOML file < environment < CLI.
//!
//! The original service loaded YAML; this pack carries no YAML crate, so the
//! same layering is expressed with `toml` + `serde` instead. CLI-flag overlay
//! happens in `voxbridge-server`, which calls [`Config::load`] and then
//! patches in whatever clap parsed.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

fn default_host() -> IpAddr {
    "127.0.0.1".parse().unwrap()
}

fn default_port() -> u16 {
    8765
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "my-translator".to_string(),
            timeout_secs: 30,
        }
    }
}

impl TranslatorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    pub base_url: String,
    pub speaker_id: u32,
    pub timeout_secs: u64,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:50021".to_string(),
            speaker_id: 20,
            timeout_secs: 30,
        }
    }
}

impl TtsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Bounded capacities for the three inter-stage queues.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub translation_capacity: usize,
    pub synthesis_capacity: usize,
    pub playback_capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            translation_capacity: 64,
            synthesis_capacity: 64,
            playback_capacity: 64,
        }
    }
}

/// Worker pool sizes. Synthesis (S) and playback (P) concurrency is fixed by
/// the architecture (S is hard-pinned to 1); only T is tunable.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    pub translate_workers: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            translate_workers: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub temp_dir: PathBuf,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            temp_dir: PathBuf::from("audio/tmp"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    pub drain_timeout_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            drain_timeout_secs: 10,
        }
    }
}

impl ShutdownConfig {
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub translator: TranslatorConfig,
    pub tts: TtsConfig,
    pub queues: QueueConfig,
    pub concurrency: ConcurrencyConfig,
    pub audio: AudioConfig,
    pub shutdown: ShutdownConfig,
}

impl Config {
    /// Load defaults, merge in a TOML file if `path` is given, then apply
    /// environment variable overrides. CLI flags are layered on top of the
    /// result by the caller.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| anyhow::anyhow!("reading config file {}: {e}", path.display()))?;
                toml::from_str(&text)
                    .map_err(|e| anyhow::anyhow!("parsing config file {}: {e}", path.display()))?
            }
            None => Config::default(),
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("SERVER_HOST") {
            match v.parse() {
                Ok(addr) => self.server.host = addr,
                Err(_) => tracing::warn!(value = %v, "invalid SERVER_HOST, ignoring"),
            }
        }
        if let Ok(v) = std::env::var("SERVER_PORT") {
            match v.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %v, "invalid SERVER_PORT, ignoring"),
            }
        }
        if let Ok(v) = std::env::var("OLLAMA_BASE_URL") {
            self.translator.base_url = v;
        }
        if let Ok(v) = std::env::var("OLLAMA_MODEL") {
            self.translator.model = v;
        }
        if let Ok(v) = std::env::var("VOICEVOX_BASE_URL") {
            self.tts.base_url = v;
        }
        if let Ok(v) = std::env::var("AUDIO_DIR") {
            self.audio.temp_dir = PathBuf::from(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn defaults_match_original_service() {
        let config = Config::default();
        assert_eq!(config.server.port, 8765);
        assert_eq!(config.tts.speaker_id, 20);
        assert_eq!(config.translator.base_url, "http://localhost:11434");
        assert_eq!(config.queues.translation_capacity, 64);
        assert_eq!(config.concurrency.translate_workers, 1);
    }

    #[test]
    fn parses_partial_toml_file_with_defaults_filled_in() {
        let toml_text = r#"
            [server]
            port = 9999

            [tts]
            speaker_id = 3
        "#;
        let config: Config = toml::from_str(toml_text).unwrap();
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.server.host, default_host());
        assert_eq!(config.tts.speaker_id, 3);
        assert_eq!(config.tts.base_url, "http://localhost:50021");
    }

    #[test]
    #[serial]
    fn env_override_wins_over_file() {
        let toml_text = "[translator]\nbase_url = \"http://file-value:11434\"\n";
        let mut config: Config = toml::from_str(toml_text).unwrap();
        unsafe {
            std::env::set_var("OLLAMA_BASE_URL", "http://env-value:11434");
        }
        config.apply_env_overrides();
        unsafe {
            std::env::remove_var("OLLAMA_BASE_URL");
        }
        assert_eq!(config.translator.base_url, "http://env-value:11434");
    }

    #[test]
    #[serial]
    fn invalid_env_port_is_ignored() {
        let mut config = Config::default();
        unsafe {
            std::env::set_var("SERVER_PORT", "not-a-port");
        }
        config.apply_env_overrides();
        unsafe {
            std::env::remove_var("SERVER_PORT");
        }
        assert_eq!(config.server.port, 8765);
    }
}
