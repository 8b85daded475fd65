use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, SublateError};

fn default_poll_interval_secs() -> u64 {
    3
}

fn default_poll_timeout_secs() -> u64 {
    900
}

fn default_mock_duration_secs() -> f64 {
    150.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub transcriber: TranscriberConfig,
    pub translate: TranslateConfig,
    pub media: MediaConfig,
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriberConfig {
    /// Transcription provider: Hosted or Mock
    pub provider: TranscriberProvider,
    /// Base URL of the hosted speech API
    pub endpoint: String,
    /// Environment variable holding the speech API key
    pub api_key_env: String,
    /// Seconds between job status polls
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Give up polling after this many seconds
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
    /// Language reported by the mock provider
    pub mock_language: String,
    /// Duration the mock provider spreads its placeholder transcript over
    #[serde(default = "default_mock_duration_secs")]
    pub mock_duration_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriberProvider {
    /// Hosted: upload audio to a hosted speech API and poll for the result
    Hosted,
    /// Mock: placeholder transcript, no network access
    Mock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Base URL of the LLM API
    pub endpoint: String,
    /// Model to use for translation
    pub model: String,
    /// Environment variable holding the LLM API key
    pub api_key_env: String,
    /// Maximum retries for failed or malformed translations
    pub max_retries: u32,
    /// Translation mode
    pub mode: TranslationMode,
    /// Quality preset controlling sampling temperature
    pub quality: TranslationQualityPreset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMode {
    /// Document: translate the whole subtitle document in a single prompt
    Document,
    /// Cue: translate each cue's text individually
    Cue,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationQualityPreset {
    /// Precise: low temperature, most literal output
    Precise,
    /// Balanced: default trade-off
    Balanced,
    /// Fast: higher temperature, quicker to diverge
    Fast,
}

impl TranslationQualityPreset {
    pub fn temperature(&self) -> f32 {
        match self {
            Self::Precise => 0.1,
            Self::Balanced => 0.2,
            Self::Fast => 0.4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub ffmpeg_path: String,
    /// Path to ffprobe binary
    pub ffprobe_path: String,
    /// Maximum accepted media duration in seconds
    pub max_duration_secs: f64,
    /// Sample rate for extracted audio
    pub audio_sample_rate: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Path to yt-dlp binary
    pub ytdlp_path: String,
    /// Number of parallel download connections
    pub connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transcriber: TranscriberConfig {
                provider: TranscriberProvider::Hosted,
                endpoint: "https://api.assemblyai.com".to_string(),
                api_key_env: "ASSEMBLYAI_API_KEY".to_string(),
                poll_interval_secs: default_poll_interval_secs(),
                poll_timeout_secs: default_poll_timeout_secs(),
                mock_language: "en".to_string(),
                mock_duration_secs: default_mock_duration_secs(),
            },
            translate: TranslateConfig {
                endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                model: "gemini-1.5-flash".to_string(),
                api_key_env: "GEMINI_API_KEY".to_string(),
                max_retries: 3,
                mode: TranslationMode::Document,
                quality: TranslationQualityPreset::Balanced,
            },
            media: MediaConfig {
                ffmpeg_path: "ffmpeg".to_string(),
                ffprobe_path: "ffprobe".to_string(),
                max_duration_secs: 1900.0,
                audio_sample_rate: 16000,
            },
            fetch: FetchConfig {
                ytdlp_path: "yt-dlp".to_string(),
                connections: 8,
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SublateError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| SublateError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SublateError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SublateError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

/// Resolve an API key from the configured environment variable.
pub fn resolve_api_key(var_name: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(SublateError::Config(format!(
            "API key not found. Please set the {} environment variable.",
            var_name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trip() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.media.max_duration_secs, 1900.0);
        assert_eq!(parsed.translate.model, "gemini-1.5-flash");
    }

    #[test]
    fn test_quality_preset_temperatures() {
        assert_eq!(TranslationQualityPreset::Precise.temperature(), 0.1);
        assert_eq!(TranslationQualityPreset::Balanced.temperature(), 0.2);
        assert_eq!(TranslationQualityPreset::Fast.temperature(), 0.4);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml_str = r#"
            [transcriber]
            provider = "mock"
            endpoint = "https://api.example.com"
            api_key_env = "SPEECH_KEY"
            mock_language = "en"

            [translate]
            endpoint = "http://localhost:8080"
            model = "test-model"
            api_key_env = "LLM_KEY"
            max_retries = 1
            mode = "cue"
            quality = "fast"

            [media]
            ffmpeg_path = "ffmpeg"
            ffprobe_path = "ffprobe"
            max_duration_secs = 60.0
            audio_sample_rate = 16000

            [fetch]
            ytdlp_path = "yt-dlp"
            connections = 4
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.transcriber.poll_interval_secs, 3);
        assert_eq!(config.transcriber.mock_duration_secs, 150.0);
    }
}
