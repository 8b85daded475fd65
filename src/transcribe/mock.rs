use async_trait::async_trait;
use std::path::Path;
use tracing::info;

use crate::config::TranscriberConfig;
use crate::error::{Result, SublateError};
use crate::srt;
use super::common::Transcript;
use super::Transcriber;

/// Placeholder transcript used when no speech API is wired up.
const MOCK_TRANSCRIPT: &str = "Hello and welcome to the show. \
Today, we're going to talk about the latest trends in artificial intelligence. \
AI is transforming industries, from healthcare to finance. \
The future of AI is collaborative and exciting. \
We're seeing a boom in machine learning models and data science. \
Thank you for watching.";

/// Transcriber that fabricates a transcript without network access.
///
/// The placeholder text is spread over the configured duration with
/// proportional timing, which keeps the rest of the pipeline exercisable
/// offline.
pub struct MockTranscriber {
    config: TranscriberConfig,
}

impl MockTranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<Transcript> {
        if !audio_path.exists() {
            return Err(SublateError::FileNotFound(audio_path.display().to_string()));
        }

        info!(
            "Mock transcription of {} over {:.0}s",
            audio_path.display(),
            self.config.mock_duration_secs
        );

        let cues = srt::proportional_cues(MOCK_TRANSCRIPT, self.config.mock_duration_secs);
        let language = language
            .map(|s| s.to_string())
            .unwrap_or_else(|| self.config.mock_language.clone());

        Ok(Transcript::from_cues(cues, Some(language)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_mock_transcriber_spreads_cues_over_duration() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("audio.wav");
        std::fs::write(&audio, b"fake").unwrap();

        let mut config = Config::default().transcriber;
        config.mock_duration_secs = 120.0;
        let transcriber = MockTranscriber::new(config);

        let transcript = transcriber.transcribe(&audio, None).await.unwrap();
        assert_eq!(transcript.cues.len(), 6);
        assert_eq!(transcript.cues[0].start, 0.0);
        assert_eq!(transcript.cues.last().unwrap().end, 120.0);
        assert_eq!(transcript.language.as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_mock_transcriber_missing_file() {
        let config = Config::default().transcriber;
        let transcriber = MockTranscriber::new(config);
        let result = transcriber.transcribe(Path::new("/no/such/audio.wav"), None).await;
        assert!(result.is_err());
    }
}
