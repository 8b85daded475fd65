use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

use crate::config::MediaConfig;
use crate::error::{Result, SublateError};
use super::{FfmpegCommands, MediaProcessor};

/// ffprobe `-show_entries format=duration -of json` output
#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: ProbeFormat,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Media processor backed by external ffmpeg/ffprobe binaries.
pub struct FfmpegProcessor {
    config: MediaConfig,
    commands: FfmpegCommands,
}

impl FfmpegProcessor {
    pub fn new(config: MediaConfig) -> Self {
        let commands = FfmpegCommands::new(&config.ffmpeg_path, &config.ffprobe_path);
        Self { config, commands }
    }
}

#[async_trait]
impl MediaProcessor for FfmpegProcessor {
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()> {
        info!(
            "Extracting audio from {} to {}",
            video_path.display(),
            audio_path.display()
        );

        self.commands
            .extract_audio(video_path, audio_path, self.config.audio_sample_rate)
            .run()
            .await?;

        info!("Audio extraction completed");
        Ok(())
    }

    async fn probe_duration(&self, media_path: &Path) -> Result<f64> {
        debug!("Probing duration of {}", media_path.display());

        let stdout = self.commands.probe_duration(media_path).run_capturing().await?;
        let probe: ProbeOutput = serde_json::from_str(&stdout)
            .map_err(|e| SublateError::Media(format!("Failed to parse ffprobe output: {}", e)))?;

        probe
            .format
            .duration
            .ok_or_else(|| {
                SublateError::Media(format!(
                    "No duration reported for {}",
                    media_path.display()
                ))
            })?
            .parse::<f64>()
            .map_err(|e| SublateError::Media(format!("Invalid duration value: {}", e)))
    }

    async fn check_duration_limit(&self, media_path: &Path) -> Result<f64> {
        let duration = self.probe_duration(media_path).await?;
        let limit = self.config.max_duration_secs;

        if duration > limit {
            return Err(SublateError::DurationExceeded {
                actual: duration,
                limit,
            });
        }

        Ok(duration)
    }

    fn check_availability(&self) -> Result<()> {
        let output = std::process::Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .map_err(|e| SublateError::Media(format!("ffmpeg not found: {}", e)))?;

        if output.status.success() {
            debug!("ffmpeg is available");
            Ok(())
        } else {
            Err(SublateError::Media(
                "ffmpeg version check failed".to_string(),
            ))
        }
    }

    async fn version_info(&self) -> Result<String> {
        let stdout = self.commands.version().run_capturing().await?;
        Ok(stdout.lines().next().unwrap_or("unknown").to_string())
    }
}
