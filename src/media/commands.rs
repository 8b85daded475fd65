use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SublateError};

/// A prepared invocation of an external tool, captured as data so command
/// shapes can be inspected in tests without spawning anything.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub label: &'static str,
}

impl ToolInvocation {
    pub fn new<S: Into<String>>(program: S, label: &'static str, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            label,
        }
    }

    /// Run to completion, discarding stdout.
    pub async fn run(&self) -> Result<()> {
        self.run_capturing().await.map(|_| ())
    }

    /// Run to completion and return captured stdout.
    pub async fn run_capturing(&self) -> Result<String> {
        debug!("{}: {} {}", self.label, self.program, self.args.join(" "));

        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| {
                SublateError::Media(format!("Failed to spawn {}: {}", self.program, e))
            })?;

        if !output.status.success() {
            return Err(SublateError::Media(format!(
                "{} failed: {}",
                self.label,
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Builds the ffmpeg/ffprobe invocations the pipeline needs.
pub struct FfmpegCommands {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl FfmpegCommands {
    pub fn new<S1: Into<String>, S2: Into<String>>(ffmpeg_path: S1, ffprobe_path: S2) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
        }
    }

    /// Strip the video track and resample to mono PCM, the input format the
    /// speech APIs accept.
    pub fn extract_audio(&self, video_path: &Path, audio_path: &Path, sample_rate: u32) -> ToolInvocation {
        let args = vec![
            "-i".to_string(),
            video_path.display().to_string(),
            "-vn".to_string(),
            "-c:a".to_string(),
            "pcm_s16le".to_string(),
            "-ar".to_string(),
            sample_rate.to_string(),
            "-ac".to_string(),
            "1".to_string(),
            "-y".to_string(),
            audio_path.display().to_string(),
        ];
        ToolInvocation::new(&self.ffmpeg_path, "Audio extraction", args)
    }

    /// Container duration query, JSON on stdout.
    pub fn probe_duration(&self, media_path: &Path) -> ToolInvocation {
        let args = vec![
            "-v".to_string(),
            "error".to_string(),
            "-show_entries".to_string(),
            "format=duration".to_string(),
            "-of".to_string(),
            "json".to_string(),
            media_path.display().to_string(),
        ];
        ToolInvocation::new(&self.ffprobe_path, "Duration probe", args)
    }

    pub fn version(&self) -> ToolInvocation {
        ToolInvocation::new(&self.ffmpeg_path, "Version check", vec!["-version".to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_audio_command_shape() {
        let commands = FfmpegCommands::new("ffmpeg", "ffprobe");
        let invocation =
            commands.extract_audio(Path::new("in.mp4"), Path::new("out.wav"), 16000);
        assert_eq!(invocation.program, "ffmpeg");
        assert_eq!(
            invocation.args,
            vec![
                "-i", "in.mp4", "-vn", "-c:a", "pcm_s16le", "-ar", "16000", "-ac", "1", "-y",
                "out.wav"
            ]
        );
    }

    #[test]
    fn test_probe_duration_command_shape() {
        let commands = FfmpegCommands::new("ffmpeg", "ffprobe");
        let invocation = commands.probe_duration(Path::new("clip.mp4"));
        assert_eq!(invocation.program, "ffprobe");
        assert!(invocation.args.contains(&"format=duration".to_string()));
        assert_eq!(invocation.args.last().unwrap(), "clip.mp4");
    }
}
