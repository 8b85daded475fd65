use regex::Regex;
use std::path::Path;
use tracing::info;

use crate::config::FetchConfig;
use crate::error::{Result, SublateError};
use crate::media::ToolInvocation;

const YOUTUBE_URL_PATTERN: &str = r"^(https?://)?(www\.)?(youtube|youtu|youtube-nocookie)\.(com|be)/(watch\?v=|embed/|v/|.+\?v=)?([^&=%\?]{11})";

/// Check if the URL is a valid YouTube URL
pub fn is_valid_youtube_url(url: &str) -> bool {
    youtube_video_id(url).is_some()
}

/// Extract the 11-character YouTube video ID from a URL
pub fn youtube_video_id(url: &str) -> Option<String> {
    let re = Regex::new(YOUTUBE_URL_PATTERN).expect("YouTube URL pattern is valid");
    re.captures(url.trim())
        .and_then(|caps| caps.get(6))
        .map(|m| m.as_str().to_string())
}

/// Downloads YouTube audio through an external yt-dlp binary.
pub struct YoutubeFetcher {
    config: FetchConfig,
}

impl YoutubeFetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }

    /// Download the best audio stream of a YouTube video to `output_path`.
    pub async fn fetch_audio(&self, url: &str, output_path: &Path) -> Result<()> {
        let video_id = youtube_video_id(url)
            .ok_or_else(|| SublateError::Fetch(format!("Not a valid YouTube URL: {}", url)))?;

        info!("Downloading audio for YouTube video {}", video_id);

        let args = vec![
            "-f".to_string(),
            "bestaudio".to_string(),
            "--no-playlist".to_string(),
            format!("-N{}", self.config.connections),
            "-o".to_string(),
            output_path.display().to_string(),
            url.to_string(),
        ];
        ToolInvocation::new(&self.config.ytdlp_path, "YouTube audio download", args)
            .run()
            .await
            .map_err(|e| SublateError::Fetch(e.to_string()))?;

        if !output_path.exists() {
            return Err(SublateError::Fetch(format!(
                "yt-dlp reported success but {} was not created",
                output_path.display()
            )));
        }

        info!("Audio download completed: {}", output_path.display());
        Ok(())
    }

    /// Check if yt-dlp is available
    pub fn check_availability(&self) -> Result<()> {
        let output = std::process::Command::new(&self.config.ytdlp_path)
            .arg("--version")
            .output()
            .map_err(|e| SublateError::Fetch(format!("yt-dlp not found: {}", e)))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(SublateError::Fetch("yt-dlp version check failed".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_watch_urls() {
        assert_eq!(
            youtube_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            youtube_video_id("http://youtube.com/watch?v=dQw4w9WgXcQ&t=42"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            youtube_video_id("youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_embed_and_v_urls() {
        assert_eq!(
            youtube_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            youtube_video_id("https://youtube-nocookie.com/v/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_invalid_urls() {
        assert!(!is_valid_youtube_url("https://vimeo.com/12345"));
        assert!(!is_valid_youtube_url("not a url"));
        assert!(!is_valid_youtube_url(""));
        assert!(!is_valid_youtube_url("/tmp/video.mp4"));
    }
}
