// Audio extraction and duration probing over external ffmpeg/ffprobe.

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::Path;

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Media operations the pipeline needs from the ffmpeg toolchain.
#[async_trait]
pub trait MediaProcessor: Send + Sync {
    /// Extract the audio track of a video into a speech-API-ready WAV
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()>;

    /// Container duration in seconds
    async fn probe_duration(&self, media_path: &Path) -> Result<f64>;

    /// Probe duration and reject media longer than the configured limit
    async fn check_duration_limit(&self, media_path: &Path) -> Result<f64>;

    /// Verify the external binaries can be spawned
    fn check_availability(&self) -> Result<()>;

    /// First line of `ffmpeg -version`
    async fn version_info(&self) -> Result<String>;
}

pub fn create_processor(config: MediaConfig) -> Box<dyn MediaProcessor> {
    Box::new(processor::FfmpegProcessor::new(config))
}
