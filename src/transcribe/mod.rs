// Modular transcription architecture
//
// Providers are selected through a factory:
// - Hosted: hosted speech API (upload, poll, SRT export)
// - Mock: placeholder transcript, no network access

pub mod common;
pub mod hosted;
pub mod mock;

use async_trait::async_trait;
use std::path::Path;

pub use common::*;
use crate::config::{resolve_api_key, TranscriberConfig, TranscriberProvider};
use crate::error::Result;

/// Main trait for transcription operations
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file, optionally with a source language hint
    async fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<Transcript>;
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    /// Create a transcriber for the configured provider
    pub fn create_transcriber(config: TranscriberConfig) -> Result<Box<dyn Transcriber>> {
        match config.provider {
            TranscriberProvider::Hosted => {
                let api_key = resolve_api_key(&config.api_key_env)?;
                Ok(Box::new(hosted::HostedTranscriber::new(config, api_key)))
            }
            TranscriberProvider::Mock => Ok(Box::new(mock::MockTranscriber::new(config))),
        }
    }
}
