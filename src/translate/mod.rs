// Modular translation architecture
//
// Modes are selected through a factory:
// - Document: translate the whole SRT document in one prompt
// - Cue: translate each cue's text individually

pub mod common;
pub mod cue;
pub mod document;

use async_trait::async_trait;

pub use common::*;
use crate::config::{resolve_api_key, TranslateConfig, TranslationMode};
use crate::error::Result;
use crate::srt::Cue;

/// Main trait for translation operations
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate cue texts to the target language, preserving timings.
    async fn translate_cues(&self, cues: &[Cue], target_language: &str) -> Result<Vec<Cue>>;
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Create a translator for the configured mode
    pub fn create_translator(config: TranslateConfig) -> Result<Box<dyn Translator>> {
        let api_key = resolve_api_key(&config.api_key_env)?;
        let mode = config.mode.clone();
        let base = BaseTranslator::new(config, api_key);

        Ok(match mode {
            TranslationMode::Document => Box::new(document::DocumentTranslator::new(base)),
            TranslationMode::Cue => Box::new(cue::CueTranslator::new(base)),
        })
    }
}
