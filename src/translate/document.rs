use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::{Result, SublateError};
use crate::srt::{self, Cue};
use super::common::BaseTranslator;
use super::Translator;

/// Translates the whole subtitle document in a single prompt.
///
/// The model is instructed to preserve the SRT structure; the parsed
/// response is only accepted when its cue count matches the source, and the
/// source timings are kept regardless of what the model returned.
pub struct DocumentTranslator {
    base: BaseTranslator,
}

impl DocumentTranslator {
    pub fn new(base: BaseTranslator) -> Self {
        Self { base }
    }

    fn adopt_texts(source: &[Cue], translated: Vec<Cue>) -> Vec<Cue> {
        source
            .iter()
            .zip(translated)
            .map(|(src, tr)| Cue {
                index: src.index,
                start: src.start,
                end: src.end,
                text: tr.text,
            })
            .collect()
    }
}

#[async_trait]
impl Translator for DocumentTranslator {
    async fn translate_cues(&self, cues: &[Cue], target_language: &str) -> Result<Vec<Cue>> {
        if cues.is_empty() {
            return Ok(Vec::new());
        }

        let document = srt::render(cues);
        let cache_key = self.base.cache_key(&document, target_language, "document");

        if let Some(cached) = self.base.load_cached(&cache_key).await {
            if let Ok(parsed) = srt::parse(&cached) {
                if parsed.len() == cues.len() {
                    info!("Using cached document translation");
                    return Ok(Self::adopt_texts(cues, parsed));
                }
            }
        }

        let attempts = self.base.config.max_retries + 1;
        for attempt in 1..=attempts {
            info!(
                "Translating {} cues to {} (attempt {}/{})",
                cues.len(),
                target_language,
                attempt,
                attempts
            );

            let response = match self.base.translate_document(&document, target_language).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("Document translation request failed: {}", e);
                    continue;
                }
            };

            let parsed = match srt::parse(&response) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("Translated document is not valid SRT: {}", e);
                    continue;
                }
            };

            if parsed.len() != cues.len() {
                warn!(
                    "Translated document has {} cues, expected {}",
                    parsed.len(),
                    cues.len()
                );
                continue;
            }

            self.base
                .save_cached(&cache_key, &document, target_language, &response, "document")
                .await?;

            return Ok(Self::adopt_texts(cues, parsed));
        }

        Err(SublateError::Translate(format!(
            "Document translation to {} failed after {} attempts",
            target_language, attempts
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::srt::proportional_cues;
    use crate::translate::common::{TextGenerator, TranslationCache};
    use mockall::mock;

    mock! {
        pub TestGenerator {}

        #[async_trait]
        impl TextGenerator for TestGenerator {
            async fn generate(&self, prompt: &str) -> Result<String>;
        }
    }

    fn translator_with(
        generator: MockTestGenerator,
        cache_dir: &std::path::Path,
        max_retries: u32,
    ) -> DocumentTranslator {
        let mut config = Config::default().translate;
        config.max_retries = max_retries;
        DocumentTranslator::new(BaseTranslator::with_parts(
            config,
            Box::new(generator),
            TranslationCache::open(cache_dir),
        ))
    }

    #[tokio::test]
    async fn test_cue_count_mismatch_retries_then_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut generator = MockTestGenerator::new();
        // The model collapses both cues into one on every attempt
        generator.expect_generate().times(2).returning(|_| {
            Ok("1\n00:00:00,000 --> 00:00:20,000\nUn. Deux.\n".to_string())
        });

        let translator = translator_with(generator, dir.path(), 1);
        let cues = proportional_cues("One. Two.", 20.0);

        let result = translator.translate_cues(&cues, "fr").await;
        assert!(matches!(result, Err(SublateError::Translate(_))));
    }

    #[tokio::test]
    async fn test_matching_response_adopts_source_timings() {
        let dir = tempfile::tempdir().unwrap();
        let mut generator = MockTestGenerator::new();
        // Right cue count, but the model drifted the timestamps
        generator.expect_generate().times(1).returning(|_| {
            Ok("1\n00:00:03,000 --> 00:00:09,000\nUn.\n\n\
                2\n00:00:09,000 --> 00:01:39,000\nDeux.\n"
                .to_string())
        });

        let translator = translator_with(generator, dir.path(), 0);
        let cues = proportional_cues("One. Two.", 20.0);

        let translated = translator.translate_cues(&cues, "fr").await.unwrap();
        assert_eq!(translated.len(), 2);
        assert_eq!(translated[0].text, "Un.");
        assert_eq!(translated[1].text, "Deux.");
        assert_eq!(translated[0].start, 0.0);
        assert_eq!(translated[1].end, 20.0);
    }

    #[test]
    fn test_adopt_texts_keeps_source_timings() {
        let source = proportional_cues("One. Two.", 20.0);
        let mut translated = source.clone();
        translated[0].text = "Un.".to_string();
        translated[1].text = "Deux.".to_string();
        // Drifted timings from the model must be ignored
        translated[0].start = 3.0;
        translated[1].end = 99.0;

        let merged = DocumentTranslator::adopt_texts(&source, translated);
        assert_eq!(merged[0].text, "Un.");
        assert_eq!(merged[0].start, 0.0);
        assert_eq!(merged[1].end, 20.0);
        assert_eq!(merged[1].index, 2);
    }
}
