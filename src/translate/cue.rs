use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::Result;
use crate::srt::Cue;
use super::common::BaseTranslator;
use super::Translator;

/// Translates caption text cue by cue.
///
/// Slower than document mode but immune to the model reshaping the subtitle
/// structure; failed cues keep their original text.
pub struct CueTranslator {
    base: BaseTranslator,
}

impl CueTranslator {
    pub fn new(base: BaseTranslator) -> Self {
        Self { base }
    }

    /// Sanity checks on a single translated cue.
    fn validate_translation(original: &str, translated: &str) -> bool {
        if translated.trim().is_empty() {
            return false;
        }

        // Identical output usually means the model refused to translate
        if original.trim() == translated.trim() {
            return false;
        }

        // Suspiciously long output tends to be commentary, not translation
        if translated.len() > original.len() * 3 + 16 {
            return false;
        }

        true
    }

    async fn translate_one(&self, text: &str, target_language: &str) -> Result<String> {
        let cache_key = self.base.cache_key(text, target_language, "cue");
        if let Some(cached) = self.base.load_cached(&cache_key).await {
            return Ok(cached);
        }

        let attempts = self.base.config.max_retries + 1;
        let mut saw_response = false;
        let mut last_error = None;
        for _ in 0..attempts {
            match self.base.translate_text(text, target_language).await {
                Ok(translation) if Self::validate_translation(text, &translation) => {
                    self.base
                        .save_cached(&cache_key, text, target_language, &translation, "cue")
                        .await?;
                    return Ok(translation);
                }
                Ok(translation) => {
                    warn!("Translation validation failed for: {}", translation);
                    saw_response = true;
                }
                Err(e) => {
                    warn!("Translation failed: {}", e);
                    last_error = Some(e);
                }
            }
        }

        // Nothing but request failures means the endpoint is down or the key
        // is bad; surface that instead of writing the source text through.
        if !saw_response {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        // The model answered but nothing validated; keep the original text
        // rather than dropping the cue
        Ok(text.to_string())
    }
}

#[async_trait]
impl Translator for CueTranslator {
    async fn translate_cues(&self, cues: &[Cue], target_language: &str) -> Result<Vec<Cue>> {
        let total = cues.len();
        let mut translated = Vec::with_capacity(total);

        for (idx, cue) in cues.iter().enumerate() {
            info!("Translating cue {}/{}: {}", idx + 1, total, cue.text);

            let text = self.translate_one(&cue.text, target_language).await?;
            translated.push(Cue {
                index: cue.index,
                start: cue.start,
                end: cue.end,
                text,
            });
        }

        Ok(translated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::SublateError;
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
    ) -> CueTranslator {
        let mut config = Config::default().translate;
        config.max_retries = max_retries;
        CueTranslator::new(BaseTranslator::with_parts(
            config,
            Box::new(generator),
            TranslationCache::open(cache_dir),
        ))
    }

    #[test]
    fn test_validate_translation() {
        assert!(CueTranslator::validate_translation("Hello.", "Bonjour."));
        assert!(!CueTranslator::validate_translation("Hello.", ""));
        assert!(!CueTranslator::validate_translation("Hello.", "Hello."));
        assert!(!CueTranslator::validate_translation(
            "Hi.",
            "Here is a very long explanation of the translation that is clearly not a caption"
        ));
    }

    #[tokio::test]
    async fn test_request_failures_propagate_after_retries() {
        let dir = tempfile::tempdir().unwrap();
        let mut generator = MockTestGenerator::new();
        generator
            .expect_generate()
            .times(2)
            .returning(|_| Err(SublateError::Translate("quota exceeded".to_string())));

        let translator = translator_with(generator, dir.path(), 1);
        let cues = proportional_cues("Hello there.", 10.0);

        let result = translator.translate_cues(&cues, "fr").await;
        assert!(matches!(result, Err(SublateError::Translate(_))));
    }

    #[tokio::test]
    async fn test_unvalidated_responses_fall_back_to_source_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut generator = MockTestGenerator::new();
        // The model parrots the source back, which never validates
        generator
            .expect_generate()
            .times(2)
            .returning(|_| Ok("{\"text\":\"Hello there.\"}".to_string()));

        let translator = translator_with(generator, dir.path(), 1);
        let cues = proportional_cues("Hello there.", 10.0);

        let translated = translator.translate_cues(&cues, "fr").await.unwrap();
        assert_eq!(translated[0].text, "Hello there.");
    }

    #[tokio::test]
    async fn test_validated_translation_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        let mut generator = MockTestGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .returning(|_| Ok("{\"text\":\"Bonjour.\"}".to_string()));

        let translator = translator_with(generator, dir.path(), 0);
        let cues = proportional_cues("Hello there.", 10.0);

        let first = translator.translate_cues(&cues, "fr").await.unwrap();
        assert_eq!(first[0].text, "Bonjour.");

        // Second pass must be served from the cache
        let second = translator.translate_cues(&cues, "fr").await.unwrap();
        assert_eq!(second[0].text, "Bonjour.");
    }
}
