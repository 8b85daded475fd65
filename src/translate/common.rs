use std::path::PathBuf;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::cache::JsonStore;
use crate::config::TranslateConfig;
use crate::error::{Result, SublateError};

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TranslationResult {
    text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationCacheEntry {
    pub source_text: String,
    pub target_language: String,
    pub translation: String,
    pub model: String,
    pub mode: String,
    pub cached_at: u64,
}

/// Persistent translation cache.
pub struct TranslationCache {
    store: JsonStore,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::open(".sublate/cache/translations")
    }

    /// Cache rooted at an explicit directory.
    pub fn open<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            store: JsonStore::open(dir),
        }
    }

    pub async fn load(&self, cache_key: &str) -> Option<String> {
        self.store
            .get::<TranslationCacheEntry>(cache_key)
            .await
            .map(|entry| entry.translation)
    }

    pub async fn save(&self, cache_key: &str, entry: &TranslationCacheEntry) -> Result<()> {
        self.store.put(cache_key, entry).await
    }

    /// Clear all cached translations, returning the number removed.
    pub async fn clear(&self) -> Result<u64> {
        let count = self.store.remove_all().await?;
        info!("Cleared {} translation cache entries", count);
        Ok(count)
    }

    /// List cached translations, newest first.
    pub async fn list(&self) -> Result<Vec<TranslationCacheEntry>> {
        let mut entries: Vec<TranslationCacheEntry> = self.store.entries().await?;
        entries.sort_by(|a, b| b.cached_at.cmp(&a.cached_at));
        Ok(entries)
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Seam over the LLM endpoint so the translation flows can be driven
/// without the network.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send a prompt and return the model's text answer.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Gemini-style `generateContent` REST client.
pub struct GeminiClient {
    client: Client,
    config: TranslateConfig,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: TranslateConfig, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .expect("HTTP client creation should not fail");

        Self {
            client,
            config,
            api_key,
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    /// Send a prompt to the LLM and return the first candidate's text.
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.endpoint, self.config.model
        );

        let request = json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": {
                "temperature": self.config.quality.temperature(),
                "topP": 0.95,
                "topK": 40,
            }
        });

        debug!("Sending translation request to: {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SublateError::Translate(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SublateError::Translate(format!(
                "LLM API error {}: {}",
                status, error_text
            )));
        }

        let generate_response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| SublateError::Translate(format!("Failed to parse response: {}", e)))?;

        let text = generate_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(SublateError::Translate(
                "Empty translation received".to_string(),
            ));
        }

        Ok(text)
    }
}

/// Base translator with the LLM seam and common functionality shared by
/// the document and cue modes.
pub struct BaseTranslator {
    generator: Box<dyn TextGenerator>,
    pub config: TranslateConfig,
    cache: TranslationCache,
}

impl BaseTranslator {
    pub fn new(config: TranslateConfig, api_key: String) -> Self {
        let generator = Box::new(GeminiClient::new(config.clone(), api_key));
        Self::with_parts(config, generator, TranslationCache::new())
    }

    /// Construct from pre-built components.
    pub fn with_parts(
        config: TranslateConfig,
        generator: Box<dyn TextGenerator>,
        cache: TranslationCache,
    ) -> Self {
        Self {
            generator,
            config,
            cache,
        }
    }

    /// Translate a single piece of caption text, expecting a JSON-wrapped
    /// response.
    pub async fn translate_text(&self, text: &str, target_language: &str) -> Result<String> {
        let prompt = build_text_prompt(text, target_language);
        let raw_response = self.generator.generate(&prompt).await?;

        debug!("Raw LLM response: {}", raw_response);

        let cleaned = remove_markdown_code_blocks(&raw_response);
        if let Ok(result) = serde_json::from_str::<TranslationResult>(&cleaned) {
            return Ok(result.text.trim().to_string());
        }

        // Mixed text around the JSON object
        if let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) {
            if start < end {
                if let Ok(result) =
                    serde_json::from_str::<TranslationResult>(&cleaned[start..=end])
                {
                    return Ok(result.text.trim().to_string());
                }
            }
        }

        Ok(clean_translation_response(&cleaned))
    }

    /// Translate a whole SRT document in one prompt, instructing the model
    /// to preserve indices and timestamps.
    pub async fn translate_document(&self, srt_content: &str, target_language: &str) -> Result<String> {
        let prompt = build_document_prompt(srt_content, target_language);
        let raw_response = self.generator.generate(&prompt).await?;
        Ok(remove_markdown_code_blocks(&raw_response))
    }

    /// Generate cache key for a translation
    pub fn cache_key(&self, source_text: &str, target_language: &str, mode: &str) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        source_text.hash(&mut hasher);
        target_language.hash(&mut hasher);
        mode.hash(&mut hasher);
        self.config.model.hash(&mut hasher);

        format!("{:016x}", hasher.finish())
    }

    /// Load a translation from the persistent cache
    pub async fn load_cached(&self, cache_key: &str) -> Option<String> {
        self.cache.load(cache_key).await
    }

    /// Save a translation to the persistent cache
    pub async fn save_cached(
        &self,
        cache_key: &str,
        source_text: &str,
        target_language: &str,
        translation: &str,
        mode: &str,
    ) -> Result<()> {
        let entry = TranslationCacheEntry {
            source_text: source_text.to_string(),
            target_language: target_language.to_string(),
            translation: translation.to_string(),
            model: self.config.model.clone(),
            mode: mode.to_string(),
            cached_at: crate::transcribe::now_epoch_secs(),
        };

        self.cache.save(cache_key, &entry).await
    }
}

/// Build the single-text translation prompt with a JSON-wrapped response.
fn build_text_prompt(text: &str, target_language: &str) -> String {
    let language_name = language_code_to_name(target_language);

    format!(
        "You are a professional translator specialized in video subtitles.\n\
         \n\
         CRITICAL: You must translate the text to {} ONLY. Do not translate to any other language.\n\
         The target language is: {} (language code: {})\n\
         \n\
         Keep the tone and register of the original text. Adapt idiomatic\n\
         expressions where needed, and keep the translation natural and fluent.\n\
         \n\
         Return ONLY the translation in JSON format as {{\"text\":\"your {} translation here\"}}.\n\
         Do not include any explanations, alternatives, or text in other languages.\n\
         \n\
         Text to translate: \"{}\"\n",
        language_name, language_name, target_language, language_name, text
    )
}

/// Build the whole-document translation prompt that preserves SRT structure.
fn build_document_prompt(srt_content: &str, target_language: &str) -> String {
    let language_name = language_code_to_name(target_language);

    format!(
        "You are a professional translator specialized in video subtitles.\n\
         \n\
         Translate the following subtitles into {} while respecting these rules:\n\
         1. Keep the exact SRT structure (cue numbers, timestamps, blank lines)\n\
         2. Translate only the caption text, never the numbers or timestamps\n\
         3. Preserve the original meaning and context\n\
         4. Adapt idiomatic expressions where necessary\n\
         5. Use natural, fluent language\n\
         6. Respect the original register (formal/informal)\n\
         7. Keep punctuation and special characters\n\
         8. Keep each translation aligned with its timestamps\n\
         \n\
         Here is the text to translate:\n\
         \n\
         {}\n\
         \n\
         Translation:",
        language_name, srt_content
    )
}

/// Convert language code to full language name for clearer prompts
pub fn language_code_to_name(code: &str) -> String {
    match code.to_lowercase().as_str() {
        "ar" => "Arabic".to_string(),
        "zh" => "Chinese (Simplified)".to_string(),
        "fr" => "French".to_string(),
        "de" => "German".to_string(),
        "hi" => "Hindi".to_string(),
        "it" => "Italian".to_string(),
        "ja" => "Japanese".to_string(),
        "ko" => "Korean".to_string(),
        "pt" => "Portuguese".to_string(),
        "ru" => "Russian".to_string(),
        "es" => "Spanish".to_string(),
        "sv" => "Swedish".to_string(),
        "tr" => "Turkish".to_string(),
        "vi" => "Vietnamese".to_string(),
        "nl" => "Dutch".to_string(),
        "pl" => "Polish".to_string(),
        "th" => "Thai".to_string(),
        "uk" => "Ukrainian".to_string(),
        "en" => "English".to_string(),
        _ => code.to_string(),
    }
}

/// Remove markdown code fences an LLM may wrap around its answer.
pub fn remove_markdown_code_blocks(text: &str) -> String {
    let text = text.trim();

    for prefix in ["```srt", "```json", "```"] {
        if let Some(inner) = text.strip_prefix(prefix) {
            if let Some(inner) = inner.strip_suffix("```") {
                return inner.trim().to_string();
            }
        }
    }

    if text.len() >= 2 && text.starts_with('`') && text.ends_with('`') {
        return text[1..text.len() - 1].trim().to_string();
    }

    text.to_string()
}

/// Extract the most plausible translation line from a free-form response.
fn clean_translation_response(response: &str) -> String {
    for line in response.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty()
            || trimmed.starts_with("Here are")
            || trimmed.starts_with("Option")
            || trimmed.starts_with("**Option")
            || trimmed.starts_with("Translation:")
            || trimmed.starts_with("- ")
            || trimmed.starts_with("* ")
        {
            continue;
        }

        if trimmed.starts_with("**") && trimmed.ends_with("**") {
            continue;
        }

        if trimmed.len() > 3 {
            return trimmed.to_string();
        }
    }

    for line in response.lines() {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    response.to_string()
}

/// Check that the LLM endpoint knows the configured model.
pub async fn check_translator_availability(config: &TranslateConfig, api_key: &str) -> Result<()> {
    let client = Client::new();
    let url = format!("{}/models/{}", config.endpoint, config.model);

    let response = client
        .get(&url)
        .header("x-goog-api-key", api_key)
        .send()
        .await
        .map_err(|e| SublateError::Translate(format!("Failed to reach LLM API: {}", e)))?;

    if response.status().is_success() {
        info!("LLM model '{}' is available", config.model);
        Ok(())
    } else {
        Err(SublateError::Translate(format!(
            "LLM model '{}' not available at {} (status {})",
            config.model,
            config.endpoint,
            response.status()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_markdown_code_blocks() {
        assert_eq!(
            remove_markdown_code_blocks("```json\n{\"text\":\"hola\"}\n```"),
            "{\"text\":\"hola\"}"
        );
        assert_eq!(remove_markdown_code_blocks("```\nplain\n```"), "plain");
        assert_eq!(remove_markdown_code_blocks("`inline`"), "inline");
        assert_eq!(remove_markdown_code_blocks("no fences"), "no fences");
    }

    #[test]
    fn test_clean_translation_response_skips_preamble() {
        let response = "Here are two options:\n**Option 1**\nBonjour le monde";
        assert_eq!(clean_translation_response(response), "Bonjour le monde");
    }

    #[test]
    fn test_language_code_to_name() {
        assert_eq!(language_code_to_name("ja"), "Japanese");
        assert_eq!(language_code_to_name("ZH"), "Chinese (Simplified)");
        assert_eq!(language_code_to_name("xx"), "xx");
    }

    #[test]
    fn test_document_prompt_mentions_structure_rules() {
        let prompt = build_document_prompt("1\n00:00:00,000 --> 00:00:01,000\nHi\n", "fr");
        assert!(prompt.contains("French"));
        assert!(prompt.contains("timestamps"));
        assert!(prompt.contains("00:00:00,000"));
    }
}
