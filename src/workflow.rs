use std::path::{Path, PathBuf};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::fs;
use tracing::{info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Result, SublateError};
use crate::fetch::{self, YoutubeFetcher};
use crate::media::{self, MediaProcessor};
use crate::srt;
use crate::transcribe::{Transcriber, TranscriberFactory, Transcript};
use crate::translate::{check_translator_availability, TranslatorFactory};

const VIDEO_EXTENSIONS: [&str; 7] = ["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm"];
const AUDIO_EXTENSIONS: [&str; 7] = ["wav", "mp3", "m4a", "aac", "flac", "ogg", "opus"];

pub struct Workflow {
    config: Config,
    transcriber: Box<dyn Transcriber>,
    media: Box<dyn MediaProcessor>,
    fetcher: YoutubeFetcher,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let transcriber = TranscriberFactory::create_transcriber(config.transcriber.clone())?;
        let media = media::create_processor(config.media.clone());
        let fetcher = YoutubeFetcher::new(config.fetch.clone());

        media.check_availability()?;

        Ok(Self {
            config,
            transcriber,
            media,
            fetcher,
        })
    }

    /// Construct a workflow from pre-built components.
    pub fn with_parts(
        config: Config,
        transcriber: Box<dyn Transcriber>,
        media: Box<dyn MediaProcessor>,
    ) -> Self {
        let fetcher = YoutubeFetcher::new(config.fetch.clone());
        Self {
            config,
            transcriber,
            media,
            fetcher,
        }
    }

    /// Process a single input, which may be a local media file or a YouTube
    /// URL, into per-language subtitle files.
    pub async fn process_input(
        &self,
        input: &str,
        target_languages: &[String],
        output_dir: Option<&Path>,
    ) -> Result<()> {
        if fetch::is_valid_youtube_url(input) {
            self.process_youtube(input, target_languages, output_dir).await
        } else {
            self.process_single_file(Path::new(input), target_languages, output_dir)
                .await
        }
    }

    /// Process a single local media file with subtitle translation
    pub async fn process_single_file(
        &self,
        input_path: &Path,
        target_languages: &[String],
        output_dir: Option<&Path>,
    ) -> Result<()> {
        info!("Processing file: {}", input_path.display());

        if !input_path.exists() {
            return Err(SublateError::FileNotFound(input_path.display().to_string()));
        }
        if !is_media_file(input_path) {
            return Err(SublateError::UnsupportedFormat(
                input_path.display().to_string(),
            ));
        }

        let output_dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => input_path
                .parent()
                .ok_or_else(|| SublateError::Config("Cannot determine output directory".to_string()))?
                .to_path_buf(),
        };
        fs::create_dir_all(&output_dir).await?;

        let stem = input_path
            .file_stem()
            .ok_or_else(|| SublateError::Config("Invalid input filename".to_string()))?
            .to_string_lossy()
            .to_string();

        let duration = self.media.check_duration_limit(input_path).await?;
        info!("Media duration: {}", srt::format_srt_time(duration));

        let scratch = tempfile::tempdir().map_err(SublateError::Io)?;
        let audio_path = self.prepare_audio(input_path, scratch.path()).await?;

        self.emit_subtitles(&audio_path, &stem, &output_dir, target_languages)
            .await
    }

    /// Process all video files in a directory
    pub async fn process_directory(
        &self,
        input_dir: &Path,
        target_languages: &[String],
        output_dir: Option<&Path>,
    ) -> Result<()> {
        info!("Processing directory: {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(SublateError::Config(
                "Input path is not a directory".to_string(),
            ));
        }

        let mut media_files = Vec::new();
        for entry in WalkDir::new(input_dir).into_iter().filter_map(|e| e.ok()) {
            if is_media_file(entry.path()) {
                media_files.push(entry.path().to_path_buf());
            }
        }

        info!("Found {} media files to process", media_files.len());

        let progress = ProgressBar::new(media_files.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("[{bar:40}] {pos}/{len} {msg}")
                .expect("progress template is valid"),
        );

        for media_path in media_files {
            progress.set_message(
                media_path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
            );

            match self
                .process_single_file(&media_path, target_languages, output_dir)
                .await
            {
                Ok(_) => info!("Successfully processed: {}", media_path.display()),
                Err(e) => warn!("Failed to process {}: {}", media_path.display(), e),
            }

            progress.inc(1);
        }

        progress.finish_and_clear();
        Ok(())
    }

    /// Download a YouTube video's audio and process it
    pub async fn process_youtube(
        &self,
        url: &str,
        target_languages: &[String],
        output_dir: Option<&Path>,
    ) -> Result<()> {
        let video_id = fetch::youtube_video_id(url)
            .ok_or_else(|| SublateError::Fetch(format!("Not a valid YouTube URL: {}", url)))?;

        let output_dir = output_dir
            .map(|d| d.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&output_dir).await?;

        let scratch = tempfile::tempdir().map_err(SublateError::Io)?;
        let download_path = scratch.path().join(format!("{}.m4a", Uuid::new_v4()));

        self.fetcher.fetch_audio(url, &download_path).await?;

        let duration = self.media.check_duration_limit(&download_path).await?;
        info!("Downloaded audio duration: {}", srt::format_srt_time(duration));

        let audio_path = self.prepare_audio(&download_path, scratch.path()).await?;
        let stem = format!("youtube_{}", video_id);

        self.emit_subtitles(&audio_path, &stem, &output_dir, target_languages)
            .await
    }

    /// Transcribe a media file straight to an SRT file
    pub async fn transcribe_to_srt(
        &self,
        input_path: &Path,
        output_path: &Path,
        language: Option<&str>,
    ) -> Result<()> {
        let transcript = if is_audio_file(input_path) {
            self.transcriber.transcribe(input_path, language).await?
        } else {
            let scratch = tempfile::tempdir().map_err(SublateError::Io)?;
            let audio_path = self.prepare_audio(input_path, scratch.path()).await?;
            self.transcriber.transcribe(&audio_path, language).await?
        };

        srt::write_srt(&transcript.cues, output_path).await
    }

    /// Extract-or-passthrough: video inputs get their audio extracted into
    /// the scratch directory, audio inputs are used as-is.
    async fn prepare_audio(&self, input_path: &Path, scratch_dir: &Path) -> Result<PathBuf> {
        if is_audio_file(input_path) {
            return Ok(input_path.to_path_buf());
        }

        let audio_path = scratch_dir.join(format!("{}.wav", Uuid::new_v4()));
        self.media.extract_audio(input_path, &audio_path).await?;
        Ok(audio_path)
    }

    /// Transcribe, emit the original-language SRT, then one SRT per target
    /// language that differs from the detected source language.
    async fn emit_subtitles(
        &self,
        audio_path: &Path,
        stem: &str,
        output_dir: &Path,
        target_languages: &[String],
    ) -> Result<()> {
        let transcript = self.transcriber.transcribe(audio_path, None).await?;
        info!(
            "Transcription completed: {} cues, language {}",
            transcript.cues.len(),
            transcript.language.as_deref().unwrap_or("unknown")
        );

        let original_path = output_dir.join(format!("{}_original.srt", stem));
        srt::write_srt(&transcript.cues, &original_path).await?;
        info!("Wrote {}", original_path.display());

        let targets = targets_needing_translation(&transcript, target_languages);
        if targets.is_empty() {
            return Ok(());
        }

        let api_key = crate::config::resolve_api_key(&self.config.translate.api_key_env)?;
        check_translator_availability(&self.config.translate, &api_key).await?;

        let translator = TranslatorFactory::create_translator(self.config.translate.clone())?;
        for target_lang in targets {
            info!("Translating to {}", target_lang);

            let translated = translator.translate_cues(&transcript.cues, &target_lang).await?;
            let output_path = output_dir.join(subtitle_file_name(stem, &target_lang));
            srt::write_srt(&translated, &output_path).await?;

            info!("Wrote {}", output_path.display());
        }

        Ok(())
    }
}

/// Download YouTube audio to an explicit output path.
///
/// Standalone because it needs neither a transcriber nor a translator, so
/// no API keys have to be configured.
pub async fn fetch_audio_file(
    fetch_config: crate::config::FetchConfig,
    media_config: crate::config::MediaConfig,
    url: &str,
    output_path: &Path,
) -> Result<()> {
    let fetcher = YoutubeFetcher::new(fetch_config);
    fetcher.check_availability()?;
    fetcher.fetch_audio(url, output_path).await?;

    let media = media::create_processor(media_config);
    media.check_duration_limit(output_path).await?;
    Ok(())
}

/// Translate an existing subtitle file to one or more target languages.
///
/// Standalone because it needs neither a transcriber nor ffmpeg.
pub async fn translate_subtitle_file(
    translate_config: crate::config::TranslateConfig,
    input_path: &Path,
    output_dir: &Path,
    target_languages: &[String],
) -> Result<()> {
    let cues = srt::read_srt(input_path).await?;
    info!("Loaded {} cues from {}", cues.len(), input_path.display());

    fs::create_dir_all(output_dir).await?;

    let stem = input_path
        .file_stem()
        .ok_or_else(|| SublateError::Config("Invalid subtitle filename".to_string()))?
        .to_string_lossy()
        .to_string();

    let api_key = crate::config::resolve_api_key(&translate_config.api_key_env)?;
    check_translator_availability(&translate_config, &api_key).await?;

    let translator = TranslatorFactory::create_translator(translate_config)?;
    for target_lang in target_languages {
        let translated = translator.translate_cues(&cues, target_lang).await?;
        let output_path = output_dir.join(subtitle_file_name(&stem, target_lang));
        srt::write_srt(&translated, &output_path).await?;
        info!("Wrote {}", output_path.display());
    }

    Ok(())
}

/// Synthesize an SRT file from plain text and a known total duration.
pub async fn compose_subtitle_file(
    text_path: &Path,
    duration_secs: f64,
    output_path: &Path,
) -> Result<()> {
    if !text_path.exists() {
        return Err(SublateError::FileNotFound(text_path.display().to_string()));
    }

    let text = fs::read_to_string(text_path).await.map_err(SublateError::Io)?;
    let cues = srt::proportional_cues(&text, duration_secs);
    info!(
        "Composed {} cues over {}",
        cues.len(),
        srt::format_srt_time(duration_secs)
    );

    srt::write_srt(&cues, output_path).await
}

/// Output file name for a translated subtitle
pub fn subtitle_file_name(stem: &str, target_language: &str) -> String {
    format!(
        "{}_{}.srt",
        stem,
        target_language.to_lowercase().replace(' ', "_")
    )
}

/// Drop targets that match the transcript's detected source language.
pub fn targets_needing_translation(
    transcript: &Transcript,
    target_languages: &[String],
) -> Vec<String> {
    target_languages
        .iter()
        .filter(|lang| {
            let same = transcript
                .language
                .as_deref()
                .is_some_and(|src| src.eq_ignore_ascii_case(lang));
            if same {
                info!("Skipping {}: transcript already in that language", lang);
            }
            !same
        })
        .cloned()
        .collect()
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

pub fn is_audio_file(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.as_str()))
}

pub fn is_media_file(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| {
        VIDEO_EXTENSIONS.contains(&ext.as_str()) || AUDIO_EXTENSIONS.contains(&ext.as_str())
    })
}
