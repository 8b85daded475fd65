//! Sublate - Automated Video Subtitle Translation Pipeline
//!
//! Main entry point: takes a media file or YouTube URL, obtains a transcript
//! through a hosted speech API (or a mock placeholder), translates it with a
//! hosted LLM, and emits SRT subtitle files.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sublate::cli::{Args, CacheAction, Commands};
use sublate::config::{
    Config, TranscriberProvider, TranslationMode, TranslationQualityPreset,
};
use sublate::error::SublateError;
use sublate::transcribe::{format_age, now_epoch_secs, TranscriptCache};
use sublate::translate::TranslationCache;
use sublate::workflow::{self, Workflow};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("sublate.toml").exists() {
                info!("Found sublate.toml in current directory, loading...");
                Config::from_file("sublate.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Process {
            input,
            target_langs,
            output_dir,
            translation_mode,
            provider,
            quality,
        } => {
            info!("Processing input: {}", input);

            config.translate.mode = parse_translation_mode(&translation_mode)?;
            config.transcriber.provider = parse_provider(&provider)?;
            config.translate.quality = parse_quality(&quality)?;

            let target_languages = split_langs(&target_langs);
            let workflow = Workflow::new(config)?;
            workflow
                .process_input(&input, &target_languages, output_dir.as_deref())
                .await?;
        }
        Commands::Batch {
            input_dir,
            target_langs,
            output_dir,
            translation_mode,
            provider,
        } => {
            info!("Processing directory: {}", input_dir.display());

            config.translate.mode = parse_translation_mode(&translation_mode)?;
            config.transcriber.provider = parse_provider(&provider)?;

            let target_languages = split_langs(&target_langs);
            let workflow = Workflow::new(config)?;
            workflow
                .process_directory(&input_dir, &target_languages, output_dir.as_deref())
                .await?;
        }
        Commands::Fetch { url, output } => {
            info!("Fetching audio from: {}", url);

            workflow::fetch_audio_file(config.fetch, config.media, &url, &output).await?;
            println!("Saved audio to {}", output.display());
        }
        Commands::Transcribe {
            input,
            output,
            language,
            provider,
        } => {
            info!("Transcribing: {}", input.display());

            config.transcriber.provider = parse_provider(&provider)?;
            let workflow = Workflow::new(config)?;
            workflow
                .transcribe_to_srt(&input, &output, language.as_deref())
                .await?;
            println!("Saved subtitles to {}", output.display());
        }
        Commands::Translate {
            input,
            output_dir,
            target_langs,
            translation_mode,
        } => {
            info!("Translating subtitles: {}", input.display());

            config.translate.mode = parse_translation_mode(&translation_mode)?;
            let target_languages = split_langs(&target_langs);
            workflow::translate_subtitle_file(
                config.translate,
                &input,
                &output_dir,
                &target_languages,
            )
            .await?;
        }
        Commands::Compose {
            input,
            duration,
            output,
        } => {
            info!("Composing subtitles from: {}", input.display());

            workflow::compose_subtitle_file(&input, duration, &output).await?;
            println!("Saved subtitles to {}", output.display());
        }
        Commands::Cache { action } => match action {
            CacheAction::List => {
                let transcripts = TranscriptCache::new().list().await?;
                let translations = TranslationCache::new().list().await?;

                if transcripts.is_empty() && translations.is_empty() {
                    println!("No cached entries found.");
                } else {
                    if !transcripts.is_empty() {
                        println!("\nCached Transcripts:");
                        println!("{:<10} {:<10} {:<12} {:<50}", "Provider", "Language", "Cached", "Audio File");
                        println!("{}", "-".repeat(82));

                        for item in transcripts {
                            let language =
                                item.transcript.language.as_deref().unwrap_or("auto");
                            let audio_file = std::path::Path::new(&item.audio_path)
                                .file_name()
                                .map(|n| n.to_string_lossy().into_owned())
                                .unwrap_or_default();

                            println!(
                                "{:<10} {:<10} {:<12} {:<50}",
                                item.provider,
                                language,
                                format_age(now_epoch_secs().saturating_sub(item.cached_at)),
                                audio_file
                            );
                        }
                    }

                    if !translations.is_empty() {
                        println!("\nCached Translations:");
                        println!("{:<15} {:<10} {:<10} {:<12} {:<40}", "Model", "Language", "Mode", "Cached", "Source Text");
                        println!("{}", "-".repeat(87));

                        for item in translations {
                            println!(
                                "{:<15} {:<10} {:<10} {:<12} {:<40}",
                                item.model,
                                item.target_language,
                                item.mode,
                                format_age(now_epoch_secs().saturating_sub(item.cached_at)),
                                preview(&item.source_text, 37)
                            );
                        }
                    }
                }
            }
            CacheAction::Clear => {
                let transcript_count = TranscriptCache::new().clear().await?;
                let translation_count = TranslationCache::new().clear().await?;
                println!(
                    "Cleared {} cached transcripts and {} cached translations",
                    transcript_count, translation_count
                );
            }
            CacheAction::Info => {
                let info = TranscriptCache::new().info().await?;
                let translation_count = TranslationCache::new().list().await?.len();

                println!("\nCache Statistics:");
                println!("Transcript files: {}", info.total_files);
                println!(
                    "Transcript size: {:.2} MB",
                    info.total_size as f64 / 1024.0 / 1024.0
                );
                println!("Translation files: {}", translation_count);
                println!("Providers used: {:?}", info.providers_used);

                if let Some(oldest) = info.oldest_entry {
                    println!(
                        "Oldest entry: {} ago",
                        format_age(now_epoch_secs().saturating_sub(oldest))
                    );
                }
                if let Some(newest) = info.newest_entry {
                    println!(
                        "Newest entry: {} ago",
                        format_age(now_epoch_secs().saturating_sub(newest))
                    );
                }
            }
        },
    }

    info!("Done");
    Ok(())
}

/// Console logging plus daily rolling files under `.sublate/log`.
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".sublate").join("log");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = rolling::daily(&log_dir, "sublate.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // The appender guard must outlive main
    std::mem::forget(guard);

    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer().with_target(false);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut)
}

fn split_langs(target_langs: &str) -> Vec<String> {
    target_langs
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse translation mode from string
fn parse_translation_mode(mode: &str) -> Result<TranslationMode> {
    match mode.to_lowercase().as_str() {
        "document" => Ok(TranslationMode::Document),
        "cue" => Ok(TranslationMode::Cue),
        _ => Err(SublateError::Config(format!(
            "Invalid translation mode '{}'. Valid modes: document, cue",
            mode
        ))
        .into()),
    }
}

/// Parse transcription provider from string
fn parse_provider(provider: &str) -> Result<TranscriberProvider> {
    match provider.to_lowercase().as_str() {
        "hosted" => Ok(TranscriberProvider::Hosted),
        "mock" => Ok(TranscriberProvider::Mock),
        _ => Err(SublateError::Config(format!(
            "Invalid transcription provider '{}'. Valid providers: hosted, mock",
            provider
        ))
        .into()),
    }
}

/// Parse translation quality preset from string
fn parse_quality(quality: &str) -> Result<TranslationQualityPreset> {
    match quality.to_lowercase().as_str() {
        "precise" => Ok(TranslationQualityPreset::Precise),
        "balanced" => Ok(TranslationQualityPreset::Balanced),
        "fast" => Ok(TranslationQualityPreset::Fast),
        _ => Err(SublateError::Config(format!(
            "Invalid quality preset '{}'. Valid presets: precise, balanced, fast",
            quality
        ))
        .into()),
    }
}
