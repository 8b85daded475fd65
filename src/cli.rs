use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process a media file or YouTube URL into translated subtitles
    Process {
        /// Input media file path or YouTube URL
        #[arg(short, long)]
        input: String,

        /// Target languages for translation (comma-separated codes)
        #[arg(short, long, default_value = "fr")]
        target_langs: String,

        /// Output directory for subtitle files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Translation mode (document, cue)
        #[arg(long, default_value = "document")]
        translation_mode: String,

        /// Transcription provider (hosted, mock)
        #[arg(long, default_value = "hosted")]
        provider: String,

        /// Translation quality preset (precise, balanced, fast)
        #[arg(long, default_value = "balanced")]
        quality: String,
    },

    /// Process all media files in a directory
    Batch {
        /// Input directory containing media files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Target languages for translation (comma-separated codes)
        #[arg(short, long, default_value = "fr")]
        target_langs: String,

        /// Output directory for subtitle files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Translation mode (document, cue)
        #[arg(long, default_value = "document")]
        translation_mode: String,

        /// Transcription provider (hosted, mock)
        #[arg(long, default_value = "hosted")]
        provider: String,
    },

    /// Download the audio track of a YouTube video
    Fetch {
        /// YouTube video URL
        #[arg(short, long)]
        url: String,

        /// Output audio file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Transcribe a media file to an SRT subtitle file
    Transcribe {
        /// Input media file
        #[arg(short, long)]
        input: PathBuf,

        /// Output subtitle file
        #[arg(short, long)]
        output: PathBuf,

        /// Source language hint
        #[arg(short, long)]
        language: Option<String>,

        /// Transcription provider (hosted, mock)
        #[arg(long, default_value = "hosted")]
        provider: String,
    },

    /// Translate an SRT subtitle file using the LLM
    Translate {
        /// Input subtitle file
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory for translated files
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Target languages (comma-separated codes)
        #[arg(short, long)]
        target_langs: String,

        /// Translation mode (document, cue)
        #[arg(long, default_value = "document")]
        translation_mode: String,
    },

    /// Compose an SRT file from plain text and a total duration
    Compose {
        /// Input plain-text file
        #[arg(short, long)]
        input: PathBuf,

        /// Total media duration in seconds
        #[arg(short, long)]
        duration: f64,

        /// Output subtitle file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Manage transcript and translation caches
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
pub enum CacheAction {
    /// List cached transcripts and translations
    List,

    /// Clear all cached transcripts and translations
    Clear,

    /// Show cache statistics and size
    Info,
}
