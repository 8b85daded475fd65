//! Sublate - Automated Video Subtitle Translation Pipeline
//!
//! Takes a media file or YouTube URL, obtains a transcript through a hosted
//! speech API (or a mock placeholder), translates it with a hosted LLM, and
//! emits SRT subtitle files. Audio extraction and video download are
//! delegated to ffmpeg and yt-dlp.

pub mod cache;
pub mod cli;
pub mod config;
pub mod workflow;
pub mod transcribe;
pub mod translate;
pub mod srt;
pub mod media;
pub mod fetch;
pub mod error;
