use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::JsonStore;
use crate::error::{Result, SublateError};
use crate::srt::Cue;

/// Service-agnostic transcription result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Full transcript text
    pub text: String,
    /// Timed caption cues
    pub cues: Vec<Cue>,
    /// Detected or assumed source language code (e.g. "en")
    pub language: Option<String>,
}

impl Transcript {
    pub fn from_cues(cues: Vec<Cue>, language: Option<String>) -> Self {
        let text = cues
            .iter()
            .map(|c| c.text.trim())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            text,
            cues,
            language,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptCacheEntry {
    pub transcript: Transcript,
    pub provider: String,
    pub audio_path: String,
    pub audio_modified: Option<u64>,
    pub cached_at: u64,
}

#[derive(Debug)]
pub struct CacheInfo {
    pub total_files: u64,
    pub total_size: u64,
    pub oldest_entry: Option<u64>,
    pub newest_entry: Option<u64>,
    pub providers_used: Vec<String>,
}

/// Persistent transcript cache keyed by audio file metadata.
pub struct TranscriptCache {
    store: JsonStore,
}

impl TranscriptCache {
    pub fn new() -> Self {
        Self {
            store: JsonStore::open(".sublate/cache/transcripts"),
        }
    }

    /// Hash the audio file identity (path, size, mtime) plus provider data.
    pub fn file_key<P: AsRef<Path>>(path: P, additional_data: &[&str]) -> Result<String> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)
            .map_err(|e| SublateError::Cache(format!("Failed to read file metadata: {}", e)))?;

        let mut hasher = DefaultHasher::new();
        path.to_string_lossy().hash(&mut hasher);
        metadata.len().hash(&mut hasher);
        file_mtime_secs(path).unwrap_or(0).hash(&mut hasher);
        for data in additional_data {
            data.hash(&mut hasher);
        }

        Ok(format!("{:016x}", hasher.finish()))
    }

    pub async fn load(&self, key: &str) -> Option<Transcript> {
        self.store
            .get::<TranscriptCacheEntry>(key)
            .await
            .map(|entry| entry.transcript)
    }

    pub async fn save(
        &self,
        key: &str,
        transcript: &Transcript,
        provider: &str,
        audio_path: &Path,
    ) -> Result<()> {
        let entry = TranscriptCacheEntry {
            transcript: transcript.clone(),
            provider: provider.to_string(),
            audio_path: audio_path.display().to_string(),
            audio_modified: file_mtime_secs(audio_path),
            cached_at: now_epoch_secs(),
        };
        self.store.put(key, &entry).await
    }

    /// Delete all cached transcripts, returning the number removed.
    pub async fn clear(&self) -> Result<u64> {
        let count = self.store.remove_all().await?;
        info!("Cleared {} transcript cache entries", count);
        Ok(count)
    }

    /// List cached transcripts, newest first.
    pub async fn list(&self) -> Result<Vec<TranscriptCacheEntry>> {
        let mut entries: Vec<TranscriptCacheEntry> = self.store.entries().await?;
        entries.sort_by(|a, b| b.cached_at.cmp(&a.cached_at));
        Ok(entries)
    }

    pub async fn info(&self) -> Result<CacheInfo> {
        let entries = self.list().await?;

        let mut providers_used = Vec::new();
        for entry in &entries {
            if !providers_used.contains(&entry.provider) {
                providers_used.push(entry.provider.clone());
            }
        }

        Ok(CacheInfo {
            total_files: entries.len() as u64,
            total_size: self.store.disk_usage().await,
            oldest_entry: entries.iter().map(|e| e.cached_at).min(),
            newest_entry: entries.iter().map(|e| e.cached_at).max(),
            providers_used,
        })
    }
}

fn file_mtime_secs(path: &Path) -> Option<u64> {
    std::fs::metadata(path)
        .ok()?
        .modified()
        .ok()?
        .duration_since(std::time::UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs())
}

impl Default for TranscriptCache {
    fn default() -> Self {
        Self::new()
    }
}

pub fn now_epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Format an age in seconds to a human-readable string
pub fn format_age(seconds: u64) -> String {
    let days = seconds / (24 * 60 * 60);
    let hours = (seconds % (24 * 60 * 60)) / (60 * 60);
    let minutes = (seconds % (60 * 60)) / 60;
    let secs = seconds % 60;

    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srt;

    #[test]
    fn test_transcript_from_cues_joins_text() {
        let cues = srt::proportional_cues("One. Two.", 10.0);
        let transcript = Transcript::from_cues(cues, Some("en".to_string()));
        assert_eq!(transcript.text, "One. Two.");
        assert_eq!(transcript.cues.len(), 2);
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(30), "30s");
        assert_eq!(format_age(90), "1m 30s");
        assert_eq!(format_age(3700), "1h 1m");
        assert_eq!(format_age(200_000), "2d 7h");
    }

    #[test]
    fn test_file_key_changes_with_extra_data() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("audio.wav");
        std::fs::write(&file, b"fake audio").unwrap();

        let a = TranscriptCache::file_key(&file, &["hosted"]).unwrap();
        let b = TranscriptCache::file_key(&file, &["mock"]).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, TranscriptCache::file_key(&file, &["hosted"]).unwrap());
    }
}
