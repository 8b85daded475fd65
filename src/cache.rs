use std::path::PathBuf;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Result, SublateError};

/// Directory of JSON entries, one file per key.
///
/// Reads never fail the caller: a missing, unreadable, or stale-format entry
/// is treated as a cache miss.
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn open<P: Into<PathBuf>>(dir: P) -> Self {
        let dir = dir.into();
        if let Err(e) = std::fs::create_dir_all(&dir) {
            warn!("Failed to create cache directory {}: {}", dir.display(), e);
        }
        Self { dir }
    }

    fn entry_file(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let content = tokio::fs::read_to_string(self.entry_file(key)).await.ok()?;
        match serde_json::from_str(&content) {
            Ok(value) => {
                debug!("Cache hit: {}", key);
                Some(value)
            }
            Err(e) => {
                warn!("Ignoring unreadable cache entry {}: {}", key, e);
                None
            }
        }
    }

    pub async fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value)
            .map_err(|e| SublateError::Cache(format!("Failed to serialize cache entry: {}", e)))?;

        if let Err(e) = tokio::fs::write(self.entry_file(key), content).await {
            warn!("Failed to write cache entry {}: {}", key, e);
        }
        Ok(())
    }

    /// Delete every entry, returning the number removed.
    pub async fn remove_all(&self) -> Result<u64> {
        let mut removed = 0;
        for path in self.entry_files().await {
            if tokio::fs::remove_file(&path).await.is_ok() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// All readable entries, in directory order.
    pub async fn entries<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        for path in self.entry_files().await {
            let Ok(content) = tokio::fs::read_to_string(&path).await else {
                continue;
            };
            match serde_json::from_str(&content) {
                Ok(item) => items.push(item),
                Err(e) => warn!("Skipping unreadable cache file {}: {}", path.display(), e),
            }
        }
        Ok(items)
    }

    /// Total size in bytes of all entry files.
    pub async fn disk_usage(&self) -> u64 {
        let mut total = 0;
        for path in self.entry_files().await {
            if let Ok(metadata) = tokio::fs::metadata(&path).await {
                total += metadata.len();
            }
        }
        total
    }

    async fn entry_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        let Ok(mut dir) = tokio::fs::read_dir(&self.dir).await else {
            return files;
        };
        while let Ok(Some(entry)) = dir.next_entry().await {
            if entry.path().extension().is_some_and(|ext| ext == "json") {
                files.push(entry.path());
            }
        }
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        value: u32,
    }

    #[tokio::test]
    async fn test_put_get_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path().join("entries"));

        let sample = Sample {
            name: "a".to_string(),
            value: 7,
        };
        store.put("k1", &sample).await.unwrap();

        assert_eq!(store.get::<Sample>("k1").await, Some(sample));
        assert_eq!(store.get::<Sample>("missing").await, None);

        let all: Vec<Sample> = store.entries().await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(store.disk_usage().await > 0);

        assert_eq!(store.remove_all().await.unwrap(), 1);
        assert_eq!(store.get::<Sample>("k1").await, None);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path());
        std::fs::write(dir.path().join("bad.json"), "not json").unwrap();

        assert_eq!(store.get::<Sample>("bad").await, None);
        let all: Vec<Sample> = store.entries().await.unwrap();
        assert!(all.is_empty());
    }
}
