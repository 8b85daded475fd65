use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::TranscriberConfig;
use crate::error::{Result, SublateError};
use crate::srt;
use super::common::{Transcript, TranscriptCache};
use super::Transcriber;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Debug, Serialize)]
struct JobRequest {
    audio_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    language_code: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    language_detection: bool,
}

#[derive(Debug, Deserialize)]
struct JobResponse {
    id: String,
    status: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    language_code: Option<String>,
}

#[derive(Debug)]
enum JobState {
    Completed(JobResponse),
    Pending(String),
    Failed(String),
}

/// Map a polled job payload onto what the poll loop should do next.
fn classify_job(job: JobResponse) -> JobState {
    if job.status == "completed" {
        JobState::Completed(job)
    } else if job.status == "error" {
        JobState::Failed(job.error.unwrap_or_else(|| "unknown error".to_string()))
    } else {
        JobState::Pending(job.status)
    }
}

/// Transcriber backed by a hosted speech API (AssemblyAI-style REST flow):
/// upload the audio bytes, submit a transcription job, poll until it
/// finishes, then download the SRT export.
pub struct HostedTranscriber {
    client: Client,
    config: TranscriberConfig,
    api_key: String,
    cache: TranscriptCache,
}

impl HostedTranscriber {
    pub fn new(config: TranscriberConfig, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .expect("HTTP client creation should not fail");

        Self {
            client,
            config,
            api_key,
            cache: TranscriptCache::new(),
        }
    }

    async fn upload_audio(&self, audio_path: &Path) -> Result<String> {
        info!("Uploading audio file: {}", audio_path.display());

        let bytes = tokio::fs::read(audio_path).await.map_err(SublateError::Io)?;

        let response = self
            .client
            .post(format!("{}/v2/upload", self.config.endpoint))
            .header("authorization", &self.api_key)
            .body(bytes)
            .send()
            .await
            .map_err(|e| SublateError::Transcribe(format!("Upload request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SublateError::Transcribe(format!(
                "Upload failed {}: {}",
                status, error_text
            )));
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| SublateError::Transcribe(format!("Failed to parse upload response: {}", e)))?;

        debug!("Audio uploaded to {}", upload.upload_url);
        Ok(upload.upload_url)
    }

    async fn submit_job(&self, audio_url: String, language: Option<&str>) -> Result<String> {
        let request = JobRequest {
            audio_url,
            language_code: language.map(|s| s.to_string()),
            language_detection: language.is_none(),
        };

        let response = self
            .client
            .post(format!("{}/v2/transcript", self.config.endpoint))
            .header("authorization", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SublateError::Transcribe(format!("Job submission failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SublateError::Transcribe(format!(
                "Job submission failed {}: {}",
                status, error_text
            )));
        }

        let job: JobResponse = response
            .json()
            .await
            .map_err(|e| SublateError::Transcribe(format!("Failed to parse job response: {}", e)))?;

        info!("Transcription job submitted: {}", job.id);
        Ok(job.id)
    }

    async fn poll_job(&self, job_id: &str) -> Result<JobResponse> {
        let url = format!("{}/v2/transcript/{}", self.config.endpoint, job_id);
        let deadline =
            std::time::Instant::now() + Duration::from_secs(self.config.poll_timeout_secs);

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .expect("spinner template is valid"),
        );
        spinner.set_message("Waiting for transcription...");

        loop {
            let response = self
                .client
                .get(&url)
                .header("authorization", &self.api_key)
                .send()
                .await
                .map_err(|e| SublateError::Transcribe(format!("Status poll failed: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_default();
                spinner.finish_and_clear();
                return Err(SublateError::Transcribe(format!(
                    "Status poll failed {}: {}",
                    status, error_text
                )));
            }

            let job: JobResponse = response
                .json()
                .await
                .map_err(|e| SublateError::Transcribe(format!("Failed to parse status: {}", e)))?;

            match classify_job(job) {
                JobState::Completed(job) => {
                    spinner.finish_with_message("Transcription completed");
                    return Ok(job);
                }
                JobState::Failed(message) => {
                    spinner.finish_and_clear();
                    return Err(SublateError::Transcribe(format!(
                        "Transcription job failed: {}",
                        message
                    )));
                }
                JobState::Pending(status) => {
                    debug!("Job {} status: {}", job_id, status);
                    spinner.tick();
                }
            }

            if std::time::Instant::now() >= deadline {
                spinner.finish_and_clear();
                return Err(SublateError::Transcribe(format!(
                    "Transcription job {} did not finish within {}s",
                    job_id, self.config.poll_timeout_secs
                )));
            }

            tokio::time::sleep(Duration::from_secs(self.config.poll_interval_secs)).await;
        }
    }

    async fn download_srt(&self, job_id: &str) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/v2/transcript/{}/srt", self.config.endpoint, job_id))
            .header("authorization", &self.api_key)
            .send()
            .await
            .map_err(|e| SublateError::Transcribe(format!("SRT export failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(SublateError::Transcribe(format!(
                "SRT export failed with status {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| SublateError::Transcribe(format!("Failed to read SRT export: {}", e)))
    }
}

#[async_trait]
impl Transcriber for HostedTranscriber {
    async fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<Transcript> {
        if !audio_path.exists() {
            return Err(SublateError::FileNotFound(audio_path.display().to_string()));
        }

        let cache_key = TranscriptCache::file_key(
            audio_path,
            &["hosted", language.unwrap_or("auto")],
        )?;
        if let Some(cached) = self.cache.load(&cache_key).await {
            info!("Using cached transcript for {}", audio_path.display());
            return Ok(cached);
        }

        let audio_url = self.upload_audio(audio_path).await?;
        let job_id = self.submit_job(audio_url, language).await?;
        let job = self.poll_job(&job_id).await?;

        let srt_content = self.download_srt(&job_id).await?;
        let cues = srt::parse(&srt_content)?;
        if cues.is_empty() {
            return Err(SublateError::Transcribe(
                "Hosted API returned an empty transcript".to_string(),
            ));
        }

        let transcript = Transcript::from_cues(cues, job.language_code);
        self.cache
            .save(&cache_key, &transcript, "hosted", audio_path)
            .await?;

        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(status: &str, error: Option<&str>) -> JobResponse {
        JobResponse {
            id: "job-1".to_string(),
            status: status.to_string(),
            error: error.map(|e| e.to_string()),
            language_code: None,
        }
    }

    #[test]
    fn test_classify_completed_job() {
        assert!(matches!(
            classify_job(job("completed", None)),
            JobState::Completed(_)
        ));
    }

    #[test]
    fn test_classify_failed_job_carries_api_message() {
        match classify_job(job("error", Some("audio duration too short"))) {
            JobState::Failed(message) => assert_eq!(message, "audio duration too short"),
            other => panic!("unexpected state: {:?}", other),
        }

        match classify_job(job("error", None)) {
            JobState::Failed(message) => assert_eq!(message, "unknown error"),
            other => panic!("unexpected state: {:?}", other),
        }
    }

    #[test]
    fn test_classify_pending_statuses_keep_polling() {
        assert!(matches!(
            classify_job(job("queued", None)),
            JobState::Pending(_)
        ));
        assert!(matches!(
            classify_job(job("processing", None)),
            JobState::Pending(_)
        ));
    }
}
