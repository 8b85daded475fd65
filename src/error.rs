use thiserror::Error;

#[derive(Error, Debug)]
pub enum SublateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transcription error: {0}")]
    Transcribe(String),

    #[error("Translation error: {0}")]
    Translate(String),

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Subtitle error: {0}")]
    Subtitle(String),

    #[error("Media duration {actual:.0}s exceeds the allowed limit of {limit:.0}s")]
    DurationExceeded { actual: f64, limit: f64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Cache error: {0}")]
    Cache(String),
}

pub type Result<T> = std::result::Result<T, SublateError>;
