use thiserror::Error;

/// Domain-level errors for Parlance.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not access microphone: {0}")]
    Microphone(String),

    #[error("Already recording")]
    AlreadyRecording,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Server responded with {status}: {status_text}")]
    Transport { status: u16, status_text: String },

    #[error("Processing timed out")]
    PollTimeout,

    #[error("Status polling aborted after {errors} consecutive errors: {last_error}")]
    PollFailed { errors: u32, last_error: String },

    #[error("{0}")]
    ServerFailure(String),

    #[error("Unsupported language code: {0}")]
    UnsupportedLanguage(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for DomainError {
    fn from(err: toml::de::Error) -> Self {
        DomainError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for DomainError {
    fn from(err: toml::ser::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

impl From<hound::Error> for DomainError {
    fn from(err: hound::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for DomainError {
    fn from(err: reqwest::Error) -> Self {
        DomainError::Request(err.to_string())
    }
}
