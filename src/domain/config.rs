use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Translation gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Gateway endpoint URL. Uploads POST here; status checks GET the
    /// same URL with a jobId query parameter.
    pub endpoint: String,
    /// Optional API key sent as the x-api-key header.
    pub api_key: Option<String>,
    /// Default source language code.
    pub source_language: String,
    /// Default target language code.
    pub target_language: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            source_language: "en".to_string(),
            target_language: "es".to_string(),
        }
    }
}

/// Microphone capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Hard cap on recording length in milliseconds.
    pub max_duration_ms: u64,
    /// Capture sample rate in Hz.
    pub sample_rate: u32,
    /// Input device id; None selects the system default.
    pub device: Option<String>,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            max_duration_ms: 10_000,
            sample_rate: 16_000,
            device: None,
        }
    }
}

/// Status polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Interval between status checks in milliseconds.
    pub interval_ms: u64,
    /// Maximum number of status checks before giving up.
    pub max_checks: u32,
    /// Maximum consecutive transport errors tolerated before giving up.
    pub max_transport_errors: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 3_000,
            max_checks: 10,
            max_transport_errors: 3,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Enable file logging with rotation.
    pub file_logging: bool,
    /// Maximum number of log files to keep.
    pub max_files: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: true,
            max_files: 7,
        }
    }
}

/// Terminal presentation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Render with the dark palette. Persisted across runs and flipped
    /// by the `theme` command.
    pub dark_mode: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { dark_mode: false }
    }
}

/// Result output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for downloaded translation audio; None uses a
    /// per-platform data directory.
    pub save_dir: Option<PathBuf>,
    /// Play the translated audio after download.
    pub play_audio: bool,
    /// Playback volume (0.0-1.0).
    pub volume: f32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            save_dir: None,
            play_audio: true,
            volume: 1.0,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub recording: RecordingConfig,
    pub polling: PollingConfig,
    pub logging: LoggingConfig,
    pub ui: UiConfig,
    pub output: OutputConfig,
}

impl AppConfig {
    /// Create a new AppConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }
}
