pub mod audio;
pub mod clip;
pub mod config;
pub mod error;
pub mod job;
pub mod translation;

pub use audio::{AtomicRecorderState, AudioDevice, RecorderConfig, RecorderEvent, RecorderState};
pub use clip::AudioClip;
pub use config::AppConfig;
pub use error::DomainError;
pub use job::{JobStatus, JobTracker, PollerState, StatusResponse, UploadOutcome};
pub use translation::{Language, LanguagePair, TranslationResult};
