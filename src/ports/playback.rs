use async_trait::async_trait;
use std::path::Path;

use crate::domain::DomainError;

/// Port for playing downloaded translation audio.
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Play an audio file through the default output device, blocking
    /// until playback finishes.
    async fn play_file(&self, path: &Path, volume: f32) -> Result<(), DomainError>;
}
