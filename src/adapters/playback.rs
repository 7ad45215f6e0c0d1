use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use async_trait::async_trait;
use rodio::OutputStreamBuilder;
use tracing::{debug, info};

use crate::domain::DomainError;
use crate::ports::AudioPlayer;

/// rodio-based playback for downloaded translation audio.
///
/// rodio owns its output stream for the duration of one file; playback is
/// blocking, so each play runs on the blocking thread pool.
pub struct RodioPlayer;

impl RodioPlayer {
    pub fn new() -> Self {
        Self
    }

    fn play_blocking(path: &Path, volume: f32) -> Result<(), DomainError> {
        let stream_handle = OutputStreamBuilder::from_default_device()
            .map_err(|e| DomainError::Playback(format!("No output device: {}", e)))?
            .open_stream()
            .map_err(|e| DomainError::Playback(format!("Failed to open output stream: {}", e)))?;
        let mixer = stream_handle.mixer();

        let file = File::open(path)
            .map_err(|e| DomainError::Playback(format!("Failed to open audio file: {}", e)))?;
        let buf_reader = BufReader::new(file);

        let sink = rodio::play(mixer, buf_reader)
            .map_err(|e| DomainError::Playback(format!("Failed to decode audio: {}", e)))?;
        sink.set_volume(volume);
        sink.sleep_until_end();

        Ok(())
    }
}

impl Default for RodioPlayer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioPlayer for RodioPlayer {
    async fn play_file(&self, path: &Path, volume: f32) -> Result<(), DomainError> {
        debug!(path = ?path, volume, "Playing translation audio");

        let owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::play_blocking(&owned, volume))
            .await
            .map_err(|e| DomainError::Playback(format!("Playback task failed: {}", e)))??;

        info!(path = ?path, "Playback finished");
        Ok(())
    }
}
