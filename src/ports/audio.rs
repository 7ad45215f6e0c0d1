use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::{AudioClip, AudioDevice, DomainError, RecorderConfig, RecorderEvent, RecorderState};

/// Port for microphone capture.
///
/// Implementations handle platform-specific capture and device selection.
#[async_trait]
pub trait Recorder: Send + Sync {
    /// Start recording from the selected input device.
    ///
    /// Starting always begins a fresh clip; any samples left over from a
    /// previous session are discarded. Returns an error if already
    /// recording or if the device cannot be opened.
    async fn start_recording(&self) -> Result<(), DomainError>;

    /// Stop recording and return the captured clip.
    ///
    /// The clip contains mono PCM at the configured sample rate. The
    /// capture stream is closed and the device released before the clip
    /// is handed back. Returns `Ok(None)` when no recording was active,
    /// so a redundant stop is harmless.
    async fn stop_recording(&self) -> Result<Option<AudioClip>, DomainError>;

    /// Get the current capture state.
    fn state(&self) -> RecorderState;

    /// Get the capture configuration.
    fn config(&self) -> RecorderConfig;

    /// List available audio input devices.
    fn list_input_devices(&self) -> Result<Vec<AudioDevice>, DomainError>;

    /// Select an input device by ID, or use the system default if None.
    fn select_input_device(&self, device_id: Option<&str>) -> Result<(), DomainError>;

    /// Subscribe to recorder events.
    fn subscribe(&self) -> broadcast::Receiver<RecorderEvent>;

    /// Get the current input level (0.0 - 1.0).
    ///
    /// Returns 0.0 if not recording.
    fn current_level(&self) -> f32;
}
