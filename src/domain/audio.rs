use std::sync::atomic::{AtomicU8, Ordering};

/// Microphone capture state machine.
///
/// State transitions:
/// - Idle -> Recording (start_recording)
/// - Recording -> Idle (stop_recording, returns the captured clip)
///
/// There is no paused state. A stop always ends the capture; starting
/// again begins a fresh clip with an empty buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecorderState {
    /// Ready to record, no active capture.
    Idle = 0,
    /// Actively capturing audio.
    Recording = 1,
}

impl RecorderState {
    /// Check if recording can be started from this state.
    #[must_use]
    pub fn can_start_recording(&self) -> bool {
        matches!(self, RecorderState::Idle)
    }

    /// Check if recording can be stopped from this state.
    #[must_use]
    pub fn can_stop_recording(&self) -> bool {
        matches!(self, RecorderState::Recording)
    }
}

impl From<u8> for RecorderState {
    fn from(value: u8) -> Self {
        match value {
            1 => RecorderState::Recording,
            _ => RecorderState::Idle, // Unknown states map to Idle
        }
    }
}

impl From<RecorderState> for u8 {
    fn from(state: RecorderState) -> Self {
        state as u8
    }
}

/// Atomic wrapper for RecorderState for lock-free reads.
#[derive(Debug)]
pub struct AtomicRecorderState(AtomicU8);

impl AtomicRecorderState {
    pub fn new(state: RecorderState) -> Self {
        Self(AtomicU8::new(state.into()))
    }

    pub fn load(&self) -> RecorderState {
        self.0.load(Ordering::Acquire).into()
    }

    pub fn store(&self, state: RecorderState) {
        self.0.store(state.into(), Ordering::Release);
    }

    /// Compare and swap, returns true if successful.
    pub fn compare_exchange(&self, current: RecorderState, new: RecorderState) -> bool {
        self.0
            .compare_exchange(current.into(), new.into(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for AtomicRecorderState {
    fn default() -> Self {
        Self::new(RecorderState::Idle)
    }
}

/// Microphone capture configuration.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Hard cap on recording length in milliseconds (ring buffer size).
    pub max_duration_ms: u64,
    /// Target sample rate in Hz.
    pub sample_rate: u32,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            max_duration_ms: 10_000,
            sample_rate: 16_000,
        }
    }
}

impl RecorderConfig {
    /// Ring buffer capacity in samples. The buffer holds exactly the
    /// maximum duration, so a runaway capture can never grow past it.
    pub fn buffer_capacity(&self) -> usize {
        (self.sample_rate as u64 * self.max_duration_ms / 1000) as usize
    }
}

/// Events emitted by the capture backend while a recording is active.
#[derive(Debug, Clone, PartialEq)]
pub enum RecorderEvent {
    /// Recorder state changed.
    StateChanged {
        from: RecorderState,
        to: RecorderState,
    },
    /// Audio level update (for the input meter).
    LevelUpdate {
        /// RMS level normalized to 0.0-1.0.
        level: f32,
    },
    /// The capture stream reported an error.
    Error { message: String },
}

/// Input audio device information.
#[derive(Debug, Clone)]
pub struct AudioDevice {
    /// Unique device identifier.
    pub id: String,
    /// Human-readable device name.
    pub name: String,
    /// Whether this is the system default device.
    pub is_default: bool,
}
