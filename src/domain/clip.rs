use crate::domain::error::DomainError;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;
use zeroize::Zeroize;

/// Captured audio clip that is securely zeroed on drop.
/// Raw capture data lives only in memory until it is encoded for upload.
#[derive(Debug, Zeroize)]
#[zeroize(drop)]
pub struct AudioClip {
    /// PCM audio samples (16-bit mono).
    samples: Vec<i16>,
    /// Sample rate in Hz.
    sample_rate: u32,
}

impl AudioClip {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Get the samples as a slice.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Get the sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the duration in seconds.
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Check if the clip holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Get the number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Encode the clip as a mono 16-bit WAV file for upload.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>, DomainError> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut buffer, spec)?;
            for &sample in &self.samples {
                writer.write_sample(sample)?;
            }
            writer.finalize()?;
        }

        Ok(buffer.into_inner())
    }
}
