//! Audio format parameters, both requested and parsed.

use serde::{Deserialize, Serialize};

use crate::error::RestoreError;

/// Audio format code for integer PCM in a WAVE `fmt ` chunk.
pub const WAVE_FORMAT_PCM: u16 = 1;

/// PCM parameters a header is synthesized from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcmFormat {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bits per sample (a positive multiple of 8).
    pub bits_per_sample: u16,
    /// Number of channels (1 = mono, 2 = stereo).
    pub channels: u16,
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            bits_per_sample: 16,
            channels: 1,
        }
    }
}

impl PcmFormat {
    pub fn new(sample_rate: u32, bits_per_sample: u16, channels: u16) -> Self {
        Self {
            sample_rate,
            bits_per_sample,
            channels,
        }
    }

    /// Bytes per sample (per channel).
    pub fn bytes_per_sample(&self) -> u16 {
        self.bits_per_sample / 8
    }

    /// Bytes per sample frame across all channels.
    pub fn block_align(&self) -> u16 {
        self.channels.wrapping_mul(self.bytes_per_sample())
    }

    /// Bytes per second.
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate.wrapping_mul(self.block_align() as u32)
    }

    /// Checks that the parameters describe integer PCM a header can carry.
    pub fn validate(&self) -> Result<(), RestoreError> {
        let invalid = |message: String| Err(RestoreError::InvalidFormat { message });

        if self.sample_rate == 0 {
            return invalid("sample rate must be positive".to_string());
        }
        if self.channels == 0 {
            return invalid("channel count must be at least 1".to_string());
        }
        if self.bits_per_sample == 0 || self.bits_per_sample % 8 != 0 {
            return invalid(format!(
                "bits per sample must be a positive multiple of 8, got {}",
                self.bits_per_sample
            ));
        }
        let block_align = self.channels as u32 * self.bytes_per_sample() as u32;
        if block_align > u16::MAX as u32 {
            return invalid(format!(
                "block align of {} bytes does not fit a 16-bit field",
                block_align
            ));
        }
        if (self.sample_rate as u64) * (block_align as u64) > u32::MAX as u64 {
            return invalid(format!(
                "byte rate of {} bytes per second does not fit a 32-bit field",
                self.sample_rate as u64 * block_align as u64
            ));
        }
        Ok(())
    }
}

/// Fields decoded from a `fmt ` or `COMM` chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatInfo {
    /// WAVE format code; AIFF is always reported as PCM.
    pub audio_format: u16,
    pub channels: u16,
    /// Sample rate in Hz, rounded to an integer for AIFF.
    pub sample_rate: u32,
    /// Stored value for WAVE, derived for AIFF.
    pub byte_rate: u32,
    /// Stored value for WAVE, derived for AIFF.
    pub block_align: u16,
    pub bits_per_sample: u16,
    /// Frame count from the AIFF `COMM` chunk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_frames: Option<u32>,
    /// Exact decoded AIFF sample rate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_sample_rate: Option<f64>,
}

impl FormatInfo {
    /// `channels * bits_per_sample / 8`, computed without overflow.
    pub fn expected_block_align(&self) -> u64 {
        self.channels as u64 * self.bits_per_sample as u64 / 8
    }

    /// `sample_rate * channels * bits_per_sample / 8`, computed without overflow.
    pub fn expected_byte_rate(&self) -> u64 {
        self.sample_rate as u64 * self.expected_block_align()
    }

    /// The PCM parameters this chunk describes.
    pub fn pcm_format(&self) -> PcmFormat {
        PcmFormat::new(self.sample_rate, self.bits_per_sample, self.channels)
    }
}
