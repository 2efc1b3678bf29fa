use serde::{Deserialize, Serialize};

use crate::error::SynthesisError;

/// PCM encodings an engine may announce in [`start`](crate::SynthesisRequest::start).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFormat {
    /// 8-bit unsigned PCM.
    Pcm8,
    /// 16-bit signed little-endian PCM.
    Pcm16,
    /// 32-bit IEEE float little-endian PCM.
    PcmFloat,
}

impl AudioFormat {
    pub const ALL: [AudioFormat; 3] = [AudioFormat::Pcm8, AudioFormat::Pcm16, AudioFormat::PcmFloat];

    pub fn bytes_per_sample(self) -> usize {
        match self {
            AudioFormat::Pcm8 => 1,
            AudioFormat::Pcm16 => 2,
            AudioFormat::PcmFloat => 4,
        }
    }
}

/// Output format recorded by a successful `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioParams {
    pub sample_rate_hz: u32,
    pub format: AudioFormat,
    pub channel_count: u16,
}

impl AudioParams {
    pub fn new(
        sample_rate_hz: u32,
        format: AudioFormat,
        channel_count: u16,
    ) -> Result<Self, SynthesisError> {
        if sample_rate_hz == 0 {
            return Err(SynthesisError::InvalidArgument(
                "sample rate must be positive".to_string(),
            ));
        }
        if channel_count == 0 {
            return Err(SynthesisError::InvalidArgument(
                "channel count must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            sample_rate_hz,
            format,
            channel_count,
        })
    }

    /// Bytes in one frame (one sample for every channel).
    pub fn frame_size(&self) -> usize {
        self.format.bytes_per_sample() * self.channel_count as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_sample_rate_and_channels() {
        assert!(AudioParams::new(0, AudioFormat::Pcm16, 1).is_err());
        assert!(AudioParams::new(16000, AudioFormat::Pcm16, 0).is_err());
    }

    #[test]
    fn frame_size_accounts_for_channels() {
        let params = AudioParams::new(22050, AudioFormat::Pcm16, 2).unwrap();
        assert_eq!(params.frame_size(), 4);
        let params = AudioParams::new(22050, AudioFormat::PcmFloat, 1).unwrap();
        assert_eq!(params.frame_size(), 4);
    }

    #[test]
    fn format_names_are_snake_case_in_json() {
        let json = serde_json::to_string(&AudioFormat::PcmFloat).unwrap();
        assert_eq!(json, "\"pcm_float\"");
    }
}
