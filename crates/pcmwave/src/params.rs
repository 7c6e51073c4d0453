//! Construction parameters for new containers.

use serde::{Deserialize, Serialize};

/// Sample layout used to construct an empty container.
///
/// Missing fields fall back to 44.1 kHz, 16-bit, stereo when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaveParams {
    /// Sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Bits per sample (16, 24 or 32).
    #[serde(default = "default_bits_per_sample")]
    pub bits_per_sample: u16,
    /// Number of interleaved channels.
    #[serde(default = "default_channels")]
    pub channels: u16,
}

fn default_sample_rate() -> u32 {
    44100
}

fn default_bits_per_sample() -> u16 {
    16
}

fn default_channels() -> u16 {
    2
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            bits_per_sample: default_bits_per_sample(),
            channels: default_channels(),
        }
    }
}

impl WaveParams {
    /// Creates parameters from explicit values.
    pub fn new(sample_rate: u32, bits_per_sample: u16, channels: u16) -> Self {
        Self {
            sample_rate,
            bits_per_sample,
            channels,
        }
    }

    /// Mono at the given rate and depth.
    pub fn mono(sample_rate: u32, bits_per_sample: u16) -> Self {
        Self::new(sample_rate, bits_per_sample, 1)
    }

    /// Stereo at the given rate and depth.
    pub fn stereo(sample_rate: u32, bits_per_sample: u16) -> Self {
        Self::new(sample_rate, bits_per_sample, 2)
    }

    /// Bytes per sample frame across all channels.
    ///
    /// Bit depths that are not a multiple of 8 truncate.
    pub fn block_align(&self) -> u16 {
        self.channels.wrapping_mul(self.bits_per_sample) / 8
    }

    /// Bytes per second of audio.
    pub fn avg_bytes_per_sec(&self) -> u32 {
        self.sample_rate.wrapping_mul(self.block_align() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = WaveParams::default();
        assert_eq!(params.sample_rate, 44100);
        assert_eq!(params.bits_per_sample, 16);
        assert_eq!(params.channels, 2);
    }

    #[test]
    fn test_derived_sizes() {
        let params = WaveParams::stereo(44100, 16);
        assert_eq!(params.block_align(), 4);
        assert_eq!(params.avg_bytes_per_sec(), 176400);

        let params = WaveParams::mono(48000, 24);
        assert_eq!(params.block_align(), 3);
        assert_eq!(params.avg_bytes_per_sec(), 144000);
    }

    #[test]
    fn test_odd_bit_depth_truncates() {
        // 2 * 12 / 8 = 3, 1 * 12 / 8 = 1
        assert_eq!(WaveParams::stereo(8000, 12).block_align(), 3);
        assert_eq!(WaveParams::mono(8000, 12).block_align(), 1);
    }

    #[test]
    fn test_params_serde() {
        let params = WaveParams::new(96000, 32, 2);
        let json = serde_json::to_string(&params).unwrap();
        let parsed: WaveParams = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, params);
    }

    #[test]
    fn test_params_partial_json_uses_defaults() {
        let parsed: WaveParams = serde_json::from_str(r#"{"bits_per_sample": 24}"#).unwrap();
        assert_eq!(parsed, WaveParams::new(44100, 24, 2));
    }

    #[test]
    fn test_params_reject_unknown_fields() {
        let result: Result<WaveParams, _> = serde_json::from_str(r#"{"rate": 8000}"#);
        assert!(result.is_err());
    }
}
