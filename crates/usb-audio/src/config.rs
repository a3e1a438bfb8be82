//! Immutable function configuration.
//!
//! [`AudioFormat`] is fixed at firmware build time and handed to the driver
//! on construction. [`AudioFunctionConfig`] adds the numbering the USB core
//! assigns during class-driver registration; the driver assembles it once
//! all numbers are known and never mutates it afterwards.

use platform::{AudioConfig, EndpointAddress, SampleRateHz};

use crate::class::FS_ISO_MAX_PACKET;
use crate::error::UacError;

/// Largest number of logical channels the feature unit describes.
pub const MAX_CHANNELS: u8 = 8;

/// Number of string descriptors the function owns.
pub const STRING_COUNT: u8 = 2;

/// Stream capabilities of the playback function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioFormat {
    sample_rate: SampleRateHz,
    channels: u8,
    bits_per_sample: u8,
}

impl AudioFormat {
    /// Validate and build a stream format.
    ///
    /// # Errors
    ///
    /// - [`UacError::UnsupportedFormat`] for a sample rate outside
    ///   8–768 kHz, zero or more than [`MAX_CHANNELS`] channels, or a bit
    ///   depth other than 16/24/32.
    /// - [`UacError::PacketTooLarge`] when one USB frame of audio does not
    ///   fit a full-speed isochronous packet.
    pub fn new(sample_rate_hz: u32, channels: u8, bits_per_sample: u8) -> Result<Self, UacError> {
        let sample_rate =
            SampleRateHz::new(sample_rate_hz).map_err(|_| UacError::UnsupportedFormat)?;
        if channels == 0 || channels > MAX_CHANNELS {
            return Err(UacError::UnsupportedFormat);
        }
        if !matches!(bits_per_sample, 16 | 24 | 32) {
            return Err(UacError::UnsupportedFormat);
        }
        let format = Self {
            sample_rate,
            channels,
            bits_per_sample,
        };
        let requested = format.max_packet_size();
        if requested > FS_ISO_MAX_PACKET {
            return Err(UacError::PacketTooLarge {
                requested,
                limit: FS_ISO_MAX_PACKET,
            });
        }
        Ok(format)
    }

    /// Sample rate.
    pub fn sample_rate(&self) -> SampleRateHz {
        self.sample_rate
    }

    /// Logical channel count.
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Significant bits per sample (`bBitResolution`).
    pub fn bits_per_sample(&self) -> u8 {
        self.bits_per_sample
    }

    /// Bytes per sample container (`bSubframeSize`).
    pub fn subframe_bytes(&self) -> u8 {
        self.audio_config().subframe_bytes()
    }

    /// The same layout as the playback pipeline sees it.
    pub fn audio_config(&self) -> AudioConfig {
        AudioConfig {
            sample_rate: self.sample_rate.get(),
            channels: self.channels,
            bit_depth: self.bits_per_sample,
        }
    }

    /// Isochronous `wMaxPacketSize` for full speed.
    ///
    /// One 1 ms frame carries `ceil(rate / 1000)` sample frames; one extra
    /// frame of head-room absorbs the host clock drifting against ours
    /// (adaptive endpoint).
    pub fn max_packet_size(&self) -> usize {
        let frames = usize::try_from(self.sample_rate.samples_per_frame())
            .unwrap_or(usize::MAX)
            .saturating_add(1);
        frames.saturating_mul(self.audio_config().frame_bytes())
    }
}

impl Default for AudioFormat {
    /// 48 kHz, stereo, 16-bit: the rate every UAC 1.0 host driver handles.
    fn default() -> Self {
        Self {
            sample_rate: SampleRateHz::HZ_48000,
            channels: 2,
            bits_per_sample: 16,
        }
    }
}

/// Format plus the numbering assigned at class-driver registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioFunctionConfig {
    /// Stream capabilities.
    pub format: AudioFormat,
    /// Audio-control interface number.
    pub control_interface: u8,
    /// Audio-streaming interface number (always `control_interface + 1`).
    pub streaming_interface: u8,
    /// Isochronous OUT endpoint.
    pub endpoint: EndpointAddress,
    /// First of the [`STRING_COUNT`] string indices owned by the function.
    pub first_string: u8,
}

impl AudioFunctionConfig {
    /// String index naming the whole function (IAD and AC interface).
    pub fn function_string(&self) -> u8 {
        self.first_string
    }

    /// String index naming the streaming interface.
    pub fn streaming_string(&self) -> u8 {
        self.first_string.saturating_add(1)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_packet_is_49_stereo_frames() {
        // 48 + 1 frames × 2 ch × 2 bytes
        assert_eq!(AudioFormat::default().max_packet_size(), 196);
    }

    #[test]
    fn test_44k1_rounds_frames_up() {
        let fmt = AudioFormat::new(44_100, 2, 16).unwrap();
        assert_eq!(fmt.max_packet_size(), (45 + 1) * 4);
    }

    #[test]
    fn test_rejects_bandwidth_over_full_speed_limit() {
        let err = AudioFormat::new(192_000, 2, 32).unwrap_err();
        assert!(matches!(err, UacError::PacketTooLarge { .. }));
    }

    #[test]
    fn test_rejects_odd_bit_depth_and_channel_count() {
        assert_eq!(AudioFormat::new(48_000, 2, 20), Err(UacError::UnsupportedFormat));
        assert_eq!(AudioFormat::new(48_000, 0, 16), Err(UacError::UnsupportedFormat));
        assert_eq!(AudioFormat::new(48_000, 9, 16), Err(UacError::UnsupportedFormat));
    }

    #[test]
    fn test_24bit_subframe_is_three_bytes() {
        let fmt = AudioFormat::new(96_000, 2, 24).unwrap();
        assert_eq!(fmt.subframe_bytes(), 3);
        assert_eq!(fmt.max_packet_size(), 97 * 6);
    }
}
