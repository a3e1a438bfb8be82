//! Feature unit state: mute and per-channel volume.
//!
//! Channel 0 is the master channel, 1..=N are the logical channels of the
//! stream. Mute exists on the master channel only; volume exists on every
//! channel. Stored volumes are always on the [`VOL_RES`] grid.
//!
//! [`VOL_RES`]: platform::audio_types::VOL_RES

use platform::VolumeDb;

use crate::class::{CHANNEL_ALL, MUTE_CONTROL, VOLUME_CONTROL};
use crate::config::MAX_CHANNELS;

// master + MAX_CHANNELS
const VOLUME_SLOTS: usize = (MAX_CHANNELS as usize).saturating_add(1);

/// Feature unit control addressed by the high byte of `wValue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlSelector {
    /// `MUTE_CONTROL`, one-byte boolean payload.
    Mute,
    /// `VOLUME_CONTROL`, two-byte little-endian signed payload.
    Volume,
}

impl ControlSelector {
    /// Decode a selector byte. Anything but mute and volume is unsupported.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            MUTE_CONTROL => Some(Self::Mute),
            VOLUME_CONTROL => Some(Self::Volume),
            _ => None,
        }
    }

    /// Data-stage length in bytes.
    pub fn payload_len(self) -> usize {
        match self {
            Self::Mute => 1,
            Self::Volume => 2,
        }
    }
}

/// Current mute flag and volumes for one USB connection.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FeatureState {
    channels: u8,
    muted: bool,
    volume: [VolumeDb; VOLUME_SLOTS],
}

impl FeatureState {
    /// Defaults for a stream of `channels` logical channels: unmuted, 0 dB.
    pub fn new(channels: u8) -> Self {
        Self {
            channels,
            muted: false,
            volume: [VolumeDb::UNITY; VOLUME_SLOTS],
        }
    }

    /// Back to the power-on defaults.
    pub fn reset(&mut self) {
        *self = Self::new(self.channels);
    }

    /// Number of logical channels (excluding master).
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Whether `selector` exists on `channel`.
    ///
    /// The class-wide "all channels" number is not supported.
    pub fn supports(&self, selector: ControlSelector, channel: u8) -> bool {
        if channel == CHANNEL_ALL {
            return false;
        }
        match selector {
            ControlSelector::Mute => channel == 0,
            ControlSelector::Volume => channel <= self.channels,
        }
    }

    /// Master mute.
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Set the master mute.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Volume of `channel`, or `None` if the channel does not exist.
    pub fn volume(&self, channel: u8) -> Option<VolumeDb> {
        if channel > self.channels {
            return None;
        }
        self.volume.get(usize::from(channel)).copied()
    }

    /// Store `volume` for `channel`. Returns `false` if the channel does not exist.
    pub fn set_volume(&mut self, channel: u8, volume: VolumeDb) -> bool {
        if channel > self.channels {
            return false;
        }
        match self.volume.get_mut(usize::from(channel)) {
            Some(slot) => {
                *slot = volume;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_unmuted_unity() {
        let fs = FeatureState::new(2);
        assert!(!fs.is_muted());
        for ch in 0..=2 {
            assert_eq!(fs.volume(ch), Some(VolumeDb::UNITY));
        }
    }

    #[test]
    fn test_channel_range() {
        let mut fs = FeatureState::new(2);
        assert_eq!(fs.volume(3), None);
        assert!(!fs.set_volume(3, VolumeDb::MIN));
        assert!(fs.set_volume(2, VolumeDb::MIN));
        assert_eq!(fs.volume(2), Some(VolumeDb::MIN));
    }

    #[test]
    fn test_mute_only_on_master() {
        let fs = FeatureState::new(2);
        assert!(fs.supports(ControlSelector::Mute, 0));
        assert!(!fs.supports(ControlSelector::Mute, 1));
        assert!(fs.supports(ControlSelector::Volume, 2));
        assert!(!fs.supports(ControlSelector::Volume, 0xFF));
    }

    #[test]
    fn test_all_channels_request_is_unsupported() {
        let fs = FeatureState::new(MAX_CHANNELS);
        assert!(!fs.supports(ControlSelector::Volume, CHANNEL_ALL));
        assert!(!fs.supports(ControlSelector::Mute, CHANNEL_ALL));
        assert_eq!(fs.volume(CHANNEL_ALL), None);
    }

    #[test]
    fn test_widest_stream_has_a_volume_per_channel() {
        let mut fs = FeatureState::new(MAX_CHANNELS);
        assert!(fs.supports(ControlSelector::Volume, MAX_CHANNELS));
        assert!(fs.set_volume(MAX_CHANNELS, VolumeDb::MIN));
        assert_eq!(fs.volume(MAX_CHANNELS), Some(VolumeDb::MIN));
        assert_eq!(fs.volume(0), Some(VolumeDb::UNITY));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut fs = FeatureState::new(2);
        fs.set_muted(true);
        fs.set_volume(1, VolumeDb::MIN);
        fs.reset();
        assert_eq!(fs, FeatureState::new(2));
    }

    #[test]
    fn test_selector_decoding() {
        assert_eq!(ControlSelector::from_raw(1), Some(ControlSelector::Mute));
        assert_eq!(ControlSelector::from_raw(2), Some(ControlSelector::Volume));
        assert_eq!(ControlSelector::from_raw(3), None);
        assert_eq!(ControlSelector::Volume.payload_len(), 2);
    }
}
