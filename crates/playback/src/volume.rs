//! ES9038Q2M volume shadow.
//!
//! The host adjusts mute and volume from the USB control pipe, which must
//! not wait on I2C. [`DacVolumeShadow`] implements [`CodecControl`] by
//! recomputing the two attenuation registers in memory and raising a dirty
//! flag; the codec task polls [`DacVolumeShadow::take_pending`] and performs
//! the actual register writes.
//!
//! The ES9038Q2M uses an 8-bit attenuation register per channel where:
//! - `0x00` = 0 dB attenuation (full volume)
//! - each LSB = 0.5 dB, the same step as the host's volume resolution
//! - `0xFF` = −127.5 dB, used as mute
//!
//! The per-channel register is master attenuation plus channel trim. A
//! mono stream drives both DAC channels from logical channel 1; logical
//! channels beyond 2 have no DAC output and are ignored.

use platform::{AttenuationRegister, CodecControl, VolumeDb};

/// Register 15: left-channel attenuation.
pub const REG_ATT_L: u8 = 15;
/// Register 16: right-channel attenuation.
pub const REG_ATT_R: u8 = 16;

/// One pending I2C register write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterWrite {
    /// Register address.
    pub reg: u8,
    /// Value to write.
    pub value: u8,
}

/// Latest host-requested levels, reduced to ES9038Q2M register values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DacVolumeShadow {
    stream_channels: u8,
    muted: bool,
    master: VolumeDb,
    left: VolumeDb,
    right: VolumeDb,
    dirty: bool,
}

impl DacVolumeShadow {
    /// Shadow for a stream with `stream_channels` logical channels.
    ///
    /// Starts dirty so the first poll pushes the power-on levels.
    pub fn new(stream_channels: u8) -> Self {
        Self {
            stream_channels,
            muted: false,
            master: VolumeDb::UNITY,
            left: VolumeDb::UNITY,
            right: VolumeDb::UNITY,
            dirty: true,
        }
    }

    /// Whether a write is waiting for the codec task.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the outputs are muted.
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Current left and right register values.
    pub fn registers(&self) -> [RegisterWrite; 2] {
        let (left, right) = if self.muted {
            (AttenuationRegister::MUTED, AttenuationRegister::MUTED)
        } else {
            (
                AttenuationRegister::combined(self.master, self.left),
                AttenuationRegister::combined(self.master, self.right),
            )
        };
        [
            RegisterWrite {
                reg: REG_ATT_L,
                value: left.get(),
            },
            RegisterWrite {
                reg: REG_ATT_R,
                value: right.get(),
            },
        ]
    }

    /// Register writes to perform, if anything changed since the last call.
    pub fn take_pending(&mut self) -> Option<[RegisterWrite; 2]> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.registers())
    }
}

impl CodecControl for DacVolumeShadow {
    fn set_mute(&mut self, muted: bool) {
        if self.muted != muted {
            self.muted = muted;
            self.dirty = true;
        }
    }

    fn set_volume(&mut self, channel: u8, volume: VolumeDb) {
        let before = (self.master, self.left, self.right);
        match (channel, self.stream_channels) {
            (0, _) => self.master = volume,
            (1, 1) => {
                self.left = volume;
                self.right = volume;
            }
            (1, _) => self.left = volume,
            (2, _) => self.right = volume,
            _ => {}
        }
        if before != (self.master, self.left, self.right) {
            self.dirty = true;
        }
    }
}
