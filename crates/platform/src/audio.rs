//! Audio collaborator contracts
//!
//! Both traits are synchronous on purpose: they are called from the USB
//! event context and from the isochronous completion context, neither of
//! which may await.

use crate::audio_types::VolumeDb;

/// Result of handing a block of PCM bytes to the playback pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ingest {
    /// The bytes were queued (or silently discarded by a stopped pipeline).
    Accepted,
    /// The pipeline buffer is full; nothing was queued.
    Rejected,
}

/// Playback-pipeline ingestion entry point.
///
/// `accept` is called from the transfer completion context and must be
/// bounded, allocation-free and non-blocking. It is all-or-nothing: either
/// every byte of `pcm` is queued or none is.
pub trait PlaybackSink {
    /// Offer one isochronous payload worth of interleaved PCM bytes.
    fn accept(&mut self, pcm: &[u8]) -> Ingest;

    /// Begin accepting samples (streaming interface went operational).
    fn start(&mut self);

    /// Stop and flush (streaming interface went idle, or bus disconnect).
    fn stop(&mut self);
}

/// Hardware codec control.
///
/// Fire-and-forget: implementations must not block and have no way to
/// report failure back to the USB host.
pub trait CodecControl {
    /// Apply the master mute flag.
    fn set_mute(&mut self, muted: bool);

    /// Apply a volume level. Channel 0 is master, 1..=N are logical channels.
    fn set_volume(&mut self, channel: u8, volume: VolumeDb);
}

/// PCM stream layout shared by the driver and the playback pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u8,
    /// Bit depth (16, 24 or 32)
    pub bit_depth: u8,
}

impl AudioConfig {
    /// Bytes per sample container on the USB wire (16 → 2, 24 → 3, 32 → 4).
    pub const fn subframe_bytes(&self) -> u8 {
        self.bit_depth.div_ceil(8)
    }

    /// Bytes per interleaved frame (one sample for every channel).
    pub const fn frame_bytes(&self) -> usize {
        (self.subframe_bytes() as usize).saturating_mul(self.channels as usize)
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            channels: 2,
            bit_depth: 16,
        }
    }
}
