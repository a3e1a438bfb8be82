//! USB playback pipeline: bounded PCM FIFO between the USB completion
//! handler and the DAC feed.
//!
//! ```text
//!  accept() ──► RingBuffer<N> ──► drain() ──► SAI DMA half-buffer
//!  (USB ISR)                      (DMA half-complete)
//! ```
//!
//! # States
//!
//! - `Stopped`: streaming interface idle. Late packets are counted and
//!   discarded but reported as accepted; `drain` yields silence.
//! - `Priming`: collecting a cushion of half the FIFO before playback
//!   starts, so host clock jitter does not immediately underrun.
//! - `Running`: `drain` returns buffered audio; a short read is padded with
//!   silence, counted as an underrun and sends the pipeline back to
//!   `Priming`.

use platform::{AudioConfig, Ingest, PlaybackSink};

use crate::ring_buffer::RingBuffer;

/// Pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PipelineState {
    /// Not streaming.
    Stopped,
    /// Buffering before playback.
    Priming,
    /// Playing.
    Running,
}

/// Saturating pipeline counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PipelineStats {
    /// Drains that ran out of audio while running.
    pub underruns: u32,
    /// Packets refused because the FIFO was full.
    pub overflows: u32,
    /// Packets that arrived while stopped and were discarded.
    pub late_packets: u32,
}

/// Bounded playback FIFO implementing [`PlaybackSink`].
pub struct UsbPlaybackPipeline<const N: usize> {
    fifo: RingBuffer<N>,
    config: AudioConfig,
    state: PipelineState,
    stats: PipelineStats,
}

impl<const N: usize> UsbPlaybackPipeline<N> {
    /// Stopped pipeline for the given stream layout.
    pub fn new(config: AudioConfig) -> Self {
        Self {
            fifo: RingBuffer::new(),
            config,
            state: PipelineState::Stopped,
            stats: PipelineStats::default(),
        }
    }

    /// Current state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Counters since construction.
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Stream layout.
    pub fn config(&self) -> AudioConfig {
        self.config
    }

    /// Bytes waiting to be drained.
    pub fn buffered(&self) -> usize {
        self.fifo.available()
    }

    /// Fill level at which priming ends: half the FIFO, whole frames.
    pub fn priming_threshold(&self) -> usize {
        let half = N / 2;
        let frame = self.config.frame_bytes();
        half.checked_rem(frame)
            .map_or(half, |partial| half.saturating_sub(partial))
    }

    /// Fill `out` for the DAC. Returns how many bytes were real audio;
    /// the rest of `out` is silence.
    ///
    /// Only whole frames are taken from the FIFO so channels never swap.
    pub fn drain(&mut self, out: &mut [u8]) -> usize {
        let taken = match self.state {
            PipelineState::Running => {
                let frame = self.config.frame_bytes();
                let want = out
                    .len()
                    .checked_rem(frame)
                    .map_or(out.len(), |partial| out.len().saturating_sub(partial));
                let dest = out.get_mut(..want).unwrap_or_default();
                let n = self.fifo.read_slice(dest);
                if n < want {
                    self.stats.underruns = self.stats.underruns.saturating_add(1);
                    self.state = PipelineState::Priming;
                }
                n
            }
            PipelineState::Priming | PipelineState::Stopped => 0,
        };
        if let Some(rest) = out.get_mut(taken..) {
            rest.fill(0);
        }
        taken
    }
}

impl<const N: usize> PlaybackSink for UsbPlaybackPipeline<N> {
    fn accept(&mut self, pcm: &[u8]) -> Ingest {
        if self.state == PipelineState::Stopped {
            self.stats.late_packets = self.stats.late_packets.saturating_add(1);
            return Ingest::Accepted;
        }
        if self.fifo.write_slice(pcm).is_err() {
            self.stats.overflows = self.stats.overflows.saturating_add(1);
            return Ingest::Rejected;
        }
        if self.state == PipelineState::Priming && self.fifo.available() >= self.priming_threshold() {
            self.state = PipelineState::Running;
        }
        Ingest::Accepted
    }

    fn start(&mut self) {
        self.fifo.clear();
        self.state = PipelineState::Priming;
    }

    fn stop(&mut self) {
        self.fifo.clear();
        self.state = PipelineState::Stopped;
    }
}
