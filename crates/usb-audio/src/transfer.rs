//! Isochronous receive slots and the completion handler.
//!
//! Everything here runs in the completion context: no logging, no
//! allocation, no blocking. A slot's buffer belongs to the USB core from
//! `submit_receive` until its completion is reported; the `busy` flag
//! keeps a slot from being lent twice.

use platform::{BufferId, EndpointAddress, Ingest, PlaybackSink, TransferStatus, UsbCore};

use crate::class::FS_ISO_MAX_PACKET;

/// Size of one slot buffer: a full-speed isochronous packet.
pub const SLOT_BUFFER_SIZE: usize = FS_ISO_MAX_PACKET;

/// Saturating transfer counters for one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferStats {
    /// Packets handed to the playback pipeline.
    pub packets_accepted: u32,
    /// Bytes handed to the playback pipeline.
    pub bytes_accepted: u32,
    /// Packets the pipeline refused (buffer full).
    pub packets_dropped: u32,
    /// Completions with an error or cancelled status.
    pub transfer_errors: u32,
    /// Completions that arrived after the stream went inactive.
    pub stale_completions: u32,
    /// Re-arm submissions the USB core refused.
    pub rearm_failures: u32,
    /// Successful completions reporting more bytes than the slot lent.
    pub oversized_completions: u32,
}

impl TransferStats {
    fn accepted(&mut self, bytes: usize) {
        self.packets_accepted = self.packets_accepted.saturating_add(1);
        let bytes = u32::try_from(bytes).unwrap_or(u32::MAX);
        self.bytes_accepted = self.bytes_accepted.saturating_add(bytes);
    }

    fn dropped(&mut self) {
        self.packets_dropped = self.packets_dropped.saturating_add(1);
    }

    fn error(&mut self) {
        self.transfer_errors = self.transfer_errors.saturating_add(1);
    }

    fn stale(&mut self) {
        self.stale_completions = self.stale_completions.saturating_add(1);
    }

    fn rearm_failed(&mut self) {
        self.rearm_failures = self.rearm_failures.saturating_add(1);
    }

    fn oversized(&mut self) {
        self.oversized_completions = self.oversized_completions.saturating_add(1);
    }
}

/// What happened to one completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Completion {
    /// Payload forwarded to the pipeline.
    Forwarded,
    /// Pipeline full, payload dropped.
    Dropped,
    /// Error or cancelled status, nothing forwarded.
    Errored,
    /// Reported length exceeded the lent buffer, payload discarded.
    Oversized,
    /// Stream inactive, slot returned without re-arming.
    Stale,
    /// Not one of our in-flight buffers.
    Ignored,
}

/// One receive buffer plus its ownership flag.
pub struct TransferSlot {
    buf: [u8; SLOT_BUFFER_SIZE],
    busy: bool,
}

impl TransferSlot {
    const fn new() -> Self {
        Self {
            buf: [0; SLOT_BUFFER_SIZE],
            busy: false,
        }
    }

    /// Whether the buffer is currently lent to the USB core.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Identity the USB core reports back on completion.
    pub fn id(&self) -> BufferId {
        BufferId::of(&self.buf)
    }

    /// Lend the first `len` bytes to the core. No-op if already lent.
    fn arm<U: UsbCore>(
        &mut self,
        usb: &mut U,
        ep: EndpointAddress,
        len: usize,
    ) -> Result<(), U::Error> {
        if self.busy {
            return Ok(());
        }
        let len = len.min(SLOT_BUFFER_SIZE);
        let buf = self.buf.get_mut(..len).unwrap_or_default();
        usb.submit_receive(ep, buf)?;
        self.busy = true;
        Ok(())
    }
}

/// Fixed pool of `N` receive slots.
pub struct SlotPool<const N: usize> {
    slots: [TransferSlot; N],
    packet_len: usize,
    stats: TransferStats,
}

impl<const N: usize> SlotPool<N> {
    /// Pool of idle slots lending `packet_len` bytes per reception.
    pub fn new(packet_len: usize) -> Self {
        Self {
            slots: core::array::from_fn(|_| TransferSlot::new()),
            packet_len: packet_len.min(SLOT_BUFFER_SIZE),
            stats: TransferStats::default(),
        }
    }

    /// Bytes lent per reception.
    pub fn packet_len(&self) -> usize {
        self.packet_len
    }

    /// Counters since the last [`reset_stats`](Self::reset_stats).
    pub fn stats(&self) -> TransferStats {
        self.stats
    }

    /// Zero the counters.
    pub fn reset_stats(&mut self) {
        self.stats = TransferStats::default();
    }

    /// Slots currently lent to the USB core.
    pub fn busy_count(&self) -> usize {
        self.slots.iter().filter(|s| s.busy).count()
    }

    /// Slot view, for diagnostics.
    pub fn slots(&self) -> &[TransferSlot] {
        &self.slots
    }

    /// Lend every idle slot to the core. Returns how many were newly armed.
    pub fn arm_idle<U: UsbCore>(&mut self, usb: &mut U, ep: EndpointAddress) -> usize {
        let len = self.packet_len;
        let mut armed = 0usize;
        for slot in self.slots.iter_mut().filter(|s| !s.busy) {
            match slot.arm(usb, ep, len) {
                Ok(()) => armed = armed.saturating_add(1),
                Err(_) => self.stats.rearm_failed(),
            }
        }
        armed
    }

    /// Take every slot back (bus reset or disconnect cancelled them all).
    pub fn release_all(&mut self) {
        for slot in &mut self.slots {
            slot.busy = false;
        }
    }

    /// Handle one completed reception into `buffer`.
    ///
    /// While `operational`, the payload is offered to `sink` and the slot is
    /// re-armed before returning, whatever the status. Otherwise the slot
    /// is returned to the pool and left idle.
    ///
    /// A `length` beyond the lent `packet_len` is a core fault: the tail was
    /// never ours to read, so the whole packet is discarded and counted.
    #[allow(clippy::too_many_arguments)]
    pub fn complete<U: UsbCore, P: PlaybackSink>(
        &mut self,
        usb: &mut U,
        sink: &mut P,
        ep: EndpointAddress,
        status: TransferStatus,
        length: usize,
        buffer: BufferId,
        operational: bool,
    ) -> Completion {
        let Some(slot) = self
            .slots
            .iter_mut()
            .find(|s| s.busy && s.id() == buffer)
        else {
            return Completion::Ignored;
        };
        slot.busy = false;

        if !operational {
            self.stats.stale();
            return Completion::Stale;
        }

        let outcome = match status {
            TransferStatus::Success if length > self.packet_len => {
                self.stats.oversized();
                Completion::Oversized
            }
            TransferStatus::Success => {
                let payload = slot.buf.get(..length).unwrap_or_default();
                if payload.is_empty() {
                    Completion::Forwarded
                } else {
                    match sink.accept(payload) {
                        Ingest::Accepted => {
                            self.stats.accepted(length);
                            Completion::Forwarded
                        }
                        Ingest::Rejected => {
                            self.stats.dropped();
                            Completion::Dropped
                        }
                    }
                }
            }
            TransferStatus::Error | TransferStatus::Cancelled => {
                self.stats.error();
                Completion::Errored
            }
        };

        if slot.arm(usb, ep, self.packet_len).is_err() {
            self.stats.rearm_failed();
        }
        outcome
    }

    /// Copy `data` into the in-flight slot `buffer`, standing in for the
    /// core's DMA in host tests. Returns `false` if no such slot is lent.
    #[cfg(any(test, feature = "std"))]
    pub fn fill_in_flight(&mut self, buffer: BufferId, data: &[u8]) -> bool {
        let Some(slot) = self
            .slots
            .iter_mut()
            .find(|s| s.busy && s.id() == buffer)
        else {
            return false;
        };
        for (dst, src) in slot.buf.iter_mut().zip(data) {
            *dst = *src;
        }
        true
    }
}
