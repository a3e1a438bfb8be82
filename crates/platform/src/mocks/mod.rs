//! Mock implementations for testing
//!
//! This module provides recording mocks of the collaborator traits for use
//! in unit and integration tests. Every call is recorded in a fixed-size
//! `heapless` buffer; once a buffer is full further records are dropped but
//! the counters keep running.

#![cfg(any(test, feature = "std"))]

use crate::audio::{CodecControl, Ingest, PlaybackSink};
use crate::audio_types::VolumeDb;
use crate::usb::{BufferId, Direction, EndpointAddress, EndpointType, UsbCore};

/// Error returned by [`MockUsbCore::submit_receive`] when a failure is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockUsbError;

/// One recorded [`UsbCore::submit_receive`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    /// Endpoint the buffer was queued on.
    pub ep: EndpointAddress,
    /// Identity of the lent buffer, used to tell which slot was armed.
    pub buffer: BufferId,
    /// Length of the lent buffer.
    pub len: usize,
}

/// Mock USB core
pub struct MockUsbCore {
    next_endpoint: u8,
    exhausted: bool,
    fail_submits: bool,
    submissions: heapless::Deque<Submission, 64>,
    submit_count: usize,
    cancel_count: usize,
    allocations: heapless::Vec<(EndpointType, Direction, u16), 8>,
}

impl MockUsbCore {
    /// Create a mock core that hands out endpoint numbers starting at 1.
    pub fn new() -> Self {
        Self {
            next_endpoint: 1,
            exhausted: false,
            fail_submits: false,
            submissions: heapless::Deque::new(),
            submit_count: 0,
            cancel_count: 0,
            allocations: heapless::Vec::new(),
        }
    }

    /// Make every later [`UsbCore::alloc_endpoint`] call fail.
    pub fn exhaust_endpoints(&mut self) {
        self.exhausted = true;
    }

    /// Make [`UsbCore::submit_receive`] fail until cleared.
    pub fn set_fail_submits(&mut self, fail: bool) {
        self.fail_submits = fail;
    }

    /// Most recent submissions, oldest first (at most 64 kept).
    pub fn submissions(&self) -> impl Iterator<Item = &Submission> {
        self.submissions.iter()
    }

    /// Most recent submission.
    pub fn last_submission(&self) -> Option<&Submission> {
        self.submissions.back()
    }

    /// Total successful submissions since creation.
    pub fn submit_count(&self) -> usize {
        self.submit_count
    }

    /// Total [`UsbCore::cancel`] calls.
    pub fn cancel_count(&self) -> usize {
        self.cancel_count
    }

    /// Recorded endpoint allocations.
    pub fn allocations(&self) -> &[(EndpointType, Direction, u16)] {
        &self.allocations
    }

    /// Forget recorded submissions (counters are kept).
    pub fn clear_submissions(&mut self) {
        self.submissions.clear();
    }
}

impl Default for MockUsbCore {
    fn default() -> Self {
        Self::new()
    }
}

impl UsbCore for MockUsbCore {
    type Error = MockUsbError;

    fn alloc_endpoint(
        &mut self,
        kind: EndpointType,
        direction: Direction,
        max_packet_size: u16,
    ) -> Option<EndpointAddress> {
        if self.exhausted || self.next_endpoint > 15 {
            return None;
        }
        let _ = self.allocations.push((kind, direction, max_packet_size));
        let ep = EndpointAddress::from_parts(self.next_endpoint, direction);
        self.next_endpoint = self.next_endpoint.saturating_add(1);
        Some(ep)
    }

    fn submit_receive(&mut self, ep: EndpointAddress, buf: &mut [u8]) -> Result<(), Self::Error> {
        if self.fail_submits {
            return Err(MockUsbError);
        }
        if self.submissions.is_full() {
            let _ = self.submissions.pop_front();
        }
        let _ = self.submissions.push_back(Submission {
            ep,
            buffer: BufferId::of(buf),
            len: buf.len(),
        });
        self.submit_count = self.submit_count.saturating_add(1);
        Ok(())
    }

    fn cancel(&mut self, _ep: EndpointAddress) {
        self.cancel_count = self.cancel_count.saturating_add(1);
    }
}

/// Mock playback pipeline
pub struct MockPlaybackSink {
    started: bool,
    start_count: usize,
    stop_count: usize,
    accept_calls: usize,
    bytes_accepted: usize,
    last_packet: heapless::Vec<u8, 1024>,
    reject: bool,
}

impl MockPlaybackSink {
    /// Create a sink that accepts everything.
    pub fn new() -> Self {
        Self {
            started: false,
            start_count: 0,
            stop_count: 0,
            accept_calls: 0,
            bytes_accepted: 0,
            last_packet: heapless::Vec::new(),
            reject: false,
        }
    }

    /// Simulate a full pipeline buffer.
    pub fn set_reject(&mut self, reject: bool) {
        self.reject = reject;
    }

    /// Whether `start` was called more recently than `stop`.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Number of `start` calls.
    pub fn start_count(&self) -> usize {
        self.start_count
    }

    /// Number of `stop` calls.
    pub fn stop_count(&self) -> usize {
        self.stop_count
    }

    /// Number of `accept` calls, accepted or not.
    pub fn accept_calls(&self) -> usize {
        self.accept_calls
    }

    /// Total bytes accepted.
    pub fn bytes_accepted(&self) -> usize {
        self.bytes_accepted
    }

    /// Copy of the last accepted packet (first 1024 bytes).
    pub fn last_packet(&self) -> &[u8] {
        &self.last_packet
    }
}

impl Default for MockPlaybackSink {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackSink for MockPlaybackSink {
    fn accept(&mut self, pcm: &[u8]) -> Ingest {
        self.accept_calls = self.accept_calls.saturating_add(1);
        if self.reject {
            return Ingest::Rejected;
        }
        self.bytes_accepted = self.bytes_accepted.saturating_add(pcm.len());
        self.last_packet.clear();
        let keep = pcm.len().min(self.last_packet.capacity());
        let _ = self.last_packet.extend_from_slice(pcm.get(..keep).unwrap_or_default());
        Ingest::Accepted
    }

    fn start(&mut self) {
        self.started = true;
        self.start_count = self.start_count.saturating_add(1);
    }

    fn stop(&mut self) {
        self.started = false;
        self.stop_count = self.stop_count.saturating_add(1);
    }
}

/// Mock codec control
pub struct MockCodecControl {
    mute_calls: heapless::Vec<bool, 32>,
    volume_calls: heapless::Vec<(u8, VolumeDb), 32>,
}

impl MockCodecControl {
    /// Create new mock codec control
    pub fn new() -> Self {
        Self {
            mute_calls: heapless::Vec::new(),
            volume_calls: heapless::Vec::new(),
        }
    }

    /// Every `set_mute` argument, in call order.
    pub fn mute_calls(&self) -> &[bool] {
        &self.mute_calls
    }

    /// Every `set_volume` argument pair, in call order.
    pub fn volume_calls(&self) -> &[(u8, VolumeDb)] {
        &self.volume_calls
    }
}

impl Default for MockCodecControl {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecControl for MockCodecControl {
    fn set_mute(&mut self, muted: bool) {
        let _ = self.mute_calls.push(muted);
    }

    fn set_volume(&mut self, channel: u8, volume: VolumeDb) {
        let _ = self.volume_calls.push((channel, volume));
    }
}
