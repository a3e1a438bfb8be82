//! Const-generic, stack-allocated ring buffer for interleaved PCM bytes.
//!
//! `RingBuffer<N>` stores up to `N` bytes without heap allocation. It is a
//! single-producer / single-consumer (SPSC) structure sitting between the
//! USB completion handler (writer) and the SAI DMA feed (reader).
//!
//! # Constraints
//!
//! - Writes are all-or-nothing so a USB packet is never split; a packet
//!   always holds whole sample frames, so the fill level stays frame
//!   aligned.
//! - `no_std`; the backing store lives in the owning struct, which the
//!   firmware places in a `static`.
//! - Not interrupt-safe by itself. The owner serialises the two sides.

/// A fixed-capacity ring buffer of PCM bytes.
pub struct RingBuffer<const N: usize> {
    buf: [u8; N],
    /// Index of the next byte to read.
    read: usize,
    /// Index of the next byte to write.
    write: usize,
    /// Number of valid bytes currently held.
    count: usize,
}

impl<const N: usize> RingBuffer<N> {
    /// Create a new, empty ring buffer.
    ///
    /// `const` so the buffer can live in a `static` without a runtime
    /// initialiser.
    pub const fn new() -> Self {
        Self {
            buf: [0u8; N],
            read: 0,
            write: 0,
            count: 0,
        }
    }

    /// Append `data`.
    ///
    /// # Errors
    ///
    /// Returns `Err(())` if `data` does not fit in the free space. The
    /// buffer is unchanged on error.
    #[allow(clippy::result_unit_err)] // overflow is the only error; () is sufficient
    #[allow(clippy::indexing_slicing)] // Safety: write < N invariant; data.len() <= N - count checked above
    #[allow(clippy::arithmetic_side_effects)] // Safety: wrap via % N; count + data.len() <= N
    pub fn write_slice(&mut self, data: &[u8]) -> Result<(), ()> {
        if data.len() > N - self.count {
            return Err(());
        }
        for &byte in data {
            self.buf[self.write] = byte;
            self.write = (self.write + 1) % N;
        }
        self.count += data.len();
        Ok(())
    }

    /// Move up to `out.len()` bytes into `out`. Returns the number moved.
    #[allow(clippy::indexing_slicing)] // Safety: read < N invariant; only reads up to self.count bytes
    #[allow(clippy::arithmetic_side_effects)] // Safety: wrap via % N; count -= n where n <= count
    pub fn read_slice(&mut self, out: &mut [u8]) -> usize {
        let n = out.len().min(self.count);
        for slot in out.iter_mut().take(n) {
            *slot = self.buf[self.read];
            self.read = (self.read + 1) % N;
        }
        self.count -= n;
        n
    }

    /// Drop everything buffered.
    pub fn clear(&mut self) {
        self.read = 0;
        self.write = 0;
        self.count = 0;
    }

    /// Bytes available to read.
    pub fn available(&self) -> usize {
        self.count
    }

    /// Bytes that can still be written.
    pub fn free(&self) -> usize {
        N.saturating_sub(self.count)
    }

    /// Maximum number of bytes the buffer can hold.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// `true` when no bytes are present.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// `true` when the buffer is completely full.
    pub fn is_full(&self) -> bool {
        self.count == N
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
