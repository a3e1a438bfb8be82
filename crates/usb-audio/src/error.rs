//! Driver error type.
//!
//! Only caller-facing failures live here. Malformed host requests are not
//! errors: they come back as [`ControlOutcome::Unhandled`] so the USB core
//! can STALL, and isochronous transport problems are counted in
//! [`TransferStats`].
//!
//! [`ControlOutcome::Unhandled`]: crate::control::ControlOutcome::Unhandled
//! [`TransferStats`]: crate::transfer::TransferStats

use thiserror_no_std::Error;

/// Errors returned by [`UacDriver`](crate::UacDriver) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UacError {
    /// The interface number is not the streaming interface owned by this driver.
    #[error("interface {0} is not owned by the audio function")]
    InvalidInterface(u8),

    /// Only alternate settings 0 (idle) and 1 (streaming) exist.
    #[error("alternate setting {0} does not exist")]
    InvalidAltSetting(u8),

    /// Requested `wMaxPacketSize` exceeds what the endpoint or slot buffers can carry.
    #[error("max packet size {requested} exceeds limit {limit}")]
    PacketTooLarge {
        /// Requested size in bytes.
        requested: usize,
        /// Largest allowed size in bytes.
        limit: usize,
    },

    /// Destination buffer cannot hold the descriptor fragment.
    #[error("descriptor needs {needed} bytes, buffer has {available}")]
    BufferTooSmall {
        /// Bytes required.
        needed: usize,
        /// Bytes available.
        available: usize,
    },

    /// Interface, string or endpoint numbering has not been assigned yet.
    #[error("interface/string/endpoint numbering not assigned")]
    NumberingNotAssigned,

    /// The USB core could not allocate the isochronous OUT endpoint.
    #[error("no isochronous OUT endpoint available")]
    EndpointUnavailable,

    /// Stream format outside what the function can describe.
    #[error("unsupported stream format")]
    UnsupportedFormat,
}
