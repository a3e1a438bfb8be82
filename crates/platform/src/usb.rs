//! USB device-core abstraction
//!
//! The generic USB core (enumeration, endpoint scheduling, STALL signalling)
//! is not part of this workspace. Class drivers see it only through the
//! [`UsbCore`] trait and the wire types below.
//!
//! # Buffer ownership
//!
//! [`UsbCore::submit_receive`] lends a receive buffer to the core. A real
//! OTG core keeps the buffer address for DMA until it reports completion,
//! so callers must not touch or resubmit that buffer before the completion
//! callback hands it back. Class drivers enforce this with a per-buffer
//! busy flag.

/// Transfer direction, from the host's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Host to device.
    Out,
    /// Device to host.
    In,
}

/// USB endpoint transfer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EndpointType {
    /// Control endpoint.
    Control,
    /// Isochronous endpoint.
    Isochronous,
    /// Bulk endpoint.
    Bulk,
    /// Interrupt endpoint.
    Interrupt,
}

/// Endpoint address as it appears in `bEndpointAddress` (bit 7 = IN).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct EndpointAddress(u8);

impl EndpointAddress {
    const DIR_IN: u8 = 0x80;

    /// Build an address from an endpoint number (0–15) and a direction.
    #[must_use]
    pub const fn from_parts(number: u8, direction: Direction) -> Self {
        let n = number & 0x0F;
        match direction {
            Direction::Out => Self(n),
            Direction::In => Self(n | Self::DIR_IN),
        }
    }

    /// Endpoint number without the direction bit.
    #[must_use]
    pub const fn number(self) -> u8 {
        self.0 & 0x0F
    }

    /// Direction encoded in bit 7.
    #[must_use]
    pub const fn direction(self) -> Direction {
        if self.0 & Self::DIR_IN == 0 {
            Direction::Out
        } else {
            Direction::In
        }
    }

    /// Raw `bEndpointAddress` byte.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl From<u8> for EndpointAddress {
    fn from(raw: u8) -> Self {
        Self(raw & (Self::DIR_IN | 0x0F))
    }
}

/// Identity of a buffer lent through [`UsbCore::submit_receive`]: its start
/// address. The core reports it back on completion so the class driver can
/// tell which of its buffers was filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct BufferId(usize);

impl BufferId {
    /// Identity of `buf`.
    #[must_use]
    pub fn of(buf: &[u8]) -> Self {
        Self(buf.as_ptr() as usize)
    }

    /// Start address.
    #[must_use]
    pub const fn addr(self) -> usize {
        self.0
    }
}

/// Completion status reported by the USB core for one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferStatus {
    /// The transfer completed and the reported length is valid.
    Success,
    /// CRC / PID / bit-stuff error, or a missed isochronous frame.
    Error,
    /// The transfer was cancelled (bus reset, endpoint disabled).
    Cancelled,
}

/// `bmRequestType` bits 6..5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestKind {
    /// Chapter 9 standard request.
    Standard,
    /// Class-specific request.
    Class,
    /// Vendor-specific request.
    Vendor,
    /// Reserved encoding.
    Reserved,
}

/// `bmRequestType` bits 4..0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Recipient {
    /// Addressed to the device.
    Device,
    /// Addressed to an interface (`wIndex` low byte).
    Interface,
    /// Addressed to an endpoint (`wIndex` low byte).
    Endpoint,
    /// Other recipient.
    Other,
    /// Reserved encoding.
    Reserved,
}

/// Standard (chapter 9) request codes class drivers may see.
pub mod standard {
    /// GET_INTERFACE
    pub const GET_INTERFACE: u8 = 0x0A;
    /// SET_INTERFACE
    pub const SET_INTERFACE: u8 = 0x0B;
}

/// Decoded 8-byte control setup packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SetupPacket {
    /// `bmRequestType`
    pub request_type: u8,
    /// `bRequest`
    pub request: u8,
    /// `wValue`
    pub value: u16,
    /// `wIndex`
    pub index: u16,
    /// `wLength`
    pub length: u16,
}

impl SetupPacket {
    /// Decode the raw little-endian setup packet as received on EP0.
    #[must_use]
    pub const fn parse(raw: &[u8; 8]) -> Self {
        Self {
            request_type: raw[0],
            request: raw[1],
            value: u16::from_le_bytes([raw[2], raw[3]]),
            index: u16::from_le_bytes([raw[4], raw[5]]),
            length: u16::from_le_bytes([raw[6], raw[7]]),
        }
    }

    /// Data-stage direction (bit 7).
    #[must_use]
    pub const fn direction(&self) -> Direction {
        if self.request_type & 0x80 == 0 {
            Direction::Out
        } else {
            Direction::In
        }
    }

    /// Request kind (bits 6..5).
    #[must_use]
    pub const fn kind(&self) -> RequestKind {
        match self.request_type & 0x60 {
            0x00 => RequestKind::Standard,
            0x20 => RequestKind::Class,
            0x40 => RequestKind::Vendor,
            _ => RequestKind::Reserved,
        }
    }

    /// Recipient (bits 4..0).
    #[must_use]
    pub const fn recipient(&self) -> Recipient {
        match self.request_type & 0x1F {
            0 => Recipient::Device,
            1 => Recipient::Interface,
            2 => Recipient::Endpoint,
            3 => Recipient::Other,
            _ => Recipient::Reserved,
        }
    }

    /// `wValue` high byte (control selector for Audio Class requests).
    #[must_use]
    pub const fn value_high(&self) -> u8 {
        self.value.to_be_bytes()[0]
    }

    /// `wValue` low byte (channel number for Audio Class requests).
    #[must_use]
    pub const fn value_low(&self) -> u8 {
        self.value.to_le_bytes()[0]
    }

    /// `wIndex` high byte (entity ID for Audio Class requests).
    #[must_use]
    pub const fn index_high(&self) -> u8 {
        self.index.to_be_bytes()[0]
    }

    /// `wIndex` low byte (interface or endpoint number).
    #[must_use]
    pub const fn index_low(&self) -> u8 {
        self.index.to_le_bytes()[0]
    }
}

/// The USB device core, as seen by a class driver.
pub trait UsbCore {
    /// Error type for transfer submission
    type Error: core::fmt::Debug;

    /// Reserve an endpoint of the given type and direction.
    ///
    /// Returns `None` when the core has no free endpoint that can carry
    /// `max_packet_size`.
    fn alloc_endpoint(
        &mut self,
        kind: EndpointType,
        direction: Direction,
        max_packet_size: u16,
    ) -> Option<EndpointAddress>;

    /// Queue `buf` to receive the next OUT transaction on `ep`.
    ///
    /// Must not block. Ownership of `buf` passes to the core until the
    /// matching completion is reported.
    fn submit_receive(&mut self, ep: EndpointAddress, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Cancel every queued transfer on `ep`. Completions may still arrive.
    fn cancel(&mut self, ep: EndpointAddress);
}
