//! Configuration descriptor fragment for the playback function.
//!
//! Topology: USB streaming input terminal (1) → feature unit (2, mute on
//! the master channel, volume on master and every logical channel) →
//! headphone output terminal (3). The streaming interface has the
//! zero-bandwidth alt 0 and the operational alt 1 carrying one adaptive
//! isochronous OUT endpoint.

use crate::class::*;
use crate::config::AudioFunctionConfig;
use crate::error::UacError;

const IAD_LEN: usize = 8;
const INTERFACE_LEN: usize = 9;
const AC_HEADER_LEN: usize = 9;
const INPUT_TERMINAL_LEN: usize = 12;
const OUTPUT_TERMINAL_LEN: usize = 9;
const AS_GENERAL_LEN: usize = 7;
const FORMAT_TYPE_I_LEN: usize = 11;
const AUDIO_ENDPOINT_LEN: usize = 9;
const CS_ENDPOINT_LEN: usize = 7;

/// Feature unit descriptor length: 7 fixed bytes plus one control byte for
/// the master channel and one per logical channel.
pub const fn feature_unit_len(channels: u8) -> usize {
    (channels as usize).saturating_add(8)
}

/// Sum of the class-specific AC descriptors (`wTotalLength` of the AC header).
pub const fn ac_total_len(channels: u8) -> usize {
    AC_HEADER_LEN
        .saturating_add(INPUT_TERMINAL_LEN)
        .saturating_add(feature_unit_len(channels))
        .saturating_add(OUTPUT_TERMINAL_LEN)
}

/// Length of the whole fragment written by [`build_config_descriptor`].
pub const fn config_descriptor_len(channels: u8) -> usize {
    IAD_LEN
        .saturating_add(INTERFACE_LEN)
        .saturating_add(ac_total_len(channels))
        .saturating_add(INTERFACE_LEN)
        .saturating_add(INTERFACE_LEN)
        .saturating_add(AS_GENERAL_LEN)
        .saturating_add(FORMAT_TYPE_I_LEN)
        .saturating_add(AUDIO_ENDPOINT_LEN)
        .saturating_add(CS_ENDPOINT_LEN)
}

/// `wChannelConfig` spatial locations.
///
/// Mono is Center Front; wider layouts take the first `n` locations in
/// Audio Class order (L, R, C, LFE, Ls, Rs, ...).
pub fn channel_config(channels: u8) -> u16 {
    if channels == 1 {
        0x0004
    } else {
        1u16.checked_shl(u32::from(channels))
            .map_or(u16::MAX, |bit| bit.wrapping_sub(1))
    }
}

/// Sequential descriptor writer over a caller-owned buffer.
struct DescriptorWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> DescriptorWriter<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Write one descriptor: `bLength`, `bDescriptorType`, then `body`.
    fn write(&mut self, descriptor_type: u8, body: &[u8]) -> Result<(), UacError> {
        let len = body.len().saturating_add(2);
        let b_length = u8::try_from(len).map_err(|_| UacError::UnsupportedFormat)?;
        let end = self.pos.saturating_add(len);
        let available = self.buf.len();
        let out = self
            .buf
            .get_mut(self.pos..end)
            .ok_or(UacError::BufferTooSmall {
                needed: end,
                available,
            })?;
        let header = [b_length, descriptor_type];
        for (slot, byte) in out.iter_mut().zip(header.iter().chain(body)) {
            *slot = *byte;
        }
        self.pos = end;
        Ok(())
    }

    fn interface(
        &mut self,
        number: u8,
        alt: u8,
        endpoints: u8,
        subclass: u8,
        string: u8,
    ) -> Result<(), UacError> {
        self.write(
            DT_INTERFACE,
            &[
                number,                // bInterfaceNumber
                alt,                   // bAlternateSetting
                endpoints,             // bNumEndpoints
                AUDIO,                 // bInterfaceClass
                subclass,              // bInterfaceSubClass
                PR_PROTOCOL_UNDEFINED, // bInterfaceProtocol
                string,                // iInterface
            ],
        )
    }

    fn position(&self) -> usize {
        self.pos
    }
}

/// Encode the function's configuration descriptor fragment into `dest`.
///
/// Returns the number of bytes written, always
/// [`config_descriptor_len`]`(channels)`.
///
/// # Errors
///
/// - [`UacError::PacketTooLarge`] if `max_packet_size` exceeds the 1023-byte
///   full-speed isochronous limit.
/// - [`UacError::BufferTooSmall`] if `dest` cannot hold the fragment; nothing
///   is written in that case.
pub fn build_config_descriptor(
    cfg: &AudioFunctionConfig,
    max_packet_size: usize,
    dest: &mut [u8],
) -> Result<usize, UacError> {
    if max_packet_size > FS_ISO_MAX_PACKET {
        return Err(UacError::PacketTooLarge {
            requested: max_packet_size,
            limit: FS_ISO_MAX_PACKET,
        });
    }
    let format = &cfg.format;
    let channels = format.channels();
    let needed = config_descriptor_len(channels);
    if dest.len() < needed {
        return Err(UacError::BufferTooSmall {
            needed,
            available: dest.len(),
        });
    }

    let mut w = DescriptorWriter::new(dest);

    // Interface association: binds the AC and AS interfaces into one function.
    w.write(
        DT_INTERFACE_ASSOCIATION,
        &[
            cfg.control_interface, // bFirstInterface
            0x02,                  // bInterfaceCount
            AUDIO,                 // bFunctionClass
            AUDIOCONTROL,          // bFunctionSubClass
            PR_PROTOCOL_UNDEFINED, // bFunctionProtocol
            cfg.function_string(), // iFunction
        ],
    )?;

    // Standard AC interface
    w.interface(
        cfg.control_interface,
        0,
        0,
        AUDIOCONTROL,
        cfg.function_string(),
    )?;

    // Class-specific AC header
    let adc = BCD_ADC_1_0.to_le_bytes();
    let total = u16::try_from(ac_total_len(channels))
        .unwrap_or(u16::MAX)
        .to_le_bytes();
    w.write(
        CS_INTERFACE,
        &[
            AC_HEADER, // bDescriptorSubtype
            adc[0],    // bcdADC
            adc[1],
            total[0], // wTotalLength
            total[1],
            0x01,                    // bInCollection
            cfg.streaming_interface, // baInterfaceNr(1)
        ],
    )?;

    // Input terminal: the host's PCM stream
    let tt = TERMINAL_USB_STREAMING.to_le_bytes();
    let layout = channel_config(channels).to_le_bytes();
    w.write(
        CS_INTERFACE,
        &[
            AC_INPUT_TERMINAL, // bDescriptorSubtype
            ID_INPUT_TERMINAL, // bTerminalID
            tt[0],             // wTerminalType
            tt[1],
            0x00,      // bAssocTerminal
            channels,  // bNrChannels
            layout[0], // wChannelConfig
            layout[1],
            0x00, // iChannelNames
            0x00, // iTerminal
        ],
    )?;

    // Feature unit: bControlSize 1, master mute+volume, per-channel volume
    let mut fu: heapless::Vec<u8, 16> = heapless::Vec::new();
    let fixed = [
        AC_FEATURE_UNIT,                    // bDescriptorSubtype
        ID_FEATURE_UNIT,                    // bUnitID
        ID_INPUT_TERMINAL,                  // bSourceID
        0x01,                               // bControlSize
        FU_CONTROL_MUTE | FU_CONTROL_VOLUME, // bmaControls(0)
    ];
    fu.extend_from_slice(&fixed)
        .map_err(|_| UacError::UnsupportedFormat)?;
    for _ in 0..channels {
        fu.push(FU_CONTROL_VOLUME)
            .map_err(|_| UacError::UnsupportedFormat)?;
    }
    fu.push(0x00).map_err(|_| UacError::UnsupportedFormat)?; // iFeature
    w.write(CS_INTERFACE, &fu)?;

    // Output terminal: the DAP's headphone jack
    let tt = TERMINAL_HEADPHONES.to_le_bytes();
    w.write(
        CS_INTERFACE,
        &[
            AC_OUTPUT_TERMINAL, // bDescriptorSubtype
            ID_OUTPUT_TERMINAL, // bTerminalID
            tt[0],              // wTerminalType
            tt[1],
            0x00,            // bAssocTerminal
            ID_FEATURE_UNIT, // bSourceID
            0x00,            // iTerminal
        ],
    )?;

    // AS interface, alt 0: zero bandwidth
    w.interface(
        cfg.streaming_interface,
        0,
        0,
        AUDIOSTREAMING,
        cfg.streaming_string(),
    )?;

    // AS interface, alt 1: operational
    w.interface(
        cfg.streaming_interface,
        1,
        1,
        AUDIOSTREAMING,
        cfg.streaming_string(),
    )?;

    let pcm = FORMAT_PCM.to_le_bytes();
    w.write(
        CS_INTERFACE,
        &[
            AS_GENERAL,        // bDescriptorSubtype
            ID_INPUT_TERMINAL, // bTerminalLink
            0x01,              // bDelay (frames)
            pcm[0],            // wFormatTag
            pcm[1],
        ],
    )?;

    let rate = format.sample_rate().get().to_le_bytes();
    w.write(
        CS_INTERFACE,
        &[
            AS_FORMAT_TYPE,           // bDescriptorSubtype
            FORMAT_TYPE_I,            // bFormatType
            channels,                 // bNrChannels
            format.subframe_bytes(),  // bSubframeSize
            format.bits_per_sample(), // bBitResolution
            0x01,                     // bSamFreqType: one discrete rate
            rate[0],                  // tSamFreq (24-bit)
            rate[1],
            rate[2],
        ],
    )?;

    // Standard audio endpoint (9 bytes in Audio 1.0)
    let mps = u16::try_from(max_packet_size)
        .unwrap_or(u16::MAX)
        .to_le_bytes();
    w.write(
        DT_ENDPOINT,
        &[
            cfg.endpoint.raw(),   // bEndpointAddress
            EP_ATTR_ISO_ADAPTIVE, // bmAttributes
            mps[0],               // wMaxPacketSize
            mps[1],
            0x01, // bInterval: every frame
            0x00, // bRefresh
            0x00, // bSynchAddress
        ],
    )?;

    w.write(
        CS_ENDPOINT,
        &[
            EP_GENERAL, // bDescriptorSubtype
            0x00,       // bmAttributes: no sampling-frequency control
            0x00,       // bLockDelayUnits
            0x00,       // wLockDelay
            0x00,
        ],
    )?;

    Ok(w.position())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use crate::config::AudioFormat;
    use platform::{Direction, EndpointAddress};

    fn stereo_cfg() -> AudioFunctionConfig {
        AudioFunctionConfig {
            format: AudioFormat::default(),
            control_interface: 2,
            streaming_interface: 3,
            endpoint: EndpointAddress::from_parts(1, Direction::Out),
            first_string: 4,
        }
    }

    #[test]
    fn test_stereo_fragment_length() {
        // IAD 8, AC interface 9, AC class 40, AS alt 0 and 1 18, AS general 7,
        // format 11, endpoint 9, CS endpoint 7.
        assert_eq!(config_descriptor_len(2), 109);
        assert_eq!(ac_total_len(2), 40);

        let mut buf = [0u8; 256];
        let n = build_config_descriptor(&stereo_cfg(), 196, &mut buf).unwrap();
        assert_eq!(n, config_descriptor_len(2));
    }

    #[test]
    fn test_fragment_grows_one_byte_per_channel() {
        assert_eq!(feature_unit_len(1), 9);
        assert_eq!(feature_unit_len(2), 10);
        assert_eq!(config_descriptor_len(8), config_descriptor_len(2) + 6);
    }

    #[test]
    fn test_starts_with_iad() {
        let mut buf = [0u8; 256];
        build_config_descriptor(&stereo_cfg(), 196, &mut buf).unwrap();
        assert_eq!(&buf[..8], &[8, 0x0B, 2, 2, 0x01, 0x01, 0x00, 4]);
    }

    #[test]
    fn test_endpoint_carries_packet_size() {
        let mut buf = [0u8; 256];
        let n = build_config_descriptor(&stereo_cfg(), 196, &mut buf).unwrap();
        // endpoint descriptor sits right before the 7-byte CS endpoint
        let ep = &buf[n - 16..n - 7];
        assert_eq!(ep, &[9, 0x05, 0x01, 0x09, 196, 0, 1, 0, 0]);
    }

    #[test]
    fn test_rejects_oversized_packet() {
        let mut buf = [0u8; 256];
        let err = build_config_descriptor(&stereo_cfg(), 1024, &mut buf).unwrap_err();
        assert_eq!(
            err,
            UacError::PacketTooLarge {
                requested: 1024,
                limit: 1023
            }
        );
    }

    #[test]
    fn test_short_buffer_is_untouched() {
        let mut buf = [0xAAu8; 64];
        let err = build_config_descriptor(&stereo_cfg(), 196, &mut buf).unwrap_err();
        assert_eq!(
            err,
            UacError::BufferTooSmall {
                needed: config_descriptor_len(2),
                available: 64
            }
        );
        assert!(buf.iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn test_channel_config_layouts() {
        assert_eq!(channel_config(1), 0x0004);
        assert_eq!(channel_config(2), 0x0003);
        assert_eq!(channel_config(6), 0x003F);
        assert_eq!(channel_config(8), 0x00FF);
    }

    #[test]
    fn test_output_is_deterministic() {
        let mut a = [0u8; 256];
        let mut b = [0u8; 256];
        build_config_descriptor(&stereo_cfg(), 196, &mut a).unwrap();
        build_config_descriptor(&stereo_cfg(), 196, &mut b).unwrap();
        assert_eq!(a, b);
    }
}
