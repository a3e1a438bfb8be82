//! Descriptor fragment checked by an independent UAC 1.0 parser.
//!
//! The parser below walks the fragment the way a host audio driver does:
//! descriptor by descriptor using `bLength`, tracking which interface it is
//! inside, and pulling out the fields a host needs to open the stream.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::panic)]

use platform::{Direction, EndpointAddress};
use usb_audio::{build_config_descriptor, AudioFormat, AudioFunctionConfig};

#[derive(Debug, Default)]
struct ParsedFunction {
    iad_first_interface: u8,
    iad_count: u8,
    ac_interface: Option<u8>,
    ac_total_len_declared: u16,
    ac_total_len_seen: usize,
    as_alt_settings: Vec<(u8, u8)>, // (alt, bNumEndpoints)
    terminal_channels: u8,
    feature_unit_controls: Vec<u8>,
    format_channels: u8,
    subframe: u8,
    bits: u8,
    sample_rates: Vec<u32>,
    endpoint_address: u8,
    endpoint_attributes: u8,
    max_packet_size: u16,
    saw_cs_endpoint: bool,
}

fn parse(bytes: &[u8]) -> ParsedFunction {
    let mut out = ParsedFunction::default();
    let mut current_subclass = 0u8;
    let mut pos = 0;
    while pos < bytes.len() {
        let len = bytes[pos] as usize;
        assert!(len >= 2, "zero-length descriptor at {pos}");
        let d = &bytes[pos..pos + len];
        match (d[1], current_subclass) {
            (0x0B, _) => {
                assert_eq!(len, 8);
                out.iad_first_interface = d[2];
                out.iad_count = d[3];
                assert_eq!(d[4], 0x01, "IAD function class must be AUDIO");
            }
            (0x04, _) => {
                assert_eq!(len, 9);
                assert_eq!(d[5], 0x01, "interface class must be AUDIO");
                current_subclass = d[6];
                match current_subclass {
                    0x01 => out.ac_interface = Some(d[2]),
                    0x02 => out.as_alt_settings.push((d[3], d[4])),
                    other => panic!("unexpected subclass {other}"),
                }
            }
            (0x24, 0x01) => {
                out.ac_total_len_seen += len;
                match d[2] {
                    0x01 => out.ac_total_len_declared = u16::from_le_bytes([d[5], d[6]]),
                    0x02 => out.terminal_channels = d[7],
                    0x06 => {
                        let control_size = d[5] as usize;
                        assert_eq!(control_size, 1);
                        out.feature_unit_controls = d[6..len - 1].to_vec();
                    }
                    0x03 => assert_eq!(d[7], 0x02, "output terminal must be fed by the feature unit"),
                    other => panic!("unexpected AC subtype {other}"),
                }
            }
            (0x24, 0x02) => match d[2] {
                0x01 => assert_eq!(u16::from_le_bytes([d[5], d[6]]), 0x0001, "PCM"),
                0x02 => {
                    assert_eq!(d[3], 0x01, "format type I");
                    out.format_channels = d[4];
                    out.subframe = d[5];
                    out.bits = d[6];
                    let n = d[7] as usize;
                    assert!(n > 0, "continuous ranges are not expected");
                    for i in 0..n {
                        let o = 8 + 3 * i;
                        out.sample_rates
                            .push(u32::from_le_bytes([d[o], d[o + 1], d[o + 2], 0]));
                    }
                }
                other => panic!("unexpected AS subtype {other}"),
            },
            (0x05, 0x02) => {
                assert_eq!(len, 9, "audio endpoints are 9 bytes in UAC 1.0");
                out.endpoint_address = d[2];
                out.endpoint_attributes = d[3];
                out.max_packet_size = u16::from_le_bytes([d[4], d[5]]);
            }
            (0x25, 0x02) => {
                assert_eq!(d[2], 0x01, "EP_GENERAL");
                out.saw_cs_endpoint = true;
            }
            (ty, sub) => panic!("unexpected descriptor type {ty:#x} in subclass {sub}"),
        }
        pos += len;
    }
    assert_eq!(pos, bytes.len(), "descriptor walk overran the fragment");
    out
}

fn cfg(format: AudioFormat) -> AudioFunctionConfig {
    AudioFunctionConfig {
        format,
        control_interface: 1,
        streaming_interface: 2,
        endpoint: EndpointAddress::from_parts(3, Direction::Out),
        first_string: 5,
    }
}

fn roundtrip(rate: u32, channels: u8, bits: u8) {
    let format = AudioFormat::new(rate, channels, bits).unwrap();
    let mps = format.max_packet_size();
    let mut buf = [0u8; 512];
    let n = build_config_descriptor(&cfg(format), mps, &mut buf).unwrap();
    let p = parse(&buf[..n]);

    assert_eq!(p.sample_rates, vec![rate]);
    assert_eq!(p.format_channels, channels);
    assert_eq!(p.terminal_channels, channels);
    assert_eq!(p.bits, bits);
    assert_eq!(p.subframe, bits.div_ceil(8));
    assert_eq!(usize::from(p.max_packet_size), mps);
}

#[test]
fn default_format_roundtrips() {
    roundtrip(48_000, 2, 16);
}

#[test]
fn hi_res_stereo_roundtrips() {
    roundtrip(96_000, 2, 24);
}

#[test]
fn mono_cd_rate_roundtrips() {
    roundtrip(44_100, 1, 16);
}

#[test]
fn eight_channel_roundtrips() {
    roundtrip(48_000, 8, 16);
}

#[test]
fn topology_and_numbering() {
    let mut buf = [0u8; 512];
    let n = build_config_descriptor(&cfg(AudioFormat::default()), 196, &mut buf).unwrap();
    let p = parse(&buf[..n]);

    assert_eq!(p.iad_first_interface, 1);
    assert_eq!(p.iad_count, 2);
    assert_eq!(p.ac_interface, Some(1));
    assert_eq!(p.as_alt_settings, vec![(0, 0), (1, 1)]);
    assert_eq!(usize::from(p.ac_total_len_declared), p.ac_total_len_seen);
    // master: mute + volume, then volume on L and R
    assert_eq!(p.feature_unit_controls, vec![0x03, 0x02, 0x02]);
    assert_eq!(p.endpoint_address, 0x03);
    assert_eq!(p.endpoint_attributes & 0x03, 0x01, "isochronous");
    assert_eq!(p.endpoint_attributes & 0x0C, 0x08, "adaptive");
    assert!(p.saw_cs_endpoint);
}
