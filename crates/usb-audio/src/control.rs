//! Control request decoding and the feature-unit request handler.
//!
//! A `SET_CUR` is a two-phase handshake: the setup packet is accepted and
//! recorded as [`PendingControl::AwaitingSetData`], and the value is only
//! applied when the OUT data stage arrives with exactly the expected
//! length. `GET_*` requests are answered synchronously into the caller's
//! buffer.
//!
//! Nothing here stalls. Unsupported or malformed requests come back as
//! [`ControlOutcome::Unhandled`] and the USB core decides how to STALL.

use platform::{
    usb::standard, CodecControl, Direction, Recipient, RequestKind, SetupPacket, VolumeDb,
};

use crate::class::{GET_CUR, GET_MAX, GET_MIN, GET_RES, ID_FEATURE_UNIT, SET_CUR};
use crate::feature::{ControlSelector, FeatureState};

/// Result of a control request or data stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlOutcome {
    /// Accepted. For IN requests, the number of bytes written to the
    /// destination buffer; for OUT requests, 0.
    Handled(usize),
    /// Not supported or malformed; the USB core should STALL.
    Unhandled,
}

/// Feature-unit request code (`bRequest`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FeatureRequest {
    /// `SET_CUR`
    SetCur,
    /// `GET_CUR`
    GetCur,
    /// `GET_MIN`
    GetMin,
    /// `GET_MAX`
    GetMax,
    /// `GET_RES`
    GetRes,
}

impl FeatureRequest {
    /// Decode `bRequest`. `SET_MIN`/`SET_MAX`/`SET_RES` are not supported.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            SET_CUR => Some(Self::SetCur),
            GET_CUR => Some(Self::GetCur),
            GET_MIN => Some(Self::GetMin),
            GET_MAX => Some(Self::GetMax),
            GET_RES => Some(Self::GetRes),
            _ => None,
        }
    }

    fn direction(self) -> Direction {
        match self {
            Self::SetCur => Direction::Out,
            _ => Direction::In,
        }
    }
}

/// A request addressed to the audio function, after decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AudioRequest {
    /// Class request to the feature unit.
    Feature {
        /// Request code.
        request: FeatureRequest,
        /// Control selector (`wValue` high byte).
        selector: ControlSelector,
        /// Channel (`wValue` low byte), 0 = master.
        channel: u8,
    },
    /// Standard GET_INTERFACE.
    GetInterface {
        /// Interface number (`wIndex`).
        interface: u8,
    },
    /// Standard SET_INTERFACE.
    SetInterface {
        /// Interface number (`wIndex`).
        interface: u8,
        /// Requested alternate setting (`wValue`).
        alt: u8,
    },
}

/// Decode `setup` if it targets this function.
///
/// Returns `None` for anything addressed elsewhere, any unsupported
/// selector or request code, a data direction that does not match the
/// request, or a `wLength` other than the control's payload size.
pub fn decode(setup: &SetupPacket, control_interface: u8, streaming_interface: u8) -> Option<AudioRequest> {
    if setup.recipient() != Recipient::Interface {
        return None;
    }
    let interface = setup.index_low();
    let ours = interface == control_interface || interface == streaming_interface;

    match setup.kind() {
        RequestKind::Standard => match setup.request {
            standard::GET_INTERFACE
                if ours && setup.direction() == Direction::In && setup.length == 1 =>
            {
                Some(AudioRequest::GetInterface { interface })
            }
            standard::SET_INTERFACE
                if ours && setup.direction() == Direction::Out && setup.length == 0 =>
            {
                let alt = u8::try_from(setup.value).unwrap_or(u8::MAX);
                Some(AudioRequest::SetInterface { interface, alt })
            }
            _ => None,
        },
        RequestKind::Class => {
            if interface != control_interface || setup.index_high() != ID_FEATURE_UNIT {
                return None;
            }
            let request = FeatureRequest::from_raw(setup.request)?;
            if request.direction() != setup.direction() {
                return None;
            }
            let selector = ControlSelector::from_raw(setup.value_high())?;
            if usize::from(setup.length) != selector.payload_len() {
                return None;
            }
            Some(AudioRequest::Feature {
                request,
                selector,
                channel: setup.value_low(),
            })
        }
        RequestKind::Vendor | RequestKind::Reserved => None,
    }
}

/// Two-phase `SET_CUR` handshake state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PendingControl {
    /// No data stage expected.
    #[default]
    Idle,
    /// Setup accepted; waiting for `length` bytes for `selector` on `channel`.
    AwaitingSetData {
        /// Control being written.
        selector: ControlSelector,
        /// Target channel.
        channel: u8,
        /// Expected data-stage length.
        length: usize,
    },
}

impl PendingControl {
    /// Whether a data stage is expected.
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Consume the pending state, leaving `Idle`.
    pub fn take(&mut self) -> Self {
        core::mem::take(self)
    }
}

/// Answer a `GET_*` request into `dest`.
pub fn answer_get(
    state: &FeatureState,
    request: FeatureRequest,
    selector: ControlSelector,
    channel: u8,
    dest: &mut [u8],
) -> ControlOutcome {
    if !state.supports(selector, channel) {
        return ControlOutcome::Unhandled;
    }
    let (bytes, len) = match (selector, request) {
        (ControlSelector::Mute, FeatureRequest::GetCur) => ([u8::from(state.is_muted()), 0], 1),
        (ControlSelector::Volume, FeatureRequest::GetCur) => match state.volume(channel) {
            Some(v) => (v.to_le_bytes(), 2),
            None => return ControlOutcome::Unhandled,
        },
        (ControlSelector::Volume, FeatureRequest::GetMin) => (VolumeDb::MIN.to_le_bytes(), 2),
        (ControlSelector::Volume, FeatureRequest::GetMax) => (VolumeDb::MAX.to_le_bytes(), 2),
        (ControlSelector::Volume, FeatureRequest::GetRes) => (VolumeDb::RES.to_le_bytes(), 2),
        _ => return ControlOutcome::Unhandled,
    };
    let (Some(out), Some(src)) = (dest.get_mut(..len), bytes.get(..len)) else {
        return ControlOutcome::Unhandled;
    };
    out.copy_from_slice(src);
    ControlOutcome::Handled(len)
}

/// Apply a `SET_CUR` data stage to `state` and forward it to `codec`.
///
/// Nothing changes unless `data` is exactly the control's payload size and
/// the channel exists. Volumes are rounded to the resolution grid and
/// clamped into range before they are stored.
pub fn apply_set<C: CodecControl>(
    state: &mut FeatureState,
    codec: &mut C,
    selector: ControlSelector,
    channel: u8,
    data: &[u8],
) -> ControlOutcome {
    if data.len() != selector.payload_len() || !state.supports(selector, channel) {
        return ControlOutcome::Unhandled;
    }
    match selector {
        ControlSelector::Mute => {
            let muted = data.first().is_some_and(|&b| b != 0);
            state.set_muted(muted);
            codec.set_mute(muted);
        }
        ControlSelector::Volume => {
            let Ok(raw) = <[u8; 2]>::try_from(data) else {
                return ControlOutcome::Unhandled;
            };
            let volume = VolumeDb::from_raw_clamped(i16::from_le_bytes(raw));
            if !state.set_volume(channel, volume) {
                return ControlOutcome::Unhandled;
            }
            codec.set_volume(channel, volume);
        }
    }
    ControlOutcome::Handled(0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use platform::mocks::MockCodecControl;

    const CTRL: u8 = 0;
    const STREAM: u8 = 1;

    fn setup(raw: [u8; 8]) -> SetupPacket {
        SetupPacket::parse(&raw)
    }

    #[test]
    fn test_decode_set_cur_volume() {
        // SET_CUR VOLUME ch2, FU 2 on interface 0, wLength 2
        let req = decode(&setup([0x21, 0x01, 0x02, 0x02, 0x00, 0x02, 0x02, 0x00]), CTRL, STREAM);
        assert_eq!(
            req,
            Some(AudioRequest::Feature {
                request: FeatureRequest::SetCur,
                selector: ControlSelector::Volume,
                channel: 2,
            })
        );
    }

    #[test]
    fn test_decode_rejects_wrong_entity() {
        // same request addressed to the input terminal (ID 1)
        let req = decode(&setup([0x21, 0x01, 0x02, 0x02, 0x00, 0x01, 0x02, 0x00]), CTRL, STREAM);
        assert_eq!(req, None);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        // SET_CUR MUTE with wLength 2
        let req = decode(&setup([0x21, 0x01, 0x00, 0x01, 0x00, 0x02, 0x02, 0x00]), CTRL, STREAM);
        assert_eq!(req, None);
    }

    #[test]
    fn test_decode_rejects_direction_mismatch() {
        // GET_CUR with an OUT bmRequestType
        let req = decode(&setup([0x21, 0x81, 0x00, 0x01, 0x00, 0x02, 0x01, 0x00]), CTRL, STREAM);
        assert_eq!(req, None);
    }

    #[test]
    fn test_decode_undefined_selector() {
        for ch in [0u8, 1, 2, 0xFF] {
            let req = decode(&setup([0xA1, 0x81, ch, 0x03, 0x00, 0x02, 0x01, 0x00]), CTRL, STREAM);
            assert_eq!(req, None);
        }
    }

    #[test]
    fn test_decode_endpoint_recipient_is_not_ours() {
        // SET_CUR SAMPLING_FREQ to endpoint 0x01
        let req = decode(&setup([0x22, 0x01, 0x00, 0x01, 0x01, 0x00, 0x03, 0x00]), CTRL, STREAM);
        assert_eq!(req, None);
    }

    #[test]
    fn test_decode_standard_interface_requests() {
        let set = decode(&setup([0x01, 0x0B, 0x01, 0x00, STREAM, 0x00, 0x00, 0x00]), CTRL, STREAM);
        assert_eq!(set, Some(AudioRequest::SetInterface { interface: STREAM, alt: 1 }));
        let get = decode(&setup([0x81, 0x0A, 0x00, 0x00, STREAM, 0x00, 0x01, 0x00]), CTRL, STREAM);
        assert_eq!(get, Some(AudioRequest::GetInterface { interface: STREAM }));
        let foreign = decode(&setup([0x01, 0x0B, 0x01, 0x00, 0x05, 0x00, 0x00, 0x00]), CTRL, STREAM);
        assert_eq!(foreign, None);
    }

    #[test]
    fn test_get_volume_range() {
        let state = FeatureState::new(2);
        let mut buf = [0u8; 4];
        let out = answer_get(&state, FeatureRequest::GetMin, ControlSelector::Volume, 1, &mut buf);
        assert_eq!(out, ControlOutcome::Handled(2));
        assert_eq!(i16::from_le_bytes([buf[0], buf[1]]), -20_480);
        answer_get(&state, FeatureRequest::GetRes, ControlSelector::Volume, 0, &mut buf);
        assert_eq!(i16::from_le_bytes([buf[0], buf[1]]), 128);
    }

    #[test]
    fn test_get_mute_range_unsupported() {
        let state = FeatureState::new(2);
        let mut buf = [0u8; 2];
        let out = answer_get(&state, FeatureRequest::GetMax, ControlSelector::Mute, 0, &mut buf);
        assert_eq!(out, ControlOutcome::Unhandled);
    }

    #[test]
    fn test_get_into_short_buffer() {
        let state = FeatureState::new(2);
        let mut buf = [0u8; 1];
        let out = answer_get(&state, FeatureRequest::GetCur, ControlSelector::Volume, 0, &mut buf);
        assert_eq!(out, ControlOutcome::Unhandled);
    }

    #[test]
    fn test_apply_volume_rounds_and_forwards() {
        let mut state = FeatureState::new(2);
        let mut codec = MockCodecControl::new();
        let out = apply_set(&mut state, &mut codec, ControlSelector::Volume, 1, &(-2637i16).to_le_bytes());
        assert_eq!(out, ControlOutcome::Handled(0));
        assert_eq!(state.volume(1).unwrap().raw(), -2688);
        assert_eq!(codec.volume_calls(), &[(1, VolumeDb::try_new(-2688).unwrap())]);
    }

    #[test]
    fn test_apply_short_data_changes_nothing() {
        let mut state = FeatureState::new(2);
        let mut codec = MockCodecControl::new();
        let out = apply_set(&mut state, &mut codec, ControlSelector::Volume, 1, &[0x00]);
        assert_eq!(out, ControlOutcome::Unhandled);
        assert_eq!(state, FeatureState::new(2));
        assert!(codec.volume_calls().is_empty());
    }

    #[test]
    fn test_apply_mute_nonzero_is_muted() {
        let mut state = FeatureState::new(2);
        let mut codec = MockCodecControl::new();
        apply_set(&mut state, &mut codec, ControlSelector::Mute, 0, &[0x02]);
        assert!(state.is_muted());
        assert_eq!(codec.mute_calls(), &[true]);
    }

    #[test]
    fn test_pending_take_leaves_idle() {
        let mut p = PendingControl::AwaitingSetData {
            selector: ControlSelector::Mute,
            channel: 0,
            length: 1,
        };
        assert!(!p.take().is_idle());
        assert!(p.is_idle());
    }
}
