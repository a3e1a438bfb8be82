//! USB Audio Class 1.0 codes used by this function.
//!
//! Only the subset the playback function emits or decodes is listed.

// ── Standard descriptor types ────────────────────────────────────────────────

/// Standard INTERFACE descriptor.
pub const DT_INTERFACE: u8 = 0x04;
/// Standard ENDPOINT descriptor.
pub const DT_ENDPOINT: u8 = 0x05;
/// Standard STRING descriptor.
pub const DT_STRING: u8 = 0x03;
/// INTERFACE_ASSOCIATION descriptor (USB 2.0 ECN).
pub const DT_INTERFACE_ASSOCIATION: u8 = 0x0B;

// ── Class / subclass ─────────────────────────────────────────────────────────

/// Audio interface class.
pub const AUDIO: u8 = 0x01;
/// Audio control interface subclass.
pub const AUDIOCONTROL: u8 = 0x01;
/// Audio streaming interface subclass.
pub const AUDIOSTREAMING: u8 = 0x02;
/// Protocol field for Audio 1.0 interfaces.
pub const PR_PROTOCOL_UNDEFINED: u8 = 0x00;

/// `bcdADC` for Audio Device Class 1.0.
pub const BCD_ADC_1_0: u16 = 0x0100;

// ── Class-specific descriptor types ──────────────────────────────────────────

/// Class-specific interface descriptor.
pub const CS_INTERFACE: u8 = 0x24;
/// Class-specific endpoint descriptor.
pub const CS_ENDPOINT: u8 = 0x25;

// ── Audio control interface subtypes ─────────────────────────────────────────

/// AC HEADER.
pub const AC_HEADER: u8 = 0x01;
/// AC INPUT_TERMINAL.
pub const AC_INPUT_TERMINAL: u8 = 0x02;
/// AC OUTPUT_TERMINAL.
pub const AC_OUTPUT_TERMINAL: u8 = 0x03;
/// AC FEATURE_UNIT.
pub const AC_FEATURE_UNIT: u8 = 0x06;

// ── Audio streaming interface subtypes ───────────────────────────────────────

/// AS_GENERAL.
pub const AS_GENERAL: u8 = 0x01;
/// FORMAT_TYPE.
pub const AS_FORMAT_TYPE: u8 = 0x02;
/// Class-specific endpoint EP_GENERAL.
pub const EP_GENERAL: u8 = 0x01;

/// FORMAT_TYPE_I.
pub const FORMAT_TYPE_I: u8 = 0x01;
/// `wFormatTag` PCM.
pub const FORMAT_PCM: u16 = 0x0001;

// ── Terminal types ───────────────────────────────────────────────────────────

/// USB streaming terminal (host side of the function).
pub const TERMINAL_USB_STREAMING: u16 = 0x0101;
/// Headphones output terminal (the DAP's analogue output).
pub const TERMINAL_HEADPHONES: u16 = 0x0302;

// ── Entity IDs (fixed topology) ──────────────────────────────────────────────

/// Input terminal fed by the streaming interface.
pub const ID_INPUT_TERMINAL: u8 = 0x01;
/// Feature unit carrying mute and volume.
pub const ID_FEATURE_UNIT: u8 = 0x02;
/// Headphone output terminal.
pub const ID_OUTPUT_TERMINAL: u8 = 0x03;

// ── Feature unit control bitmap (bmaControls, 1 byte) ────────────────────────

/// Mute control present.
pub const FU_CONTROL_MUTE: u8 = 0x01;
/// Volume control present.
pub const FU_CONTROL_VOLUME: u8 = 0x02;

// ── Feature unit control selectors (wValue high byte) ────────────────────────

/// MUTE_CONTROL.
pub const MUTE_CONTROL: u8 = 0x01;
/// VOLUME_CONTROL.
pub const VOLUME_CONTROL: u8 = 0x02;

// ── Class-specific request codes (bRequest) ──────────────────────────────────
// SET_MIN, SET_MAX and SET_RES are not accepted and have no constant here.

/// SET_CUR.
pub const SET_CUR: u8 = 0x01;
/// GET_CUR.
pub const GET_CUR: u8 = 0x81;
/// GET_MIN.
pub const GET_MIN: u8 = 0x82;
/// GET_MAX.
pub const GET_MAX: u8 = 0x83;
/// GET_RES.
pub const GET_RES: u8 = 0x84;

// ── Endpoint attributes ──────────────────────────────────────────────────────

/// bmAttributes: isochronous, adaptive synchronisation, data endpoint.
pub const EP_ATTR_ISO_ADAPTIVE: u8 = 0x09;

/// Largest isochronous payload a full-speed endpoint can carry.
pub const FS_ISO_MAX_PACKET: usize = 1023;

/// Channel number the Audio Class reserves for "all channels".
pub const CHANNEL_ALL: u8 = 0xFF;
