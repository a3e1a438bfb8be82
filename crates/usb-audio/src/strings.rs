//! String descriptors owned by the audio function.

use platform::config::{USB_AUDIO_FUNCTION_NAME, USB_AUDIO_STREAMING_NAME};

use crate::class::DT_STRING;
use crate::config::STRING_COUNT;

/// Longest encoded string descriptor: 2 header bytes plus 63 UTF-16 units.
pub const MAX_STRING_DESCRIPTOR: usize = 128;

/// Encoded `STRING` descriptor (`bLength`, `bDescriptorType`, UTF-16LE text).
pub type StringDescriptor = heapless::Vec<u8, MAX_STRING_DESCRIPTOR>;

/// Text for string `index`, given the first index assigned to the function.
pub fn lookup(first_string: u8, index: u8) -> Option<&'static str> {
    let offset = index.checked_sub(first_string)?;
    if offset >= STRING_COUNT {
        return None;
    }
    match offset {
        0 => Some(USB_AUDIO_FUNCTION_NAME),
        _ => Some(USB_AUDIO_STREAMING_NAME),
    }
}

/// Encode `text` as a USB string descriptor.
///
/// Returns `None` if the text does not fit [`MAX_STRING_DESCRIPTOR`].
pub fn encode(text: &str) -> Option<StringDescriptor> {
    let mut out = StringDescriptor::new();
    out.push(0).ok()?;
    out.push(DT_STRING).ok()?;
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes()).ok()?;
    }
    let len = u8::try_from(out.len()).ok()?;
    *out.first_mut()? = len;
    Some(out)
}
