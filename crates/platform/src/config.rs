//! Application configuration and constants
//!
//! This module defines central configuration values used across the application.
//! All branding, naming, and USB identity strings should reference these
//! constants rather than hardcoding values.

/// The application name
pub const APP_NAME: &str = "Soul Listener";

/// The application type/category
pub const APP_TYPE: &str = "DAP"; // Digital Audio Player

/// Application version (synchronized with Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name the host shows for the USB audio function (IAD `iFunction` and the
/// audio-control interface `iInterface`).
pub const USB_AUDIO_FUNCTION_NAME: &str = "Soul Listener USB Audio";

/// Name of the audio-streaming interface (`iInterface` on both alt settings).
pub const USB_AUDIO_STREAMING_NAME: &str = "Soul Listener Playback";

/// Full application title (name + type)
pub const fn app_title() -> &'static str {
    APP_NAME
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usb_names_carry_app_name() {
        assert!(USB_AUDIO_FUNCTION_NAME.starts_with(APP_NAME));
        assert!(USB_AUDIO_STREAMING_NAME.starts_with(APP_NAME));
        assert_eq!(app_title(), APP_NAME);
        assert_eq!(APP_TYPE, "DAP");
    }
}
