//! Alternate-setting state of the audio-streaming interface.

use crate::error::UacError;

/// Alternate setting of the streaming interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AltSetting {
    /// Alt 0: zero bandwidth, no endpoint.
    #[default]
    Inactive,
    /// Alt 1: isochronous OUT endpoint streaming.
    Operational,
}

impl AltSetting {
    /// Decode `bAlternateSetting`.
    pub fn from_raw(alt: u8) -> Result<Self, UacError> {
        match alt {
            0 => Ok(Self::Inactive),
            1 => Ok(Self::Operational),
            other => Err(UacError::InvalidAltSetting(other)),
        }
    }

    /// `bAlternateSetting` value.
    pub fn raw(self) -> u8 {
        match self {
            Self::Inactive => 0,
            Self::Operational => 1,
        }
    }
}

/// What the driver has to do after a recorded alt-setting change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    /// Same state as before; nothing to do.
    Unchanged,
    /// Inactive → Operational: arm the slots, start the pipeline.
    Activate,
    /// Operational → Inactive: stop re-arming, stop the pipeline.
    Deactivate,
}

/// Tracks the streaming interface's alt setting for one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterfaceStateManager {
    interface: Option<u8>,
    current: AltSetting,
}

impl InterfaceStateManager {
    /// Unassigned manager; every request fails until [`assign`](Self::assign).
    pub const fn new() -> Self {
        Self {
            interface: None,
            current: AltSetting::Inactive,
        }
    }

    /// Record the streaming interface number given at registration.
    pub fn assign(&mut self, interface: u8) {
        self.interface = Some(interface);
    }

    /// Assigned streaming interface number.
    pub fn interface(&self) -> Option<u8> {
        self.interface
    }

    /// Whether the stream is operational.
    pub fn is_operational(&self) -> bool {
        self.current == AltSetting::Operational
    }

    /// Back to alt 0 without a transition (connection reset).
    pub fn reset(&mut self) {
        self.current = AltSetting::Inactive;
    }

    fn check(&self, interface: u8) -> Result<(), UacError> {
        match self.interface {
            Some(own) if own == interface => Ok(()),
            _ => Err(UacError::InvalidInterface(interface)),
        }
    }

    /// Record `alt` for `interface` and report the transition it causes.
    ///
    /// Nothing is recorded on error.
    pub fn request(&mut self, interface: u8, alt: u8) -> Result<Transition, UacError> {
        self.check(interface)?;
        let next = AltSetting::from_raw(alt)?;
        let transition = match (self.current, next) {
            (AltSetting::Inactive, AltSetting::Operational) => Transition::Activate,
            (AltSetting::Operational, AltSetting::Inactive) => Transition::Deactivate,
            _ => Transition::Unchanged,
        };
        self.current = next;
        Ok(transition)
    }

    /// Last recorded alt setting of `interface`.
    pub fn current(&self, interface: u8) -> Result<AltSetting, UacError> {
        self.check(interface)?;
        Ok(self.current)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn manager() -> InterfaceStateManager {
        let mut m = InterfaceStateManager::new();
        m.assign(1);
        m
    }

    #[test]
    fn test_transitions() {
        let mut m = manager();
        assert_eq!(m.request(1, 1).unwrap(), Transition::Activate);
        assert!(m.is_operational());
        assert_eq!(m.request(1, 1).unwrap(), Transition::Unchanged);
        assert_eq!(m.request(1, 0).unwrap(), Transition::Deactivate);
        assert_eq!(m.request(1, 0).unwrap(), Transition::Unchanged);
    }

    #[test]
    fn test_foreign_interface_rejected() {
        let mut m = manager();
        assert_eq!(m.request(0, 1), Err(UacError::InvalidInterface(0)));
        assert_eq!(m.current(2), Err(UacError::InvalidInterface(2)));
    }

    #[test]
    fn test_unassigned_rejects_everything() {
        let m = InterfaceStateManager::new();
        assert_eq!(m.current(0), Err(UacError::InvalidInterface(0)));
    }

    #[test]
    fn test_unknown_alt_leaves_state() {
        let mut m = manager();
        m.request(1, 1).unwrap();
        assert_eq!(m.request(1, 2), Err(UacError::InvalidAltSetting(2)));
        assert_eq!(m.current(1).unwrap(), AltSetting::Operational);
    }
}
