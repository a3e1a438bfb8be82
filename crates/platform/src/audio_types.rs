//! Audio domain newtypes for compile-time safety.
//!
//! These zero-cost abstractions prevent common errors:
//! - `VolumeDb`: USB Audio Class volume in 1/256 dB, always on the 0.5 dB grid
//! - `AttenuationRegister`: ES9038Q2M-specific, derived from `VolumeDb` only
//! - `SampleRateHz`: validates 8000–768000 Hz range

use thiserror_no_std::Error;

// ── Error type ───────────────────────────────────────────────────────────────

/// Error returned when a value is out of the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("value {value} outside {min}..={max}")]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: i32,
    /// The inclusive minimum allowed value.
    pub min: i32,
    /// The inclusive maximum allowed value.
    pub max: i32,
}

// ── VolumeDb ─────────────────────────────────────────────────────────────────

/// Lowest volume exposed to the host: −80 dB in 1/256 dB units.
pub const VOL_MIN: i16 = -20_480;

/// Highest volume exposed to the host: 0 dB (unity gain).
pub const VOL_MAX: i16 = 0;

/// Volume step: 0.5 dB, the ES9038Q2M attenuation granularity.
pub const VOL_RES: i16 = 128;

/// Volume level in USB Audio Class units (signed 1/256 dB).
///
/// Invariant: `VOL_MIN <= raw <= VOL_MAX` and `raw % VOL_RES == 0`.
/// Values arriving from the host are brought onto the grid with
/// [`VolumeDb::from_raw_clamped`]; [`VolumeDb::try_new`] is the strict form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct VolumeDb(i16);

impl VolumeDb {
    /// Minimum volume ([`VOL_MIN`]).
    pub const MIN: Self = Self(VOL_MIN);
    /// Maximum volume ([`VOL_MAX`]).
    pub const MAX: Self = Self(VOL_MAX);
    /// Resolution ([`VOL_RES`]). Only meaningful as a GET_RES answer.
    pub const RES: Self = Self(VOL_RES);
    /// 0 dB, the power-on default.
    pub const UNITY: Self = Self(0);

    /// Round `raw` to the nearest multiple of [`VOL_RES`] (ties toward +∞),
    /// then clamp into `[VOL_MIN, VOL_MAX]`.
    ///
    /// Never fails: the host's `0x8000` ("−∞ dB") lands on [`VolumeDb::MIN`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // clamped into the i16 range before the cast
    pub const fn from_raw_clamped(raw: i16) -> Self {
        let res = VOL_RES as i32;
        let rounded = (raw as i32)
            .saturating_add(res / 2)
            .div_euclid(res)
            .saturating_mul(res);
        let clamped = if rounded < VOL_MIN as i32 {
            VOL_MIN as i32
        } else if rounded > VOL_MAX as i32 {
            VOL_MAX as i32
        } else {
            rounded
        };
        Self(clamped as i16)
    }

    /// Create a `VolumeDb`, rejecting values off the grid or out of range.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `raw` is outside `[VOL_MIN, VOL_MAX]`
    /// or not a multiple of [`VOL_RES`].
    pub fn try_new(raw: i16) -> Result<Self, OutOfRangeError> {
        let on_grid = raw.rem_euclid(VOL_RES) == 0;
        if (VOL_MIN..=VOL_MAX).contains(&raw) && on_grid {
            Ok(Self(raw))
        } else {
            Err(OutOfRangeError {
                value: i32::from(raw),
                min: i32::from(VOL_MIN),
                max: i32::from(VOL_MAX),
            })
        }
    }

    /// Raw value in 1/256 dB.
    #[must_use]
    pub const fn raw(self) -> i16 {
        self.0
    }

    /// Little-endian wire encoding used by the Audio Class control pipe.
    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; 2] {
        self.0.to_le_bytes()
    }

    /// Attenuation below 0 dB in 0.5 dB steps (0 = unity).
    #[must_use]
    pub fn half_db_steps(self) -> u16 {
        // raw <= 0 and on the 128 grid, so the quotient is 0..=160.
        self.0
            .unsigned_abs()
            .checked_div(VOL_RES.unsigned_abs())
            .unwrap_or(0)
    }
}

impl Default for VolumeDb {
    fn default() -> Self {
        Self::UNITY
    }
}

// ── AttenuationRegister ──────────────────────────────────────────────────────

/// ES9038Q2M volume attenuation register value (0x00 = 0 dB, 0xFF = mute).
///
/// The ES9038Q2M attenuates in 0.5 dB steps per LSB on REG_ATT_L (15) and
/// REG_ATT_R (16), which is exactly one [`VOL_RES`] step.
///
/// This type can only be constructed from a [`VolumeDb`] (or as the mute
/// value), ensuring the conversion is applied consistently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct AttenuationRegister(u8);

impl AttenuationRegister {
    /// Register value that silences the channel.
    pub const MUTED: Self = Self(0xFF);

    /// Convert a `VolumeDb` to an ES9038Q2M attenuation register value.
    ///
    /// - 0 dB    → 0x00
    /// - −0.5 dB → 0x01
    /// - −80 dB  → 0xA0
    #[must_use]
    pub fn from_volume(vol: VolumeDb) -> Self {
        Self(u8::try_from(vol.half_db_steps()).unwrap_or(u8::MAX))
    }

    /// Combine a master and a channel level: attenuations add, saturating at 0xFF.
    #[must_use]
    pub fn combined(master: VolumeDb, channel: VolumeDb) -> Self {
        let steps = master.half_db_steps().saturating_add(channel.half_db_steps());
        Self(u8::try_from(steps).unwrap_or(u8::MAX))
    }

    /// Return the raw register value.
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

// ── SampleRateHz ─────────────────────────────────────────────────────────────

/// Sample rate in Hz, validated to the range supported by the ES9038Q2M.
///
/// Valid range: 8000–768000 Hz (8 kHz to 768 kHz PCM).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct SampleRateHz(u32);

impl SampleRateHz {
    /// Minimum supported sample rate: 8000 Hz (telephony).
    pub const MIN_HZ: u32 = 8_000;

    /// Maximum supported sample rate: 768000 Hz (ES9038Q2M PCM max).
    pub const MAX_HZ: u32 = 768_000;

    /// 48 kHz, the USB audio default.
    pub const HZ_48000: Self = Self(48_000);

    /// Create a `SampleRateHz`, returning an error if out of 8000–768000 Hz.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `hz < 8000` or `hz > 768000`.
    pub fn new(hz: u32) -> Result<Self, OutOfRangeError> {
        if (Self::MIN_HZ..=Self::MAX_HZ).contains(&hz) {
            Ok(Self(hz))
        } else {
            Err(OutOfRangeError {
                value: i32::try_from(hz).unwrap_or(i32::MAX),
                min: 8_000,
                max: 768_000,
            })
        }
    }

    /// Return the sample rate in Hz.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Whole samples per 1 ms full-speed USB frame, rounded up.
    #[must_use]
    pub fn samples_per_frame(self) -> u32 {
        self.0.div_ceil(1000)
    }
}
