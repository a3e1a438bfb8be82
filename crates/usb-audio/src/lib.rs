//! USB Audio Class 1.0 playback function for the `SoulAudio` DAP
//!
//! The DAP shows up on the host as a USB headphone DAC: one audio-control
//! interface with a feature unit (master mute, per-channel volume) and one
//! audio-streaming interface carrying an adaptive isochronous OUT endpoint.
//!
//! # Layers
//!
//! ```text
//! USB core (external)        ── setup packets, completions ──┐
//!         ↓                                                  │
//! UacDriver (this crate)                                     │
//!   ├─ descriptor / strings   (pure)                         │
//!   ├─ control + feature      (event context)                │
//!   ├─ interface              (alt-setting state machine)    │
//!   └─ transfer               (completion context) ◄─────────┘
//!         ↓                        ↓
//! CodecControl               PlaybackSink
//! ```
//!
//! # Example
//!
//! ```
//! use platform::mocks::{MockCodecControl, MockPlaybackSink, MockUsbCore};
//! use usb_audio::{AudioFormat, UacDriver};
//!
//! let mut driver: UacDriver<_, _, _> = UacDriver::new(
//!     MockUsbCore::new(),
//!     MockPlaybackSink::new(),
//!     MockCodecControl::new(),
//!     AudioFormat::default(),
//! );
//! driver.init();
//! driver.request_endpoints().unwrap();
//! let next_interface = driver.set_first_interface(0);
//! let next_string = driver.set_first_string_index(4);
//! assert_eq!((next_interface, next_string), (2, 6));
//!
//! let mut buf = [0u8; 256];
//! let len = driver.get_config_descriptor(&mut buf, 196).unwrap();
//! assert_eq!(len, usb_audio::config_descriptor_len(2));
//! ```
//!
//! # Features
//!
//! - `std`: host builds; enables the platform mocks and DMA stand-in helpers
//! - `defmt`: hardware logging and `defmt::Format` derives
//! - `tracing`: host logging through `tracing`

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)]
#![allow(clippy::doc_markdown)] // descriptor field names in doc comments
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod logging;

pub mod class;
pub mod config;
pub mod control;
pub mod descriptor;
pub mod driver;
pub mod error;
pub mod feature;
pub mod interface;
pub mod strings;
pub mod transfer;

pub use config::{AudioFormat, AudioFunctionConfig, MAX_CHANNELS, STRING_COUNT};
pub use control::{ControlOutcome, PendingControl};
pub use descriptor::{build_config_descriptor, config_descriptor_len};
pub use driver::UacDriver;
pub use error::UacError;
pub use feature::{ControlSelector, FeatureState};
pub use interface::AltSetting;
pub use strings::StringDescriptor;
pub use transfer::{Completion, TransferStats, SLOT_BUFFER_SIZE};
