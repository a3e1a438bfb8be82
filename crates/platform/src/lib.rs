//! Hardware Abstraction Layer (HAL) for the `SoulAudio` DAP USB audio path
//!
//! This crate provides the trait-based contracts between the USB Audio Class
//! driver and the collaborators it does not own, enabling development and
//! testing without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Firmware composition root
//!         ↓
//! Feature Layers (usb-audio, playback)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Hardware Layer (USB OTG core, SAI/DMA, I²C codec)
//! ```
//!
//! # Collaborator contracts
//!
//! - [`UsbCore`] - endpoint allocation and isochronous transfer submission
//! - [`PlaybackSink`] - non-blocking PCM hand-off to the playback pipeline
//! - [`CodecControl`] - fire-and-forget mute / volume writes to the DAC
//!
//! # Features
//!
//! - `std`: Enable the recording mocks in [`mocks`] (for testing)
//! - `defmt`: Enable defmt derives
//!
//! # Example
//!
//! ```
//! use platform::{Ingest, PlaybackSink};
//!
//! fn forward<P: PlaybackSink>(sink: &mut P, packet: &[u8]) -> bool {
//!     sink.accept(packet) == Ingest::Accepted
//! }
//! ```

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
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![allow(clippy::doc_markdown)] // register names and hex values in doc comments
#![allow(clippy::must_use_candidate)] // accessors: callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod audio;
pub mod audio_types;
pub mod config;
pub mod usb;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

// Re-export the collaborator traits
pub use audio::{AudioConfig, CodecControl, Ingest, PlaybackSink};
pub use audio_types::{AttenuationRegister, OutOfRangeError, SampleRateHz, VolumeDb};

// Re-export USB wire types
pub use usb::{
    BufferId, Direction, EndpointAddress, EndpointType, Recipient, RequestKind, SetupPacket,
    TransferStatus, UsbCore,
};
