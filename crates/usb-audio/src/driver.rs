//! The audio function driver instance.
//!
//! One [`UacDriver`] owns all per-function state: the feature unit, the
//! streaming interface's alt setting, the pending control handshake and
//! the receive slot pool. The USB core calls into it from two contexts:
//!
//! - the event context (registration, descriptors, control requests,
//!   connect/disconnect), which logs;
//! - the completion context ([`UacDriver::transfer_complete`]), which does
//!   not.
//!
//! Both take `&mut self`; the firmware serialises them (same executor, or
//! the completion interrupt masked around event-context calls).
//!
//! The receive slots live inside the driver and are identified to the core
//! by address, so the driver must not move while any slot is busy. Firmware
//! keeps it in a `static`.

use platform::{
    BufferId, CodecControl, Direction, EndpointAddress, EndpointType, PlaybackSink, SetupPacket,
    TransferStatus, UsbCore,
};

use crate::config::{AudioFormat, AudioFunctionConfig, STRING_COUNT};
use crate::control::{self, AudioRequest, ControlOutcome, FeatureRequest, PendingControl};
use crate::descriptor;
use crate::error::UacError;
use crate::feature::FeatureState;
use crate::interface::{AltSetting, InterfaceStateManager, Transition};
use crate::logging::{debug, info, warn};
use crate::strings::{self, StringDescriptor};
use crate::transfer::{Completion, SlotPool, TransferStats, SLOT_BUFFER_SIZE};

/// USB Audio Class 1.0 playback function.
///
/// `SLOTS` receive buffers are kept in flight while streaming; two is
/// enough for double buffering at full speed.
pub struct UacDriver<U, P, C, const SLOTS: usize = 2>
where
    U: UsbCore,
    P: PlaybackSink,
    C: CodecControl,
{
    usb: U,
    sink: P,
    codec: C,
    format: AudioFormat,
    control_interface: Option<u8>,
    endpoint: Option<EndpointAddress>,
    first_string: Option<u8>,
    feature: FeatureState,
    interface: InterfaceStateManager,
    pending: PendingControl,
    slots: SlotPool<SLOTS>,
}

impl<U, P, C, const SLOTS: usize> UacDriver<U, P, C, SLOTS>
where
    U: UsbCore,
    P: PlaybackSink,
    C: CodecControl,
{
    const AT_LEAST_TWO_SLOTS: () = assert!(SLOTS >= 2, "need at least two receive slots");

    /// Build the driver around its collaborators. No USB traffic happens
    /// until the core registers the function.
    pub fn new(usb: U, sink: P, codec: C, format: AudioFormat) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::AT_LEAST_TWO_SLOTS;
        Self {
            usb,
            sink,
            codec,
            format,
            control_interface: None,
            endpoint: None,
            first_string: None,
            feature: FeatureState::new(format.channels()),
            interface: InterfaceStateManager::new(),
            pending: PendingControl::Idle,
            slots: SlotPool::new(format.max_packet_size()),
        }
    }

    /// One-time initialisation at firmware boot.
    ///
    /// Puts every per-connection piece of state in its power-on condition.
    /// Numbering assigned by the core is kept.
    pub fn init(&mut self) {
        self.feature.reset();
        self.interface.reset();
        self.pending = PendingControl::Idle;
        self.slots.release_all();
        self.slots.reset_stats();
        info!(
            "usb audio: {} Hz, {} ch, {} bit, {} B/packet",
            self.format.sample_rate().get(),
            self.format.channels(),
            self.format.bits_per_sample(),
            self.format.max_packet_size()
        );
    }

    // ── Registration ─────────────────────────────────────────────────────────

    /// Reserve the isochronous OUT endpoint. Called once at class-driver
    /// registration; later calls return the same endpoint.
    pub fn request_endpoints(&mut self) -> Result<EndpointAddress, UacError> {
        if let Some(ep) = self.endpoint {
            return Ok(ep);
        }
        let mps = self.format.max_packet_size();
        let too_large = UacError::PacketTooLarge {
            requested: mps,
            limit: SLOT_BUFFER_SIZE,
        };
        if mps > SLOT_BUFFER_SIZE {
            return Err(too_large);
        }
        let mps = u16::try_from(mps).map_err(|_| too_large)?;
        let ep = self
            .usb
            .alloc_endpoint(EndpointType::Isochronous, Direction::Out, mps)
            .ok_or(UacError::EndpointUnavailable)?;
        debug!("usb audio: iso OUT endpoint {}", ep.raw());
        self.endpoint = Some(ep);
        Ok(ep)
    }

    /// Take interfaces `n` (control) and `n + 1` (streaming).
    ///
    /// Returns the next free interface number.
    pub fn set_first_interface(&mut self, n: u8) -> u8 {
        self.control_interface = Some(n);
        self.interface.assign(n.saturating_add(1));
        n.saturating_add(2)
    }

    /// Take string indices `n ..n + STRING_COUNT`.
    ///
    /// Returns the next free string index.
    pub fn set_first_string_index(&mut self, n: u8) -> u8 {
        self.first_string = Some(n);
        n.saturating_add(STRING_COUNT)
    }

    /// Format plus numbering, once every number has been assigned.
    pub fn function_config(&self) -> Result<AudioFunctionConfig, UacError> {
        match (
            self.control_interface,
            self.interface.interface(),
            self.endpoint,
            self.first_string,
        ) {
            (Some(control_interface), Some(streaming_interface), Some(endpoint), Some(first_string)) => {
                Ok(AudioFunctionConfig {
                    format: self.format,
                    control_interface,
                    streaming_interface,
                    endpoint,
                    first_string,
                })
            }
            _ => Err(UacError::NumberingNotAssigned),
        }
    }

    /// Write the function's configuration descriptor fragment into `dest`.
    ///
    /// `max_packet_size` is normally [`AudioFormat::max_packet_size`]; it may
    /// not exceed the length each receive slot lends the core.
    pub fn get_config_descriptor(
        &self,
        dest: &mut [u8],
        max_packet_size: usize,
    ) -> Result<usize, UacError> {
        let cfg = self.function_config()?;
        let limit = self.slots.packet_len();
        if max_packet_size > limit {
            return Err(UacError::PacketTooLarge {
                requested: max_packet_size,
                limit,
            });
        }
        descriptor::build_config_descriptor(&cfg, max_packet_size, dest)
    }

    /// String descriptor for `index`, if it is one of ours.
    pub fn get_string_descriptor(&self, index: u8) -> Option<StringDescriptor> {
        let text = strings::lookup(self.first_string?, index)?;
        strings::encode(text)
    }

    // ── Connection lifecycle ─────────────────────────────────────────────────

    /// The host configured the device: start from defaults.
    ///
    /// Feature state returns to unmuted 0 dB and is pushed to the codec;
    /// the stream is inactive; counters are zeroed.
    pub fn init_connection(&mut self) {
        self.reclaim_slots();
        if self.interface.is_operational() {
            self.sink.stop();
        }
        self.interface.reset();
        self.pending = PendingControl::Idle;
        self.feature.reset();
        self.slots.reset_stats();
        self.sync_codec();
        info!("usb audio: connection initialised");
    }

    /// Bus reset or cable pulled.
    ///
    /// In-flight receptions are cancelled and every slot is taken back;
    /// the pipeline is stopped if it was running.
    pub fn disconnect(&mut self) {
        self.reclaim_slots();
        if self.interface.is_operational() {
            self.sink.stop();
        }
        self.interface.reset();
        self.pending = PendingControl::Idle;
        self.feature.reset();
        info!("usb audio: disconnected");
    }

    fn reclaim_slots(&mut self) {
        if self.slots.busy_count() > 0 {
            if let Some(ep) = self.endpoint {
                self.usb.cancel(ep);
            }
        }
        self.slots.release_all();
    }

    fn sync_codec(&mut self) {
        self.codec.set_mute(self.feature.is_muted());
        for channel in 0..=self.feature.channels() {
            if let Some(volume) = self.feature.volume(channel) {
                self.codec.set_volume(channel, volume);
            }
        }
    }

    // ── Streaming interface ──────────────────────────────────────────────────

    /// Select alt setting `alt` on the streaming interface.
    ///
    /// Going operational arms every idle slot and starts the pipeline;
    /// going inactive stops the pipeline and lets in-flight receptions
    /// drain as stale completions. Re-selecting the current setting does
    /// nothing.
    pub fn set_interface(&mut self, interface: u8, alt: u8) -> Result<(), UacError> {
        self.interface.current(interface)?;
        AltSetting::from_raw(alt)?;
        let ep = self.endpoint.ok_or(UacError::NumberingNotAssigned)?;

        match self.interface.request(interface, alt)? {
            Transition::Activate => {
                let armed = self.slots.arm_idle(&mut self.usb, ep);
                self.sink.start();
                info!("usb audio: streaming, {} slots armed", armed);
            }
            Transition::Deactivate => {
                self.sink.stop();
                info!("usb audio: stream idle");
            }
            Transition::Unchanged => {
                debug!("usb audio: alt {} already selected", alt);
            }
        }
        Ok(())
    }

    /// Last selected alt setting of the streaming interface.
    pub fn get_interface(&self, interface: u8) -> Result<u8, UacError> {
        self.interface.current(interface).map(AltSetting::raw)
    }

    // ── Control pipe ─────────────────────────────────────────────────────────

    /// Handle a setup packet addressed to this function.
    ///
    /// `GET_*` answers are written to `dest`. A `SET_CUR` is accepted with
    /// `Handled(0)` and completed by [`control_data_stage`](Self::control_data_stage).
    /// A new setup discards any `SET_CUR` still waiting for its data.
    pub fn control_request(&mut self, req: &SetupPacket, dest: &mut [u8]) -> ControlOutcome {
        if !self.pending.take().is_idle() {
            debug!("usb audio: pending SET_CUR superseded");
        }
        let (Some(control_interface), Some(streaming_interface)) =
            (self.control_interface, self.interface.interface())
        else {
            return ControlOutcome::Unhandled;
        };
        let Some(request) = control::decode(req, control_interface, streaming_interface) else {
            debug!(
                "usb audio: unsupported request {} wValue {} wIndex {}",
                req.request,
                req.value,
                req.index
            );
            return ControlOutcome::Unhandled;
        };

        match request {
            AudioRequest::Feature {
                request: FeatureRequest::SetCur,
                selector,
                channel,
            } => {
                if !self.feature.supports(selector, channel) {
                    debug!("usb audio: SET_CUR on missing channel {}", channel);
                    return ControlOutcome::Unhandled;
                }
                self.pending = PendingControl::AwaitingSetData {
                    selector,
                    channel,
                    length: selector.payload_len(),
                };
                ControlOutcome::Handled(0)
            }
            AudioRequest::Feature {
                request,
                selector,
                channel,
            } => control::answer_get(&self.feature, request, selector, channel, dest),
            AudioRequest::GetInterface { interface } => {
                let alt = if interface == streaming_interface {
                    self.interface.current(interface).map(AltSetting::raw)
                } else {
                    Ok(0)
                };
                match (alt, dest.first_mut()) {
                    (Ok(alt), Some(out)) => {
                        *out = alt;
                        ControlOutcome::Handled(1)
                    }
                    _ => ControlOutcome::Unhandled,
                }
            }
            AudioRequest::SetInterface { interface, alt } => {
                if interface == control_interface {
                    return if alt == 0 {
                        ControlOutcome::Handled(0)
                    } else {
                        ControlOutcome::Unhandled
                    };
                }
                match self.set_interface(interface, alt) {
                    Ok(()) => ControlOutcome::Handled(0),
                    Err(e) => {
                        warn!("usb audio: SET_INTERFACE refused: {}", e);
                        ControlOutcome::Unhandled
                    }
                }
            }
        }
    }

    /// Complete a pending `SET_CUR` with its OUT data stage.
    ///
    /// `Unhandled` if no `SET_CUR` is pending or `data` has the wrong
    /// length; the pending request is consumed either way and nothing is
    /// changed on failure.
    pub fn control_data_stage(&mut self, data: &[u8]) -> ControlOutcome {
        let PendingControl::AwaitingSetData {
            selector,
            channel,
            length,
        } = self.pending.take()
        else {
            debug!("usb audio: data stage without SET_CUR");
            return ControlOutcome::Unhandled;
        };
        if data.len() != length {
            warn!(
                "usb audio: SET_CUR data stage {} bytes, expected {}",
                data.len(),
                length
            );
            return ControlOutcome::Unhandled;
        }
        let outcome = control::apply_set(&mut self.feature, &mut self.codec, selector, channel, data);
        if outcome != ControlOutcome::Unhandled {
            debug!(
                "usb audio: SET_CUR ch {} muted {} volume {}",
                channel,
                self.feature.is_muted(),
                self.feature.volume(channel).map_or(0, platform::VolumeDb::raw)
            );
        }
        outcome
    }

    // ── Completion context ───────────────────────────────────────────────────

    /// A reception on `ep` finished.
    ///
    /// Only the function's isochronous OUT endpoint is handled; anything
    /// else is [`Completion::Ignored`]. Never logs, allocates or blocks.
    pub fn transfer_complete(
        &mut self,
        ep: EndpointAddress,
        dir: Direction,
        status: TransferStatus,
        length: usize,
        buffer: BufferId,
    ) -> Completion {
        if self.endpoint != Some(ep) || dir != Direction::Out {
            return Completion::Ignored;
        }
        let operational = self.interface.is_operational();
        self.slots.complete(
            &mut self.usb,
            &mut self.sink,
            ep,
            status,
            length,
            buffer,
            operational,
        )
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    /// Stream format.
    pub fn format(&self) -> &AudioFormat {
        &self.format
    }

    /// Transfer counters for the current connection.
    pub fn stats(&self) -> TransferStats {
        self.slots.stats()
    }

    /// Feature unit state.
    pub fn feature_state(&self) -> &FeatureState {
        &self.feature
    }

    /// Control handshake state.
    pub fn pending_control(&self) -> PendingControl {
        self.pending
    }

    /// Receive slots currently lent to the USB core.
    pub fn busy_slots(&self) -> usize {
        self.slots.busy_count()
    }

    /// Isochronous OUT endpoint, once requested.
    pub fn endpoint(&self) -> Option<EndpointAddress> {
        self.endpoint
    }

    /// USB core collaborator.
    pub fn usb(&self) -> &U {
        &self.usb
    }

    /// USB core collaborator, mutably.
    pub fn usb_mut(&mut self) -> &mut U {
        &mut self.usb
    }

    /// Playback pipeline collaborator.
    pub fn sink(&self) -> &P {
        &self.sink
    }

    /// Playback pipeline collaborator, mutably.
    pub fn sink_mut(&mut self) -> &mut P {
        &mut self.sink
    }

    /// Codec-control collaborator.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Codec-control collaborator, mutably.
    pub fn codec_mut(&mut self) -> &mut C {
        &mut self.codec
    }

    /// Write `data` into the in-flight slot `buffer` as the core's DMA would.
    #[cfg(any(test, feature = "std"))]
    pub fn fill_in_flight(&mut self, buffer: BufferId, data: &[u8]) -> bool {
        self.slots.fill_in_flight(buffer, data)
    }
}
