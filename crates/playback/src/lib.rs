//! Device-side playback pipeline: USB PCM FIFO and ES9038Q2M volume shadow
#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]

pub mod pipeline;
pub mod ring_buffer;
pub mod volume;

pub use pipeline::{PipelineState, PipelineStats, UsbPlaybackPipeline};
pub use ring_buffer::RingBuffer;
pub use volume::{DacVolumeShadow, RegisterWrite, REG_ATT_L, REG_ATT_R};

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
#[allow(clippy::arithmetic_side_effects)]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::expect_used)]
mod tests {
    /// Ring buffer tests
    mod ring_buffer_tests {
        use crate::ring_buffer::RingBuffer;

        #[test]
        fn test_ring_buffer_write_then_read() {
            let mut rb: RingBuffer<64> = RingBuffer::new();
            let data: [u8; 16] = core::array::from_fn(|i| i as u8);
            rb.write_slice(&data).expect("write should succeed");
            let mut out = [0u8; 16];
            let n = rb.read_slice(&mut out);
            assert_eq!(n, 16);
            assert_eq!(out, data);
        }

        #[test]
        fn test_ring_buffer_available_after_write() {
            let mut rb: RingBuffer<64> = RingBuffer::new();
            rb.write_slice(&[1u8; 20]).expect("write should succeed");
            assert_eq!(rb.available(), 20);
            assert_eq!(rb.free(), 44);
        }

        #[test]
        fn test_ring_buffer_full_returns_err() {
            let mut rb: RingBuffer<8> = RingBuffer::new();
            rb.write_slice(&[0u8; 8]).expect("filling to capacity should succeed");
            assert!(rb.is_full());
            let result = rb.write_slice(&[42u8]);
            assert!(result.is_err(), "writing past capacity must fail");
        }

        #[test]
        fn test_ring_buffer_oversized_write_leaves_contents() {
            let mut rb: RingBuffer<8> = RingBuffer::new();
            rb.write_slice(&[7u8; 5]).expect("partial fill");
            assert!(rb.write_slice(&[9u8; 4]).is_err());
            assert_eq!(rb.available(), 5);
            let mut out = [0u8; 8];
            assert_eq!(rb.read_slice(&mut out), 5);
            assert_eq!(&out[..5], &[7u8; 5]);
        }

        #[test]
        fn test_ring_buffer_wraps_around() {
            let mut rb: RingBuffer<8> = RingBuffer::new();
            rb.write_slice(&[1u8; 8]).expect("initial fill");
            let mut half = [0u8; 4];
            assert_eq!(rb.read_slice(&mut half), 4);
            assert_eq!(half, [1u8; 4]);
            rb.write_slice(&[2u8; 4]).expect("wrap-around write");
            let mut rest = [0u8; 8];
            assert_eq!(rb.read_slice(&mut rest), 8);
            assert_eq!(&rest[..4], &[1u8; 4]);
            assert_eq!(&rest[4..], &[2u8; 4]);
        }

        #[test]
        fn test_ring_buffer_clear_empties() {
            let mut rb: RingBuffer<8> = RingBuffer::new();
            rb.write_slice(&[3u8; 6]).expect("fill");
            rb.clear();
            assert!(rb.is_empty());
            assert_eq!(rb.free(), rb.capacity());
        }
    }

    /// USB playback pipeline tests
    mod pipeline_tests {
        use crate::pipeline::{PipelineState, UsbPlaybackPipeline};
        use platform::{AudioConfig, Ingest, PlaybackSink};

        // 48 kHz stereo 16-bit: 192 bytes per 1 ms packet, 4 bytes per frame.
        const PACKET: usize = 192;

        fn pipeline() -> UsbPlaybackPipeline<1024> {
            UsbPlaybackPipeline::new(AudioConfig::default())
        }

        fn packet(byte: u8) -> [u8; PACKET] {
            [byte; PACKET]
        }

        #[test]
        fn test_starts_stopped_and_outputs_silence() {
            let mut p = pipeline();
            assert_eq!(p.state(), PipelineState::Stopped);
            let mut out = [0xAAu8; 64];
            assert_eq!(p.drain(&mut out), 0);
            assert!(out.iter().all(|&b| b == 0));
        }

        #[test]
        fn test_late_packets_while_stopped_are_counted_not_buffered() {
            let mut p = pipeline();
            assert_eq!(p.accept(&packet(1)), Ingest::Accepted);
            assert_eq!(p.stats().late_packets, 1);
            assert_eq!(p.buffered(), 0);
        }

        #[test]
        fn test_priming_threshold_is_half_fifo_frame_aligned() {
            let p: UsbPlaybackPipeline<1026> = UsbPlaybackPipeline::new(AudioConfig::default());
            assert_eq!(p.priming_threshold(), 512);
            let mono24 = AudioConfig {
                sample_rate: 48_000,
                channels: 1,
                bit_depth: 24,
            };
            let p: UsbPlaybackPipeline<1024> = UsbPlaybackPipeline::new(mono24);
            assert_eq!(p.priming_threshold(), 510);
        }

        #[test]
        fn test_priming_holds_audio_until_threshold() {
            let mut p = pipeline();
            p.start();
            assert_eq!(p.state(), PipelineState::Priming);
            p.accept(&packet(1));
            p.accept(&packet(2));
            let mut out = [0u8; 64];
            assert_eq!(p.drain(&mut out), 0, "still priming");
            p.accept(&packet(3));
            assert_eq!(p.state(), PipelineState::Running);
            assert_eq!(p.drain(&mut out), 64);
            assert!(out.iter().all(|&b| b == 1));
        }

        #[test]
        fn test_underrun_pads_silence_and_reprimes() {
            let mut p = pipeline();
            p.start();
            for i in 0..3 {
                p.accept(&packet(i + 1));
            }
            let mut out = [0xAAu8; 1024];
            let n = p.drain(&mut out);
            assert_eq!(n, 3 * PACKET);
            assert!(out[n..].iter().all(|&b| b == 0));
            assert_eq!(p.stats().underruns, 1);
            assert_eq!(p.state(), PipelineState::Priming);
        }

        #[test]
        fn test_drain_takes_whole_frames_only() {
            let mut p = pipeline();
            p.start();
            for _ in 0..3 {
                p.accept(&packet(5));
            }
            let mut out = [0xAAu8; 10];
            assert_eq!(p.drain(&mut out), 8);
            assert_eq!(&out[8..], &[0, 0]);
            assert_eq!(p.buffered(), 3 * PACKET - 8);
        }

        #[test]
        fn test_full_fifo_rejects_and_counts_overflow() {
            let mut p = pipeline();
            p.start();
            for _ in 0..5 {
                assert_eq!(p.accept(&packet(1)), Ingest::Accepted);
            }
            assert_eq!(p.accept(&packet(1)), Ingest::Rejected);
            assert_eq!(p.stats().overflows, 1);
            assert_eq!(p.buffered(), 5 * PACKET);
        }

        #[test]
        fn test_stop_flushes() {
            let mut p = pipeline();
            p.start();
            p.accept(&packet(1));
            p.stop();
            assert_eq!(p.state(), PipelineState::Stopped);
            assert_eq!(p.buffered(), 0);
        }

        #[test]
        fn test_restart_discards_previous_stream() {
            let mut p = pipeline();
            p.start();
            p.accept(&packet(1));
            p.start();
            assert_eq!(p.buffered(), 0);
            assert_eq!(p.state(), PipelineState::Priming);
        }
    }

    /// Volume shadow tests
    mod volume_tests {
        use crate::volume::{DacVolumeShadow, RegisterWrite, REG_ATT_L, REG_ATT_R};
        use platform::{CodecControl, VolumeDb};

        fn vol(raw: i16) -> VolumeDb {
            VolumeDb::try_new(raw).expect("on-grid test volume")
        }

        fn values(writes: [RegisterWrite; 2]) -> (u8, u8) {
            assert_eq!(writes[0].reg, REG_ATT_L);
            assert_eq!(writes[1].reg, REG_ATT_R);
            (writes[0].value, writes[1].value)
        }

        #[test]
        fn test_first_poll_pushes_unity() {
            let mut shadow = DacVolumeShadow::new(2);
            let writes = shadow.take_pending().expect("starts dirty");
            assert_eq!(values(writes), (0x00, 0x00));
            assert_eq!(shadow.take_pending(), None);
        }

        #[test]
        fn test_mute_writes_ff_to_both_channels() {
            let mut shadow = DacVolumeShadow::new(2);
            shadow.take_pending();
            shadow.set_mute(true);
            assert_eq!(values(shadow.take_pending().expect("dirty")), (0xFF, 0xFF));
        }

        #[test]
        fn test_master_and_trim_add() {
            let mut shadow = DacVolumeShadow::new(2);
            shadow.set_volume(0, vol(-1280)); // −5 dB → 10 steps
            shadow.set_volume(1, vol(-256)); // −1 dB → 2 steps
            shadow.set_volume(2, vol(-512)); // −2 dB → 4 steps
            assert_eq!(values(shadow.take_pending().expect("dirty")), (12, 14));
        }

        #[test]
        fn test_combined_attenuation_saturates() {
            let mut shadow = DacVolumeShadow::new(2);
            shadow.set_volume(0, VolumeDb::MIN);
            shadow.set_volume(1, VolumeDb::MIN);
            let (left, right) = values(shadow.registers());
            assert_eq!(left, 0xFF);
            assert_eq!(right, 160);
        }

        #[test]
        fn test_mono_channel_drives_both_outputs() {
            let mut shadow = DacVolumeShadow::new(1);
            shadow.set_volume(1, vol(-768));
            assert_eq!(values(shadow.registers()), (6, 6));
        }

        #[test]
        fn test_unchanged_value_stays_clean() {
            let mut shadow = DacVolumeShadow::new(2);
            shadow.take_pending();
            shadow.set_volume(1, VolumeDb::UNITY);
            shadow.set_mute(false);
            shadow.set_volume(5, vol(-128));
            assert!(!shadow.is_dirty());
        }

        #[test]
        fn test_unmute_restores_levels() {
            let mut shadow = DacVolumeShadow::new(2);
            shadow.set_volume(0, vol(-128));
            shadow.set_mute(true);
            shadow.set_mute(false);
            assert!(!shadow.is_muted());
            assert_eq!(values(shadow.registers()), (1, 1));
        }
    }
}
