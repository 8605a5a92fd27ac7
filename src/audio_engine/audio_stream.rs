//! Audio Stream Module
//!
//! This module adapts a CPAL output stream to the blocking [`AudioDevice`] interface:
//! - Stream initialization and configuration
//! - A real-time callback that drains a sample ring into the hardware buffer
//! - Underrun detection and recovery
//! - Logger setup for the audio subsystem

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Sample, Stream, StreamConfig};
use env_logger::{Builder, Env};
use rtrb::{Producer, RingBuffer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::audio_engine::AudioConfig;
use crate::audio_engine::constants::{
    DEVICE_RING_BLOCKS, DEVICE_WRITE_POLL_INTERVAL, DEVICE_WRITE_TIMEOUT, OUTPUT_CHANNELS,
};
use crate::audio_engine::device::AudioDevice;
use crate::audio_engine::errors::DeviceError;

/// Setup and configure the logger for audio operations
pub fn setup_logger() {
    // Users can override via `RUST_LOG`, e.g. `RUST_LOG=debug` when troubleshooting.
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .try_init()
        .unwrap_or(()); // Ignore initialization errors
}

/// State shared with the real-time callback.
struct StreamFlags {
    /// Set once a block has been written since the last prepare.
    primed: AtomicBool,
    /// Set by the callback when it ran out of samples while primed.
    underrun: AtomicBool,
}

/// [`AudioDevice`] backed by the host's default CPAL output device.
pub struct CpalOutputDevice {
    stream: Stream,
    producer: Producer<i16>,
    flags: Arc<StreamFlags>,
    write_timeout: Duration,
}

impl CpalOutputDevice {
    /// Opens the default output device as a 16-bit stereo stream at `config.sample_rate`.
    ///
    /// The stream is started immediately and plays silence until the first write.
    pub fn open(config: &AudioConfig) -> Result<Self, DeviceError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(DeviceError::NoDevice)?;

        log::info!(
            "Starting audio output... ({} ch@{} Hz, {} frame device buffer)",
            OUTPUT_CHANNELS,
            config.sample_rate,
            config.device_buffer_frames
        );

        let ring_samples = config.block_frames * OUTPUT_CHANNELS * DEVICE_RING_BLOCKS;
        let (producer, mut consumer) = RingBuffer::<i16>::new(ring_samples);

        let flags = Arc::new(StreamFlags {
            primed: AtomicBool::new(false),
            underrun: AtomicBool::new(false),
        });
        let callback_flags = Arc::clone(&flags);

        let stream_config = StreamConfig {
            channels: OUTPUT_CHANNELS as u16,
            sample_rate: config.sample_rate,
            buffer_size: BufferSize::Fixed(config.device_buffer_frames),
        };

        let stream = device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let mut starved = false;
                for out in data.iter_mut() {
                    *out = match consumer.pop() {
                        Ok(sample) => f32::from_sample(sample),
                        Err(_) => {
                            starved = true;
                            f32::EQUILIBRIUM
                        }
                    };
                }

                if starved && callback_flags.primed.load(Ordering::Acquire) {
                    callback_flags.underrun.store(true, Ordering::Release);
                }
            },
            |err| {
                log::error!("Audio stream error: {}", err);
            },
            None,
        )?;

        stream.play()?;

        Ok(Self {
            stream,
            producer,
            flags,
            write_timeout: DEVICE_WRITE_TIMEOUT,
        })
    }
}

impl AudioDevice for CpalOutputDevice {
    fn write(&mut self, samples: &[i16]) -> Result<(), DeviceError> {
        if self.flags.underrun.swap(false, Ordering::AcqRel) {
            return Err(DeviceError::Underrun);
        }

        let deadline = Instant::now() + self.write_timeout;
        let mut pending = samples;

        while !pending.is_empty() {
            if self.producer.is_abandoned() {
                return Err(DeviceError::Disconnected);
            }

            let free = self.producer.slots();
            if free == 0 {
                if Instant::now() >= deadline {
                    return Err(DeviceError::Timeout);
                }
                thread::sleep(DEVICE_WRITE_POLL_INTERVAL);
                continue;
            }

            let (now, later) = pending.split_at(free.min(pending.len()));
            for &sample in now {
                if self.producer.push(sample).is_err() {
                    return Err(DeviceError::Disconnected);
                }
            }
            pending = later;
        }

        self.flags.primed.store(true, Ordering::Release);
        Ok(())
    }

    fn prepare(&mut self) -> Result<(), DeviceError> {
        if self.producer.is_abandoned() {
            return Err(DeviceError::Disconnected);
        }

        self.flags.primed.store(false, Ordering::Release);
        self.flags.underrun.store(false, Ordering::Release);
        Ok(())
    }

    fn close(&mut self) {
        if let Err(err) = self.stream.pause() {
            log::warn!("{}", DeviceError::from(err));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_setup() {
        // Multiple calls should be safe (though only the first takes effect)
        setup_logger();
        setup_logger();
    }

    #[test]
    fn test_cpal_device_open_write_close() {
        // Actual stream creation requires audio hardware
        if cpal::default_host().default_output_device().is_none() {
            return;
        }

        let config = AudioConfig::default();
        let Ok(mut device) = CpalOutputDevice::open(&config) else {
            // Expected in many test environments
            return;
        };

        let block = vec![0i16; config.block_frames * OUTPUT_CHANNELS];
        let _ = device.write(&block);
        assert!(device.prepare().is_ok());
        device.close();
    }
}
