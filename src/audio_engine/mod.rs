//! Audio Engine Module
//!
//! This module provides sound-effect mixing and playback for the game.
//! It is organized into sub-modules, each with a specific responsibility:
//!
//! - [`audio_stream`]: CPAL output stream behind the blocking device interface
//! - [`constants`]: Configuration constants and limits
//! - [`device`]: The device trait the mixer thread writes to
//! - [`errors`]: Audio-specific error types
//! - [`sound`]: Shared PCM sound buffers
//! - [`submission_queue`]: Bounded hand-off of play requests
//! - [`channel_pool`]: Fixed set of playing channels and saturating mixing
//! - [`mixer`]: The per-block mixer and the mixer thread loop
//! - [`sample_loader`]: Audio file loading and decoding
//!
//! The main [`AudioEngine`] struct owns the mixer thread and is the only thing the
//! game needs to talk to.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, mpsc};
use std::thread::{self, JoinHandle};

use crate::audio_engine::audio_stream::{CpalOutputDevice, setup_logger};
use crate::audio_engine::constants::{DEVICE_BUFFER_FRAMES, MIX_BLOCK_FRAMES, MIX_SAMPLE_RATE};
use crate::audio_engine::device::AudioDevice;
use crate::audio_engine::errors::{AudioInitError, DeviceError};
use crate::audio_engine::mixer::{Mixer, run_mixer_loop};
use crate::audio_engine::sound::SoundAsset;
use crate::audio_engine::stats::{MixerStats, MixerStatsSnapshot};
use crate::audio_engine::submission_queue::SubmissionQueue;

pub mod audio_stream;
pub mod channel_pool;
pub mod constants;
pub mod device;
pub mod errors;
pub mod mixer;
pub mod sample_loader;
pub mod sound;
pub mod stats;
pub mod submission_queue;

mod channels;
mod resample;

/// Output format and pacing settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioConfig {
    /// Output sample rate in Hz. Sounds are expected at this rate.
    pub sample_rate: u32,
    /// Frames mixed per iteration of the mixer thread.
    pub block_frames: usize,
    /// Fixed buffer size requested from the output device, in frames.
    pub device_buffer_frames: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: MIX_SAMPLE_RATE,
            block_frames: MIX_BLOCK_FRAMES,
            device_buffer_frames: DEVICE_BUFFER_FRAMES,
        }
    }
}

impl AudioConfig {
    /// Rejects settings under which the mixer could never produce or pace audio.
    pub fn validate(&self) -> Result<(), AudioInitError> {
        if self.sample_rate == 0 {
            return Err(AudioInitError::InvalidConfig("sample_rate must be non-zero"));
        }
        if self.block_frames == 0 {
            return Err(AudioInitError::InvalidConfig("block_frames must be non-zero"));
        }
        if self.device_buffer_frames == 0 {
            return Err(AudioInitError::InvalidConfig(
                "device_buffer_frames must be non-zero",
            ));
        }
        Ok(())
    }
}

/// Handles held while the mixer thread is alive.
struct MixerHandle {
    queue: Arc<Mutex<SubmissionQueue>>,
    stop: Arc<AtomicBool>,
    stats: Arc<MixerStats>,
    thread: JoinHandle<()>,
}

enum EngineState {
    /// Not started yet.
    Idle,
    Running(MixerHandle),
    /// Start-up failed; the engine stays silent for good.
    Failed,
    Closed,
}

/// Sound-effect playback with a dedicated mixer thread.
///
/// Failure to start is never fatal: [`AudioEngine::init_audio`] reports it and every
/// later [`AudioEngine::play_sound`] quietly does nothing.
pub struct AudioEngine {
    config: AudioConfig,
    state: EngineState,
}

impl AudioEngine {
    /// Create a new AudioEngine with the default configuration. No device is opened yet.
    pub fn new() -> Self {
        Self::with_config(AudioConfig::default())
    }

    pub fn with_config(config: AudioConfig) -> Self {
        Self {
            config,
            state: EngineState::Idle,
        }
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    /// Opens the default output device and starts the mixer thread.
    ///
    /// Returns `false` if audio could not be started; the engine then stays inert.
    pub fn init_audio(&mut self) -> bool {
        let config = self.config;
        self.init_audio_with(move || CpalOutputDevice::open(&config))
    }

    /// Starts the mixer thread with a device produced by `open_device`.
    ///
    /// `open_device` runs on the mixer thread, which keeps the device for its whole
    /// life and closes it on shutdown.
    pub fn init_audio_with<D, F>(&mut self, open_device: F) -> bool
    where
        D: AudioDevice,
        F: FnOnce() -> Result<D, DeviceError> + Send + 'static,
    {
        setup_logger();

        match self.state {
            EngineState::Idle => {}
            EngineState::Running(_) => {
                log::warn!("Audio already running");
                return true;
            }
            EngineState::Failed | EngineState::Closed => {
                log::debug!("Audio unavailable, not starting again");
                return false;
            }
        }

        if let Err(err) = self.config.validate() {
            log::error!("Audio disabled: {err}");
            self.state = EngineState::Failed;
            return false;
        }

        match start_mixer(self.config, open_device) {
            Ok(handle) => {
                log::info!(
                    "Audio started ({} Hz, {} frame blocks)",
                    self.config.sample_rate,
                    self.config.block_frames
                );
                self.state = EngineState::Running(handle);
                true
            }
            Err(err) => {
                log::error!("Audio disabled: {err}");
                self.state = EngineState::Failed;
                false
            }
        }
    }

    /// Queues `sound` for playback on the next mixer iteration.
    ///
    /// Never blocks beyond a short critical section. Returns `false` if the request
    /// was dropped: audio not running, queue full, or an empty sound.
    pub fn play_sound(&self, sound: &SoundAsset, looping: bool) -> bool {
        let EngineState::Running(handle) = &self.state else {
            return false;
        };

        let accepted = handle
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .enqueue(sound, looping);

        if !accepted {
            log::debug!("Submission queue full, dropping sound");
            handle.stats.record_dropped(1);
        }
        accepted
    }

    /// Stops the mixer thread and closes the device.
    ///
    /// Safe to call more than once; afterwards [`AudioEngine::play_sound`] is a no-op.
    pub fn close_audio(&mut self) {
        let state = std::mem::replace(&mut self.state, EngineState::Closed);
        let EngineState::Running(handle) = state else {
            return;
        };

        handle.stop.store(true, Ordering::Release);
        if handle.thread.join().is_err() {
            log::error!("Mixer thread panicked");
        }
        log::info!("Audio stopped");
    }

    /// Whether the mixer thread is running.
    pub fn is_running(&self) -> bool {
        matches!(self.state, EngineState::Running(_))
    }

    /// Current mixer counters; all zero unless running.
    pub fn stats(&self) -> MixerStatsSnapshot {
        match &self.state {
            EngineState::Running(handle) => handle.stats.snapshot(),
            _ => MixerStatsSnapshot::default(),
        }
    }
}

impl Default for AudioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.close_audio();
    }
}

/// Spawns the mixer thread and waits until it has opened the device.
fn start_mixer<D, F>(config: AudioConfig, open_device: F) -> Result<MixerHandle, AudioInitError>
where
    D: AudioDevice,
    F: FnOnce() -> Result<D, DeviceError> + Send + 'static,
{
    let queue = Arc::new(Mutex::new(SubmissionQueue::new()));
    let stop = Arc::new(AtomicBool::new(false));
    let stats = Arc::new(MixerStats::default());
    let (ready_tx, ready_rx) = mpsc::channel::<Result<(), DeviceError>>();

    let thread = {
        let queue = Arc::clone(&queue);
        let stop = Arc::clone(&stop);
        let stats = Arc::clone(&stats);

        thread::Builder::new()
            .name("audio-mixer".to_string())
            .spawn(move || {
                let device = match open_device() {
                    Ok(device) => device,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));

                let mixer = Mixer::new(config.block_frames);
                run_mixer_loop(device, mixer, &queue, &stop, &stats);
            })?
    };

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(MixerHandle {
            queue,
            stop,
            stats,
            thread,
        }),
        Ok(Err(err)) => {
            let _ = thread.join();
            Err(AudioInitError::Device(err))
        }
        Err(_) => {
            let _ = thread.join();
            Err(AudioInitError::Handshake)
        }
    }
}
