//! Block mixer and the mixer thread loop.
//!
//! [`Mixer`] owns the channel pool and the output block. One call to
//! [`Mixer::mix_block`] is one iteration of the mixer thread: zero the block, drain
//! the submission queue, accumulate every channel with saturation, then retire
//! finished channels. [`run_mixer_loop`] repeats that and pushes each block to the
//! device until asked to stop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::audio_engine::channel_pool::ChannelPool;
use crate::audio_engine::constants::OUTPUT_CHANNELS;
use crate::audio_engine::device::AudioDevice;
use crate::audio_engine::stats::MixerStats;
use crate::audio_engine::submission_queue::{DrainOutcome, SubmissionQueue};

/// Fixed-size block mixer.
pub struct Mixer {
    pool: ChannelPool,
    output: Box<[i16]>,
}

impl Mixer {
    /// Creates a mixer producing `block_frames` stereo frames per iteration.
    ///
    /// A block is never shorter than one frame, so cursors always advance.
    pub fn new(block_frames: usize) -> Self {
        Self {
            pool: ChannelPool::new(),
            output: vec![0; block_frames.max(1) * OUTPUT_CHANNELS].into_boxed_slice(),
        }
    }

    /// Runs one mixer iteration and returns what the drain step did.
    ///
    /// The queue lock is held only while requests move into the pool.
    pub fn mix_block(&mut self, queue: &Mutex<SubmissionQueue>) -> DrainOutcome {
        self.output.fill(0);

        let outcome = {
            let mut queue = queue.lock().unwrap_or_else(PoisonError::into_inner);
            queue.drain_into(&mut self.pool)
        };

        self.pool.accumulate(&mut self.output);
        self.pool.retire();

        outcome
    }

    /// The block produced by the last call to [`Mixer::mix_block`].
    pub fn output(&self) -> &[i16] {
        &self.output
    }

    pub fn pool(&self) -> &ChannelPool {
        &self.pool
    }

    /// Number of channels still playing.
    pub fn active_channels(&self) -> usize {
        self.pool.len()
    }
}

/// Body of the mixer thread.
///
/// Mixes and writes blocks until `stop` is raised. A failed write re-prepares the
/// device and the loop carries on; the block that failed is lost. The device is
/// closed here, on the thread that owns it.
pub fn run_mixer_loop<D: AudioDevice>(
    mut device: D,
    mut mixer: Mixer,
    queue: &Mutex<SubmissionQueue>,
    stop: &AtomicBool,
    stats: &MixerStats,
) {
    log::debug!("Mixer thread running");

    while !stop.load(Ordering::Acquire) {
        let outcome = mixer.mix_block(queue);
        if outcome.dropped > 0 {
            log::debug!("Channel pool full, dropped {} sound(s)", outcome.dropped);
            stats.record_dropped(outcome.dropped);
        }
        stats.set_active_channels(mixer.active_channels());

        match device.write(mixer.output()) {
            Ok(()) => stats.record_block_written(),
            Err(err) => {
                log::warn!("Audio device write failed: {err}; re-preparing");
                stats.record_device_error();
                if let Err(err) = device.prepare() {
                    log::error!("Failed to re-prepare audio device: {err}");
                }
            }
        }
    }

    device.close();
    stats.set_active_channels(0);
    log::debug!("Mixer thread stopped");
}
