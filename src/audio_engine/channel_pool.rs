//! Fixed-capacity pool of playing sounds.
//!
//! Live channels occupy the front of the pool; anything past [`ChannelPool::len`]
//! does not exist as far as mixing is concerned. Retired channels are removed by
//! swapping in the last live channel, so order inside the pool carries no meaning.

use crate::audio_engine::constants::MIX_CHANNELS;
use crate::audio_engine::sound::SoundAsset;
use crate::audio_engine::submission_queue::PlayRequest;

/// A single playing sound with its read position.
#[derive(Debug)]
pub struct Channel {
    sound: SoundAsset,
    cursor: usize,
    looping: bool,
}

impl Channel {
    pub fn new(sound: SoundAsset, looping: bool) -> Self {
        Self {
            sound,
            cursor: 0,
            looping,
        }
    }

    /// Read position in samples. Always `<= self.len()`.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Total length in samples.
    pub fn len(&self) -> usize {
        self.sound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sound.is_empty()
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn is_finished(&self) -> bool {
        self.cursor == self.sound.len()
    }

    /// Adds this channel's next samples onto `out` with saturation.
    ///
    /// A looping channel that hits its end before `out` is full continues from
    /// sample 0 in the same call. Returns the number of samples mixed.
    pub fn mix_into(&mut self, out: &mut [i16]) -> usize {
        let samples = self.sound.samples();
        let mut written = 0;

        while written < out.len() && self.cursor < samples.len() {
            let n = (samples.len() - self.cursor).min(out.len() - written);
            saturating_mix(
                &mut out[written..written + n],
                &samples[self.cursor..self.cursor + n],
            );
            self.cursor += n;
            written += n;

            if self.looping && self.cursor == samples.len() && written < out.len() {
                self.cursor = 0;
            }
        }

        written
    }

    fn rewind(&mut self) {
        self.cursor = 0;
    }
}

/// Adds `src` onto `dst` sample by sample, clamping to the `i16` range.
pub fn saturating_mix(dst: &mut [i16], src: &[i16]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d = d.saturating_add(*s);
    }
}

/// Bounded set of active channels, owned by the mixer thread.
pub struct ChannelPool {
    channels: Vec<Channel>,
}

impl ChannelPool {
    /// Creates an empty pool with room for [`MIX_CHANNELS`] channels.
    pub fn new() -> Self {
        Self {
            channels: Vec::with_capacity(MIX_CHANNELS),
        }
    }

    /// Starts a new channel at cursor 0, handing the request back if the pool is full.
    pub fn admit(&mut self, request: PlayRequest) -> Result<(), PlayRequest> {
        if self.is_full() {
            return Err(request);
        }

        self.channels
            .push(Channel::new(request.sound, request.looping));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.channels.len() >= MIX_CHANNELS
    }

    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.iter()
    }

    /// Mixes every live channel into `out`.
    pub fn accumulate(&mut self, out: &mut [i16]) {
        for channel in &mut self.channels {
            channel.mix_into(out);
        }
    }

    /// Restarts finished looping channels and removes finished one-shots.
    ///
    /// Returns the number of channels removed.
    pub fn retire(&mut self) -> usize {
        let mut removed = 0;

        for index in (0..self.channels.len()).rev() {
            let channel = &mut self.channels[index];
            if !channel.is_finished() {
                continue;
            }

            if channel.is_looping() {
                channel.rewind();
            } else {
                self.channels.swap_remove(index);
                removed += 1;
            }
        }

        removed
    }
}

impl Default for ChannelPool {
    fn default() -> Self {
        Self::new()
    }
}
