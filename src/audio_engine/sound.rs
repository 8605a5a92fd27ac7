//! Shared PCM sound buffers.
//!
//! A [`SoundAsset`] is what the game layer loads once and hands to
//! [`AudioEngine::play_sound`](crate::AudioEngine::play_sound) as often as it likes.
//! Cloning is cheap: every clone points at the same immutable sample data, so the
//! mixer can keep a sound alive while it plays without ever owning or freeing it.

use std::sync::Arc;

use crate::audio_engine::constants::OUTPUT_CHANNELS;

/// Immutable 16-bit interleaved stereo PCM at the mix sample rate.
#[derive(Debug, Clone)]
pub struct SoundAsset {
    samples: Arc<[i16]>,
}

impl SoundAsset {
    /// Creates a sound from interleaved stereo samples.
    ///
    /// A trailing half frame is dropped so the buffer always holds whole frames.
    pub fn from_samples(mut samples: Vec<i16>) -> Self {
        let whole = samples.len() - samples.len() % OUTPUT_CHANNELS;
        samples.truncate(whole);

        Self {
            samples: Arc::from(samples.into_boxed_slice()),
        }
    }

    /// Creates a sound from `[left, right]` frames.
    pub fn from_frames(frames: &[[i16; OUTPUT_CHANNELS]]) -> Self {
        Self {
            samples: frames.iter().flatten().copied().collect(),
        }
    }

    /// Interleaved sample data.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Length in samples (not frames).
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length in stereo frames.
    pub fn frames(&self) -> usize {
        self.samples.len() / OUTPUT_CHANNELS
    }

    /// Whether two handles refer to the same sample data.
    pub fn ptr_eq(&self, other: &SoundAsset) -> bool {
        Arc::ptr_eq(&self.samples, &other.samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sound_from_samples() {
        let sound = SoundAsset::from_samples(vec![1, -1, 2, -2]);

        assert_eq!(sound.len(), 4);
        assert_eq!(sound.frames(), 2);
        assert_eq!(sound.samples(), &[1, -1, 2, -2]);
    }

    #[test]
    fn test_sound_drops_half_frame() {
        let sound = SoundAsset::from_samples(vec![1, 2, 3]);

        assert_eq!(sound.samples(), &[1, 2]);
        assert_eq!(sound.frames(), 1);
    }

    #[test]
    fn test_sound_from_frames() {
        let sound = SoundAsset::from_frames(&[[10, 20], [30, 40]]);

        assert_eq!(sound.samples(), &[10, 20, 30, 40]);
    }

    #[test]
    fn test_clones_share_sample_data() {
        let sound = SoundAsset::from_samples(vec![0; 8]);
        let clone = sound.clone();
        let other = SoundAsset::from_samples(vec![0; 8]);

        assert!(sound.ptr_eq(&clone));
        assert!(!sound.ptr_eq(&other));
    }

    #[test]
    fn test_empty_sound() {
        let sound = SoundAsset::from_samples(Vec::new());

        assert!(sound.is_empty());
        assert_eq!(sound.frames(), 0);
    }
}
