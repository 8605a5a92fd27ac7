//! Bounded hand-off of play requests from the game thread to the mixer thread.
//!
//! The queue lives behind the engine's single mutex. The producer only ever calls
//! [`SubmissionQueue::enqueue`]; the mixer empties it once per iteration with
//! [`SubmissionQueue::drain_into`].

use crate::audio_engine::channel_pool::ChannelPool;
use crate::audio_engine::constants::MIX_CHANNELS;
use crate::audio_engine::sound::SoundAsset;

/// A pending request to start a sound.
#[derive(Debug, Clone)]
pub struct PlayRequest {
    pub sound: SoundAsset,
    pub looping: bool,
}

/// Result of moving queued requests into the channel pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainOutcome {
    /// Requests that became active channels.
    pub admitted: usize,
    /// Requests discarded because the pool was full.
    pub dropped: usize,
}

/// Fixed-capacity queue of play requests.
pub struct SubmissionQueue {
    pending: Vec<PlayRequest>,
}

impl SubmissionQueue {
    pub fn new() -> Self {
        Self {
            pending: Vec::with_capacity(MIX_CHANNELS),
        }
    }

    /// Appends a play request if there is room.
    ///
    /// Returns `false` when the queue is full or the sound is empty; the request is
    /// dropped in both cases.
    pub fn enqueue(&mut self, sound: &SoundAsset, looping: bool) -> bool {
        if sound.is_empty() || self.pending.len() >= MIX_CHANNELS {
            return false;
        }

        self.pending.push(PlayRequest {
            sound: sound.clone(),
            looping,
        });
        true
    }

    /// Number of requests waiting for the next drain.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Moves every pending request into `pool`, as many as fit.
    ///
    /// Requests that find the pool full are discarded, and the queue is always
    /// empty afterwards.
    pub fn drain_into(&mut self, pool: &mut ChannelPool) -> DrainOutcome {
        let mut outcome = DrainOutcome::default();

        for request in self.pending.drain(..) {
            if pool.admit(request).is_ok() {
                outcome.admitted += 1;
            } else {
                outcome.dropped += 1;
            }
        }

        outcome
    }
}

impl Default for SubmissionQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sound(len: usize) -> SoundAsset {
        SoundAsset::from_samples(vec![100; len])
    }

    #[test]
    fn test_enqueue_accepts_until_full() {
        let mut queue = SubmissionQueue::new();
        let sound = sound(8);

        for _ in 0..MIX_CHANNELS {
            assert!(queue.enqueue(&sound, false));
        }

        assert!(!queue.enqueue(&sound, false));
        assert_eq!(queue.len(), MIX_CHANNELS);
    }

    #[test]
    fn test_enqueue_rejects_empty_sound() {
        let mut queue = SubmissionQueue::new();

        assert!(!queue.enqueue(&SoundAsset::from_samples(Vec::new()), true));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_drain_moves_requests_into_pool() {
        let mut queue = SubmissionQueue::new();
        let mut pool = ChannelPool::new();
        queue.enqueue(&sound(8), false);
        queue.enqueue(&sound(16), true);

        let outcome = queue.drain_into(&mut pool);

        assert_eq!(
            outcome,
            DrainOutcome {
                admitted: 2,
                dropped: 0
            }
        );
        assert!(queue.is_empty());
        assert_eq!(pool.len(), 2);
        assert!(pool.iter().all(|channel| channel.cursor() == 0));
    }

    #[test]
    fn test_drain_drops_what_does_not_fit() {
        let mut queue = SubmissionQueue::new();
        let mut pool = ChannelPool::new();
        let sound = sound(8);

        for _ in 0..MIX_CHANNELS - 2 {
            queue.enqueue(&sound, false);
        }
        queue.drain_into(&mut pool);

        for _ in 0..5 {
            queue.enqueue(&sound, false);
        }
        let outcome = queue.drain_into(&mut pool);

        assert_eq!(outcome.admitted, 2);
        assert_eq!(outcome.dropped, 3);
        assert_eq!(pool.len(), MIX_CHANNELS);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_overload_before_drain_admits_exactly_capacity() {
        let mut queue = SubmissionQueue::new();
        let mut pool = ChannelPool::new();

        let accepted = (0..MIX_CHANNELS + 5)
            .filter(|i| queue.enqueue(&sound(8 + i * 2), false))
            .count();
        let outcome = queue.drain_into(&mut pool);

        assert_eq!(accepted, MIX_CHANNELS);
        assert_eq!(outcome.admitted, MIX_CHANNELS);
        assert_eq!(pool.len(), MIX_CHANNELS);
        assert_eq!(queue.len(), 0);
    }
}
