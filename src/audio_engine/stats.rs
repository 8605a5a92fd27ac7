//! Lock-free counters describing what the mixer thread has been doing.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counters shared between the mixer thread and the rest of the application.
#[derive(Debug, Default)]
pub struct MixerStats {
    active_channels: AtomicUsize,
    dropped_requests: AtomicU64,
    device_errors: AtomicU64,
    blocks_written: AtomicU64,
}

/// Point-in-time copy of [`MixerStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MixerStatsSnapshot {
    /// Channels playing after the most recent mix iteration.
    pub active_channels: usize,
    /// Play requests discarded because the queue or the channel pool was full.
    pub dropped_requests: u64,
    /// Device writes that failed and were recovered by re-preparing.
    pub device_errors: u64,
    /// Blocks successfully handed to the device.
    pub blocks_written: u64,
}

impl MixerStats {
    pub fn set_active_channels(&self, count: usize) {
        self.active_channels.store(count, Ordering::Relaxed);
    }

    pub fn record_dropped(&self, count: usize) {
        self.dropped_requests
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_device_error(&self) {
        self.device_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_block_written(&self) {
        self.blocks_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MixerStatsSnapshot {
        MixerStatsSnapshot {
            active_channels: self.active_channels.load(Ordering::Relaxed),
            dropped_requests: self.dropped_requests.load(Ordering::Relaxed),
            device_errors: self.device_errors.load(Ordering::Relaxed),
            blocks_written: self.blocks_written.load(Ordering::Relaxed),
        }
    }
}
