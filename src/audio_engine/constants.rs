//! Audio engine configuration constants and limits.

use std::time::Duration;

/// Maximum number of sounds that can play simultaneously.
///
/// Also the capacity of the submission queue.
pub const MIX_CHANNELS: usize = 32;

/// Sample rate every [`SoundAsset`](crate::SoundAsset) is stored at, in Hz.
pub const MIX_SAMPLE_RATE: u32 = 44_100;

/// Number of interleaved output channels (stereo).
pub const OUTPUT_CHANNELS: usize = 2;

/// Number of frames produced per mixer iteration.
pub const MIX_BLOCK_FRAMES: usize = 2048;

/// Fixed buffer size requested from the output device, in frames.
pub const DEVICE_BUFFER_FRAMES: u32 = 512;

/// Capacity of the ring between the mixer thread and the device callback, in mix blocks.
pub const DEVICE_RING_BLOCKS: usize = 2;

/// How long a blocking device write waits for room before giving up.
pub const DEVICE_WRITE_TIMEOUT: Duration = Duration::from_millis(500);

/// Sleep between polls while a device write waits for room.
pub const DEVICE_WRITE_POLL_INTERVAL: Duration = Duration::from_millis(2);
