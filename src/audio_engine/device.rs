//! The boundary between the mixer and whatever actually plays the samples.

use crate::audio_engine::errors::DeviceError;

/// A blocking sink for interleaved 16-bit stereo samples.
///
/// The mixer thread creates the device, writes every block to it and closes it, so
/// implementations do not need to be `Send`. `write` is expected to block until the
/// device has room; that blocking is what paces the mixer loop.
pub trait AudioDevice {
    /// Writes one full block of interleaved samples.
    ///
    /// An error means the block was not played. The mixer answers it with
    /// [`AudioDevice::prepare`] and moves on to the next block.
    fn write(&mut self, samples: &[i16]) -> Result<(), DeviceError>;

    /// Resets the device after a failed write (underrun, timeout).
    fn prepare(&mut self) -> Result<(), DeviceError>;

    /// Stops output. Called once, on the mixer thread, before the device is dropped.
    fn close(&mut self) {}
}
