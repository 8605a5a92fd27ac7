//! Audio-specific error types.

use thiserror::Error;

/// Errors that can occur while loading audio files.
#[derive(Debug, Error)]
pub enum SampleLoadError {
    /// Failed to open the audio file.
    #[error("failed to open file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode the audio file.
    #[error("failed to decode audio file: {0}")]
    Decode(#[from] symphonia::core::errors::Error),

    /// Failed to create resampler.
    #[error("failed to create resampler: {0}")]
    ResamplerConstruction(#[from] rubato::ResamplerConstructionError),

    /// Failed to resample audio.
    #[error("failed to resample audio: {0}")]
    Resample(#[from] rubato::ResampleError),

    /// Audio file has no default track.
    #[error("audio file has no default track")]
    NoDefaultTrack,

    /// Audio file is missing sample rate information.
    #[error("audio file is missing a sample rate")]
    MissingSampleRate,

    /// Audio file is missing channel information.
    #[error("audio file is missing channel information")]
    MissingChannels,

    /// Unsupported channel mapping configuration.
    #[error(
        "unsupported channel mapping: file has {file_channels} channels, output has {output_channels} channels"
    )]
    UnsupportedChannels {
        /// Number of channels in the source file.
        file_channels: usize,
        /// Number of channels expected for output.
        output_channels: usize,
    },
}

/// Errors reported by an [`AudioDevice`](crate::AudioDevice).
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The host exposes no output device.
    #[error("no audio output device found")]
    NoDevice,

    /// The output stream could not be built with the requested format.
    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    /// The output stream could not be started.
    #[error("failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    /// The output stream could not be paused.
    #[error("failed to pause output stream: {0}")]
    PauseStream(#[from] cpal::PauseStreamError),

    /// The device ran out of samples before the last write arrived.
    #[error("device buffer underrun")]
    Underrun,

    /// The device did not accept a block within the write timeout.
    #[error("device write timed out")]
    Timeout,

    /// The device side of the stream is gone.
    #[error("device stream disconnected")]
    Disconnected,
}

/// Errors that prevent the audio subsystem from starting.
#[derive(Debug, Error)]
pub enum AudioInitError {
    /// The engine configuration cannot produce audio.
    #[error("invalid audio config: {0}")]
    InvalidConfig(&'static str),

    /// Opening or configuring the device failed.
    #[error("failed to open audio device: {0}")]
    Device(#[from] DeviceError),

    /// The mixer thread could not be spawned.
    #[error("failed to spawn mixer thread: {0}")]
    Thread(#[from] std::io::Error),

    /// The mixer thread exited before reporting whether the device opened.
    #[error("mixer thread exited during startup")]
    Handshake,
}
