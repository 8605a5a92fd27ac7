//! Sound-effect mixer for a small arcade game.
//!
//! The game thread calls [`AudioEngine::play_sound`]; a dedicated mixer thread adds
//! every playing sound into fixed-size 16-bit stereo blocks with saturation and
//! writes them to the output device.

mod audio_engine;

pub use audio_engine::audio_stream::{CpalOutputDevice, setup_logger};
pub use audio_engine::channel_pool::{Channel, ChannelPool};
pub use audio_engine::constants;
pub use audio_engine::device::AudioDevice;
pub use audio_engine::errors::{AudioInitError, DeviceError, SampleLoadError};
pub use audio_engine::mixer::Mixer;
pub use audio_engine::sample_loader::{decode_audio_file_to_sound, load_sound, quantize};
pub use audio_engine::sound::SoundAsset;
pub use audio_engine::stats::MixerStatsSnapshot;
pub use audio_engine::submission_queue::{DrainOutcome, PlayRequest, SubmissionQueue};
pub use audio_engine::{AudioConfig, AudioEngine};
