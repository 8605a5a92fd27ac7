//! Channel layout conversion for decoded audio.
//!
//! Every sound is mixed as interleaved stereo, so decoded files are folded to two
//! channels here before resampling.

use crate::audio_engine::constants::OUTPUT_CHANNELS;
use crate::audio_engine::errors::SampleLoadError;

/// Converts interleaved samples with `file_channels` channels to interleaved stereo.
///
/// - Mono: the signal is duplicated to both sides
/// - Stereo: returned unchanged
/// - More than two channels: the first two (front left/right) are kept
///
/// A trailing partial frame is discarded.
pub fn to_stereo(samples: Vec<f32>, file_channels: usize) -> Result<Vec<f32>, SampleLoadError> {
    match file_channels {
        0 => Err(SampleLoadError::UnsupportedChannels {
            file_channels,
            output_channels: OUTPUT_CHANNELS,
        }),
        1 => {
            let mut out = Vec::with_capacity(samples.len() * 2);
            for s in samples {
                out.push(s);
                out.push(s);
            }
            Ok(out)
        }
        2 => {
            let mut samples = samples;
            samples.truncate(samples.len() - samples.len() % 2);
            Ok(samples)
        }
        _ => {
            let frames = samples.len() / file_channels;
            let mut out = Vec::with_capacity(frames * 2);
            for frame in samples.chunks_exact(file_channels) {
                out.push(frame[0]);
                out.push(frame[1]);
            }
            Ok(out)
        }
    }
}
