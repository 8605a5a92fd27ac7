//! Sample-rate conversion for decoded sounds, built on rubato's async sinc resampler.

use rubato::audioadapter::{Adapter, AdapterMut};
use rubato::{
    Async, FixedAsync, Indexing, Resampler, SincInterpolationParameters, SincInterpolationType,
    WindowFunction,
};

use crate::audio_engine::errors::SampleLoadError;

/// Output frames produced per resampler call.
const OUT_FRAMES_PER_CALL: usize = 1024;

/// Read-only view of planar channel buffers starting at `offset`.
struct PlanarSlice<'a> {
    buf: &'a [Vec<f32>],
    offset: usize,
    frames: usize,
}

impl<'a> Adapter<'a, f32> for PlanarSlice<'a> {
    unsafe fn read_sample_unchecked(&self, channel: usize, frame: usize) -> f32 {
        self.buf[channel][self.offset + frame]
    }

    fn channels(&self) -> usize {
        self.buf.len()
    }

    fn frames(&self) -> usize {
        self.frames
    }

    fn copy_from_channel_to_slice(&self, channel: usize, skip: usize, slice: &mut [f32]) -> usize {
        if channel >= self.buf.len() || skip >= self.frames {
            return 0;
        }
        let n = (self.frames - skip).min(slice.len());
        let start = self.offset + skip;
        slice[..n].copy_from_slice(&self.buf[channel][start..start + n]);
        n
    }
}

/// Writable interleaved view used as resampler output.
struct InterleavedMutSlice<'a> {
    buf: &'a mut [f32],
    channels: usize,
    frames: usize,
}

impl<'a> Adapter<'a, f32> for InterleavedMutSlice<'a> {
    unsafe fn read_sample_unchecked(&self, channel: usize, frame: usize) -> f32 {
        self.buf[frame * self.channels + channel]
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn frames(&self) -> usize {
        self.frames
    }
}

impl<'a> AdapterMut<'a, f32> for InterleavedMutSlice<'a> {
    unsafe fn write_sample_unchecked(&mut self, channel: usize, frame: usize, value: &f32) -> bool {
        self.buf[frame * self.channels + channel] = *value;
        false
    }
}

fn deinterleave(samples: &[f32], channels: usize) -> Vec<Vec<f32>> {
    (0..channels)
        .map(|c| samples.iter().skip(c).step_by(channels).copied().collect())
        .collect()
}

/// Resamples interleaved `samples` from `in_rate_hz` to `out_rate_hz`.
///
/// Returns the input unchanged when the rates already match. The output starts
/// with the resampler's filter delay (a few milliseconds of near-silence).
pub fn resample_interleaved(
    samples: Vec<f32>,
    channels: usize,
    in_rate_hz: u32,
    out_rate_hz: u32,
) -> Result<Vec<f32>, SampleLoadError> {
    if in_rate_hz == out_rate_hz || channels == 0 || samples.is_empty() {
        return Ok(samples);
    }

    let ratio = f64::from(out_rate_hz) / f64::from(in_rate_hz);
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        oversampling_factor: 128,
        interpolation: SincInterpolationType::Linear,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = Async::<f32>::new_sinc(
        ratio,
        1.0,
        &params,
        OUT_FRAMES_PER_CALL,
        channels,
        FixedAsync::Output,
    )?;

    let planar = deinterleave(&samples, channels);
    let total_frames = samples.len() / channels;
    let expected_frames = (total_frames as f64 * ratio).ceil() as usize;

    let mut resampled = Vec::with_capacity((expected_frames + OUT_FRAMES_PER_CALL) * channels);
    let mut block: Vec<f32> = Vec::new();
    let mut pos = 0;

    loop {
        let need = resampler.input_frames_next();
        let out_frames = resampler.output_frames_next();
        if block.len() < channels * out_frames {
            block.resize(channels * out_frames, 0.0);
        }

        let remain = total_frames - pos;
        let partial = remain < need;
        let input = PlanarSlice {
            buf: &planar,
            offset: pos,
            frames: if partial { remain } else { need },
        };
        let mut output = InterleavedMutSlice {
            buf: &mut block[..channels * out_frames],
            channels,
            frames: out_frames,
        };

        let indexing = Indexing {
            input_offset: 0,
            output_offset: 0,
            partial_len: Some(remain),
            active_channels_mask: None,
        };
        let (used, produced) = if partial {
            resampler.process_into_buffer(&input, &mut output, Some(&indexing))?
        } else {
            resampler.process_into_buffer(&input, &mut output, None)?
        };

        resampled.extend_from_slice(&block[..produced * channels]);
        pos += used.min(remain);

        if partial {
            break;
        }
    }

    // Flush whatever is still inside the filter.
    let out_frames = resampler.output_frames_next();
    if block.len() < channels * out_frames {
        block.resize(channels * out_frames, 0.0);
    }
    let empty = PlanarSlice {
        buf: &planar,
        offset: total_frames,
        frames: 0,
    };
    let mut output = InterleavedMutSlice {
        buf: &mut block[..channels * out_frames],
        channels,
        frames: out_frames,
    };
    let indexing = Indexing {
        input_offset: 0,
        output_offset: 0,
        partial_len: Some(0),
        active_channels_mask: None,
    };
    let (_, produced) = resampler.process_into_buffer(&empty, &mut output, Some(&indexing))?;
    resampled.extend_from_slice(&block[..produced * channels]);

    log::debug!(
        "Resampled {} frames @ {} Hz -> {} frames @ {} Hz",
        total_frames,
        in_rate_hz,
        resampled.len() / channels,
        out_rate_hz
    );

    Ok(resampled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(frames: usize, channels: usize, rate_hz: u32) -> Vec<f32> {
        (0..frames)
            .flat_map(|i| {
                let v = (i as f32 * 440.0 * std::f32::consts::TAU / rate_hz as f32).sin() * 0.5;
                std::iter::repeat_n(v, channels)
            })
            .collect()
    }

    #[test]
    fn test_same_rate_is_passthrough() {
        let input = sine(100, 2, 44_100);
        let output = resample_interleaved(input.clone(), 2, 44_100, 44_100).unwrap();

        assert_eq!(output, input);
    }

    #[test]
    fn test_upsample_doubles_length() {
        let input = sine(22_050, 2, 22_050);
        let output = resample_interleaved(input, 2, 22_050, 44_100).unwrap();

        let frames = output.len() / 2;
        assert_eq!(output.len() % 2, 0);
        assert!(frames >= 44_100 - OUT_FRAMES_PER_CALL, "got {frames} frames");
        assert!(frames <= 44_100 + 3 * OUT_FRAMES_PER_CALL, "got {frames} frames");
        assert!(output.iter().any(|s| s.abs() > 0.25));
    }

    #[test]
    fn test_deinterleave() {
        let planar = deinterleave(&[1.0, 2.0, 3.0, 4.0], 2);

        assert_eq!(planar, vec![vec![1.0, 3.0], vec![2.0, 4.0]]);
    }
}
