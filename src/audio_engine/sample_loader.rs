//! Audio file loading and decoding functionality.
//!
//! This module turns audio files into [`SoundAsset`]s in the mixer's native format:
//! interleaved 16-bit stereo at [`MIX_SAMPLE_RATE`]. The mixer itself never touches files.

use std::fs::File;
use std::path::Path;
use symphonia::core::{
    audio::SampleBuffer as SymphoniaSampleBuffer, codecs::DecoderOptions,
    errors::Error as SymphoniaError, formats::FormatOptions, io::MediaSourceStream,
    meta::MetadataOptions, probe::Hint,
};
use symphonia::default::{get_codecs, get_probe};

use crate::audio_engine::channels::to_stereo;
use crate::audio_engine::constants::{MIX_SAMPLE_RATE, OUTPUT_CHANNELS};
use crate::audio_engine::errors::SampleLoadError;
use crate::audio_engine::resample::resample_interleaved;
use crate::audio_engine::sound::SoundAsset;

/// Loads an audio file as a sound ready for [`AudioEngine::play_sound`](crate::AudioEngine::play_sound).
pub fn load_sound(path: impl AsRef<Path>) -> Result<SoundAsset, SampleLoadError> {
    decode_audio_file_to_sound(path.as_ref(), MIX_SAMPLE_RATE)
}

/// Decodes an audio file into 16-bit stereo at `output_rate_hz`.
///
/// # Errors
///
/// - File not found or cannot be opened
/// - Audio format not recognized or corrupted
/// - File without a default track, sample rate or channel layout
/// - Resampler failures
pub fn decode_audio_file_to_sound(
    path: &Path,
    output_rate_hz: u32,
) -> Result<SoundAsset, SampleLoadError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or(SampleLoadError::NoDefaultTrack)?;
    let track_id = track.id;
    let file_rate_hz = track
        .codec_params
        .sample_rate
        .ok_or(SampleLoadError::MissingSampleRate)?;
    let file_channels = track
        .codec_params
        .channels
        .ok_or(SampleLoadError::MissingChannels)?
        .count();

    let mut decoder = get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut decoded: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(err) => return Err(SampleLoadError::Decode(err)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let audio_buf = decoder.decode(&packet)?;
        let spec = *audio_buf.spec();
        let duration = audio_buf.capacity() as u64;

        let mut sample_buf = SymphoniaSampleBuffer::<f32>::new(duration, spec);
        sample_buf.copy_interleaved_ref(audio_buf);
        decoded.extend_from_slice(sample_buf.samples());
    }

    log::debug!(
        "Decoded '{}' ({} ch @ {} Hz, {} samples)",
        path.display(),
        file_channels,
        file_rate_hz,
        decoded.len()
    );

    let stereo = to_stereo(decoded, file_channels)?;
    let resampled = resample_interleaved(stereo, OUTPUT_CHANNELS, file_rate_hz, output_rate_hz)?;

    Ok(SoundAsset::from_samples(quantize(&resampled)))
}

/// Converts `[-1.0, 1.0]` floats to `i16`, clamping anything outside the range.
pub fn quantize(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s * 32_768.0).round().clamp(-32_768.0, 32_767.0) as i16)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    /// Helper function to create a PCM16 WAV file for testing.
    fn write_pcm16_wav(
        path: &Path,
        channels: u16,
        sample_rate_hz: u32,
        samples: &[i16],
    ) -> std::io::Result<()> {
        let bits_per_sample = 16u16;
        let block_align = channels * (bits_per_sample / 8);
        let byte_rate = sample_rate_hz * u32::from(block_align);
        let data_len_bytes = u32::try_from(samples.len() * 2).expect("sample data too large");
        let chunk_size = 36 + data_len_bytes;

        let mut file = File::create(path)?;
        file.write_all(b"RIFF")?;
        file.write_all(&chunk_size.to_le_bytes())?;
        file.write_all(b"WAVE")?;

        file.write_all(b"fmt ")?;
        file.write_all(&16u32.to_le_bytes())?;
        file.write_all(&1u16.to_le_bytes())?; // PCM
        file.write_all(&channels.to_le_bytes())?;
        file.write_all(&sample_rate_hz.to_le_bytes())?;
        file.write_all(&byte_rate.to_le_bytes())?;
        file.write_all(&block_align.to_le_bytes())?;
        file.write_all(&bits_per_sample.to_le_bytes())?;

        file.write_all(b"data")?;
        file.write_all(&data_len_bytes.to_le_bytes())?;
        for sample in samples {
            file.write_all(&sample.to_le_bytes())?;
        }

        Ok(())
    }

    fn assert_close(actual: &[i16], expected: &[i16]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((i32::from(*a) - i32::from(*e)).abs() <= 1, "{a} vs {e}");
        }
    }

    #[test]
    fn test_decode_stereo_wav_at_mix_rate() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("laser.wav");

        let samples = [0i16, 100, 16_384, -16_384, 32_767, -32_768];
        write_pcm16_wav(&path, 2, MIX_SAMPLE_RATE, &samples).unwrap();

        let sound = load_sound(&path).unwrap();
        assert_eq!(sound.frames(), 3);
        assert_close(sound.samples(), &samples);
    }

    #[test]
    fn test_decode_mono_wav_duplicates_channels() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("explosion.wav");

        let samples = [0i16, 16_384, -16_384];
        write_pcm16_wav(&path, 1, MIX_SAMPLE_RATE, &samples).unwrap();

        let sound = load_sound(&path).unwrap();
        assert_eq!(sound.len(), samples.len() * 2);

        // Verify that mono samples are duplicated to both stereo channels
        for frame in sound.samples().chunks_exact(2) {
            assert_eq!(frame[0], frame[1]);
        }
    }

    #[test]
    fn test_decode_resamples_to_mix_rate() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("music.wav");

        let samples: Vec<i16> = (0..11_025)
            .map(|i| ((i as f32 * 0.1).sin() * 10_000.0) as i16)
            .collect();
        write_pcm16_wav(&path, 1, 22_050, &samples).unwrap();

        let sound = load_sound(&path).unwrap();
        let frames = sound.frames();
        assert!((21_000..=26_000).contains(&frames), "got {frames} frames");
        assert!(sound.samples().iter().any(|&s| s.abs() > 5_000));
    }

    #[test]
    fn test_quantize_clamps() {
        assert_eq!(quantize(&[0.0, 0.5, -0.5, 1.0, -1.0, 2.0, -2.0]), vec![
            0, 16_384, -16_384, 32_767, -32_768, 32_767, -32_768
        ]);
    }

    #[test]
    fn test_decode_invalid_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nonexistent.wav");

        let result = load_sound(&path);
        assert!(matches!(result, Err(SampleLoadError::Io(_))));
    }

    #[test]
    fn test_decode_garbage_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("garbage.wav");
        std::fs::write(&path, b"definitely not audio").unwrap();

        assert!(load_sound(&path).is_err());
    }
}
