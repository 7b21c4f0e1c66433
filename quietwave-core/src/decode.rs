use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::DecodeError;
use crate::intake::AudioFormat;

/// Mono, normalised samples of a decoded upload.
#[derive(Clone, Debug)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Channel count of the source before mixdown.
    pub channels: u16,
    pub duration_secs: f64,
}

pub fn decode(bytes: &[u8], format: AudioFormat) -> Result<DecodedAudio, DecodeError> {
    let audio = match format {
        AudioFormat::Wav => decode_wav(bytes)?,
        AudioFormat::Mp3 => decode_mp3(bytes)?,
    };
    if audio.samples.is_empty() || audio.sample_rate == 0 {
        return Err(DecodeError::Empty);
    }
    Ok(audio)
}

/// Guess the container from its first bytes. Used for processed results whose media type is unknown.
pub fn sniff_format(bytes: &[u8]) -> Option<AudioFormat> {
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE" {
        return Some(AudioFormat::Wav);
    }
    // ID3 tag, or an MPEG frame sync (11 set bits).
    if bytes.starts_with(b"ID3") || (bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] & 0xE0 == 0xE0) {
        return Some(AudioFormat::Mp3);
    }
    None
}

fn decode_wav(bytes: &[u8]) -> Result<DecodedAudio, DecodeError> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1);

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()?
        }
    };

    Ok(finish(interleaved, spec.sample_rate, channels))
}

fn decode_mp3(bytes: &[u8]) -> Result<DecodedAudio, DecodeError> {
    let source = Cursor::new(bytes.to_vec());
    let mss = MediaSourceStream::new(Box::new(source), Default::default());
    let mut hint = Hint::new();
    hint.with_extension("mp3");

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;
    let track = format.default_track().ok_or(DecodeError::NoTrack)?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track.codec_params.channels.map(|c| c.count() as u16).unwrap_or(0);
    let mut decoder = symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut interleaved = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };
        if packet.track_id() != track_id {
            continue;
        }
        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = spec.rate;
                channels = spec.channels.count() as u16;
                let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buf.copy_interleaved_ref(decoded);
                interleaved.extend_from_slice(buf.samples());
            }
            // Corrupt frames are skipped, matching what browsers do on playback.
            Err(SymphoniaError::DecodeError(msg)) => {
                log::warn!("skipping undecodable MP3 frame: {msg}");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(finish(interleaved, sample_rate, channels.max(1)))
}

fn finish(interleaved: Vec<f32>, sample_rate: u32, channels: u16) -> DecodedAudio {
    let samples = mix_to_mono(interleaved, channels);
    let duration_secs = if sample_rate > 0 {
        samples.len() as f64 / sample_rate as f64
    } else {
        0.0
    };
    DecodedAudio {
        samples,
        sample_rate,
        channels,
        duration_secs,
    }
}

fn mix_to_mono(interleaved: Vec<f32>, channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return interleaved;
    }
    let ch = channels as usize;
    interleaved
        .chunks_exact(ch)
        .map(|frame| frame.iter().sum::<f32>() / ch as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(spec: hound::WavSpec, frames: &[Vec<i32>]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for frame in frames {
                for &s in frame {
                    writer.write_sample(s).unwrap();
                }
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_decode_16bit_stereo_wav() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let frames: Vec<Vec<i32>> = (0..8000).map(|_| vec![16384, -16384]).collect();
        let audio = decode(&wav_bytes(spec, &frames), AudioFormat::Wav).unwrap();
        assert_eq!(audio.sample_rate, 8000);
        assert_eq!(audio.channels, 2);
        assert_eq!(audio.samples.len(), 8000);
        assert!((audio.duration_secs - 1.0).abs() < 1e-9);
        // Opposite-polarity channels cancel in the mixdown.
        assert!(audio.samples.iter().all(|&s| s.abs() < 1e-6));
    }

    #[test]
    fn test_decode_float_wav() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for i in 0..1600 {
                writer.write_sample((i as f32 / 1600.0) - 0.5).unwrap();
            }
            writer.finalize().unwrap();
        }
        let audio = decode(&cursor.into_inner(), AudioFormat::Wav).unwrap();
        assert_eq!(audio.samples.len(), 1600);
        assert!((audio.samples[0] + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_empty_wav_is_an_error() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let bytes = wav_bytes(spec, &[]);
        assert!(matches!(decode(&bytes, AudioFormat::Wav), Err(DecodeError::Empty)));
    }

    #[test]
    fn test_sniff_format() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        assert_eq!(sniff_format(&wav_bytes(spec, &[vec![0]])), Some(AudioFormat::Wav));
        assert_eq!(sniff_format(b"ID3\x04\x00rest"), Some(AudioFormat::Mp3));
        assert_eq!(sniff_format(&[0xFF, 0xFB, 0x90, 0x00]), Some(AudioFormat::Mp3));
        assert_eq!(sniff_format(b"fLaC"), None);
        assert_eq!(sniff_format(&[]), None);
    }

    #[test]
    fn test_decode_silent_mp3_frames() {
        // MPEG-1 Layer III, 128 kbps, 44.1 kHz, stereo: 417-byte frames of silence.
        let mut bytes = Vec::new();
        for _ in 0..20 {
            bytes.extend_from_slice(&[0xFF, 0xFB, 0x90, 0x00]);
            bytes.extend(std::iter::repeat(0u8).take(413));
        }
        assert_eq!(sniff_format(&bytes), Some(AudioFormat::Mp3));

        let audio = decode(&bytes, AudioFormat::Mp3).unwrap();
        assert_eq!(audio.sample_rate, 44100);
        assert_eq!(audio.channels, 2);
        assert!(!audio.samples.is_empty());
        assert!(audio.duration_secs > 0.0);
        assert!(audio.samples.iter().all(|&s| s.abs() < 1e-3));
    }

    #[test]
    fn test_garbage_fails() {
        assert!(matches!(decode(b"not audio at all", AudioFormat::Wav), Err(DecodeError::Wav(_))));
        assert!(decode(b"not audio at all", AudioFormat::Mp3).is_err());
    }
}
