use realfft::RealFftPlanner;

use crate::decode::DecodedAudio;

/// STFT frame and hop used for level and spectrum statistics.
pub const FRAME_SIZE: usize = 1024;
pub const HOP_SIZE: usize = 512;

/// Fraction of frames considered "quiet" when estimating the noise floor.
const NOISE_FLOOR_PERCENTILE: f64 = 0.10;

#[derive(Clone, Debug, PartialEq)]
pub struct AudioStats {
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub channels: u16,
    /// `None` for digital silence.
    pub peak_dbfs: Option<f64>,
    pub rms_dbfs: Option<f64>,
    pub noise_floor_dbfs: Option<f64>,
    pub spectral_centroid_hz: Option<f64>,
}

/// Signal-to-noise ratio of a processed signal against its original.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Snr {
    /// Residual is zero: the output equals the input.
    Identical,
    Db(f64),
    /// Original is silent or either signal is empty.
    Undefined,
}

impl Snr {
    pub fn label(self) -> String {
        match self {
            Snr::Identical => "∞ dB (unchanged)".to_string(),
            Snr::Db(db) => format!("{db:.1} dB"),
            Snr::Undefined => "n/a".to_string(),
        }
    }
}

pub fn to_dbfs(amplitude: f64) -> Option<f64> {
    (amplitude > 0.0).then(|| 20.0 * amplitude.log10())
}

pub fn compute_stats(audio: &DecodedAudio) -> AudioStats {
    let samples = &audio.samples;
    let peak = samples.iter().fold(0.0f32, |m, &s| m.max(s.abs())) as f64;

    AudioStats {
        duration_secs: audio.duration_secs,
        sample_rate: audio.sample_rate,
        channels: audio.channels,
        peak_dbfs: to_dbfs(peak),
        rms_dbfs: to_dbfs(rms(samples)),
        noise_floor_dbfs: noise_floor(samples).and_then(to_dbfs),
        spectral_centroid_hz: spectral_centroid(samples, audio.sample_rate),
    }
}

fn rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum / samples.len() as f64).sqrt()
}

fn frame_starts(len: usize) -> impl Iterator<Item = usize> {
    let count = if len >= FRAME_SIZE { (len - FRAME_SIZE) / HOP_SIZE + 1 } else { 0 };
    (0..count).map(|i| i * HOP_SIZE)
}

/// RMS of the quietest frames. Short clips (under one frame) use the whole clip.
fn noise_floor(samples: &[f32]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let mut levels: Vec<f64> = frame_starts(samples.len())
        .map(|start| rms(&samples[start..start + FRAME_SIZE]))
        .collect();
    if levels.is_empty() {
        return Some(rms(samples));
    }
    levels.sort_by(|a, b| a.total_cmp(b));
    let idx = ((levels.len() - 1) as f64 * NOISE_FLOOR_PERCENTILE).round() as usize;
    Some(levels[idx])
}

fn hann(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos()))
        .collect()
}

/// Magnitude-weighted mean frequency of the average spectrum.
fn spectral_centroid(samples: &[f32], sample_rate: u32) -> Option<f64> {
    if sample_rate == 0 || samples.len() < FRAME_SIZE {
        return None;
    }
    let mut planner = RealFftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(FRAME_SIZE);
    let window = hann(FRAME_SIZE);
    let mut input = fft.make_input_vec();
    let mut output = fft.make_output_vec();
    let mut mean = vec![0.0f64; output.len()];

    let mut frames = 0usize;
    for start in frame_starts(samples.len()) {
        for (dst, (&s, &w)) in input.iter_mut().zip(samples[start..start + FRAME_SIZE].iter().zip(&window)) {
            *dst = s * w;
        }
        if fft.process(&mut input, &mut output).is_err() {
            continue;
        }
        for (acc, c) in mean.iter_mut().zip(&output) {
            *acc += c.norm() as f64;
        }
        frames += 1;
    }
    if frames == 0 {
        return None;
    }

    let bin_hz = sample_rate as f64 / FRAME_SIZE as f64;
    let (weighted, total) = mean
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(w, t), (i, &m)| (w + i as f64 * bin_hz * m, t + m));
    (total > 0.0).then(|| weighted / total)
}

/// `10·log10(Σo² / Σ(o−p)²)` over the common length of both signals.
pub fn snr(original: &[f32], processed: &[f32]) -> Snr {
    let n = original.len().min(processed.len());
    if n == 0 {
        return Snr::Undefined;
    }
    let (signal, residual) = original[..n]
        .iter()
        .zip(&processed[..n])
        .fold((0.0f64, 0.0f64), |(s, r), (&o, &p)| {
            let o = o as f64;
            let d = o - p as f64;
            (s + o * o, r + d * d)
        });
    if signal == 0.0 {
        Snr::Undefined
    } else if residual == 0.0 {
        Snr::Identical
    } else {
        Snr::Db(10.0 * (signal / residual).log10())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, amp: f32, sample_rate: u32, secs: f64) -> DecodedAudio {
        let n = (sample_rate as f64 * secs) as usize;
        let samples: Vec<f32> = (0..n)
            .map(|i| amp * (2.0 * PI * freq * i as f64 / sample_rate as f64).sin() as f32)
            .collect();
        DecodedAudio {
            duration_secs: n as f64 / sample_rate as f64,
            samples,
            sample_rate,
            channels: 1,
        }
    }

    #[test]
    fn test_levels_of_half_scale_sine() {
        let audio = sine(1000.0, 0.5, 44100, 0.5);
        let stats = compute_stats(&audio);
        let peak = stats.peak_dbfs.unwrap();
        assert!((peak - (-6.02)).abs() < 0.1, "peak {peak}");
        // RMS of a sine is 3 dB below its peak.
        let rms = stats.rms_dbfs.unwrap();
        assert!((rms - (-9.03)).abs() < 0.1, "rms {rms}");
        let floor = stats.noise_floor_dbfs.unwrap();
        assert!((floor - rms).abs() < 0.5, "steady tone floor {floor} vs rms {rms}");
    }

    #[test]
    fn test_centroid_near_tone_frequency() {
        let audio = sine(3000.0, 0.8, 48000, 0.25);
        let centroid = compute_stats(&audio).spectral_centroid_hz.unwrap();
        assert!((centroid - 3000.0).abs() < 150.0, "centroid {centroid}");
    }

    #[test]
    fn test_silence() {
        let audio = DecodedAudio {
            samples: vec![0.0; 4096],
            sample_rate: 8000,
            channels: 1,
            duration_secs: 0.512,
        };
        let stats = compute_stats(&audio);
        assert_eq!(stats.peak_dbfs, None);
        assert_eq!(stats.rms_dbfs, None);
        assert_eq!(stats.noise_floor_dbfs, None);
        assert_eq!(stats.spectral_centroid_hz, None);
    }

    #[test]
    fn test_noise_floor_finds_quiet_section() {
        let mut audio = sine(440.0, 0.9, 16000, 2.0);
        // Quiet first half.
        let half = audio.samples.len() / 2;
        for s in &mut audio.samples[..half] {
            *s *= 0.01;
        }
        let stats = compute_stats(&audio);
        let floor = stats.noise_floor_dbfs.unwrap();
        let rms = stats.rms_dbfs.unwrap();
        assert!(floor < rms - 30.0, "floor {floor} rms {rms}");
    }

    #[test]
    fn test_snr() {
        let a = sine(500.0, 0.5, 8000, 0.1).samples;
        assert_eq!(snr(&a, &a), Snr::Identical);
        assert_eq!(snr(&[], &a), Snr::Undefined);
        assert_eq!(snr(&[0.0; 10], &[0.1; 10]), Snr::Undefined);

        // Residual at 1/10 amplitude → 20 dB.
        let noisy: Vec<f32> = a.iter().map(|&s| s * 0.9).collect();
        match snr(&a, &noisy) {
            Snr::Db(db) => assert!((db - 20.0).abs() < 1e-3, "{db}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_snr_labels() {
        assert_eq!(Snr::Db(12.345).label(), "12.3 dB");
        assert_eq!(Snr::Undefined.label(), "n/a");
    }
}
