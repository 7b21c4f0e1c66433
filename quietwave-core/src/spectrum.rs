//! Layout of the live frequency-bar display.
//!
//! Magnitudes come from the browser's analyser as one byte per bin (0–255).
//! Everything here is plain geometry so the canvas renderer only issues draw calls.

pub const DEFAULT_FFT_SIZE: u32 = 256;
pub const MIN_FFT_SIZE: u32 = 32;
pub const MAX_FFT_SIZE: u32 = 32768;

/// Alpha of the fill painted over the previous frame; lower values leave longer trails.
pub const TRAIL_ALPHA: f64 = 0.18;

/// Bottom-to-top gradient stops for the bars.
pub const GRADIENT_STOPS: [(f32, &str); 3] = [
    (0.0, "rgba(0, 122, 255, 0.85)"),
    (0.5, "rgba(88, 86, 214, 0.85)"),
    (1.0, "rgba(52, 199, 89, 0.85)"),
];

const BAR_GAP_PX: f64 = 1.0;
/// Cap radius as a fraction of bar width.
const CAP_ROUNDING: f64 = 0.2;

/// Analysis window size. Always a power of two within what Web Audio analysers accept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FftSize(u32);

impl FftSize {
    pub fn new(size: u32) -> Option<Self> {
        (size.is_power_of_two() && (MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&size)).then_some(Self(size))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn bin_count(self) -> usize {
        (self.0 / 2) as usize
    }
}

impl Default for FftSize {
    fn default() -> Self {
        Self(DEFAULT_FFT_SIZE)
    }
}

/// One tick's worth of magnitudes, reused across frames to avoid reallocating.
#[derive(Clone, Debug, PartialEq)]
pub struct SpectrumFrame {
    pub bins: Vec<u8>,
}

impl SpectrumFrame {
    pub fn new(fft: FftSize) -> Self {
        Self {
            bins: vec![0; fft.bin_count()],
        }
    }

    pub fn clear(&mut self) {
        self.bins.fill(0);
    }

    pub fn is_silent(&self) -> bool {
        self.bins.iter().all(|&b| b == 0)
    }
}

/// One bar, in canvas pixels. `y` is the top edge; bars grow up from the bottom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bar {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub cap_radius: f64,
}

/// Bars evenly spaced across `width`, one per bin; silent bins produce no bar.
pub fn layout_bars(frame: &SpectrumFrame, width: f64, height: f64) -> Vec<Bar> {
    let n = frame.bins.len();
    if n == 0 || width <= 0.0 || height <= 0.0 {
        return Vec::new();
    }
    let slot = width / n as f64;
    let bar_w = if slot > 2.0 * BAR_GAP_PX { slot - BAR_GAP_PX } else { slot };

    frame
        .bins
        .iter()
        .enumerate()
        .filter(|(_, &m)| m > 0)
        .map(|(i, &m)| {
            let h = m as f64 / 255.0 * height;
            Bar {
                x: i as f64 * slot,
                y: height - h,
                width: bar_w,
                height: h,
                cap_radius: (bar_w * CAP_ROUNDING).min(h / 2.0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fft_size_validation() {
        assert_eq!(FftSize::new(256).map(FftSize::bin_count), Some(128));
        assert_eq!(FftSize::new(2048).map(FftSize::get), Some(2048));
        assert!(FftSize::new(300).is_none());
        assert!(FftSize::new(16).is_none());
        assert!(FftSize::new(65536).is_none());
        assert!(FftSize::new(0).is_none());
        assert_eq!(FftSize::default().bin_count(), 128);
    }

    #[test]
    fn test_bars_span_width_and_scale_with_magnitude() {
        let mut frame = SpectrumFrame::new(FftSize::new(32).unwrap());
        frame.bins[0] = 255;
        frame.bins[15] = 51;
        let bars = layout_bars(&frame, 800.0, 200.0);
        assert_eq!(bars.len(), 2);

        let slot = 800.0 / 16.0;
        assert_eq!(bars[0].x, 0.0);
        assert_eq!(bars[0].height, 200.0);
        assert_eq!(bars[0].y, 0.0);
        assert_eq!(bars[0].width, slot - 1.0);

        assert_eq!(bars[1].x, 15.0 * slot);
        assert!((bars[1].height - 40.0).abs() < 1e-9);
        assert!(bars[1].x + bars[1].width <= 800.0);
    }

    #[test]
    fn test_silent_frame_draws_nothing() {
        let frame = SpectrumFrame::new(FftSize::default());
        assert!(frame.is_silent());
        assert!(layout_bars(&frame, 800.0, 200.0).is_empty());
        assert!(layout_bars(&SpectrumFrame { bins: vec![9; 4] }, 0.0, 200.0).is_empty());
    }

    #[test]
    fn test_cap_radius_never_exceeds_half_height() {
        let frame = SpectrumFrame { bins: vec![1, 255] };
        let bars = layout_bars(&frame, 400.0, 100.0);
        for b in &bars {
            assert!(b.cap_radius <= b.height / 2.0 + 1e-12);
            assert!(b.cap_radius <= b.width * 0.2 + 1e-12);
        }
    }
}
