//! Amplitude normalization and waveform reduction
//!
//! Two paths feed the visual amplitude sequence:
//! - while recording, raw device levels (dBFS-like, roughly -50..0) are
//!   normalized and kept in a bounded sliding window
//! - after stop, the full-resolution sample array of the file is reduced to a
//!   fixed number of points by stride decimation

use serde::Serialize;
use std::collections::VecDeque;

/// Quietest device level that still registers on the meter
pub const AMPLITUDE_FLOOR_DB: f32 = -50.0;

/// Default live window length
pub const DEFAULT_LIVE_CAP: usize = 100;

/// Default number of points in a finished waveform
pub const DEFAULT_WAVEFORM_POINTS: usize = 200;

/// Full-scale magnitude of a signed 16-bit sample
const FULL_SCALE: f32 = 32768.0;

/// Map a raw device amplitude to [0, 1], louder input closer to 1
pub fn normalize(raw: f32) -> f32 {
    if raw.is_nan() {
        return 0.0;
    }
    let span = -AMPLITUDE_FLOOR_DB;
    (raw - AMPLITUDE_FLOOR_DB).clamp(0.0, span) / span
}

/// Stride used to reduce `total` samples to at most `target` points
pub fn stride_for(total: usize, target: usize) -> usize {
    total.div_ceil(target.max(1)).max(1)
}

/// Reduce a full recording to at most `target` visual points
///
/// Every sample whose index is a multiple of the stride is kept, scaled from
/// 16-bit magnitude to [0, 1]. The stride rounds up, so the points span the
/// whole input and never exceed `target`.
pub fn downsample(samples: &[i16], target: usize) -> Vec<f32> {
    if samples.is_empty() || target == 0 {
        return Vec::new();
    }

    let stride = stride_for(samples.len(), target);
    samples
        .iter()
        .step_by(stride)
        .map(|&s| (f32::from(s).abs() / FULL_SCALE).clamp(0.0, 1.0))
        .collect()
}

/// Calculate RMS level from float samples
pub fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Calculate peak level from float samples
pub fn calculate_peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
}

/// Convert a linear level to dBFS, floored for silence
pub fn to_dbfs(level: f32) -> f32 {
    const SILENCE_DB: f32 = -160.0;
    if level <= 0.0 {
        return SILENCE_DB;
    }
    (20.0 * level.log10()).max(SILENCE_DB)
}

/// Sliding window of the most recent normalized samples
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AmplitudeWindow {
    samples: VecDeque<f32>,
    #[serde(skip)]
    cap: usize,
}

impl AmplitudeWindow {
    pub fn new(cap: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(cap),
            cap,
        }
    }

    /// Normalize a raw level and append it, dropping the oldest when full
    pub fn push_raw(&mut self, raw: f32) {
        self.push(normalize(raw));
    }

    pub fn push(&mut self, value: f32) {
        if self.cap == 0 {
            return;
        }
        while self.samples.len() >= self.cap {
            self.samples.pop_front();
        }
        self.samples.push_back(value.clamp(0.0, 1.0));
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.samples.iter()
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.samples.iter().copied().collect()
    }
}

impl Default for AmplitudeWindow {
    fn default() -> Self {
        Self::new(DEFAULT_LIVE_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_reference_points() {
        assert_eq!(normalize(-50.0), 0.0);
        assert_eq!(normalize(0.0), 1.0);
        assert_eq!(normalize(-25.0), 0.5);
        assert_eq!(normalize(10.0), 1.0);
        assert_eq!(normalize(-120.0), 0.0);
        assert_eq!(normalize(f32::NAN), 0.0);
    }

    #[test]
    fn test_window_bounded() {
        let mut window = AmplitudeWindow::new(100);
        for i in 0..250 {
            window.push_raw(-50.0 + (i % 50) as f32);
            assert!(window.len() <= 100);
        }
        assert_eq!(window.len(), 100);
    }

    #[test]
    fn test_window_drops_oldest_first() {
        let mut window = AmplitudeWindow::new(3);
        for v in [0.1, 0.2, 0.3, 0.4] {
            window.push(v);
        }
        assert_eq!(window.to_vec(), vec![0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_downsample_thousand_samples() {
        let samples: Vec<i16> = (0..1000).map(|i| ((i * 37) % 65536 - 32768) as i16).collect();
        assert_eq!(stride_for(samples.len(), 200), 5);

        let points = downsample(&samples, 200);
        assert_eq!(points.len(), 200);
        assert!(points.iter().all(|p| (0.0..=1.0).contains(p)));
        assert_eq!(points[1], (f32::from(samples[5]).abs() / 32768.0));
    }

    #[test]
    fn test_downsample_short_input_keeps_every_sample() {
        let points = downsample(&[16384, -16384, 0], 200);
        assert_eq!(points, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_downsample_never_exceeds_target() {
        for len in [199, 200, 201, 399, 401, 1001, 44_100] {
            let samples = vec![i16::MIN; len];
            let points = downsample(&samples, 200);
            assert!(points.len() <= 200, "len {} gave {}", len, points.len());
            assert!(points.iter().all(|&p| p == 1.0));
        }
    }

    #[test]
    fn test_downsample_covers_the_tail() {
        let mut samples = vec![0i16; 200];
        samples.extend(std::iter::repeat(i16::MAX).take(100));
        assert_eq!(stride_for(samples.len(), 200), 2);

        let points = downsample(&samples, 200);
        assert_eq!(points.len(), 150);
        assert_eq!(points[..100], vec![0.0; 100][..]);
        assert!(points[100..].iter().all(|&p| p > 0.99));

        // Last stride-aligned sample lands in the final point
        let samples: Vec<i16> = (0..1000).map(|i| if i == 995 { -16384 } else { 0 }).collect();
        let points = downsample(&samples, 200);
        assert!(points.len() <= 200);
        assert_eq!(points.last(), Some(&0.5));
    }

    #[test]
    fn test_downsample_empty() {
        assert!(downsample(&[], 200).is_empty());
        assert!(downsample(&[1, 2, 3], 0).is_empty());
    }

    #[test]
    fn test_rms_and_dbfs() {
        assert_eq!(calculate_rms(&[]), 0.0);
        assert!((calculate_rms(&[0.5, -0.5]) - 0.5).abs() < 1e-6);
        assert_eq!(calculate_peak(&[0.1, -0.7, 0.3]), 0.7);
        assert!((to_dbfs(1.0)).abs() < 1e-6);
        assert_eq!(to_dbfs(0.0), -160.0);
    }
}
