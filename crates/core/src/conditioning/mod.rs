//! Turns raw per-frame gains into normalised perceptual heights.
//!
//! The pipeline is smoothing, range pre-scaling into 8 bits, a 256 bin
//! histogram used to find the 5th and 99th percentile gains, and finally a
//! quadratic compression of the calibrated value.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ContourError, Result};

const HISTOGRAM_BINS: usize = 256;
const MAX_BIN: usize = HISTOGRAM_BINS - 1;
/// The max scan never walks below this bin.
const MAX_GAIN_FLOOR: usize = 2;
/// Denominator of the share of frames treated as the noise floor (5%).
const MIN_PERCENTILE_DIVISOR: usize = 20;
/// Denominator of the share of frames allowed to clip at the top (1%).
const MAX_PERCENTILE_DIVISOR: usize = 100;

/// Per-frame gain magnitudes produced by an upstream audio analysis step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSignal {
    pub sample_rate: u32,
    pub samples_per_frame: u32,
    pub gains: Vec<u32>,
}

impl RawSignal {
    pub fn new(sample_rate: u32, samples_per_frame: u32, gains: Vec<u32>) -> Self {
        Self {
            sample_rate,
            samples_per_frame,
            gains,
        }
    }

    /// Reads a signal from its JSON representation.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn num_frames(&self) -> usize {
        self.gains.len()
    }

    /// Checks the timing fields are usable as denominators.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(ContourError::InvalidInput("sample rate must be positive"));
        }
        if self.samples_per_frame == 0 {
            return Err(ContourError::InvalidInput(
                "samples per frame must be positive",
            ));
        }
        Ok(())
    }
}

/// Dynamic range chosen for a signal by the histogram scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Multiplier that brings the smoothed gains into 0..=255.
    pub scale_factor: f64,
    /// Scaled gain mapped to height 0.
    pub min_gain: f64,
    /// Scaled gain mapped to height 1.
    pub max_gain: f64,
}

impl Calibration {
    pub fn range(&self) -> f64 {
        self.max_gain - self.min_gain
    }

    /// Maps a smoothed gain into `[0, 1]` and applies the quadratic curve.
    pub fn normalise(&self, smoothed: f64) -> f64 {
        let range = self.range();
        if range <= 0.0 {
            return 0.0;
        }
        let value = ((smoothed * self.scale_factor - self.min_gain) / range).clamp(0.0, 1.0);
        value * value
    }
}

/// Triangular smoothing with half weights at both edges.
pub fn smooth(gains: &[u32]) -> Vec<f64> {
    let n = gains.len();
    if n <= 2 {
        return gains.iter().map(|&g| f64::from(g)).collect();
    }

    let g = |i: usize| f64::from(gains[i]);
    let mut smoothed = Vec::with_capacity(n);
    smoothed.push(g(0) / 2.0 + g(1) / 2.0);
    for i in 1..n - 1 {
        smoothed.push(g(i - 1) / 3.0 + g(i) / 3.0 + g(i + 1) / 3.0);
    }
    smoothed.push(g(n - 2) / 2.0 + g(n - 1) / 2.0);
    smoothed
}

/// Builds the gain histogram and walks it from both ends.
pub fn calibrate(smoothed: &[f64]) -> Calibration {
    let n = smoothed.len();
    let peak = smoothed.iter().copied().fold(1.0_f64, f64::max);
    let scale_factor = if peak > MAX_BIN as f64 {
        MAX_BIN as f64 / peak
    } else {
        1.0
    };

    let mut histogram = [0usize; HISTOGRAM_BINS];
    let mut max_bin = 0usize;
    for &gain in smoothed {
        // Truncating cast, negatives and NaN land in bin 0.
        let bin = ((gain * scale_factor) as i64).clamp(0, MAX_BIN as i64) as usize;
        max_bin = max_bin.max(bin);
        histogram[bin] += 1;
    }

    let mut min_gain = 0usize;
    let mut sum = 0usize;
    while min_gain < MAX_BIN && sum < n / MIN_PERCENTILE_DIVISOR {
        sum += histogram[min_gain];
        min_gain += 1;
    }

    let mut max_gain = max_bin;
    sum = 0;
    while max_gain > MAX_GAIN_FLOOR && sum < n / MAX_PERCENTILE_DIVISOR {
        sum += histogram[max_gain];
        max_gain -= 1;
    }

    Calibration {
        scale_factor,
        min_gain: min_gain as f64,
        max_gain: max_gain as f64,
    }
}

/// Full conditioning pass: smoothing, calibration and compression.
pub fn condition(gains: &[u32]) -> Vec<f64> {
    let smoothed = smooth(gains);
    let calibration = calibrate(&smoothed);
    debug!(
        frames = gains.len(),
        scale_factor = calibration.scale_factor,
        min_gain = calibration.min_gain,
        max_gain = calibration.max_gain,
        "calibrated gain range"
    );
    smoothed
        .iter()
        .map(|&gain| calibration.normalise(gain))
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn smoothing_handles_short_inputs() {
        assert!(smooth(&[]).is_empty());
        assert_eq!(smooth(&[7]), vec![7.0]);
        assert_eq!(smooth(&[3, 9]), vec![3.0, 9.0]);
    }

    #[test]
    fn smoothing_weights_edges_and_interior() {
        let smoothed = smooth(&[10, 50, 200, 300]);
        assert_relative_eq!(smoothed[0], 30.0);
        assert_relative_eq!(smoothed[1], 260.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(smoothed[2], 550.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(smoothed[3], 250.0);
    }

    #[test]
    fn short_recording_is_strictly_increasing_towards_loudest_frame() {
        let heights = condition(&[10, 50, 200, 300]);
        assert_eq!(heights.len(), 4);
        for pair in heights.windows(2) {
            assert!(pair[0] < pair[1], "{heights:?}");
        }
        assert_relative_eq!(heights[0], (30.0_f64 / 250.0).powi(2), epsilon = 1e-9);
        assert_relative_eq!(heights[3], 1.0);
    }

    #[test]
    fn loud_signals_are_prescaled_into_eight_bits() {
        let calibration = calibrate(&smooth(&[1000; 10]));
        assert_relative_eq!(calibration.scale_factor, 0.255, epsilon = 1e-12);
        assert!(calibration.max_gain <= MAX_BIN as f64);
    }

    #[test]
    fn percentiles_clip_noise_floor_and_peaks() {
        let mut gains = vec![0; 50];
        gains.extend(std::iter::repeat(200).take(50));

        let calibration = calibrate(&smooth(&gains));
        assert_eq!(calibration.min_gain, 1.0);
        assert_eq!(calibration.max_gain, 199.0);

        let heights = condition(&gains);
        assert_eq!(heights[0], 0.0);
        assert_eq!(heights[99], 1.0);
        assert!(heights.iter().all(|h| (0.0..=1.0).contains(h)));
    }

    #[test]
    fn silent_signal_has_zero_heights() {
        let heights = condition(&[0; 100]);
        assert!(heights.iter().all(|&h| h == 0.0));
    }

    #[test]
    fn empty_range_maps_everything_to_zero() {
        let calibration = calibrate(&smooth(&[0; 3]));
        assert!(calibration.range() <= 0.0);
        assert_eq!(calibration.normalise(1.0), 0.0);
    }

    #[test]
    fn rejects_zero_timing_fields() {
        assert!(RawSignal::new(0, 100, vec![]).validate().is_err());
        assert!(RawSignal::new(8000, 0, vec![]).validate().is_err());
        assert!(RawSignal::new(8000, 100, vec![]).validate().is_ok());
    }

    #[test]
    fn parses_signal_json() {
        let signal =
            RawSignal::from_json(r#"{"sample_rate": 8000, "samples_per_frame": 100, "gains": [1, 2]}"#)
                .unwrap();
        assert_eq!(signal.num_frames(), 2);
    }
}
