use crate::{ContourError, Result};

/// Conversions between seconds, frames and pixels at one zoom level.
///
/// A scale can only be built from positive timing fields, so none of the
/// conversions can divide by zero. Rebuild it whenever the zoom level
/// changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    sample_rate: f64,
    samples_per_frame: f64,
    zoom_factor: f64,
}

impl TimeScale {
    pub fn new(sample_rate: u32, samples_per_frame: u32, zoom_factor: f64) -> Result<Self> {
        if sample_rate == 0 {
            return Err(ContourError::InvalidInput("sample rate must be positive"));
        }
        if samples_per_frame == 0 {
            return Err(ContourError::InvalidInput(
                "samples per frame must be positive",
            ));
        }
        if zoom_factor.is_nan() || zoom_factor <= 0.0 {
            return Err(ContourError::InvalidInput("zoom factor must be positive"));
        }
        Ok(Self {
            sample_rate: f64::from(sample_rate),
            samples_per_frame: f64::from(samples_per_frame),
            zoom_factor,
        })
    }

    pub fn zoom_factor(&self) -> f64 {
        self.zoom_factor
    }

    /// Frames elapsed after `seconds`; independent of the zoom level.
    pub fn seconds_to_frames(&self, seconds: f64) -> i64 {
        round(seconds * self.sample_rate / self.samples_per_frame)
    }

    pub fn seconds_to_pixels(&self, seconds: f64) -> i64 {
        round(self.zoom_factor * seconds * self.sample_rate / self.samples_per_frame)
    }

    pub fn pixels_to_seconds(&self, pixels: i64) -> f64 {
        pixels as f64 * self.samples_per_frame / (self.sample_rate * self.zoom_factor)
    }

    pub fn milliseconds_to_pixels(&self, milliseconds: i64) -> i64 {
        round(
            milliseconds as f64 * self.sample_rate * self.zoom_factor
                / (1000.0 * self.samples_per_frame),
        )
    }

    pub fn pixels_to_milliseconds(&self, pixels: i64) -> i64 {
        round(
            pixels as f64 * 1000.0 * self.samples_per_frame
                / (self.sample_rate * self.zoom_factor),
        )
    }
}

/// Half away from zero.
fn round(value: f64) -> i64 {
    value.round() as i64
}
