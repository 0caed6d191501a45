use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ContourError, Result};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub display: DisplayConfig,
}

impl AppConfig {
    /// Reads a configuration file encoded as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.display.validate()?;
        Ok(config)
    }
}

/// Geometry of the surface the contour is presented on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// View width in pixels.
    pub width: u32,
    /// View height in pixels.
    pub height: u32,
    /// Screen density multiplier applied to text.
    pub density: f32,
    /// Base timecode text size before density scaling.
    pub text_size: u32,
    /// Band reserved above the waveform for flag markers.
    pub flags_height: u32,
    /// Share of the waveform band given to each of the top and bottom fades.
    pub gradient_fraction: f32,
}

impl DisplayConfig {
    /// Rejects values the layout cannot split the view with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=0.5).contains(&self.gradient_fraction) {
            return Err(ContourError::InvalidInput(
                "gradient fraction must lie within 0.0..=0.5",
            ));
        }
        if !self.density.is_finite() || self.density < 0.0 {
            return Err(ContourError::InvalidInput(
                "density must be a non-negative number",
            ));
        }
        Ok(())
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 120,
            height: 48,
            density: 1.0,
            text_size: 12,
            flags_height: 0,
            gradient_fraction: 0.2,
        }
    }
}
