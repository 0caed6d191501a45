//! Core library for waveform contours.
//!
//! Raw per-frame gains are conditioned into normalised heights, expanded
//! into a fixed five level [`Pyramid`], and then browsed through a
//! [`Viewport`] that owns zoom, scroll and selection. [`WaveformModel`] wraps
//! all of it behind the calls a presenting component makes on each redraw.

pub mod conditioning;
pub mod config;
pub mod error;
pub mod flags;
pub mod model;
pub mod pyramid;
pub mod render;
pub mod transform;
pub mod viewport;

pub use conditioning::{Calibration, RawSignal};
pub use config::{AppConfig, DisplayConfig};
pub use error::{ContourError, Result};
pub use flags::{Flag, FlagIndex, FlagRecord};
pub use model::WaveformModel;
pub use pyramid::{Level, Pyramid, NUM_ZOOM_LEVELS};
pub use render::{ColumnShade, FrameLayout, RedrawFrame};
pub use transform::TimeScale;
pub use viewport::{Viewport, ViewportState};
