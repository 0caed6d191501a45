//! Per-redraw data handed to whatever paints the contour.

use serde::Serialize;

use crate::config::DisplayConfig;
use crate::{FlagIndex, TimeScale};

/// Vertical bands of the view, top to bottom: flags, fade, waveform, fade,
/// timecodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameLayout {
    pub flags_height: u32,
    pub gradient_height: u32,
    pub top_after_gradient: u32,
    pub bottom_of_gradient: u32,
    pub wave_max_height: u32,
    pub timecode_text_size: u32,
}

impl FrameLayout {
    /// Splits `config.height`; every band saturates instead of overflowing.
    pub fn compute(config: &DisplayConfig, density: f32) -> Self {
        let text_height = config.text_size as f32 * density;
        let bottom_of_gradient = (config.height as f32 - text_height).max(0.0) as u32;
        let band = bottom_of_gradient.saturating_sub(config.flags_height);
        let gradient_height = (band as f32 * config.gradient_fraction).max(0.0) as u32;
        let wave_max_height = band.saturating_sub(gradient_height.saturating_mul(2));

        Self {
            flags_height: config.flags_height,
            gradient_height,
            top_after_gradient: config.flags_height.saturating_add(gradient_height),
            bottom_of_gradient,
            wave_max_height,
            timecode_text_size: text_height.max(0.0) as u32,
        }
    }

    /// Half-height budget for [`crate::Viewport::rendered_heights`].
    pub fn half_height(&self) -> u32 {
        self.wave_max_height / 2
    }

    /// Top and bottom y of the vertical line for a rendered height.
    pub fn line_extent(&self, height: u32) -> (i64, i64) {
        let centre = i64::from(self.top_after_gradient) + i64::from(self.half_height());
        (centre - i64::from(height), centre + 1 + i64::from(height))
    }
}

/// How a visible column relates to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnShade {
    Unselected,
    Selected,
    Boundary,
}

/// Shade of every column in `offset..offset + width`.
pub fn shade_columns(offset: usize, width: usize, start: usize, end: usize) -> Vec<ColumnShade> {
    (offset..offset + width)
        .map(|point| {
            if point == start || point == end {
                ColumnShade::Boundary
            } else if point > start && point < end {
                ColumnShade::Selected
            } else {
                ColumnShade::Unselected
            }
        })
        .collect()
}

/// Formats whole seconds as `M:SS`.
pub fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Whole seconds shown at the left and right edges of a window.
pub fn window_seconds(scale: &TimeScale, offset: usize, width: usize) -> (u32, u32) {
    let one_pixel = scale.pixels_to_seconds(1);
    let elapsed = offset as f64 * one_pixel;
    let start = (elapsed + one_pixel) as u32;
    let end = (elapsed + one_pixel * width as f64) as u32;
    (start, end)
}

/// Everything needed to paint one frame of the visible window.
#[derive(Debug, Clone, Serialize)]
pub struct RedrawFrame {
    pub zoom_level: usize,
    pub offset: usize,
    pub layout: FrameLayout,
    /// Rendered heights for the visible columns only.
    pub heights: Vec<u32>,
    pub shades: Vec<ColumnShade>,
    pub playback_column: Option<usize>,
    pub flag_columns: Vec<usize>,
    pub start_time: String,
    pub end_time: String,
}

/// Inputs for [`RedrawFrame::build`] gathered from the viewport.
#[derive(Debug, Clone, Copy)]
pub struct WindowSpec<'a> {
    pub zoom_level: usize,
    pub offset: usize,
    pub view_width: usize,
    pub selection: (usize, usize),
    pub playback: Option<usize>,
    pub rendered: &'a [u32],
}

impl RedrawFrame {
    pub fn build(
        window: WindowSpec<'_>,
        layout: FrameLayout,
        scale: &TimeScale,
        flags: &FlagIndex,
    ) -> Self {
        let start = window.offset;
        let width = window
            .rendered
            .len()
            .saturating_sub(start)
            .min(window.view_width);
        let heights = if width > 0 {
            window.rendered[start..start + width].to_vec()
        } else {
            Vec::new()
        };

        let (start_seconds, end_seconds) = window_seconds(scale, start, width);
        let playback_column = window
            .playback
            .and_then(|pos| pos.checked_sub(start))
            .filter(|&column| column < width);

        Self {
            zoom_level: window.zoom_level,
            offset: start,
            layout,
            heights,
            shades: shade_columns(start, width, window.selection.0, window.selection.1),
            playback_column,
            flag_columns: flags.scan(scale, start, width),
            start_time: format_time(start_seconds),
            end_time: format_time(end_seconds),
        }
    }

    /// Number of visible columns.
    pub fn width(&self) -> usize {
        self.heights.len()
    }
}
