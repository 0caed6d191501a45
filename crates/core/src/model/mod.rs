use std::sync::Arc;

use tracing::{debug, info};

use crate::conditioning::condition;
use crate::config::DisplayConfig;
use crate::render::{FrameLayout, RedrawFrame, WindowSpec};
use crate::{
    ContourError, FlagIndex, FlagRecord, Pyramid, RawSignal, Result, TimeScale, Viewport,
    ViewportState,
};

#[derive(Debug)]
struct LoadedSignal {
    sample_rate: u32,
    samples_per_frame: u32,
    viewport: Viewport,
}

impl LoadedSignal {
    fn time_scale(&self) -> Result<TimeScale> {
        TimeScale::new(
            self.sample_rate,
            self.samples_per_frame,
            self.viewport.level().zoom_factor(),
        )
    }
}

/// Host-facing façade tying a loaded signal, its viewport and flags together.
///
/// Every query fails with [`ContourError::NotInitialized`] until
/// [`WaveformModel::set_sound_file`] has succeeded.
#[derive(Debug)]
pub struct WaveformModel {
    loaded: Option<LoadedSignal>,
    flags: FlagIndex,
    display: DisplayConfig,
    density: f32,
}

impl WaveformModel {
    pub fn new(display: DisplayConfig) -> Self {
        let density = display.density;
        Self {
            loaded: None,
            flags: FlagIndex::new(),
            display,
            density,
        }
    }

    /// Conditions the signal, builds its pyramid and resets the viewport.
    pub fn set_sound_file(&mut self, signal: &RawSignal) -> Result<()> {
        signal.validate()?;
        let pyramid = Arc::new(Pyramid::build(&condition(&signal.gains)));
        let viewport = Viewport::new(pyramid, self.display.width as usize);
        info!(
            frames = signal.num_frames(),
            sample_rate = signal.sample_rate,
            samples_per_frame = signal.samples_per_frame,
            zoom_level = viewport.zoom_level(),
            "loaded signal"
        );
        self.loaded = Some(LoadedSignal {
            sample_rate: signal.sample_rate,
            samples_per_frame: signal.samples_per_frame,
            viewport,
        });
        Ok(())
    }

    pub fn has_sound_file(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn is_initialized(&self) -> bool {
        self.has_sound_file()
    }

    fn loaded(&self) -> Result<&LoadedSignal> {
        self.loaded.as_ref().ok_or(ContourError::NotInitialized)
    }

    fn viewport_mut(&mut self) -> Result<&mut Viewport> {
        self.loaded
            .as_mut()
            .map(|loaded| &mut loaded.viewport)
            .ok_or(ContourError::NotInitialized)
    }

    pub fn pyramid(&self) -> Result<Arc<Pyramid>> {
        Ok(self.loaded()?.viewport.pyramid().clone())
    }

    pub fn state(&self) -> Result<ViewportState> {
        Ok(self.loaded()?.viewport.state())
    }

    pub fn zoom_level(&self) -> Result<usize> {
        Ok(self.loaded()?.viewport.zoom_level())
    }

    pub fn can_zoom_in(&self) -> Result<bool> {
        Ok(self.loaded()?.viewport.can_zoom_in())
    }

    pub fn can_zoom_out(&self) -> Result<bool> {
        Ok(self.loaded()?.viewport.can_zoom_out())
    }

    pub fn zoom_in(&mut self) -> Result<()> {
        self.viewport_mut()?.zoom_in();
        Ok(())
    }

    pub fn zoom_out(&mut self) -> Result<()> {
        self.viewport_mut()?.zoom_out();
        Ok(())
    }

    pub fn set_zoom_level(&mut self, target: usize) -> Result<()> {
        self.viewport_mut()?.set_zoom_level(target)
    }

    pub fn max_pos(&self) -> Result<usize> {
        Ok(self.loaded()?.viewport.max_pos())
    }

    pub fn time_scale(&self) -> Result<TimeScale> {
        self.loaded()?.time_scale()
    }

    pub fn seconds_to_frames(&self, seconds: f64) -> Result<i64> {
        Ok(self.time_scale()?.seconds_to_frames(seconds))
    }

    pub fn seconds_to_pixels(&self, seconds: f64) -> Result<i64> {
        Ok(self.time_scale()?.seconds_to_pixels(seconds))
    }

    pub fn pixels_to_seconds(&self, pixels: i64) -> Result<f64> {
        Ok(self.time_scale()?.pixels_to_seconds(pixels))
    }

    pub fn milliseconds_to_pixels(&self, milliseconds: i64) -> Result<i64> {
        Ok(self.time_scale()?.milliseconds_to_pixels(milliseconds))
    }

    pub fn pixels_to_milliseconds(&self, pixels: i64) -> Result<i64> {
        Ok(self.time_scale()?.pixels_to_milliseconds(pixels))
    }

    pub fn set_parameters(&mut self, start: usize, end: usize, offset: usize) -> Result<()> {
        self.viewport_mut()?.set_parameters(start, end, offset);
        Ok(())
    }

    pub fn start(&self) -> Result<usize> {
        Ok(self.state()?.selection_start)
    }

    pub fn end(&self) -> Result<usize> {
        Ok(self.state()?.selection_end)
    }

    pub fn offset(&self) -> Result<usize> {
        Ok(self.state()?.offset)
    }

    pub fn playback(&self) -> Result<Option<usize>> {
        Ok(self.state()?.playback)
    }

    pub fn set_playback(&mut self, position: Option<usize>) -> Result<()> {
        self.viewport_mut()?.set_playback(position);
        Ok(())
    }

    /// Replaces the flag index. Allowed before a signal is loaded.
    pub fn set_flags<R: FlagRecord>(&mut self, records: &[R]) {
        self.flags = FlagIndex::from_records(records);
        debug!(flags = self.flags.len(), "replaced flag index");
    }

    pub fn flags(&self) -> &FlagIndex {
        &self.flags
    }

    /// Stores a new text density and drops the rendered heights.
    pub fn recompute_heights(&mut self, density: f32) {
        self.density = density;
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.viewport.invalidate_heights();
        }
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    /// Updates the view size; the new height takes effect on the next redraw.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.display.width = width;
        self.display.height = height;
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.viewport.set_width(width as usize);
        }
    }

    pub fn layout(&self) -> FrameLayout {
        FrameLayout::compute(&self.display, self.density)
    }

    /// Gathers heights, shading, flags and timecodes for the visible window.
    pub fn redraw(&mut self) -> Result<RedrawFrame> {
        let layout = self.layout();
        let view_width = self.display.width as usize;
        let loaded = self.loaded.as_mut().ok_or(ContourError::NotInitialized)?;
        let scale = loaded.time_scale()?;
        let state = loaded.viewport.state();
        let rendered = loaded.viewport.rendered_heights(layout.half_height());

        let window = WindowSpec {
            zoom_level: state.zoom_level,
            offset: state.offset,
            view_width,
            selection: (state.selection_start, state.selection_end),
            playback: state.playback,
            rendered,
        };
        Ok(RedrawFrame::build(window, layout, &scale, &self.flags))
    }
}

impl Default for WaveformModel {
    fn default() -> Self {
        Self::new(DisplayConfig::default())
    }
}
