//! Zoom level, scroll offset and selection over a shared [`Pyramid`].
//!
//! Zoom transitions update every field of [`ViewportState`] in one `&mut`
//! call, so a reader never sees a new zoom level paired with an offset or
//! selection from the old one.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::pyramid::{Level, Pyramid, NUM_ZOOM_LEVELS};
use crate::{ContourError, Result};

const MAX_ZOOM_LEVEL: usize = NUM_ZOOM_LEVELS - 1;

/// Mutable view parameters, all expressed at the current zoom level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewportState {
    pub zoom_level: usize,
    /// Horizontal scroll in pixels into the current level.
    pub offset: usize,
    pub selection_start: usize,
    pub selection_end: usize,
    pub playback: Option<usize>,
}

impl ViewportState {
    /// Moves one level towards more detail, keeping the centre column fixed.
    fn zoom_in(&mut self, width: usize) {
        let half = width / 2;
        self.zoom_level -= 1;
        self.selection_start = self.selection_start.saturating_mul(2);
        self.selection_end = self.selection_end.saturating_mul(2);
        self.offset = self
            .offset
            .saturating_add(half)
            .saturating_mul(2)
            .saturating_sub(half);
    }

    /// Moves one level towards less detail. Odd selection bounds lose their
    /// low bit.
    fn zoom_out(&mut self, width: usize) {
        let half = width / 2;
        self.zoom_level += 1;
        self.selection_start /= 2;
        self.selection_end /= 2;
        self.offset = (self.offset.saturating_add(half) / 2).saturating_sub(half);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheKey {
    zoom_level: usize,
    half_height: u32,
}

/// Pixel heights for one (zoom level, half-height) pair.
#[derive(Debug, Default)]
struct HeightCache {
    key: Option<CacheKey>,
    heights: Vec<u32>,
}

impl HeightCache {
    fn invalidate(&mut self) {
        self.key = None;
    }

    fn get_or_compute(&mut self, key: CacheKey, level: &Level) -> &[u32] {
        if self.key != Some(key) {
            trace!(?key, len = level.len(), "recomputing rendered heights");
            self.heights = scale_heights(level.heights(), key.half_height);
            self.key = Some(key);
        }
        &self.heights
    }
}

/// Rounds each normalised height to `half_height - 1` pixels.
pub fn scale_heights(heights: &[f64], half_height: u32) -> Vec<u32> {
    let budget = f64::from(half_height.saturating_sub(1));
    heights.iter().map(|&h| (h * budget).round() as u32).collect()
}

/// Owns the viewport state for one loaded signal.
#[derive(Debug)]
pub struct Viewport {
    pyramid: Arc<Pyramid>,
    state: ViewportState,
    width: usize,
    cache: HeightCache,
}

impl Viewport {
    /// Starts at the pyramid's initial zoom level with nothing selected.
    pub fn new(pyramid: Arc<Pyramid>, width: usize) -> Self {
        let state = ViewportState {
            zoom_level: pyramid.initial_zoom_level(),
            ..Default::default()
        };
        debug!(zoom_level = state.zoom_level, width, "viewport created");
        Self {
            pyramid,
            state,
            width,
            cache: HeightCache::default(),
        }
    }

    pub fn pyramid(&self) -> &Arc<Pyramid> {
        &self.pyramid
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn zoom_level(&self) -> usize {
        self.state.zoom_level
    }

    pub fn level(&self) -> &Level {
        &self.pyramid.levels()[self.state.zoom_level]
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Viewport width used to find the centre column on zoom.
    pub fn set_width(&mut self, width: usize) {
        self.width = width;
    }

    pub fn can_zoom_in(&self) -> bool {
        self.state.zoom_level > 0
    }

    pub fn can_zoom_out(&self) -> bool {
        self.state.zoom_level < MAX_ZOOM_LEVEL
    }

    pub fn zoom_in(&mut self) {
        if !self.can_zoom_in() {
            return;
        }
        self.state.zoom_in(self.width);
        self.cache.invalidate();
        debug!(state = ?self.state, "zoomed in");
    }

    pub fn zoom_out(&mut self) {
        if !self.can_zoom_out() {
            return;
        }
        self.state.zoom_out(self.width);
        self.cache.invalidate();
        debug!(state = ?self.state, "zoomed out");
    }

    /// Steps one level at a time towards `target`.
    pub fn set_zoom_level(&mut self, target: usize) -> Result<()> {
        if target > MAX_ZOOM_LEVEL {
            return Err(ContourError::ZoomLevelOutOfRange(target));
        }
        while self.state.zoom_level > target {
            self.zoom_in();
        }
        while self.state.zoom_level < target {
            self.zoom_out();
        }
        Ok(())
    }

    /// Length of the current level. Callers keep offset and selection below it.
    pub fn max_pos(&self) -> usize {
        self.level().len()
    }

    pub fn set_parameters(&mut self, start: usize, end: usize, offset: usize) {
        self.state.selection_start = start;
        self.state.selection_end = end;
        self.state.offset = offset;
    }

    pub fn set_playback(&mut self, position: Option<usize>) {
        self.state.playback = position;
    }

    /// Forces the next [`Viewport::rendered_heights`] call to recompute.
    pub fn invalidate_heights(&mut self) {
        self.cache.invalidate();
    }

    /// Pixel heights of the current level for a half-height budget.
    pub fn rendered_heights(&mut self, half_height: u32) -> &[u32] {
        let key = CacheKey {
            zoom_level: self.state.zoom_level,
            half_height,
        };
        let level = &self.pyramid.levels()[self.state.zoom_level];
        self.cache.get_or_compute(key, level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(frames: usize, width: usize) -> Viewport {
        let heights: Vec<f64> = (0..frames).map(|i| (i % 10) as f64 / 10.0).collect();
        Viewport::new(Arc::new(Pyramid::build(&heights)), width)
    }

    #[test]
    fn starts_at_initial_level() {
        assert_eq!(viewport(100, 200).zoom_level(), 0);
        assert_eq!(viewport(2000, 200).zoom_level(), 2);
        assert_eq!(viewport(6000, 200).zoom_level(), 3);
    }

    #[test]
    fn zoom_in_keeps_centre_column() {
        let mut view = viewport(2000, 200);
        view.set_parameters(0, 0, 100);

        view.zoom_in();

        assert_eq!(view.zoom_level(), 1);
        assert_eq!(view.state().offset, 300);
    }

    #[test]
    fn zoom_out_clamps_offset_at_zero() {
        let mut view = viewport(2000, 200);
        view.set_parameters(0, 0, 50);

        view.zoom_out();

        assert_eq!(view.zoom_level(), 3);
        assert_eq!(view.state().offset, 0);
    }

    #[test]
    fn zoom_round_trip_restores_even_selection() {
        let mut view = viewport(2000, 200);
        view.set_parameters(40, 90, 0);

        view.zoom_in();
        assert_eq!((view.state().selection_start, view.state().selection_end), (80, 180));
        view.zoom_out();

        assert_eq!(view.zoom_level(), 2);
        assert_eq!((view.state().selection_start, view.state().selection_end), (40, 90));
    }

    #[test]
    fn zoom_out_truncates_odd_selection() {
        let mut view = viewport(2000, 200);
        view.set_parameters(41, 91, 0);

        view.zoom_out();
        view.zoom_in();

        assert_eq!((view.state().selection_start, view.state().selection_end), (40, 90));
    }

    #[test]
    fn zoom_is_noop_at_pyramid_bounds() {
        let mut view = viewport(10, 200);
        assert!(!view.can_zoom_in());
        view.zoom_in();
        assert_eq!(view.zoom_level(), 0);

        view.set_zoom_level(4).unwrap();
        assert!(!view.can_zoom_out());
        view.zoom_out();
        assert_eq!(view.zoom_level(), 4);
    }

    #[test]
    fn set_zoom_level_steps_through_intermediate_levels() {
        let mut stepped = viewport(6000, 200);
        stepped.set_parameters(10, 20, 500);
        stepped.set_zoom_level(0).unwrap();

        let mut manual = viewport(6000, 200);
        manual.set_parameters(10, 20, 500);
        manual.zoom_in();
        manual.zoom_in();
        manual.zoom_in();

        assert_eq!(stepped.state(), manual.state());
        assert_eq!(stepped.max_pos(), 12_000);
    }

    #[test]
    fn rejects_unknown_zoom_level() {
        let mut view = viewport(10, 200);
        assert!(matches!(
            view.set_zoom_level(5),
            Err(ContourError::ZoomLevelOutOfRange(5))
        ));
        assert_eq!(view.zoom_level(), 0);
    }

    #[test]
    fn rendered_heights_scale_to_budget() {
        let heights = scale_heights(&[0.0, 0.5, 1.0, 0.26], 11);
        assert_eq!(heights, vec![0, 5, 10, 3]);
        assert_eq!(scale_heights(&[1.0], 0), vec![0]);
    }

    #[test]
    fn rendered_heights_follow_zoom_level() {
        let mut view = viewport(400, 200);
        assert_eq!(view.zoom_level(), 1);
        assert_eq!(view.rendered_heights(11).len(), 400);
        assert_eq!(view.rendered_heights(11)[9], 9);
        assert_eq!(view.rendered_heights(21)[9], 18);
        assert_eq!(view.rendered_heights(11)[9], 9);

        view.zoom_out();
        assert_eq!(view.rendered_heights(11).len(), 200);

        view.set_playback(Some(3));
        assert_eq!(view.rendered_heights(21).len(), 200);
        assert_eq!(view.state().playback, Some(3));
    }

    #[test]
    fn zoom_saturates_out_of_range_parameters() {
        let mut view = viewport(2000, 200);
        view.set_parameters(usize::MAX, usize::MAX / 2 + 1, usize::MAX - 10);

        view.zoom_in();

        let state = view.state();
        assert_eq!(state.zoom_level, 1);
        assert_eq!(state.selection_start, usize::MAX);
        assert_eq!(state.selection_end, usize::MAX);
        assert_eq!(state.offset, usize::MAX - 100);
    }
}
