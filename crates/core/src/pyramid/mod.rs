//! Multi-resolution height levels built once per loaded signal.

use tracing::debug;

/// Number of zoom levels in every pyramid.
pub const NUM_ZOOM_LEVELS: usize = 5;

/// Heights resampled for a single zoom level.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    zoom_factor: f64,
    heights: Vec<f64>,
}

impl Level {
    /// Pixels-per-frame multiplier for this level.
    pub fn zoom_factor(&self) -> f64 {
        self.zoom_factor
    }

    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Pairwise average of this level, dropping a trailing odd sample.
    fn halved(&self) -> Self {
        let heights = self
            .heights
            .chunks_exact(2)
            .map(|pair| 0.5 * (pair[0] + pair[1]))
            .collect();
        Self {
            zoom_factor: self.zoom_factor / 2.0,
            heights,
        }
    }
}

/// Immutable set of levels, index 0 most expanded, index 4 most condensed.
#[derive(Debug, Clone, PartialEq)]
pub struct Pyramid {
    levels: [Level; NUM_ZOOM_LEVELS],
}

impl Pyramid {
    /// Builds all levels from normalised heights.
    pub fn build(heights: &[f64]) -> Self {
        let expanded = Level {
            zoom_factor: 2.0,
            heights: upsample(heights),
        };
        let normal = Level {
            zoom_factor: 1.0,
            heights: heights.to_vec(),
        };
        let half = normal.halved();
        let quarter = half.halved();
        let eighth = quarter.halved();

        let pyramid = Self {
            levels: [expanded, normal, half, quarter, eighth],
        };
        debug!(
            frames = heights.len(),
            lengths = ?pyramid.levels.iter().map(Level::len).collect::<Vec<_>>(),
            "built level pyramid"
        );
        pyramid
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Length of the 1:1 level, i.e. the number of frames.
    pub fn num_frames(&self) -> usize {
        self.levels[1].len()
    }

    /// Level shown right after loading, chosen so that long recordings start
    /// out condensed.
    pub fn initial_zoom_level(&self) -> usize {
        initial_zoom_level(self.num_frames())
    }
}

/// Initial level for a recording of `num_frames` frames.
pub fn initial_zoom_level(num_frames: usize) -> usize {
    match num_frames {
        n if n > 5000 => 3,
        n if n > 1000 => 2,
        n if n > 300 => 1,
        _ => 0,
    }
}

/// Doubles the sample count, inserting the midpoint before each sample.
fn upsample(heights: &[f64]) -> Vec<f64> {
    let mut expanded = Vec::with_capacity(heights.len() * 2);
    let Some(&first) = heights.first() else {
        return expanded;
    };
    expanded.push(0.5 * first);
    expanded.push(first);
    for pair in heights.windows(2) {
        expanded.push(0.5 * (pair[0] + pair[1]));
        expanded.push(pair[1]);
    }
    expanded
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::conditioning::condition;

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 / n.max(1) as f64).collect()
    }

    #[test]
    fn level_lengths_follow_halving_rule() {
        for n in [0, 1, 2, 3, 7, 10, 33, 301] {
            let heights = ramp(n);
            let pyramid = Pyramid::build(&heights);

            assert_eq!(pyramid.levels()[0].len(), 2 * n);
            assert_eq!(pyramid.levels()[1].len(), n);
            assert_eq!(pyramid.levels()[1].heights(), heights.as_slice());
            for j in 1..NUM_ZOOM_LEVELS - 1 {
                assert_eq!(pyramid.levels()[j + 1].len(), pyramid.levels()[j].len() / 2);
            }
        }
    }

    #[test]
    fn zoom_factors_strictly_decrease() {
        let pyramid = Pyramid::build(&ramp(16));
        let factors: Vec<f64> = pyramid.levels().iter().map(Level::zoom_factor).collect();
        assert_eq!(factors, vec![2.0, 1.0, 0.5, 0.25, 0.125]);
    }

    #[test]
    fn upsampled_level_interpolates_towards_right_sample() {
        let pyramid = Pyramid::build(&[0.4, 0.8]);
        let expanded = pyramid.levels()[0].heights();
        assert_relative_eq!(expanded[0], 0.2);
        assert_relative_eq!(expanded[1], 0.4);
        assert_relative_eq!(expanded[2], 0.6);
        assert_relative_eq!(expanded[3], 0.8);
    }

    #[test]
    fn halving_drops_trailing_unpaired_sample() {
        let pyramid = Pyramid::build(&[0.2, 0.4, 1.0]);
        assert_eq!(pyramid.levels()[2].len(), 1);
        assert_relative_eq!(pyramid.levels()[2].heights()[0], 0.3, epsilon = 1e-12);
        assert!(pyramid.levels()[3].is_empty());
    }

    #[test]
    fn every_height_stays_normalised() {
        let gains: Vec<u32> = (0..500).map(|i| (i * 37 % 400) as u32).collect();
        let pyramid = Pyramid::build(&condition(&gains));
        for level in pyramid.levels() {
            assert!(level.heights().iter().all(|h| (0.0..=1.0).contains(h)));
        }
    }

    #[test]
    fn empty_signal_builds_empty_levels() {
        let pyramid = Pyramid::build(&[]);
        assert!(pyramid.levels().iter().all(Level::is_empty));
        assert_eq!(pyramid.initial_zoom_level(), 0);
    }

    #[test]
    fn initial_level_depends_on_recording_length() {
        assert_eq!(initial_zoom_level(300), 0);
        assert_eq!(initial_zoom_level(301), 1);
        assert_eq!(initial_zoom_level(1001), 2);
        assert_eq!(initial_zoom_level(5000), 2);
        assert_eq!(initial_zoom_level(5001), 3);
    }
}
