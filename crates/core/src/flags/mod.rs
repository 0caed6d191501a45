use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::TimeScale;

/// Anything that marks a whole second of the recording.
pub trait FlagRecord {
    fn seconds_after_start(&self) -> u32;
}

/// Plain flag record as read from a flag list file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    pub seconds_after_start: u32,
}

impl FlagRecord for Flag {
    fn seconds_after_start(&self) -> u32 {
        self.seconds_after_start
    }
}

/// Set of flagged seconds. Replaced wholesale, never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagIndex {
    seconds: HashSet<u32>,
}

impl FlagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reduces a list of flag records to their distinct seconds.
    pub fn from_records<'a, R, I>(records: I) -> Self
    where
        R: FlagRecord + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        Self {
            seconds: records
                .into_iter()
                .map(FlagRecord::seconds_after_start)
                .collect(),
        }
    }

    pub fn contains(&self, second: u32) -> bool {
        self.seconds.contains(&second)
    }

    pub fn len(&self) -> usize {
        self.seconds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seconds.is_empty()
    }

    /// Columns of a `width` pixel window starting at `offset` where a flagged
    /// second begins.
    ///
    /// Elapsed time is accumulated one pixel at a time, so a column is
    /// reported when its truncated second is new and flagged. Reported
    /// columns are 1-based relative to the window start.
    pub fn scan(&self, scale: &TimeScale, offset: usize, width: usize) -> Vec<usize> {
        if self.seconds.is_empty() {
            return Vec::new();
        }

        let one_pixel = scale.pixels_to_seconds(1);
        let mut elapsed = offset as f64 * one_pixel;
        let mut last_second = elapsed as i64;
        let mut columns = Vec::new();

        for column in 1..=width {
            elapsed += one_pixel;
            let second = elapsed as i64;
            if second != last_second
                && u32::try_from(second).is_ok_and(|second| self.contains(second))
            {
                last_second = second;
                columns.push(column);
            }
        }
        columns
    }
}
