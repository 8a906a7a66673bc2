//! Raw GPS input

use chrono::NaiveDateTime;

use super::Coordinate;

/// A single GPS fix from a recorded track.
///
/// Only lives for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedPoint {
    pub coordinate: Coordinate,
    pub timestamp: NaiveDateTime,
    /// Track index within the batch the point was delivered in
    pub track: u32,
    /// Batch (page) the provider delivered the point in
    pub batch: u32,
}

impl TimedPoint {
    pub fn new(coordinate: Coordinate, timestamp: NaiveDateTime, track: u32, batch: u32) -> Self {
        Self {
            coordinate,
            timestamp,
            track,
            batch,
        }
    }

    /// Absolute elapsed time between two fixes in seconds
    #[allow(clippy::cast_precision_loss)]
    pub fn seconds_between(&self, other: &TimedPoint) -> f64 {
        (self.timestamp - other.timestamp).num_milliseconds().abs() as f64 / 1000.0
    }

    /// Whether both fixes come from the same physical recording
    pub fn same_recording(&self, other: &TimedPoint) -> bool {
        self.track == other.track && self.batch == other.batch
    }
}
