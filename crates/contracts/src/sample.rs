//! FrameSample - Ingestion output
//!
//! One keypoint observation set at one instant.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Lower-cased keypoint (landmark) name, e.g. `"hip"`
pub type KeypointName = String;

/// Keypoint position, either normalized `[0, 1]` or surface pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates lie in `[0, 1]`
    pub fn is_unit_range(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

/// Frame sample
///
/// `sample_index` need not be contiguous across a stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSample {
    /// Sample index as reported by the producer
    pub sample_index: i64,

    /// Sample time (milliseconds), authoritative once parsed
    pub timestamp_ms: f64,

    /// Keypoint name -> position
    pub keypoints: BTreeMap<KeypointName, Point>,
}

impl FrameSample {
    pub fn new(sample_index: i64, timestamp_ms: f64) -> Self {
        Self {
            sample_index,
            timestamp_ms,
            keypoints: BTreeMap::new(),
        }
    }

    pub fn keypoint(&self, name: &str) -> Option<Point> {
        self.keypoints.get(name).copied()
    }

    /// Stream ordering: timestamp ascending, sample index on ties
    pub fn stream_order(&self, other: &Self) -> Ordering {
        self.timestamp_ms
            .total_cmp(&other.timestamp_ms)
            .then(self.sample_index.cmp(&other.sample_index))
    }
}

/// Coordinate convention of a sample stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSpace {
    /// Coordinates are fractions of the surface size
    Normalized,
    /// Coordinates are already surface pixels
    #[default]
    Pixel,
}

impl CoordinateSpace {
    /// Majority vote; a tie resolves to pixel
    pub fn from_votes(normalized_votes: u64, pixel_votes: u64) -> Self {
        if normalized_votes > pixel_votes {
            Self::Normalized
        } else {
            Self::Pixel
        }
    }

    pub fn is_normalized(self) -> bool {
        matches!(self, Self::Normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_range_bounds() {
        assert!(Point::new(0.0, 1.0).is_unit_range());
        assert!(!Point::new(1.01, 0.5).is_unit_range());
        assert!(!Point::new(0.5, -0.1).is_unit_range());
    }

    #[test]
    fn test_vote_tie_is_pixel() {
        assert_eq!(CoordinateSpace::from_votes(3, 3), CoordinateSpace::Pixel);
        assert_eq!(CoordinateSpace::from_votes(4, 3), CoordinateSpace::Normalized);
        assert_eq!(CoordinateSpace::from_votes(0, 0), CoordinateSpace::Pixel);
    }

    #[test]
    fn test_stream_order_breaks_ties_by_index() {
        let a = FrameSample::new(2, 100.0);
        let b = FrameSample::new(1, 100.0);
        assert_eq!(a.stream_order(&b), Ordering::Greater);
        let c = FrameSample::new(0, 50.0);
        assert_eq!(c.stream_order(&a), Ordering::Less);
    }
}
