//! Normalized attention-map snapshots.
//!
//! A snapshot is the only thing the renderer ever sees. Its serialized form
//! is the `{max, min, data: [{x, y, value}]}` dataset shape that density
//! renderers consume directly.

use serde::{Deserialize, Serialize};

use crate::bucket::BucketCoord;

/// One bucket's share of total dwell time, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPoint {
    pub x: i64,
    pub y: i64,
    #[serde(rename = "value")]
    pub intensity: f64,
}

impl SnapshotPoint {
    pub fn new(coord: BucketCoord, intensity: f64) -> Self {
        Self {
            x: coord.x,
            y: coord.y,
            intensity,
        }
    }

    pub fn coord(&self) -> BucketCoord {
        BucketCoord::new(self.x, self.y)
    }
}

/// Immutable dataset produced by one publish cycle.
///
/// The lower scale bound is always 0 and the upper bound is the largest
/// retained intensity, so the hottest bucket always maps to full scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "max")]
    max_intensity: f64,
    #[serde(rename = "min")]
    min_intensity: f64,
    data: Vec<SnapshotPoint>,
}

impl Snapshot {
    /// The `{max: 0, min: 0, data: []}` snapshot.
    pub fn empty() -> Self {
        Self {
            max_intensity: 0.0,
            min_intensity: 0.0,
            data: Vec::new(),
        }
    }

    /// Build a snapshot from retained points, deriving the scale bounds.
    pub fn from_points(data: Vec<SnapshotPoint>) -> Self {
        if data.is_empty() {
            return Self::empty();
        }
        let max_intensity = data
            .iter()
            .map(|p| p.intensity)
            .fold(f64::NEG_INFINITY, f64::max);
        Self {
            max_intensity,
            min_intensity: 0.0,
            data,
        }
    }

    pub fn max_intensity(&self) -> f64 {
        self.max_intensity
    }

    pub fn min_intensity(&self) -> f64 {
        self.min_intensity
    }

    pub fn points(&self) -> &[SnapshotPoint] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Intensity of the bucket at `coord`, if it survived the noise floor.
    pub fn intensity_at(&self, coord: BucketCoord) -> Option<f64> {
        self.data
            .iter()
            .find(|p| p.coord() == coord)
            .map(|p| p.intensity)
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}
