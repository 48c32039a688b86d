//! Snapshot publishing.
//!
//! Reads an [`Accumulator`] without mutating it and converts absolute dwell
//! times into percentages of the grand total.

use gazemap_common::config::HeatmapConfig;
use gazemap_model::{Snapshot, SnapshotPoint};

use crate::accumulator::Accumulator;

/// Default noise floor, in percent of total dwell time.
pub const DEFAULT_NOISE_FLOOR_PERCENT: f64 = 0.1;

/// Builds normalized snapshots from accumulator state.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotPublisher {
    noise_floor_percent: f64,
}

impl SnapshotPublisher {
    /// Create a publisher that drops buckets whose share of total dwell
    /// time is at or below `noise_floor_percent`.
    pub fn new(noise_floor_percent: f64) -> Self {
        Self {
            noise_floor_percent,
        }
    }

    pub fn from_config(config: &HeatmapConfig) -> Self {
        Self::new(config.noise_floor_percent)
    }

    pub fn noise_floor_percent(&self) -> f64 {
        self.noise_floor_percent
    }

    /// Produce a snapshot of the current state.
    ///
    /// Returns the empty snapshot when no time has accrued or when no bucket
    /// clears the noise floor. Points are ordered by coordinate.
    pub fn publish(&self, state: &Accumulator) -> Snapshot {
        let total = state.total_time_ms();
        if total == 0 {
            return Snapshot::empty();
        }

        let total = total as f64;
        let mut points: Vec<SnapshotPoint> = state
            .buckets()
            .filter_map(|bucket| {
                let intensity = 100.0 * bucket.time_accrued_ms() as f64 / total;
                (intensity > self.noise_floor_percent)
                    .then(|| SnapshotPoint::new(bucket.coord(), intensity))
            })
            .collect();
        points.sort_by_key(SnapshotPoint::coord);

        let snapshot = Snapshot::from_points(points);
        tracing::debug!(
            buckets = state.bucket_count(),
            retained = snapshot.len(),
            total_ms = state.total_time_ms(),
            max = snapshot.max_intensity(),
            "Published snapshot"
        );
        snapshot
    }

    /// Publish from state that may not exist yet. Before an accumulator is
    /// attached there is nothing to publish, which is not an error.
    pub fn publish_attached(&self, state: Option<&Accumulator>) -> Option<Snapshot> {
        state.map(|state| self.publish(state))
    }
}

impl Default for SnapshotPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_FLOOR_PERCENT)
    }
}
