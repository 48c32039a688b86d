//! Dwell-time accumulation over grid buckets.
//!
//! Each accepted sample closes the interval that started with the previous
//! sample. The elapsed time of that interval is credited to the bucket the
//! gaze occupied *during* it (the previous sample's bucket), never to the
//! bucket of the sample that just arrived. The new sample's bucket becomes
//! the active one and collects the next interval.

use std::collections::HashMap;

use gazemap_common::clock::{DurationMs, TimestampMs};
use gazemap_model::{BucketCoord, GazeSample, SurfaceBounds};

/// Accumulated dwell time for one grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    coord: BucketCoord,
    time_accrued_ms: DurationMs,
    last_touched_ms: TimestampMs,
}

impl Bucket {
    fn new(coord: BucketCoord, now: TimestampMs) -> Self {
        Self {
            coord,
            time_accrued_ms: 0,
            last_touched_ms: now,
        }
    }

    pub fn coord(&self) -> BucketCoord {
        self.coord
    }

    /// Total dwell time credited to this bucket.
    pub fn time_accrued_ms(&self) -> DurationMs {
        self.time_accrued_ms
    }

    /// Timestamp of the most recent sample that landed in this bucket.
    pub fn last_touched_ms(&self) -> TimestampMs {
        self.last_touched_ms
    }
}

/// Result of offering one sample to the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The sample was accepted. `attributed_ms` is the time credited to the
    /// previously active bucket.
    Accepted {
        bucket: BucketCoord,
        attributed_ms: DurationMs,
    },
    /// Tracking is paused.
    TrackingInactive,
    /// No sample was delivered.
    MissingSample,
    /// The sample has no usable coordinate on at least one axis.
    NoPosition,
    /// The position lies outside the viewing surface.
    OutOfBounds,
}

impl IngestOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Running dwell-time totals for one tracked surface.
///
/// `total_time_ms` always equals the sum of every bucket's accrued time
/// between calls.
#[derive(Debug, Clone)]
pub struct Accumulator {
    grid_size: u32,
    buckets: HashMap<BucketCoord, Bucket>,
    total_time_ms: DurationMs,
    last_sample_ms: Option<TimestampMs>,
    active_bucket: Option<BucketCoord>,
}

impl Accumulator {
    /// Create an empty accumulator. A grid size of 0 is treated as 1.
    pub fn new(grid_size: u32) -> Self {
        Self {
            grid_size: grid_size.max(1),
            buckets: HashMap::new(),
            total_time_ms: 0,
            last_sample_ms: None,
            active_bucket: None,
        }
    }

    /// Offer a sample taken at `now`.
    ///
    /// Rejected samples leave the state untouched, including the last
    /// sample timestamp, so the next accepted sample still closes the
    /// interval that began at the last accepted one.
    pub fn ingest(
        &mut self,
        sample: Option<&GazeSample>,
        tracking_active: bool,
        surface: SurfaceBounds,
        now: TimestampMs,
    ) -> IngestOutcome {
        if !tracking_active {
            return IngestOutcome::TrackingInactive;
        }
        let Some(sample) = sample else {
            return IngestOutcome::MissingSample;
        };
        let Some((x, y)) = sample.position() else {
            return IngestOutcome::NoPosition;
        };
        if !surface.contains(x, y) {
            tracing::trace!(x, y, ?surface, "Gaze sample outside surface");
            return IngestOutcome::OutOfBounds;
        }

        let mut attributed_ms = 0;
        if let Some(last) = self.last_sample_ms {
            let delta = elapsed_between(last, now);
            self.total_time_ms = self.total_time_ms.saturating_add(delta);
            if let Some(bucket) = self
                .active_bucket
                .and_then(|coord| self.buckets.get_mut(&coord))
            {
                bucket.time_accrued_ms = bucket.time_accrued_ms.saturating_add(delta);
                attributed_ms = delta;
            }
        }
        self.last_sample_ms = Some(now);

        let coord = BucketCoord::from_position(x, y, self.grid_size);
        self.buckets
            .entry(coord)
            .and_modify(|bucket| bucket.last_touched_ms = now)
            .or_insert_with(|| Bucket::new(coord, now));
        self.active_bucket = Some(coord);

        tracing::trace!(bucket = %coord, attributed_ms, "Gaze sample accepted");
        IngestOutcome::Accepted {
            bucket: coord,
            attributed_ms,
        }
    }

    /// Return to the freshly constructed state. Idempotent.
    pub fn reset(&mut self) {
        self.buckets.clear();
        self.total_time_ms = 0;
        self.last_sample_ms = None;
        self.active_bucket = None;
    }

    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Total elapsed tracking time across all buckets.
    pub fn total_time_ms(&self) -> DurationMs {
        self.total_time_ms
    }

    pub fn last_sample_ms(&self) -> Option<TimestampMs> {
        self.last_sample_ms
    }

    /// The bucket currently collecting dwell time.
    pub fn active_bucket(&self) -> Option<BucketCoord> {
        self.active_bucket
    }

    pub fn bucket(&self, coord: BucketCoord) -> Option<&Bucket> {
        self.buckets.get(&coord)
    }

    /// All buckets, in no particular order.
    pub fn buckets(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.values()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty() && self.total_time_ms == 0 && self.last_sample_ms.is_none()
    }

    /// Bucket with the most accrued time. Ties resolve to the smallest
    /// coordinate.
    pub fn hottest_bucket(&self) -> Option<&Bucket> {
        self.buckets.values().max_by(|a, b| {
            a.time_accrued_ms
                .cmp(&b.time_accrued_ms)
                .then_with(|| b.coord.cmp(&a.coord))
        })
    }
}

/// Elapsed time from `last` to `now`. A clock that runs backwards yields
/// zero, never a negative or wrapped duration.
fn elapsed_between(last: TimestampMs, now: TimestampMs) -> DurationMs {
    if now < last {
        tracing::debug!(last, now, "Clock regression, clamping interval to zero");
    }
    now.saturating_sub(last)
}
