//! Deterministic replay of a recorded sample stream.
//!
//! Instead of a wall-clock timer, publish ticks are placed on the samples'
//! own time axis: before each sample is ingested, a snapshot is taken if a
//! full publish period has passed since the previous one. This reproduces
//! what a live session would have shown, independent of how fast the file
//! is read.

use gazemap_aggregation::{Accumulator, SnapshotPublisher};
use gazemap_common::clock::{DurationMs, RateController};
use gazemap_common::config::AppConfig;
use gazemap_common::error::{GazemapError, GazemapResult};
use gazemap_model::{GazeSample, Snapshot, SurfaceBounds};

/// Outcome of a replay run.
#[derive(Debug, Clone)]
pub struct ReplayReport {
    /// Snapshots taken at each publish tick, in order.
    pub snapshots: Vec<Snapshot>,
    /// Snapshot of the state after the last sample.
    pub final_snapshot: Snapshot,
    pub samples_accepted: u64,
    pub samples_rejected: u64,
    pub total_time_ms: DurationMs,
    pub bucket_count: usize,
}

/// Re-aggregate `samples` with the given configuration.
///
/// Every sample must carry a timestamp.
pub fn replay(samples: &[GazeSample], config: &AppConfig) -> GazemapResult<ReplayReport> {
    config.validate()?;

    let surface = SurfaceBounds::from(config.surface);
    let publisher = SnapshotPublisher::from_config(&config.heatmap);
    let mut cadence = RateController::every_ms(config.heatmap.publish_period_ms);
    let mut state = Accumulator::new(config.heatmap.grid_size);

    let mut snapshots = Vec::new();
    let mut samples_accepted = 0;
    let mut samples_rejected = 0;

    for (index, sample) in samples.iter().enumerate() {
        let t = sample
            .timestamp_ms
            .ok_or_else(|| GazemapError::replay(format!("sample {index} has no timestamp")))?;

        if cadence.should_tick(t) {
            snapshots.push(publisher.publish(&state));
        }

        if state.ingest(Some(sample), true, surface, t).is_accepted() {
            samples_accepted += 1;
        } else {
            samples_rejected += 1;
        }
    }

    let final_snapshot = publisher.publish(&state);
    tracing::info!(
        samples = samples.len(),
        accepted = samples_accepted,
        ticks = snapshots.len(),
        total_ms = state.total_time_ms(),
        "Replay finished"
    );

    Ok(ReplayReport {
        snapshots,
        final_snapshot,
        samples_accepted,
        samples_rejected,
        total_time_ms: state.total_time_ms(),
        bucket_count: state.bucket_count(),
    })
}
