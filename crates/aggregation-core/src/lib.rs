//! Gazemap Aggregation Core
//!
//! Turns an irregular stream of gaze samples into a time-weighted
//! attention map:
//! - **Accumulator:** Quantizes positions into grid buckets and attributes
//!   elapsed time to the bucket the gaze occupied during each interval
//! - **Publisher:** Converts accumulated dwell time into percentages of the
//!   total and emits an immutable [`Snapshot`](gazemap_model::Snapshot)
//!
//! This crate is pure computation: no I/O, no timers, no errors. Every
//! anomaly (inactive tracking, missing or out-of-bounds samples, clock
//! regressions, empty state) degrades to a no-op.

pub mod accumulator;
pub mod publisher;

pub use accumulator::{Accumulator, Bucket, IngestOutcome};
pub use publisher::SnapshotPublisher;
