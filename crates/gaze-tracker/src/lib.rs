//! Gazemap Tracker
//!
//! Connects a gaze source and a renderer to the aggregation core:
//!
//! - **Sources:** Where samples come from (pre-loaded, channel-fed)
//! - **Session:** Owns the accumulator, gates tracking and visibility, and
//!   drives ingestion and the publish timer from a single task
//! - **Sinks:** Where snapshots go (JSONL writer, channel)
//! - **Replay:** Deterministic re-aggregation of a recorded sample stream
//!
//! Ingestion and publishing never run concurrently: both happen on the task
//! that owns the [`HeatmapSession`], and the renderer only ever receives
//! owned, immutable snapshots.

pub mod replay;
pub mod session;
pub mod sinks;
pub mod sources;
pub mod writer;

use gazemap_common::error::GazemapResult;
use gazemap_model::{GazeSample, Snapshot};

pub use replay::{replay, ReplayReport};
pub use session::{HeatmapSession, SessionStats};

/// Trait for gaze sample sources.
pub trait GazeSource: Send {
    /// Poll for the next sample without blocking. Returns `None` if no
    /// sample is available right now.
    fn poll(&mut self) -> GazemapResult<Option<GazeSample>>;

    /// Source name for logging.
    fn name(&self) -> &str;

    /// Whether the source will never produce another sample.
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// Trait for snapshot consumers (the renderer side).
pub trait SnapshotSink: Send {
    /// Hand one snapshot to the consumer.
    fn deliver(&mut self, snapshot: &Snapshot) -> GazemapResult<()>;

    /// Sink name for logging.
    fn name(&self) -> &str;
}
