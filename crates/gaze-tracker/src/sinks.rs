//! In-process snapshot sinks.

use gazemap_common::error::{GazemapError, GazemapResult};
use gazemap_model::Snapshot;
use tokio::sync::mpsc;

use crate::SnapshotSink;

/// Forwards snapshots to another task over a tokio channel.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Snapshot>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<Snapshot>) -> Self {
        Self { tx }
    }

    /// Create a connected sink/receiver pair.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Snapshot>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl SnapshotSink for ChannelSink {
    fn deliver(&mut self, snapshot: &Snapshot) -> GazemapResult<()> {
        self.tx
            .send(snapshot.clone())
            .map_err(|_| GazemapError::sink("Snapshot receiver dropped"))
    }

    fn name(&self) -> &str {
        "channel"
    }
}
