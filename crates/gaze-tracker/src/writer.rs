//! JSONL snapshot writer.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use gazemap_common::error::{GazemapError, GazemapResult};
use gazemap_model::Snapshot;

use crate::SnapshotSink;

/// Writes one snapshot per line as `{"max":..,"min":..,"data":[..]}`.
pub struct JsonlSnapshotWriter<W: Write> {
    writer: BufWriter<W>,
    snapshots_written: u64,
    flush_every: u64,
}

impl<W: Write> JsonlSnapshotWriter<W> {
    /// Wrap a writer. Output is flushed every 1000 snapshots and on drop.
    pub fn new(inner: W) -> Self {
        Self {
            writer: BufWriter::new(inner),
            snapshots_written: 0,
            flush_every: 1000,
        }
    }

    /// Flush after every `n` snapshots (minimum 1). Interactive consumers
    /// reading from a pipe want `1`.
    pub fn with_flush_every(mut self, n: u64) -> Self {
        self.flush_every = n.max(1);
        self
    }

    pub fn write_snapshot(&mut self, snapshot: &Snapshot) -> GazemapResult<()> {
        let json = serde_json::to_string(snapshot)?;
        writeln!(self.writer, "{json}")
            .map_err(|e| GazemapError::sink(format!("Failed to write snapshot: {e}")))?;
        self.snapshots_written += 1;

        if self.snapshots_written % self.flush_every == 0 {
            self.flush()?;
        }

        Ok(())
    }

    pub fn flush(&mut self) -> GazemapResult<()> {
        self.writer
            .flush()
            .map_err(|e| GazemapError::sink(format!("Failed to flush snapshots: {e}")))
    }

    pub fn snapshots_written(&self) -> u64 {
        self.snapshots_written
    }
}

impl JsonlSnapshotWriter<File> {
    /// Create (or truncate) a snapshot file, creating parent directories.
    pub fn create(path: &Path) -> GazemapResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self::new(file))
    }
}

impl<W: Write + Send> SnapshotSink for JsonlSnapshotWriter<W> {
    fn deliver(&mut self, snapshot: &Snapshot) -> GazemapResult<()> {
        self.write_snapshot(snapshot)
    }

    fn name(&self) -> &str {
        "jsonl"
    }
}

impl<W: Write> Drop for JsonlSnapshotWriter<W> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
