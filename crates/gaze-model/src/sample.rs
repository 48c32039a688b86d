//! Gaze sample types for the inbound sample stream.
//!
//! Samples are exchanged as JSON objects, one per line. The source may
//! report a position in absolute surface coordinates (`absoluteX` /
//! `absoluteY`), in local coordinates (`x` / `y`), or both; absolute
//! coordinates take precedence per axis.

use gazemap_common::clock::TimestampMs;
use serde::{Deserialize, Serialize};

/// A single gaze position reported by the eye-tracking source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GazeSample {
    /// Capture time in ms since session start. Live sources may leave this
    /// unset and let the receiver stamp samples on arrival.
    #[serde(rename = "t", default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<TimestampMs>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_x: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_y: Option<f64>,

    /// Local X coordinate (fallback when `absolute_x` is absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,

    /// Local Y coordinate (fallback when `absolute_y` is absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl GazeSample {
    /// Create a sample with absolute coordinates and no timestamp.
    pub fn absolute(x: f64, y: f64) -> Self {
        Self {
            absolute_x: Some(x),
            absolute_y: Some(y),
            ..Default::default()
        }
    }

    /// Create a sample that only carries local coordinates.
    pub fn local(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    /// Attach a capture timestamp.
    pub fn at(mut self, timestamp_ms: TimestampMs) -> Self {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }

    /// Resolved position, preferring absolute over local per axis.
    /// `None` when either axis has no value at all.
    pub fn position(&self) -> Option<(f64, f64)> {
        let x = self.absolute_x.or(self.x)?;
        let y = self.absolute_y.or(self.y)?;
        Some((x, y))
    }
}

/// Parse samples from JSONL content (one JSON object per line).
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_samples(jsonl: &str) -> Result<Vec<GazeSample>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}
