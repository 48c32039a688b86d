//! Viewing-surface bounds.

use gazemap_common::config::SurfaceConfig;
use serde::{Deserialize, Serialize};

/// Size of the viewing surface. The origin is always `(0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceBounds {
    pub width: f64,
    pub height: f64,
}

impl SurfaceBounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Check if a point lies on the surface. Edges are inclusive, and a
    /// NaN coordinate is never contained.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && x <= self.width && y >= 0.0 && y <= self.height
    }
}

impl From<SurfaceConfig> for SurfaceBounds {
    fn from(config: SurfaceConfig) -> Self {
        Self::new(config.width, config.height)
    }
}
