//! Gazemap Model
//!
//! Defines the data contracts shared by the aggregation core and its
//! collaborators:
//! - **Samples:** Gaze positions as delivered by the eye-tracking source
//! - **Surface:** Bounds of the viewing surface samples are checked against
//! - **Buckets:** Grid-aligned coordinates used to quantize positions
//! - **Snapshots:** Immutable, normalized datasets handed to the renderer
//!
//! Positions are in surface units (the same units as the surface bounds),
//! not normalized.

pub mod bucket;
pub mod sample;
pub mod snapshot;
pub mod surface;

pub use bucket::*;
pub use sample::*;
pub use snapshot::*;
pub use surface::*;
