//! Clock and timing utilities.
//!
//! Gaze samples are timestamped in integer milliseconds relative to a
//! monotonic epoch taken when the tracking session starts. This module
//! provides:
//! - The session clock itself
//! - A rate controller that decides publish ticks on a sample-time axis

use std::time::Instant;

/// Milliseconds since the session epoch.
pub type TimestampMs = u64;

/// A span of milliseconds.
pub type DurationMs = u64;

/// A session clock that provides monotonic millisecond timestamps
/// relative to a fixed epoch (the moment tracking started).
#[derive(Debug, Clone)]
pub struct SessionClock {
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a new session clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Milliseconds elapsed since the session started.
    pub fn now_ms(&self) -> TimestampMs {
        self.epoch.elapsed().as_millis() as TimestampMs
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    pub fn ms_to_secs(ms: DurationMs) -> f64 {
        ms as f64 / 1_000.0
    }
}

/// Fixed-period tick controller driven by caller-supplied timestamps.
///
/// Used where publish cadence must follow sample time rather than the
/// wall clock (deterministic replay).
#[derive(Debug)]
pub struct RateController {
    interval_ms: DurationMs,
    last_tick_ms: Option<TimestampMs>,
}

impl RateController {
    /// Create a controller that ticks every `interval_ms` (minimum 1 ms).
    pub fn every_ms(interval_ms: DurationMs) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            last_tick_ms: None,
        }
    }

    /// Check if enough time has passed for the next tick.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, current_ms: TimestampMs) -> bool {
        match self.last_tick_ms {
            None => {
                self.last_tick_ms = Some(current_ms);
                true
            }
            Some(last) if current_ms >= last.saturating_add(self.interval_ms) => {
                self.last_tick_ms = Some(current_ms);
                true
            }
            _ => false,
        }
    }

    pub fn interval_ms(&self) -> DurationMs {
        self.interval_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_starts_near_zero() {
        let clock = SessionClock::start();
        assert!(clock.now_ms() < 1_000);
        assert!(!clock.epoch_wall().is_empty());
    }

    #[test]
    fn test_ms_to_secs() {
        assert!((SessionClock::ms_to_secs(1_500) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_rate_controller() {
        let mut ctrl = RateController::every_ms(100);
        assert!(ctrl.should_tick(0)); // first tick always fires
        assert!(!ctrl.should_tick(40));
        assert!(ctrl.should_tick(100));
        assert!(!ctrl.should_tick(150));
        assert!(ctrl.should_tick(260));
    }

    #[test]
    fn test_rate_controller_zero_interval_is_clamped() {
        let ctrl = RateController::every_ms(0);
        assert_eq!(ctrl.interval_ms(), 1);
    }
}
