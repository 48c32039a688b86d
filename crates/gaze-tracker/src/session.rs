//! Heatmap session: the control surface around one accumulator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gazemap_aggregation::{Accumulator, IngestOutcome, SnapshotPublisher};
use gazemap_common::clock::{SessionClock, TimestampMs};
use gazemap_common::config::{AppConfig, HeatmapConfig};
use gazemap_common::error::GazemapResult;
use gazemap_model::{GazeSample, Snapshot, SurfaceBounds};
use tokio::time::MissedTickBehavior;

use crate::{GazeSource, SnapshotSink};

/// Upper bound on samples ingested between two timer checks, so a burst
/// cannot starve the publish timer.
const MAX_SAMPLES_PER_TURN: usize = 256;

/// How long the loop sleeps when the source has nothing to offer.
const IDLE_POLL: Duration = Duration::from_millis(1);

/// Counters for one session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub samples_accepted: u64,
    pub samples_rejected: u64,
    pub snapshots_delivered: u64,
    pub snapshots_dropped: u64,
}

/// Owns the accumulator for one tracked surface and mediates every access
/// to it.
///
/// The accumulator exists between [`start`](Self::start) and
/// [`end`](Self::end). Publishing without one is a no-op. Visibility only
/// gates delivery to the sink; samples keep accumulating while hidden.
pub struct HeatmapSession {
    config: HeatmapConfig,
    surface: SurfaceBounds,
    accumulator: Option<Accumulator>,
    publisher: SnapshotPublisher,
    sink: Option<Box<dyn SnapshotSink>>,
    clock: SessionClock,
    tracking_active: bool,
    visible: bool,
    stop_flag: Arc<AtomicBool>,
    stats: SessionStats,
}

impl HeatmapSession {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            config: config.heatmap,
            surface: config.surface.into(),
            accumulator: None,
            publisher: SnapshotPublisher::from_config(&config.heatmap),
            sink: None,
            clock: SessionClock::start(),
            tracking_active: true,
            visible: true,
            stop_flag: Arc::new(AtomicBool::new(false)),
            stats: SessionStats::default(),
        }
    }

    /// Create the accumulator and restart the session clock. Calling this
    /// on a started session keeps the existing state.
    pub fn start(&mut self) {
        if self.accumulator.is_some() {
            tracing::debug!("Heatmap session already started");
            return;
        }
        self.accumulator = Some(Accumulator::new(self.config.grid_size));
        self.clock = SessionClock::start();
        self.stop_flag.store(false, Ordering::SeqCst);
        tracing::info!(
            grid_size = self.config.grid_size,
            surface_width = self.surface.width,
            surface_height = self.surface.height,
            epoch = %self.clock.epoch_wall(),
            "Heatmap session started"
        );
    }

    /// Tear down the session, handing back the final state.
    pub fn end(&mut self) -> Option<Accumulator> {
        self.stop();
        let state = self.accumulator.take();
        if let Some(state) = &state {
            tracing::info!(
                total_ms = state.total_time_ms(),
                buckets = state.bucket_count(),
                "Heatmap session ended"
            );
        }
        state
    }

    pub fn is_started(&self) -> bool {
        self.accumulator.is_some()
    }

    /// Connect the renderer. If state already exists it receives a snapshot
    /// right away instead of waiting for the next tick.
    pub fn attach_sink(&mut self, sink: Box<dyn SnapshotSink>) {
        tracing::debug!(sink = %sink.name(), "Snapshot sink attached");
        self.sink = Some(sink);
        self.publish_tick();
    }

    pub fn detach_sink(&mut self) -> Option<Box<dyn SnapshotSink>> {
        self.sink.take()
    }

    pub fn set_tracking_active(&mut self, active: bool) {
        self.tracking_active = active;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Update the viewing-surface bounds used for the bounds check.
    pub fn set_surface(&mut self, surface: SurfaceBounds) {
        self.surface = surface;
    }

    pub fn surface(&self) -> SurfaceBounds {
        self.surface
    }

    /// Offer one sample taken at `now`. Returns `None` when the session has
    /// not been started.
    pub fn ingest(
        &mut self,
        sample: Option<&GazeSample>,
        now: TimestampMs,
    ) -> Option<IngestOutcome> {
        let state = self.accumulator.as_mut()?;
        let outcome = state.ingest(sample, self.tracking_active, self.surface, now);
        if outcome.is_accepted() {
            self.stats.samples_accepted += 1;
        } else {
            self.stats.samples_rejected += 1;
        }
        Some(outcome)
    }

    /// Offer one sample stamped with the session clock.
    pub fn ingest_now(&mut self, sample: Option<&GazeSample>) -> Option<IngestOutcome> {
        let now = self.clock.now_ms();
        self.ingest(sample, now)
    }

    /// Publish the current state and hand it to the sink when one is
    /// attached and the output is visible. Returns the snapshot that was
    /// produced, delivered or not.
    pub fn publish_tick(&mut self) -> Option<Snapshot> {
        let snapshot = self
            .publisher
            .publish_attached(self.accumulator.as_ref())?;
        self.deliver(&snapshot);
        Some(snapshot)
    }

    /// Reset accumulated state and blank the renderer.
    pub fn clear(&mut self) {
        if let Some(state) = self.accumulator.as_mut() {
            state.reset();
        }
        tracing::info!("Heatmap data cleared");
        self.deliver(&Snapshot::empty());
    }

    /// Ask a running [`run`](Self::run) loop to exit.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    /// Get the stop flag for external coordination.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    pub fn accumulator(&self) -> Option<&Accumulator> {
        self.accumulator.as_ref()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Drive the session from `source` until the stop flag is set or the
    /// source is exhausted.
    ///
    /// Samples are stamped on arrival. The publish timer fires every
    /// `publish_period_ms` regardless of sample rate and is dropped when the
    /// loop exits. A final snapshot is published on the way out.
    pub async fn run(&mut self, source: &mut dyn GazeSource) -> GazemapResult<SessionStats> {
        self.start();
        // A stop requested before this call belongs to an earlier loop.
        self.stop_flag.store(false, Ordering::SeqCst);

        let period = Duration::from_millis(self.config.publish_period_ms.max(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            source = %source.name(),
            period_ms = self.config.publish_period_ms,
            "Heatmap loop started"
        );

        while !self.stop_flag.load(Ordering::Relaxed) {
            let drained = self.drain(source);
            if drained == 0 && source.is_exhausted() {
                tracing::debug!(source = %source.name(), "Gaze source exhausted");
                break;
            }

            let idle = if drained == 0 {
                IDLE_POLL
            } else {
                Duration::ZERO
            };
            tokio::select! {
                biased;
                _ = ticker.tick() => {
                    self.publish_tick();
                }
                _ = tokio::time::sleep(idle) => {}
            }
        }

        self.publish_tick();
        tracing::info!(
            accepted = self.stats.samples_accepted,
            rejected = self.stats.samples_rejected,
            delivered = self.stats.snapshots_delivered,
            "Heatmap loop stopped"
        );
        Ok(self.stats)
    }

    fn drain(&mut self, source: &mut dyn GazeSource) -> usize {
        let mut drained = 0;
        while drained < MAX_SAMPLES_PER_TURN {
            match source.poll() {
                Ok(Some(sample)) => {
                    self.ingest_now(Some(&sample));
                    drained += 1;
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, source = %source.name(), "Gaze source error");
                    break;
                }
            }
        }
        drained
    }

    fn deliver(&mut self, snapshot: &Snapshot) {
        if !self.visible {
            return;
        }
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        // Undelivered snapshots are not buffered; the next tick carries
        // fresher data anyway.
        match sink.deliver(snapshot) {
            Ok(()) => self.stats.snapshots_delivered += 1,
            Err(e) => {
                self.stats.snapshots_dropped += 1;
                tracing::warn!(error = %e, sink = %sink.name(), "Snapshot not delivered");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::ChannelSink;
    use crate::sources::{ChannelSource, StubSource};
    use gazemap_common::error::GazemapError;
    use gazemap_model::BucketCoord;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn session() -> HeatmapSession {
        HeatmapSession::new(&AppConfig::default())
    }

    fn attached(session: &mut HeatmapSession) -> UnboundedReceiver<Snapshot> {
        let (sink, rx) = ChannelSink::channel();
        session.attach_sink(Box::new(sink));
        rx
    }

    fn received(rx: &mut UnboundedReceiver<Snapshot>) -> Vec<Snapshot> {
        let mut out = Vec::new();
        while let Ok(snapshot) = rx.try_recv() {
            out.push(snapshot);
        }
        out
    }

    struct FailingSink;

    impl SnapshotSink for FailingSink {
        fn deliver(&mut self, _snapshot: &Snapshot) -> GazemapResult<()> {
            Err(GazemapError::sink("renderer not ready"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_publish_before_start_is_noop() {
        let mut session = session();
        let mut rx = attached(&mut session);
        assert_eq!(session.publish_tick(), None);
        assert_eq!(session.ingest(Some(&GazeSample::absolute(1.0, 1.0)), 0), None);
        assert!(received(&mut rx).is_empty());
    }

    #[test]
    fn test_attach_publishes_immediately() {
        let mut session = session();
        session.start();
        session.ingest(Some(&GazeSample::absolute(10.0, 10.0)), 0);
        session.ingest(Some(&GazeSample::absolute(12.0, 11.0)), 1000);

        let mut rx = attached(&mut session);
        let snapshots = received(&mut rx);
        assert_eq!(snapshots.len(), 1);
        assert_eq!(
            snapshots[0].intensity_at(BucketCoord::new(10, 10)),
            Some(100.0)
        );
    }

    #[test]
    fn test_hidden_session_keeps_collecting() {
        let mut session = session();
        session.start();
        let mut rx = attached(&mut session);
        received(&mut rx);

        session.set_visible(false);
        session.ingest(Some(&GazeSample::absolute(10.0, 10.0)), 0);
        session.ingest(Some(&GazeSample::absolute(60.0, 60.0)), 500);
        assert!(session.publish_tick().is_some());
        assert!(received(&mut rx).is_empty());

        session.set_visible(true);
        let snapshot = session.publish_tick().unwrap();
        assert_eq!(received(&mut rx), vec![snapshot.clone()]);
        assert_eq!(snapshot.intensity_at(BucketCoord::new(10, 10)), Some(100.0));
    }

    #[test]
    fn test_inactive_tracking_rejects_samples() {
        let mut session = session();
        session.start();
        session.set_tracking_active(false);
        let outcome = session.ingest(Some(&GazeSample::absolute(10.0, 10.0)), 0);
        assert_eq!(outcome, Some(IngestOutcome::TrackingInactive));
        assert_eq!(session.stats().samples_rejected, 1);
        assert!(session.accumulator().unwrap().is_empty());
    }

    #[test]
    fn test_surface_update_changes_bounds_check() {
        let mut session = session();
        session.start();
        let far = GazeSample::absolute(2500.0, 100.0);
        assert_eq!(
            session.ingest(Some(&far), 0),
            Some(IngestOutcome::OutOfBounds)
        );

        session.set_surface(SurfaceBounds::new(2560.0, 1440.0));
        assert!(session.ingest(Some(&far), 10).unwrap().is_accepted());
    }

    #[test]
    fn test_clear_resets_and_blanks_renderer() {
        let mut session = session();
        session.start();
        session.ingest(Some(&GazeSample::absolute(10.0, 10.0)), 0);
        session.ingest(Some(&GazeSample::absolute(10.0, 10.0)), 300);
        let mut rx = attached(&mut session);
        received(&mut rx);

        session.clear();
        assert!(session.accumulator().unwrap().is_empty());
        assert_eq!(received(&mut rx), vec![Snapshot::empty()]);
    }

    #[test]
    fn test_sink_errors_are_dropped() {
        let mut session = session();
        session.start();
        session.attach_sink(Box::new(FailingSink));
        session.publish_tick();
        let stats = session.stats();
        assert_eq!(stats.snapshots_delivered, 0);
        assert_eq!(stats.snapshots_dropped, 2);
    }

    #[test]
    fn test_end_hands_back_state() {
        let mut session = session();
        session.start();
        session.ingest(Some(&GazeSample::absolute(10.0, 10.0)), 0);
        session.ingest(Some(&GazeSample::absolute(10.0, 10.0)), 40);

        let state = session.end().unwrap();
        assert_eq!(state.total_time_ms(), 40);
        assert!(!session.is_started());
        assert_eq!(session.publish_tick(), None);
    }

    #[tokio::test]
    async fn test_run_drains_stub_source() {
        let mut session = session();
        let mut rx = attached(&mut session);
        let samples = (0..50)
            .map(|i| GazeSample::absolute(100.0 + i as f64, 200.0))
            .collect();
        let mut source = StubSource::new(samples);

        let stats = session.run(&mut source).await.unwrap();
        assert_eq!(stats.samples_accepted, 50);
        assert_eq!(stats.samples_rejected, 0);
        assert!(stats.snapshots_delivered >= 1);
        assert!(!received(&mut rx).is_empty());

        let state = session.accumulator().unwrap();
        let sum: u64 = state.buckets().map(|b| b.time_accrued_ms()).sum();
        assert_eq!(state.total_time_ms(), sum);
    }

    #[test]
    fn test_detached_sink_receives_nothing() {
        let mut session = session();
        session.start();
        let mut rx = attached(&mut session);
        received(&mut rx);

        let sink = session.detach_sink();
        assert_eq!(sink.map(|s| s.name().to_string()), Some("channel".to_string()));
        session.ingest(Some(&GazeSample::absolute(10.0, 10.0)), 0);
        assert!(session.publish_tick().is_some());
        assert!(received(&mut rx).is_empty());
        assert_eq!(session.stats().snapshots_delivered, 1);
        assert!(session.detach_sink().is_none());
    }

    #[tokio::test]
    async fn test_run_after_stop_on_started_session() {
        let mut session = session();
        session.start();
        session.stop();

        let mut source = StubSource::new(vec![
            GazeSample::absolute(10.0, 10.0),
            GazeSample::absolute(20.0, 20.0),
        ]);
        let stats = session.run(&mut source).await.unwrap();
        assert_eq!(stats.samples_accepted, 2);
        assert_eq!(session.accumulator().unwrap().bucket_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_flag() {
        let mut session = session();
        let stop = session.stop_flag();
        let (tx, mut source) = ChannelSource::channel();

        let feeder = tokio::spawn(async move {
            for i in 0..5 {
                tx.send(GazeSample::absolute(50.0, 50.0 + i as f64)).unwrap();
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
            stop.store(true, Ordering::SeqCst);
            // Keep the channel open so only the flag can end the loop.
            tokio::time::sleep(Duration::from_millis(100)).await;
            drop(tx);
        });

        let (sink, mut rx) = ChannelSink::channel();
        session.start();
        session.attach_sink(Box::new(sink));
        let stats = session.run(&mut source).await.unwrap();
        feeder.await.unwrap();

        assert_eq!(stats.samples_accepted, 5);
        // Attach, ticks at 0, 100 and 200 ms, then the final publish after
        // the flag is raised at 250 ms.
        assert_eq!(received(&mut rx).len(), 5);
        assert_eq!(stats.snapshots_delivered, 5);
    }

    #[tokio::test]
    async fn test_run_ends_when_channel_closes() {
        let mut session = session();
        let (tx, mut source) = ChannelSource::channel();
        tx.send(GazeSample::absolute(1.0, 1.0)).unwrap();
        drop(tx);

        let stats = session.run(&mut source).await.unwrap();
        assert_eq!(stats.samples_accepted, 1);
    }
}
