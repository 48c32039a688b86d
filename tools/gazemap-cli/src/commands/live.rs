//! Aggregate a live gaze stream read from stdin.

use std::io::BufRead;
use std::sync::atomic::Ordering;

use gazemap_common::config::AppConfig;
use gazemap_model::GazeSample;
use gazemap_tracker::sources::ChannelSource;
use gazemap_tracker::writer::JsonlSnapshotWriter;
use gazemap_tracker::HeatmapSession;
use tokio::sync::mpsc::UnboundedSender;

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let (tx, mut source) = ChannelSource::channel();

    // Blocking reads stay off the session task.
    std::thread::spawn(move || read_samples(tx));

    let mut session = HeatmapSession::new(&config);
    session.start();
    session.attach_sink(Box::new(
        JsonlSnapshotWriter::new(std::io::stdout()).with_flush_every(1),
    ));

    let stop = session.stop_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.store(true, Ordering::SeqCst);
        }
    });

    let stats = session.run(&mut source).await?;
    if let Some(state) = session.end() {
        tracing::info!(
            accepted = stats.samples_accepted,
            rejected = stats.samples_rejected,
            snapshots = stats.snapshots_delivered,
            total_ms = state.total_time_ms(),
            buckets = state.bucket_count(),
            "Live session finished"
        );
    }

    Ok(())
}

fn read_samples(tx: UnboundedSender<GazeSample>) {
    let stdin = std::io::stdin();
    for (index, line) in stdin.lock().lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stdin");
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match serde_json::from_str::<GazeSample>(trimmed) {
            Ok(sample) => {
                if tx.send(sample).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(line = index + 1, error = %e, "Skipping malformed sample");
            }
        }
    }
}
