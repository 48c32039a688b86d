//! Replay a recorded gaze sample stream.

use std::path::PathBuf;

use gazemap_common::clock::SessionClock;
use gazemap_common::config::AppConfig;
use gazemap_model::parse_samples;
use gazemap_tracker::writer::JsonlSnapshotWriter;

/// Number of hottest buckets listed in the summary.
const TOP_BUCKETS: usize = 5;

pub fn run(
    path: PathBuf,
    config: AppConfig,
    output: Option<PathBuf>,
    all: bool,
) -> anyhow::Result<()> {
    println!("Replaying samples from: {}", path.display());

    let content = std::fs::read_to_string(&path)
        .map_err(|_| anyhow::anyhow!("Samples file not found: {}", path.display()))?;
    let samples =
        parse_samples(&content).map_err(|e| anyhow::anyhow!("Failed to parse samples: {e}"))?;

    println!("  Loaded {} samples", samples.len());
    if samples.is_empty() {
        println!("  No samples to replay.");
        return Ok(());
    }

    let report = gazemap_tracker::replay(&samples, &config)?;

    println!(
        "  Accepted: {} (rejected: {})",
        report.samples_accepted, report.samples_rejected
    );
    println!(
        "  Tracked time: {:.3}s",
        SessionClock::ms_to_secs(report.total_time_ms)
    );
    println!(
        "  Buckets: {} ({} above {}% noise floor)",
        report.bucket_count,
        report.final_snapshot.len(),
        config.heatmap.noise_floor_percent
    );
    println!("  Publish ticks: {}", report.snapshots.len());

    let mut hottest = report.final_snapshot.points().to_vec();
    hottest.sort_by(|a, b| b.intensity.total_cmp(&a.intensity));
    if !hottest.is_empty() {
        println!();
        println!("Hottest buckets (grid {}):", config.heatmap.grid_size);
        for point in hottest.iter().take(TOP_BUCKETS) {
            println!("  {} {:>7.3}%", point.coord(), point.intensity);
        }
    }

    if let Some(output) = output {
        let mut writer = JsonlSnapshotWriter::create(&output)?;
        if all {
            for snapshot in &report.snapshots {
                writer.write_snapshot(snapshot)?;
            }
        }
        writer.write_snapshot(&report.final_snapshot)?;
        writer.flush()?;
        println!();
        println!(
            "{} snapshot(s) written to: {}",
            writer.snapshots_written(),
            output.display()
        );
    }

    Ok(())
}
