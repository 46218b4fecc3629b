//! `inspect` command implementation.

use anyhow::{Context, Result};
use contracts::SampleFetcher;
use ingestion::{FileSampleFetcher, IngestReport};
use serde::Serialize;
use sync_engine::SampleStream;
use tracing::info;

use super::load_config;
use crate::cli::InspectArgs;

/// Sample stream summary for JSON output
#[derive(Serialize)]
struct StreamInfo {
    source: String,
    samples: usize,
    keypoints: Vec<String>,
    normalized: bool,
    nominal_interval_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    span_ms: Option<[f64; 2]>,
    rows: RowInfo,
}

#[derive(Serialize)]
struct RowInfo {
    read: usize,
    accepted: usize,
    dropped: usize,
    synthesized_timestamps: usize,
    normalized_votes: u64,
    pixel_votes: u64,
}

impl From<&IngestReport> for RowInfo {
    fn from(report: &IngestReport) -> Self {
        Self {
            read: report.rows_read,
            accepted: report.rows_accepted,
            dropped: report.rows_dropped(),
            synthesized_timestamps: report.synthesized_timestamps,
            normalized_votes: report.normalized_votes,
            pixel_votes: report.pixel_votes,
        }
    }
}

/// Execute the `inspect` command
pub async fn run_inspect(args: &InspectArgs) -> Result<()> {
    info!(samples = %args.samples.display(), "Inspecting sample stream");

    let config = load_config(args.config.as_deref())?;
    let source = args.samples.display().to_string();

    let text = FileSampleFetcher
        .fetch(&source)
        .await
        .with_context(|| format!("Failed to read samples from {source}"))?;
    let ingested = ingestion::ingest(&text, &config.ingestion)
        .with_context(|| format!("Failed to ingest samples from {source}"))?;
    let report = ingested.report.clone();
    let stream = SampleStream::new(ingested.samples, ingested.coordinate_space, &config.timing);

    let info = StreamInfo {
        source,
        samples: stream.len(),
        keypoints: stream.keypoint_names(),
        normalized: stream.is_normalized(),
        nominal_interval_ms: stream.index().nominal_interval_ms(),
        span_ms: stream.span_ms().map(|(first, last)| [first, last]),
        rows: RowInfo::from(&report),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&info).context("Failed to serialize stream info")?;
        println!("{}", json);
    } else {
        print_stream_info(&info);
    }

    Ok(())
}

fn print_stream_info(info: &StreamInfo) {
    println!("Sample stream: {}", info.source);
    println!("  Samples: {}", info.samples);
    println!(
        "  Coordinates: {}",
        if info.normalized { "normalized" } else { "pixel" }
    );
    println!("  Nominal interval: {:.1} ms", info.nominal_interval_ms);
    match info.span_ms {
        Some([first, last]) => println!(
            "  Time span: {:.0} ms .. {:.0} ms ({:.2} s)",
            first,
            last,
            (last - first) / 1000.0
        ),
        None => println!("  Time span: (empty)"),
    }
    println!("  Keypoints ({}): {}", info.keypoints.len(), info.keypoints.join(", "));

    let rows = &info.rows;
    println!("\n  Rows read: {}", rows.read);
    println!("  Rows accepted: {}", rows.accepted);
    println!("  Rows dropped: {}", rows.dropped);
    if rows.synthesized_timestamps > 0 {
        println!("  Synthesized timestamps: {}", rows.synthesized_timestamps);
    }
    println!(
        "  Votes: {} normalized / {} pixel",
        rows.normalized_votes, rows.pixel_votes
    );
}
