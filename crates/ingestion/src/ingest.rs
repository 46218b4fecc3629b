//! Row parsing, sample merging and coordinate-convention vote

use std::collections::BTreeMap;

use contracts::{CoordinateSpace, FrameSample, IngestionConfig, Point};
use tracing::{debug, info, instrument};

use crate::error::{IngestionError, Result};
use crate::header::{Column, ColumnMap};
use crate::record::{lines, pad_record, split_record};
use crate::report::{DropReason, IngestReport};
use crate::timecode::parse_timecode;

/// Ingestion output
///
/// `samples` is sorted by timestamp ascending, sample index on ties.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedSamples {
    pub samples: Vec<FrameSample>,
    pub coordinate_space: CoordinateSpace,
    pub report: IngestReport,
}

/// One accepted (sample, keypoint) observation
struct Observation {
    sample_index: i64,
    timestamp_ms: f64,
    keypoint: String,
    point: Point,
    synthesized: bool,
}

/// Parse raw tabular text into ordered frame samples
///
/// # Errors
/// - `MalformedInput` when a required column is absent (no rows are read)
/// - `NoUsableSamples` when every data row is dropped
#[instrument(name = "ingestion_parse", skip(text, config), fields(bytes = text.len()))]
pub fn ingest(text: &str, config: &IngestionConfig) -> Result<IngestedSamples> {
    let mut rows = lines(text);
    let header = match rows.next() {
        Some(line) => split_record(line),
        None => {
            return Err(IngestionError::MalformedInput {
                missing: Column::REQUIRED
                    .iter()
                    .map(|c| c.logical_name().to_string())
                    .collect(),
            })
        }
    };
    let columns = ColumnMap::resolve(&header)?;
    let width = columns.width().max(header.len());

    let mut report = IngestReport::default();
    let mut merged: BTreeMap<i64, FrameSample> = BTreeMap::new();

    for line in rows {
        report.rows_read += 1;
        let fields = pad_record(split_record(line), width);

        let observation = match parse_row(&fields, &columns, config) {
            Ok(observation) => observation,
            Err(reason) => {
                debug!(row = report.rows_read, reason = reason.as_str(), "row dropped");
                report.record_drop(reason);
                continue;
            }
        };

        if observation.point.is_unit_range() {
            report.normalized_votes += 1;
        } else {
            report.pixel_votes += 1;
        }
        if observation.synthesized {
            report.synthesized_timestamps += 1;
        }
        report.rows_accepted += 1;

        let sample = merged
            .entry(observation.sample_index)
            .or_insert_with(|| FrameSample::new(observation.sample_index, observation.timestamp_ms));
        sample.timestamp_ms = observation.timestamp_ms;
        sample.keypoints.insert(observation.keypoint, observation.point);
    }

    report.emit_metrics();

    if merged.is_empty() {
        debug!(rows = report.rows_read, "no usable samples");
        return Err(IngestionError::NoUsableSamples {
            rows: report.rows_read,
        });
    }

    let mut samples: Vec<FrameSample> = merged.into_values().collect();
    samples.sort_by(FrameSample::stream_order);

    let coordinate_space = CoordinateSpace::from_votes(report.normalized_votes, report.pixel_votes);

    info!(
        samples = samples.len(),
        rows = report.rows_read,
        dropped = report.rows_dropped(),
        normalized = coordinate_space.is_normalized(),
        "Sample stream ingested"
    );

    Ok(IngestedSamples {
        samples,
        coordinate_space,
        report,
    })
}

fn parse_row(
    fields: &[String],
    columns: &ColumnMap,
    config: &IngestionConfig,
) -> std::result::Result<Observation, DropReason> {
    let index_value = parse_finite(&fields[columns.sample_index]).ok_or(DropReason::BadIndex)?;
    let sample_index = index_value.trunc() as i64;

    let explicit = columns
        .timestamp_ms
        .and_then(|pos| parse_finite(&fields[pos]))
        .or_else(|| columns.timecode.and_then(|pos| parse_timecode(&fields[pos])));
    let (timestamp_ms, synthesized) = match explicit {
        Some(ts) => (ts, false),
        None => (synthesize_timestamp(sample_index, config.fallback_fps), true),
    };

    let keypoint = fields[columns.keypoint].to_lowercase();
    if keypoint.is_empty() {
        return Err(DropReason::EmptyKeypoint);
    }

    let x = parse_finite(&fields[columns.x]).ok_or(DropReason::BadCoordinate)?;
    let y = parse_finite(&fields[columns.y]).ok_or(DropReason::BadCoordinate)?;

    Ok(Observation {
        sample_index,
        timestamp_ms,
        keypoint,
        point: Point::new(x, y),
        synthesized,
    })
}

fn parse_finite(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `round(index * 1000 / fps)`
fn synthesize_timestamp(sample_index: i64, fallback_fps: f64) -> f64 {
    (sample_index as f64 * 1000.0 / fallback_fps).round()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn config() -> IngestionConfig {
        IngestionConfig::default()
    }

    const FOUR_ROWS: &str = "sample,kp,x,y\n\
0,hip,0.5,0.5\n\
0,knee,0.5,0.7\n\
1,hip,0.52,0.5\n\
1,knee,0.52,0.71\n";

    #[test]
    fn test_four_row_stream_synthesizes_30fps_timestamps() {
        let ingested = ingest(FOUR_ROWS, &config()).unwrap();
        assert_eq!(ingested.samples.len(), 2);
        assert_eq!(ingested.samples[0].timestamp_ms, 0.0);
        assert_eq!(ingested.samples[1].timestamp_ms, 33.0);
        assert!(ingested.samples.iter().all(|s| s.keypoints.len() == 2));
        assert_eq!(ingested.coordinate_space, CoordinateSpace::Normalized);
        assert_eq!(ingested.report.synthesized_timestamps, 4);
    }

    #[test]
    fn test_missing_required_columns_fail_before_rows() {
        let err = ingest("frame,landmark,x\n1,hip,2", &config()).unwrap_err();
        match err {
            IngestionError::MalformedInput { missing } => assert_eq!(missing, vec!["y"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_text_is_malformed() {
        assert!(matches!(
            ingest("", &config()),
            Err(IngestionError::MalformedInput { missing }) if missing.len() == 4
        ));
    }

    #[test]
    fn test_timestamp_resolution_order() {
        let text = "frame,kp,x,y,timestamp_ms,timecode\n\
1,hip,10,10,250,00:00:09.000\n\
2,hip,10,10,,00:00:01.250\n\
3,hip,10,10,bogus,\n";
        let ingested = ingest(text, &config()).unwrap();
        let stamps: Vec<f64> = ingested.samples.iter().map(|s| s.timestamp_ms).collect();
        // index 3 falls back to round(3 * 1000 / 30) = 100
        assert_eq!(stamps, vec![100.0, 250.0, 1250.0]);
        assert_eq!(ingested.report.synthesized_timestamps, 1);
    }

    #[test]
    fn test_overflowing_timecode_falls_back_to_synthesized() {
        let text = "frame,kp,x,y,timecode\n\
1,hip,0.5,0.5,6000000000000000:00:00\n\
2,hip,0.5,0.5,00:00:00.100\n";
        let ingested = ingest(text, &config()).unwrap();
        let stamps: Vec<f64> = ingested.samples.iter().map(|s| s.timestamp_ms).collect();
        assert_eq!(stamps, vec![33.0, 100.0]);
        assert_eq!(ingested.report.synthesized_timestamps, 1);
    }

    #[test]
    fn test_configurable_fallback_rate() {
        let config = IngestionConfig { fallback_fps: 25.0 };
        let ingested = ingest("frame,kp,x,y\n3,hip,1,1\n", &config).unwrap();
        assert_eq!(ingested.samples[0].timestamp_ms, 120.0);
    }

    #[test]
    fn test_bad_rows_are_dropped_not_fatal() {
        let text = "frame,kp,x,y\n\
nan,hip,1,1\n\
x,hip,1,1\n\
1,,1,1\n\
1,hip,abc,1\n\
1,hip,1,\n\
2,Knee,0.1,0.2\n";
        let ingested = ingest(text, &config()).unwrap();
        assert_eq!(ingested.samples.len(), 1);
        assert_eq!(ingested.samples[0].sample_index, 2);
        assert!(ingested.samples[0].keypoints.contains_key("knee"));
        assert_eq!(ingested.report.dropped_bad_index, 2);
        assert_eq!(ingested.report.dropped_empty_keypoint, 1);
        assert_eq!(ingested.report.dropped_bad_coordinate, 2);
        assert_eq!(ingested.report.rows_read, 6);
    }

    #[test]
    fn test_all_rows_dropped_is_no_usable_samples() {
        let err = ingest("frame,kp,x,y\n,hip,1,1\n", &config()).unwrap_err();
        assert!(matches!(err, IngestionError::NoUsableSamples { rows: 1 }));
    }

    #[test]
    fn test_rows_merge_last_write_wins() {
        let text = "frame,kp,x,y,ms\n\
5,hip,1,1,100\n\
5,knee,2,2,110\n\
5,hip,3,3,120\n";
        let ingested = ingest(text, &config()).unwrap();
        assert_eq!(ingested.samples.len(), 1);
        let sample = &ingested.samples[0];
        assert_eq!(sample.timestamp_ms, 120.0);
        assert_eq!(sample.keypoint("hip"), Some(Point::new(3.0, 3.0)));
        assert_eq!(sample.keypoint("knee"), Some(Point::new(2.0, 2.0)));
    }

    #[test]
    fn test_short_rows_padded() {
        // timestamp column absent on the row -> padded empty -> synthesized
        let ingested = ingest("frame,kp,x,y,ms\n30,hip,1,2\n", &config()).unwrap();
        assert_eq!(ingested.samples[0].timestamp_ms, 1000.0);
    }

    #[test]
    fn test_quoted_keypoint_names() {
        let text = "frame,kp,x,y\n1,\"Left, Hip\",0.1,0.1\n";
        let ingested = ingest(text, &config()).unwrap();
        assert!(ingested.samples[0].keypoints.contains_key("left, hip"));
    }

    #[test]
    fn test_sorted_by_timestamp_then_index() {
        let text = "frame,kp,x,y,ms\n\
9,hip,1,1,50\n\
4,hip,1,1,50\n\
1,hip,1,1,300\n\
7,hip,1,1,10\n";
        let ingested = ingest(text, &config()).unwrap();
        let order: Vec<i64> = ingested.samples.iter().map(|s| s.sample_index).collect();
        assert_eq!(order, vec![7, 4, 9, 1]);
    }

    #[test]
    fn test_shuffled_rows_ingest_identically() {
        let mut rows: Vec<String> = (0..40)
            .flat_map(|i| {
                let ms = (i * 37) % 500;
                vec![
                    format!("{i},hip,{},{},{ms}", 100 + i, 200),
                    format!("{i},knee,{},{},{ms}", 110 + i, 260),
                ]
            })
            .collect();
        let header = "frame,kp,x,y,ms";
        let baseline = format!("{header}\n{}", rows.join("\n"));
        let expected = ingest(&baseline, &config()).unwrap();

        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        rows.shuffle(&mut rng);
        let shuffled = format!("{header}\n{}", rows.join("\n"));
        let actual = ingest(&shuffled, &config()).unwrap();

        assert_eq!(expected.samples, actual.samples);
        assert!(actual
            .samples
            .windows(2)
            .all(|w| w[0].stream_order(&w[1]).is_le()));
        // idempotent re-ingestion
        assert_eq!(ingest(&shuffled, &config()).unwrap(), actual);
    }

    #[test]
    fn test_vote_majority_pixel() {
        let text = "frame,kp,x,y\n1,a,0.5,0.5\n1,b,640,0.5\n1,c,320,240\n";
        let ingested = ingest(text, &config()).unwrap();
        assert_eq!(ingested.coordinate_space, CoordinateSpace::Pixel);
    }

    #[test]
    fn test_vote_tie_resolves_to_pixel() {
        let text = "frame,kp,x,y\n1,a,0.5,0.5\n1,b,640,480\n";
        let ingested = ingest(text, &config()).unwrap();
        assert_eq!(ingested.report.normalized_votes, 1);
        assert_eq!(ingested.report.pixel_votes, 1);
        assert_eq!(ingested.coordinate_space, CoordinateSpace::Pixel);
    }
}
