//! Ingestion report and drop accounting

use metrics::counter;

/// Why a data row was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// Sample index missing or not a finite number
    BadIndex,
    /// Keypoint name empty
    EmptyKeypoint,
    /// x or y missing or not a finite number
    BadCoordinate,
}

impl DropReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DropReason::BadIndex => "bad_index",
            DropReason::EmptyKeypoint => "empty_keypoint",
            DropReason::BadCoordinate => "bad_coordinate",
        }
    }
}

/// Per-ingestion statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Data rows inspected (header excluded)
    pub rows_read: usize,
    /// Rows merged into a sample
    pub rows_accepted: usize,
    /// Rows with an unusable sample index
    pub dropped_bad_index: usize,
    /// Rows with an empty keypoint name
    pub dropped_empty_keypoint: usize,
    /// Rows with unusable coordinates
    pub dropped_bad_coordinate: usize,
    /// Accepted rows whose timestamp was synthesized from the sample index
    pub synthesized_timestamps: usize,
    /// (x, y) pairs inside `[0, 1]`
    pub normalized_votes: u64,
    /// (x, y) pairs outside `[0, 1]`
    pub pixel_votes: u64,
}

impl IngestReport {
    pub fn rows_dropped(&self) -> usize {
        self.dropped_bad_index + self.dropped_empty_keypoint + self.dropped_bad_coordinate
    }

    pub(crate) fn record_drop(&mut self, reason: DropReason) {
        match reason {
            DropReason::BadIndex => self.dropped_bad_index += 1,
            DropReason::EmptyKeypoint => self.dropped_empty_keypoint += 1,
            DropReason::BadCoordinate => self.dropped_bad_coordinate += 1,
        }
    }

    /// Publish drop counters
    pub(crate) fn emit_metrics(&self) {
        counter!("overlay_ingest_rows_total").increment(self.rows_read as u64);
        for (reason, count) in [
            (DropReason::BadIndex, self.dropped_bad_index),
            (DropReason::EmptyKeypoint, self.dropped_empty_keypoint),
            (DropReason::BadCoordinate, self.dropped_bad_coordinate),
        ] {
            if count > 0 {
                counter!("overlay_ingest_rows_dropped_total", "reason" => reason.as_str())
                    .increment(count as u64);
            }
        }
    }
}
