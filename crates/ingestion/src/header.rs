//! Header resolution: case-insensitive synonyms onto logical columns

use crate::error::{IngestionError, Result};

/// Logical column of the sample stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    SampleIndex,
    Keypoint,
    X,
    Y,
    TimestampMs,
    Timecode,
}

impl Column {
    /// Columns that must be present before any row is processed
    pub const REQUIRED: [Column; 4] = [Column::SampleIndex, Column::Keypoint, Column::X, Column::Y];

    pub const ALL: [Column; 6] = [
        Column::SampleIndex,
        Column::Keypoint,
        Column::X,
        Column::Y,
        Column::TimestampMs,
        Column::Timecode,
    ];

    /// Name used in error messages
    pub fn logical_name(self) -> &'static str {
        match self {
            Column::SampleIndex => "sample-index",
            Column::Keypoint => "keypoint",
            Column::X => "x",
            Column::Y => "y",
            Column::TimestampMs => "timestamp-ms",
            Column::Timecode => "timecode",
        }
    }

    /// Accepted header names, already folded
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            Column::SampleIndex => &[
                "sample_index",
                "sample",
                "frame",
                "frame_index",
                "frame_idx",
                "frame_num",
                "frame_number",
                "index",
                "idx",
            ],
            Column::Keypoint => &["keypoint", "kp", "landmark", "name", "joint", "part", "point"],
            Column::X => &["x", "x_px", "x_norm", "px"],
            Column::Y => &["y", "y_px", "y_norm", "py"],
            Column::TimestampMs => &["timestamp_ms", "time_ms", "t_ms", "ms", "timestamp"],
            Column::Timecode => &["timecode", "time_code", "tc", "time"],
        }
    }

    /// Resolve one raw header cell
    pub fn from_header(raw: &str) -> Option<Column> {
        let folded = fold_header(raw);
        Column::ALL
            .into_iter()
            .find(|column| column.synonyms().contains(&folded.as_str()))
    }
}

/// Trim, strip quotes and BOM, lower-case, fold `-` and spaces to `_`
fn fold_header(raw: &str) -> String {
    raw.trim()
        .trim_start_matches('\u{feff}')
        .trim_matches('"')
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' || c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Field positions of the resolved logical columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub sample_index: usize,
    pub keypoint: usize,
    pub x: usize,
    pub y: usize,
    pub timestamp_ms: Option<usize>,
    pub timecode: Option<usize>,
}

impl ColumnMap {
    /// Resolve a header row; the first header matching a column wins
    ///
    /// # Errors
    /// `MalformedInput` naming every absent required column
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Result<Self> {
        let mut found: [Option<usize>; 6] = [None; 6];
        for (position, raw) in headers.iter().enumerate() {
            if let Some(column) = Column::from_header(raw.as_ref()) {
                let slot = &mut found[column as usize];
                if slot.is_none() {
                    *slot = Some(position);
                }
            }
        }

        let missing: Vec<String> = Column::REQUIRED
            .iter()
            .filter(|column| found[**column as usize].is_none())
            .map(|column| column.logical_name().to_string())
            .collect();

        match (
            found[Column::SampleIndex as usize],
            found[Column::Keypoint as usize],
            found[Column::X as usize],
            found[Column::Y as usize],
        ) {
            (Some(sample_index), Some(keypoint), Some(x), Some(y)) => Ok(Self {
                sample_index,
                keypoint,
                x,
                y,
                timestamp_ms: found[Column::TimestampMs as usize],
                timecode: found[Column::Timecode as usize],
            }),
            _ => Err(IngestionError::MalformedInput { missing }),
        }
    }

    /// Number of fields a row needs to reach every mapped column
    pub fn width(&self) -> usize {
        [self.sample_index, self.keypoint, self.x, self.y]
            .into_iter()
            .chain(self.timestamp_ms)
            .chain(self.timecode)
            .max()
            .map_or(0, |max| max + 1)
    }
}
