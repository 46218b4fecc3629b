//! # Sample Ingestion
//!
//! Keypoint sample stream ingestion module.
//!
//! Responsibilities:
//! - Resolve loosely named CSV headers onto logical columns
//! - Parse rows into merged, ordered `FrameSample`s
//! - Vote on the coordinate convention (normalized vs pixel)
//! - Fetch raw sample text from local files or memory
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{ingest, FileSampleFetcher};
//! use contracts::{IngestionConfig, SampleFetcher};
//!
//! let text = FileSampleFetcher.fetch("session/keypoints.csv").await?;
//! let ingested = ingest(&text, &IngestionConfig::default())?;
//! println!("{} samples, {:?}", ingested.samples.len(), ingested.coordinate_space);
//! ```

mod error;
mod fetch;
mod header;
mod ingest;
mod record;
mod report;
mod timecode;

// Re-exports
pub use contracts::{CoordinateSpace, FrameSample, IngestionConfig};
pub use error::{IngestionError, Result};
pub use fetch::{FileSampleFetcher, MemorySampleFetcher};
pub use header::{Column, ColumnMap};
pub use ingest::{ingest, IngestedSamples};
pub use report::{DropReason, IngestReport};
pub use timecode::parse_timecode;
