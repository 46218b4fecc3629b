//! # Contracts
//!
//! Frozen interface contracts shared by every overlay crate: the keypoint
//! sample model, configuration sections, the error taxonomy and the host
//! boundary traits (video element, drawing surface, status sinks, sample
//! fetcher). Business crates depend on this crate, never the reverse.
//!
//! ## Time Model
//! - Sample timestamps and media time are both milliseconds (`f64`)
//! - `sample_index` is ordering/diagnostic only, `timestamp_ms` is authoritative

mod error;
mod fetch;
mod host;
mod overlay_config;
mod reconcile;
mod sample;
mod status;
mod topology;

pub use error::*;
pub use fetch::{LocalSampleFetcher, SampleFetcher};
pub use host::*;
pub use overlay_config::*;
pub use reconcile::{ReconcileMeta, ResolvedSample};
pub use sample::*;
pub use status::{SharedText, StatusSink};
pub use topology::{Edge, SkeletonTopology};
