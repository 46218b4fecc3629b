//! ResolvedSample - Reconciler output
//!
//! The sample chosen for one presented frame plus the feedback diagnostics.

use serde::{Deserialize, Serialize};

use crate::FrameSample;

/// Sample resolved for a presented frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSample {
    /// Position of `sample` in the ordered stream
    pub position: usize,

    /// The nearest sample to the shifted media time
    pub sample: FrameSample,

    /// Reconciliation diagnostics
    pub meta: ReconcileMeta,
}

/// Reconciliation diagnostics (advisory only)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconcileMeta {
    /// Presented media time (ms)
    pub media_time_ms: f64,

    /// Media time plus both shifts before the update (ms)
    pub target_ms: f64,

    /// `sample.timestamp_ms - target_ms`
    pub error_ms: f64,

    /// Step classified as a discontinuity or large error
    pub big_jump: bool,

    /// Gain applied to `error_ms`
    pub gain: f64,

    /// Caller-configured constant offset (ms)
    pub base_shift_ms: f64,

    /// Feedback correction after the update (ms)
    pub dynamic_shift_ms: f64,
}

impl ReconcileMeta {
    /// Base plus dynamic shift after the update
    pub fn total_shift_ms(&self) -> f64 {
        self.base_shift_ms + self.dynamic_shift_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_shift() {
        let meta = ReconcileMeta {
            base_shift_ms: -40.0,
            dynamic_shift_ms: 12.5,
            ..Default::default()
        };
        assert_eq!(meta.total_shift_ms(), -27.5);
    }
}
