//! Timing model: timestamp index, nominal interval and nearest-sample search.

use contracts::{CoordinateSpace, FrameSample, TimingConfig};

/// Read-only timestamp index over an ordered sample stream
#[derive(Debug, Clone, PartialEq)]
pub struct TimingIndex {
    /// Parallel to the sample order, non-decreasing
    timestamps: Vec<f64>,
    /// Estimated nominal inter-sample interval (ms)
    nominal_interval_ms: f64,
}

impl TimingIndex {
    /// Build from samples already sorted by `FrameSample::stream_order`
    pub fn build(samples: &[FrameSample], config: &TimingConfig) -> Self {
        let timestamps: Vec<f64> = samples.iter().map(|s| s.timestamp_ms).collect();
        let nominal_interval_ms = estimate_interval(&timestamps, config);
        Self {
            timestamps,
            nominal_interval_ms,
        }
    }

    pub fn nominal_interval_ms(&self) -> f64 {
        self.nominal_interval_ms
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    /// Position of the sample closest to `target_ms`
    ///
    /// Equidistant neighbours resolve to the earlier one. Targets outside the
    /// covered range clamp to the first or last sample. `None` only when empty.
    pub fn nearest(&self, target_ms: f64) -> Option<usize> {
        let last = self.timestamps.len().checked_sub(1)?;
        let upper = self.timestamps.partition_point(|&ts| ts < target_ms);
        if upper == 0 {
            return Some(0);
        }
        if upper > last {
            return Some(last);
        }
        let lower = upper - 1;
        let before = target_ms - self.timestamps[lower];
        let after = self.timestamps[upper] - target_ms;
        if after < before {
            Some(upper)
        } else {
            Some(lower)
        }
    }
}

/// Median of positive consecutive deltas, clamped
///
/// The median is the element at `len / 2` of the sorted deltas.
fn estimate_interval(timestamps: &[f64], config: &TimingConfig) -> f64 {
    let mut deltas: Vec<f64> = timestamps
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .filter(|delta| delta.is_finite() && *delta > 0.0)
        .collect();

    if deltas.is_empty() {
        return config.default_interval_ms;
    }

    deltas.sort_by(f64::total_cmp);
    let median = deltas[deltas.len() / 2];
    median.clamp(config.min_interval_ms, config.max_interval_ms)
}

/// Ordered samples with their timing index and coordinate convention
///
/// Built once per load, immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleStream {
    samples: Vec<FrameSample>,
    index: TimingIndex,
    coordinate_space: CoordinateSpace,
}

impl SampleStream {
    /// `samples` must already be in stream order
    pub fn new(
        samples: Vec<FrameSample>,
        coordinate_space: CoordinateSpace,
        config: &TimingConfig,
    ) -> Self {
        let index = TimingIndex::build(&samples, config);
        Self {
            samples,
            index,
            coordinate_space,
        }
    }

    /// Stream with no samples (absent or unusable input)
    pub fn empty(config: &TimingConfig) -> Self {
        Self::new(Vec::new(), CoordinateSpace::default(), config)
    }

    pub fn samples(&self) -> &[FrameSample] {
        &self.samples
    }

    pub fn index(&self) -> &TimingIndex {
        &self.index
    }

    pub fn coordinate_space(&self) -> CoordinateSpace {
        self.coordinate_space
    }

    pub fn is_normalized(&self) -> bool {
        self.coordinate_space.is_normalized()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&FrameSample> {
        self.samples.get(position)
    }

    /// Position and sample nearest to `target_ms`
    pub fn nearest_sample(&self, target_ms: f64) -> Option<(usize, &FrameSample)> {
        let position = self.index.nearest(target_ms)?;
        self.samples.get(position).map(|sample| (position, sample))
    }

    /// Covered time range `(first, last)` in ms
    pub fn span_ms(&self) -> Option<(f64, f64)> {
        let first = self.samples.first()?.timestamp_ms;
        let last = self.samples.last()?.timestamp_ms;
        Some((first, last))
    }

    /// Distinct keypoint names across all samples, sorted
    pub fn keypoint_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .samples
            .iter()
            .flat_map(|sample| sample.keypoints.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}
