//! Replay statistics.

use std::time::Duration;

use observability::{ReconcileStatsAggregator, StatsSummary};
use serde::Serialize;

/// Statistics from a replay run
#[derive(Debug, Clone, Default)]
pub struct ReplayStats {
    /// Samples in the loaded stream
    pub samples: usize,

    /// Coordinate convention of the stream
    pub normalized: bool,

    /// Nominal sample interval (ms)
    pub nominal_interval_ms: f64,

    /// Media time advanced per presented frame (ms)
    pub frame_step_ms: f64,

    /// Video frames presented by the simulated host
    pub frames_presented: u64,

    /// Presented frames that resolved a sample
    pub frames_resolved: u64,

    /// Presented frames drawn without overlay
    pub frames_without_overlay: u64,

    /// PNG files written
    pub frames_written: u64,

    /// Dynamic shift when playback ended (ms)
    pub final_dynamic_shift_ms: f64,

    /// Advisory messages emitted by the session
    pub advisories: Vec<String>,

    /// Wall-clock duration of the replay
    pub duration: Duration,

    /// Reconciliation error aggregator
    pub reconcile: ReconcileStatsAggregator,
}

/// JSON view of a replay
#[derive(Debug, Serialize)]
pub struct ReplayReport {
    samples: usize,
    normalized: bool,
    nominal_interval_ms: f64,
    frame_step_ms: f64,
    frames_presented: u64,
    frames_resolved: u64,
    frames_without_overlay: u64,
    frames_written: u64,
    big_jumps: u64,
    final_dynamic_shift_ms: f64,
    abs_error_ms: StatsView,
    tracking_abs_error_ms: StatsView,
    dynamic_shift_ms: StatsView,
    advisories: Vec<String>,
    duration_secs: f64,
}

#[derive(Debug, Serialize)]
struct StatsView {
    count: u64,
    min: f64,
    max: f64,
    mean: f64,
    std_dev: f64,
}

impl From<&StatsSummary> for StatsView {
    fn from(summary: &StatsSummary) -> Self {
        Self {
            count: summary.count,
            min: summary.min,
            max: summary.max,
            mean: summary.mean,
            std_dev: summary.std_dev,
        }
    }
}

impl ReplayStats {
    /// Presented frames per wall-clock second
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.frames_presented as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn report(&self) -> ReplayReport {
        let summary = self.reconcile.summary();
        ReplayReport {
            samples: self.samples,
            normalized: self.normalized,
            nominal_interval_ms: self.nominal_interval_ms,
            frame_step_ms: self.frame_step_ms,
            frames_presented: self.frames_presented,
            frames_resolved: self.frames_resolved,
            frames_without_overlay: self.frames_without_overlay,
            frames_written: self.frames_written,
            big_jumps: summary.big_jumps,
            final_dynamic_shift_ms: self.final_dynamic_shift_ms,
            abs_error_ms: StatsView::from(&summary.error_ms),
            tracking_abs_error_ms: StatsView::from(&summary.tracking_error_ms),
            dynamic_shift_ms: StatsView::from(&summary.dynamic_shift_ms),
            advisories: self.advisories.clone(),
            duration_secs: self.duration.as_secs_f64(),
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\nReplay Statistics");
        println!("=================\n");

        println!("Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Samples: {} ({})", self.samples, if self.normalized { "normalized" } else { "pixel" });
        println!("   ├─ Nominal interval: {:.1} ms", self.nominal_interval_ms);
        println!("   ├─ Frame step: {:.3} ms", self.frame_step_ms);
        println!("   ├─ Frames presented: {}", self.frames_presented);
        println!("   ├─ Frames resolved: {}", self.frames_resolved);
        println!("   ├─ Frames without overlay: {}", self.frames_without_overlay);
        println!("   ├─ PNG frames written: {}", self.frames_written);
        println!("   └─ Throughput: {:.1} frames/s", self.fps());

        println!("\n{}", self.reconcile.summary());
        println!("Final dynamic shift: {:.2} ms", self.final_dynamic_shift_ms);

        if !self.advisories.is_empty() {
            println!("\nAdvisories");
            for advisory in &self.advisories {
                println!("   ├─ {}", advisory);
            }
        }

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ReconcileMeta;

    #[test]
    fn test_report_reflects_aggregator() {
        let mut stats = ReplayStats {
            frames_presented: 2,
            frames_resolved: 2,
            ..Default::default()
        };
        stats.reconcile.update(&ReconcileMeta {
            error_ms: 80.0,
            big_jump: true,
            ..Default::default()
        });
        stats.reconcile.update(&ReconcileMeta {
            error_ms: -4.0,
            ..Default::default()
        });
        let report = stats.report();
        assert_eq!(report.big_jumps, 1);
        assert_eq!(report.tracking_abs_error_ms.count, 1);
        assert_eq!(report.abs_error_ms.max, 80.0);
        assert!(serde_json::to_string(&report).unwrap().contains("\"big_jumps\":1"));
    }

    #[test]
    fn test_fps_without_duration() {
        assert_eq!(ReplayStats::default().fps(), 0.0);
    }
}
