//! 叠加同步指标收集模块
//!
//! 基于 ReconcileMeta 记录 Prometheus 指标，并在内存中聚合误差统计。

use contracts::ReconcileMeta;
use metrics::{counter, gauge, histogram};

/// 从 ReconcileMeta 记录指标
///
/// 每次 Reconciler 产出一个 ResolvedSample 时调用。
pub fn record_reconcile_metrics(meta: &ReconcileMeta) {
    counter!("overlay_frames_reconciled_total").increment(1);

    if meta.big_jump {
        counter!("overlay_big_jumps_total").increment(1);
    }

    // 时间误差 (ms)
    histogram!("overlay_reconcile_error_ms").record(meta.error_ms.abs());

    // 动态偏移 (ms)
    gauge!("overlay_dynamic_shift_ms").set(meta.dynamic_shift_ms);
    gauge!("overlay_total_shift_ms").set(meta.total_shift_ms());
}

/// 记录本次加载的样本数
pub fn record_samples_loaded(count: usize) {
    gauge!("overlay_samples_loaded").set(count as f64);
}

/// 同步误差聚合器
///
/// 在内存中聚合指标，便于 replay 结束时输出摘要。
#[derive(Debug, Clone, Default)]
pub struct ReconcileStatsAggregator {
    /// 总帧数
    pub total_frames: u64,

    /// 大跳变帧数
    pub big_jumps: u64,

    /// |误差| 统计 (ms)
    pub error_stats: RunningStats,

    /// 稳态（非大跳变）|误差| 统计 (ms)
    pub tracking_error_stats: RunningStats,

    /// 动态偏移统计 (ms)
    pub shift_stats: RunningStats,
}

impl ReconcileStatsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, meta: &ReconcileMeta) {
        self.total_frames += 1;
        let error = meta.error_ms.abs();
        self.error_stats.push(error);
        if meta.big_jump {
            self.big_jumps += 1;
        } else {
            self.tracking_error_stats.push(error);
        }
        self.shift_stats.push(meta.dynamic_shift_ms);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> ReconcileSummary {
        ReconcileSummary {
            total_frames: self.total_frames,
            big_jumps: self.big_jumps,
            big_jump_rate: if self.total_frames > 0 {
                self.big_jumps as f64 / self.total_frames as f64 * 100.0
            } else {
                0.0
            },
            error_ms: StatsSummary::from(&self.error_stats),
            tracking_error_ms: StatsSummary::from(&self.tracking_error_stats),
            dynamic_shift_ms: StatsSummary::from(&self.shift_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct ReconcileSummary {
    pub total_frames: u64,
    pub big_jumps: u64,
    pub big_jump_rate: f64,
    pub error_ms: StatsSummary,
    pub tracking_error_ms: StatsSummary,
    pub dynamic_shift_ms: StatsSummary,
}

impl std::fmt::Display for ReconcileSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Reconcile Summary ===")?;
        writeln!(f, "Frames reconciled: {}", self.total_frames)?;
        writeln!(
            f,
            "Big jumps: {} ({:.2}%)",
            self.big_jumps, self.big_jump_rate
        )?;
        writeln!(f, "|error| (ms): {}", self.error_ms)?;
        writeln!(f, "Tracking |error| (ms): {}", self.tracking_error_ms)?;
        writeln!(f, "Dynamic shift (ms): {}", self.dynamic_shift_ms)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.2}, max={:.2}, mean={:.2}, std={:.2} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值（非有限值忽略）
    pub fn push(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.count += 1;
        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
