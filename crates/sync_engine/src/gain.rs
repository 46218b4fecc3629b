//! Gain strategies for the dynamic shift feedback loop.

use contracts::ReconcilerConfig;

/// Inputs available when choosing a gain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainInput {
    /// `sample.timestamp_ms - target_ms`
    pub error_ms: f64,
    /// Caller flagged the frame as following a seek, load or resume
    pub discontinuous: bool,
    /// Nominal sample interval of the stream (ms)
    pub nominal_interval_ms: f64,
}

/// Gain decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainDecision {
    pub gain: f64,
    pub big_jump: bool,
}

/// Chooses how much of the timing error to fold into the dynamic shift
pub trait GainStrategy: Send + Sync {
    fn decide(&self, input: GainInput) -> GainDecision;
}

/// Two-speed gain
///
/// Snap (`big_jump_gain`) on a discontinuity or when
/// `|error| > max(floor, nominal_interval * factor)`, otherwise track slowly
/// (`tracking_gain`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoSpeedGain {
    pub big_jump_gain: f64,
    pub tracking_gain: f64,
    pub threshold_floor_ms: f64,
    pub threshold_factor: f64,
}

impl TwoSpeedGain {
    pub fn from_config(config: &ReconcilerConfig) -> Self {
        Self {
            big_jump_gain: config.big_jump_gain,
            tracking_gain: config.tracking_gain,
            threshold_floor_ms: config.jump_threshold_floor_ms,
            threshold_factor: config.jump_threshold_factor,
        }
    }

    /// Error magnitude above which a step counts as a big jump
    pub fn threshold_ms(&self, nominal_interval_ms: f64) -> f64 {
        self.threshold_floor_ms
            .max(nominal_interval_ms * self.threshold_factor)
    }
}

impl Default for TwoSpeedGain {
    fn default() -> Self {
        Self::from_config(&ReconcilerConfig::default())
    }
}

impl GainStrategy for TwoSpeedGain {
    fn decide(&self, input: GainInput) -> GainDecision {
        let big_jump =
            input.discontinuous || input.error_ms.abs() > self.threshold_ms(input.nominal_interval_ms);
        let gain = if big_jump {
            self.big_jump_gain
        } else {
            self.tracking_gain
        };
        GainDecision { gain, big_jump }
    }
}
