//! Playback clock reconciler.
//!
//! Maps each presented video frame onto the nearest keypoint sample and folds
//! the residual timing error into a bounded dynamic shift, in the spirit of a
//! single-state feedback filter:
//!
//! ```text
//! target  = media_time + base_shift + dynamic_shift
//! error   = nearest(target).timestamp - target
//! dynamic = clamp(dynamic + gain * error, -max, max)
//! ```

use contracts::{ReconcileMeta, ReconcilerConfig, ResolvedSample};
use tracing::{instrument, trace};

use crate::gain::{GainInput, GainStrategy, TwoSpeedGain};
use crate::timing::SampleStream;

/// Mutable reconciliation state, owned by the session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationState {
    /// Caller-configured constant offset (ms)
    pub base_shift_ms: f64,
    /// Accumulated feedback correction (ms)
    pub dynamic_shift_ms: f64,
    /// Last presented frame identity, for de-duplication
    pub last_presented_frame_id: Option<u64>,
}

impl ReconciliationState {
    pub fn new(base_shift_ms: f64) -> Self {
        Self {
            base_shift_ms,
            ..Default::default()
        }
    }

    /// New load: keep the base shift, forget everything learned
    pub fn reset(&mut self) {
        self.dynamic_shift_ms = 0.0;
        self.last_presented_frame_id = None;
    }

    /// Caller changed the base shift
    pub fn re_anchor(&mut self, base_shift_ms: f64) {
        self.base_shift_ms = base_shift_ms;
        self.dynamic_shift_ms = 0.0;
    }

    /// Seek or resume after end: the learned correction no longer applies
    pub fn seek_reset(&mut self) {
        self.dynamic_shift_ms = 0.0;
        self.last_presented_frame_id = None;
    }

    pub fn total_shift_ms(&self) -> f64 {
        self.base_shift_ms + self.dynamic_shift_ms
    }
}

/// One presented frame as reported by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresentedFrame {
    /// Media time of the presented frame (ms)
    pub media_time_ms: f64,
    /// Seek, load or resume preceded this frame
    pub discontinuous: bool,
    /// Host presented-frames counter, when available
    pub frame_id: Option<u64>,
}

impl PresentedFrame {
    pub fn new(media_time_ms: f64, discontinuous: bool, frame_id: Option<u64>) -> Self {
        Self {
            media_time_ms,
            discontinuous,
            frame_id,
        }
    }
}

/// Result of reconciling one presented frame
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Same frame identity as last time; nothing recomputed
    Duplicate,
    /// No samples to overlay
    NoOverlay,
    /// Nearest sample and updated shift
    Resolved(ResolvedSample),
}

impl FrameOutcome {
    pub fn resolved(&self) -> Option<&ResolvedSample> {
        match self {
            FrameOutcome::Resolved(resolved) => Some(resolved),
            _ => None,
        }
    }
}

/// Playback clock reconciler
pub struct Reconciler {
    strategy: Box<dyn GainStrategy>,
    max_dynamic_shift_ms: f64,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("max_dynamic_shift_ms", &self.max_dynamic_shift_ms)
            .finish_non_exhaustive()
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(&ReconcilerConfig::default())
    }
}

impl Reconciler {
    /// Two-speed reconciler from configuration
    pub fn new(config: &ReconcilerConfig) -> Self {
        Self::with_strategy(
            Box::new(TwoSpeedGain::from_config(config)),
            config.max_dynamic_shift_ms,
        )
    }

    pub fn with_strategy(strategy: Box<dyn GainStrategy>, max_dynamic_shift_ms: f64) -> Self {
        Self {
            strategy,
            max_dynamic_shift_ms: max_dynamic_shift_ms.abs(),
        }
    }

    pub fn max_dynamic_shift_ms(&self) -> f64 {
        self.max_dynamic_shift_ms
    }

    /// Reconcile one presented frame against the stream
    #[instrument(
        name = "reconcile_frame",
        skip(self, state, stream),
        fields(media_time_ms = frame.media_time_ms, discontinuous = frame.discontinuous)
    )]
    pub fn on_presented_frame(
        &self,
        state: &mut ReconciliationState,
        stream: &SampleStream,
        frame: PresentedFrame,
    ) -> FrameOutcome {
        if let Some(id) = frame.frame_id {
            if state.last_presented_frame_id == Some(id) {
                trace!(frame_id = id, "duplicate presented frame");
                return FrameOutcome::Duplicate;
            }
            state.last_presented_frame_id = Some(id);
        }

        let target_ms = frame.media_time_ms + state.total_shift_ms();
        let Some((position, sample)) = stream.nearest_sample(target_ms) else {
            return FrameOutcome::NoOverlay;
        };

        let error_ms = sample.timestamp_ms - target_ms;
        let decision = self.strategy.decide(GainInput {
            error_ms,
            discontinuous: frame.discontinuous,
            nominal_interval_ms: stream.index().nominal_interval_ms(),
        });

        let limit = self.max_dynamic_shift_ms;
        state.dynamic_shift_ms =
            (state.dynamic_shift_ms + decision.gain * error_ms).clamp(-limit, limit);

        let meta = ReconcileMeta {
            media_time_ms: frame.media_time_ms,
            target_ms,
            error_ms,
            big_jump: decision.big_jump,
            gain: decision.gain,
            base_shift_ms: state.base_shift_ms,
            dynamic_shift_ms: state.dynamic_shift_ms,
        };

        trace!(
            position,
            sample_index = sample.sample_index,
            error_ms,
            big_jump = decision.big_jump,
            dynamic_shift_ms = state.dynamic_shift_ms,
            "frame reconciled"
        );

        FrameOutcome::Resolved(ResolvedSample {
            position,
            sample: sample.clone(),
            meta,
        })
    }
}
