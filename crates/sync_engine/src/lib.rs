//! # Sync Engine
//!
//! Playback-time reconciliation between a keypoint sample stream and a video
//! presentation clock.
//!
//! Responsibilities:
//! - Timing index and nominal sample interval
//! - Nearest-sample lookup by shifted media time
//! - Two-speed feedback correction of the clock offset (bounded dynamic shift)
//!
//! ## Usage Example
//!
//! ```ignore
//! use sync_engine::{PresentedFrame, ReconciliationState, Reconciler, SampleStream};
//!
//! let stream = SampleStream::new(samples, space, &config.timing);
//! let reconciler = Reconciler::new(&config.reconciler);
//! let mut state = ReconciliationState::new(config.reconciler.base_shift_ms);
//!
//! let frame = PresentedFrame::new(media_time_ms, false, Some(presented_frames));
//! if let Some(resolved) = reconciler.on_presented_frame(&mut state, &stream, frame).resolved() {
//!     // draw resolved.sample
//! }
//! ```

mod gain;
mod reconciler;
mod timing;

// Re-exports
pub use contracts::{ReconcileMeta, ReconcilerConfig, ResolvedSample, TimingConfig};
pub use gain::{GainDecision, GainInput, GainStrategy, TwoSpeedGain};
pub use reconciler::{FrameOutcome, PresentedFrame, ReconciliationState, Reconciler};
pub use timing::{SampleStream, TimingIndex};
