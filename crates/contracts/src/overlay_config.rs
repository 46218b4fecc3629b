//! Overlay engine configuration contracts that can be shared across crates.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::SkeletonTopology;

/// RGB colour triple
pub type Rgb = [u8; 3];

/// Complete overlay configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct OverlayConfig {
    /// Sample ingestion settings
    #[serde(default)]
    #[validate(nested)]
    pub ingestion: IngestionConfig,

    /// Timing index settings
    #[serde(default)]
    #[validate(nested)]
    pub timing: TimingConfig,

    /// Clock reconciler settings
    #[serde(default)]
    #[validate(nested)]
    pub reconciler: ReconcilerConfig,

    /// Readiness waits and autoplay
    #[serde(default)]
    #[validate(nested)]
    pub readiness: ReadinessConfig,

    /// Skeleton edges to draw
    #[serde(default)]
    pub topology: SkeletonTopology,

    /// Drawing style
    #[serde(default)]
    #[validate(nested)]
    pub style: OverlayStyle,
}

/// Ingestion configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct IngestionConfig {
    /// Sample rate assumed when a row carries neither timestamp nor timecode
    #[validate(range(exclusive_min = 0.0, max = 1000.0))]
    pub fallback_fps: f64,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self { fallback_fps: 30.0 }
    }
}

/// Nominal interval estimation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TimingConfig {
    /// Interval used when no deltas can be formed (ms)
    #[validate(range(exclusive_min = 0.0))]
    pub default_interval_ms: f64,
    /// Lower clamp of the estimate (ms)
    #[validate(range(exclusive_min = 0.0))]
    pub min_interval_ms: f64,
    /// Upper clamp of the estimate (ms)
    #[validate(range(exclusive_min = 0.0))]
    pub max_interval_ms: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            default_interval_ms: 33.3,
            min_interval_ms: 5.0,
            max_interval_ms: 100.0,
        }
    }
}

/// Playback clock reconciler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Constant offset added to media time (ms)
    pub base_shift_ms: f64,
    /// Gain applied on a discontinuity or large error
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub big_jump_gain: f64,
    /// Gain applied during steady tracking
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub tracking_gain: f64,
    /// Minimum error classified as a big jump (ms)
    #[validate(range(min = 0.0))]
    pub jump_threshold_floor_ms: f64,
    /// Error threshold as a multiple of the nominal interval
    #[validate(range(min = 0.0))]
    pub jump_threshold_factor: f64,
    /// Bound of the accumulated dynamic shift (ms)
    #[validate(range(exclusive_min = 0.0))]
    pub max_dynamic_shift_ms: f64,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            base_shift_ms: 0.0,
            big_jump_gain: 0.95,
            tracking_gain: 0.20,
            jump_threshold_floor_ms: 45.0,
            jump_threshold_factor: 1.4,
            max_dynamic_shift_ms: 500.0,
        }
    }
}

/// Readiness configuration for `load`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Bounded wait for intrinsic dimensions (ms)
    #[validate(range(min = 1))]
    pub metadata_timeout_ms: u64,
    /// Bounded wait for the first decodable frame (ms)
    #[validate(range(min = 1))]
    pub first_frame_timeout_ms: u64,
    /// Attempt to start playback once loaded
    pub autoplay: bool,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            metadata_timeout_ms: 5000,
            first_frame_timeout_ms: 5000,
            autoplay: true,
        }
    }
}

/// Overlay drawing style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct OverlayStyle {
    pub bone_colour: Rgb,
    #[validate(range(min = 1))]
    pub bone_thickness: u32,

    pub keypoint_colour: Rgb,
    #[validate(range(min = 1))]
    pub keypoint_radius: u32,

    /// Keypoints that get a dashed vertical reference line
    pub reference_keypoints: Vec<String>,
    pub reference_line_colour: Rgb,
    pub reference_line_length: u32,
    #[validate(range(min = 1))]
    pub reference_line_thickness: u32,
    /// Dash (and gap) length in pixels, 0 draws a solid line
    pub reference_line_dash: u32,

    /// Overlay opacity over the video frame
    #[validate(range(min = 0.0, max = 1.0))]
    pub opacity: f64,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            bone_colour: [255, 255, 0],
            bone_thickness: 3,
            keypoint_colour: [0, 255, 0],
            keypoint_radius: 5,
            reference_keypoints: vec!["ankle".to_string(), "hip".to_string()],
            reference_line_colour: [255, 255, 255],
            reference_line_length: 120,
            reference_line_thickness: 1,
            reference_line_dash: 6,
            opacity: 1.0,
        }
    }
}

impl OverlayStyle {
    /// Alpha channel derived from opacity
    pub fn alpha(&self) -> u8 {
        (self.opacity.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}
