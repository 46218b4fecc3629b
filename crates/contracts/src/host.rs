//! Host boundary - video element and drawing surface abstractions
//!
//! The engine treats the video source opaquely: it only observes intrinsic
//! dimensions, readiness events and per-frame presentation callbacks.

use image::RgbaImage;

use crate::{ContractError, Rgb};

/// Handle of a pending per-frame presentation request
pub type FrameRequestId = u64;

/// Outcome of a programmatic playback start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStart {
    /// Playback is running
    Started,
    /// Host policy refused to start without a user gesture
    Blocked,
}

/// Asynchronous signals reported by the video host
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// Intrinsic dimensions are known (0 when the host cannot tell)
    MetadataLoaded { width: u32, height: u32 },

    /// First decodable frame is available
    FirstFrameReady,

    /// A requested frame was presented
    FramePresented {
        /// Request this presentation answers
        request: FrameRequestId,
        /// Media presentation time (ms)
        media_time_ms: f64,
        /// Monotonic presented-frame counter, when the host has one
        presented_frames: Option<u64>,
    },

    /// Playback started or resumed
    Playing,

    /// Playback paused
    Paused,

    /// A seek began
    Seeking,

    /// A seek completed at media time (ms)
    Seeked { media_time_ms: f64 },

    /// Playback reached the end of the media
    Ended,
}

/// Video element abstraction
///
/// All calls happen on the single controller task; implementations report
/// state changes asynchronously through `HostEvent`s.
pub trait VideoHost {
    /// Attach a media source; readiness is reported through events
    fn attach(&mut self, source: &str) -> Result<(), ContractError>;

    /// Detach the current source, if any
    fn detach(&mut self);

    /// Try to start playback
    fn start_playback(&mut self) -> Result<PlaybackStart, ContractError>;

    /// Pause playback
    fn pause_playback(&mut self);

    /// Current media time (ms)
    fn media_time_ms(&self) -> f64;

    /// Schedule one presented-frame callback
    fn request_frame(&mut self) -> FrameRequestId;

    /// Cancel a scheduled callback; unknown ids are ignored
    fn cancel_frame(&mut self, request: FrameRequestId);

    /// Currently presented video frame
    fn current_frame(&self) -> Result<&RgbaImage, ContractError>;
}

/// Pixel position on the drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfacePoint {
    pub x: f64,
    pub y: f64,
}

impl SurfacePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Line segment between two surface points
pub type Segment = (SurfacePoint, SurfacePoint);

/// Stroke parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub colour: Rgb,
    pub thickness: u32,
}

/// 2D raster target sized to the video's intrinsic dimensions
pub trait DrawingSurface {
    /// Surface size (width, height) in pixels
    fn size(&self) -> (u32, u32);

    /// Blit a frame onto the full surface, scaling when sizes differ
    fn draw_image(&mut self, frame: &RgbaImage) -> Result<(), ContractError>;

    /// Stroke segments opaque onto the overlay layer
    fn stroke_segments(&mut self, segments: &[Segment], stroke: Stroke);

    /// Filled circular marker on the overlay layer
    fn fill_circle(&mut self, center: SurfacePoint, radius: u32, colour: Rgb);

    /// Blend the overlay layer onto the frame at `alpha`, then clear it
    fn composite_overlay(&mut self, alpha: u8);
}
