//! Skeleton overlay renderer
//!
//! Per call: video frame, then bones, dashed reference lines and keypoint
//! markers on the overlay layer, one composite at the style opacity, then
//! status text.

use contracts::{
    ContractError, DrawingSurface, OverlayStyle, Point, ResolvedSample, Segment,
    SkeletonTopology, StatusSink, Stroke, SurfacePoint,
};
use image::RgbaImage;
use tracing::{debug, instrument};

use crate::draw::vertical_dashes;

pub const NO_DATA: &str = "no data";

/// Optional advisory text outputs
#[derive(Default)]
pub struct StatusSinks {
    pub frame_info: Option<Box<dyn StatusSink>>,
    pub draw_info: Option<Box<dyn StatusSink>>,
}

impl StatusSinks {
    pub fn new(
        frame_info: Option<Box<dyn StatusSink>>,
        draw_info: Option<Box<dyn StatusSink>>,
    ) -> Self {
        Self {
            frame_info,
            draw_info,
        }
    }

    fn set(&mut self, frame_info: &str, draw_info: &str) {
        if let Some(sink) = self.frame_info.as_mut() {
            sink.set_text(frame_info);
        }
        if let Some(sink) = self.draw_info.as_mut() {
            sink.set_text(draw_info);
        }
    }
}

impl std::fmt::Debug for StatusSinks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusSinks")
            .field("frame_info", &self.frame_info.is_some())
            .field("draw_info", &self.draw_info.is_some())
            .finish()
    }
}

/// What one render call drew
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub frame_drawn: bool,
    pub edges_drawn: usize,
    pub keypoints_drawn: usize,
    pub reference_lines_drawn: usize,
}

/// Skeleton overlay renderer
#[derive(Debug, Clone, Default)]
pub struct OverlayRenderer {
    topology: SkeletonTopology,
    style: OverlayStyle,
}

impl OverlayRenderer {
    pub fn new(topology: SkeletonTopology, style: OverlayStyle) -> Self {
        Self { topology, style }
    }

    pub fn topology(&self) -> &SkeletonTopology {
        &self.topology
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// Draw one overlay frame
    ///
    /// A missing video frame is not an error: the previous pixels stay and
    /// the overlay is drawn on top.
    #[instrument(name = "render_overlay", skip_all, fields(resolved = resolved.is_some()))]
    pub fn render(
        &self,
        surface: &mut dyn DrawingSurface,
        frame: Result<&RgbaImage, ContractError>,
        resolved: Option<&ResolvedSample>,
        normalized: bool,
        status: &mut StatusSinks,
    ) -> RenderSummary {
        let mut summary = RenderSummary {
            frame_drawn: draw_frame(surface, frame),
            ..Default::default()
        };

        let Some(resolved) = resolved else {
            status.set(NO_DATA, NO_DATA);
            return summary;
        };

        let (width, height) = surface.size();
        let project = |point: Point| to_surface(point, normalized, width, height);
        let sample = &resolved.sample;

        // Bones: every edge with both endpoints present
        let bones: Vec<Segment> = self
            .topology
            .edges
            .iter()
            .filter_map(|(a, b)| Some((project(sample.keypoint(a)?), project(sample.keypoint(b)?))))
            .collect();
        summary.edges_drawn = bones.len();
        surface.stroke_segments(
            &bones,
            Stroke {
                colour: self.style.bone_colour,
                thickness: self.style.bone_thickness,
            },
        );

        // Reference lines
        let mut dashes: Vec<Segment> = Vec::new();
        for name in &self.style.reference_keypoints {
            let Some(anchor) = sample.keypoint(&name.to_lowercase()) else {
                continue;
            };
            let anchor = project(anchor);
            dashes.extend(
                vertical_dashes(
                    anchor.x,
                    anchor.y,
                    self.style.reference_line_length as f64,
                    self.style.reference_line_dash,
                )
                .into_iter()
                .map(|(x0, y0, x1, y1)| (SurfacePoint::new(x0, y0), SurfacePoint::new(x1, y1))),
            );
            summary.reference_lines_drawn += 1;
        }
        if !dashes.is_empty() {
            surface.stroke_segments(
                &dashes,
                Stroke {
                    colour: self.style.reference_line_colour,
                    thickness: self.style.reference_line_thickness,
                },
            );
        }

        // Markers at every present keypoint
        for point in sample.keypoints.values() {
            surface.fill_circle(
                project(*point),
                self.style.keypoint_radius,
                self.style.keypoint_colour,
            );
        }
        summary.keypoints_drawn = sample.keypoints.len();

        surface.composite_overlay(self.style.alpha());

        let meta = &resolved.meta;
        status.set(
            &format!(
                "sample {} | t={:.0}ms | err={:.1}ms | shift={:.1}ms",
                sample.sample_index,
                sample.timestamp_ms,
                meta.error_ms,
                meta.total_shift_ms()
            ),
            &format!("{} keypoints", summary.keypoints_drawn),
        );

        summary
    }
}

fn draw_frame(surface: &mut dyn DrawingSurface, frame: Result<&RgbaImage, ContractError>) -> bool {
    match frame.and_then(|image| surface.draw_image(image)) {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %e, "video frame not drawn");
            false
        }
    }
}

/// Normalized coordinates scale by surface size; pixels pass through
pub fn to_surface(point: Point, normalized: bool, width: u32, height: u32) -> SurfacePoint {
    if normalized {
        SurfacePoint::new(point.x * width as f64, point.y * height as f64)
    } else {
        SurfacePoint::new(point.x, point.y)
    }
}
