//! RasterSurface - in-memory `DrawingSurface` over an RGBA buffer
//!
//! Overlay primitives are drawn opaque with `imageproc` onto a separate
//! layer; `composite_overlay` blends that layer onto the frame in one pass.

use std::path::Path;

use contracts::{ContractError, DrawingSurface, Rgb, Segment, Stroke, SurfacePoint};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use tracing::trace;

use crate::draw::{blend, brush_offsets, clip_segment, ClipBox};

const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// RGBA raster sized to the video's intrinsic dimensions
#[derive(Debug, Clone)]
pub struct RasterSurface {
    image: RgbaImage,
    /// Opaque overlay primitives awaiting composite
    layer: RgbaImage,
    dirty: bool,
}

impl RasterSurface {
    /// Transparent surface of `width x height`
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_image(RgbaImage::new(width, height))
    }

    /// Surface filled with an opaque colour
    pub fn filled(width: u32, height: u32, colour: [u8; 3]) -> Self {
        let [r, g, b] = colour;
        Self::from_image(RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255])))
    }

    fn from_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            image,
            layer: RgbaImage::new(width, height),
            dirty: false,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        (x < self.image.width() && y < self.image.height()).then(|| *self.image.get_pixel(x, y))
    }

    /// Write the surface as PNG
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), ContractError> {
        let path = path.as_ref();
        self.image
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| ContractError::surface(format!("{}: {e}", path.display())))
    }
}

impl DrawingSurface for RasterSurface {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn draw_image(&mut self, frame: &RgbaImage) -> Result<(), ContractError> {
        let (width, height) = self.size();
        if frame.width() == 0 || frame.height() == 0 {
            return Err(ContractError::surface("frame has no pixels"));
        }
        if frame.dimensions() == (width, height) {
            self.image.clone_from(frame);
        } else {
            self.image = imageops::resize(frame, width, height, FilterType::Triangle);
        }
        Ok(())
    }

    fn stroke_segments(&mut self, segments: &[Segment], stroke: Stroke) {
        let (width, height) = self.size();
        let offsets = brush_offsets(stroke.thickness);
        let margin = f64::from(stroke.thickness.clamp(1, 256)) + 1.0;
        let clip = ClipBox::surface(width, height, margin);
        let ink = opaque(stroke.colour);

        let mut drawn = 0usize;
        for (start, end) in segments {
            let Some(((x0, y0), (x1, y1))) = clip_segment((start.x, start.y), (end.x, end.y), clip)
            else {
                continue;
            };
            let (x0, y0, x1, y1) = (x0 as f32, y0 as f32, x1 as f32, y1 as f32);
            for offset in offsets.clone() {
                let shift = offset as f32;
                draw_line_segment_mut(&mut self.layer, (x0 + shift, y0), (x1 + shift, y1), ink);
                if offset != 0 {
                    draw_line_segment_mut(&mut self.layer, (x0, y0 + shift), (x1, y1 + shift), ink);
                }
            }
            drawn += 1;
        }
        if drawn > 0 {
            trace!(segments = segments.len(), drawn, "stroke pass");
            self.dirty = true;
        }
    }

    fn fill_circle(&mut self, center: SurfacePoint, radius: u32, colour: Rgb) {
        let (width, height) = self.size();
        let radius = radius.min(width.saturating_add(height));
        if !ClipBox::surface(width, height, f64::from(radius)).contains(center.x, center.y) {
            return;
        }
        // non-finite centres fail `contains`
        let center = (center.x.round() as i32, center.y.round() as i32);
        draw_filled_circle_mut(&mut self.layer, center, radius as i32, opaque(colour));
        self.dirty = true;
    }

    fn composite_overlay(&mut self, alpha: u8) {
        if !self.dirty {
            return;
        }
        for (dst, src) in self.image.pixels_mut().zip(self.layer.pixels_mut()) {
            if src[3] == 0 {
                continue;
            }
            if alpha > 0 {
                *dst = blend(*dst, Rgba([src[0], src[1], src[2], alpha]));
            }
            *src = CLEAR;
        }
        self.dirty = false;
    }
}

fn opaque([r, g, b]: Rgb) -> Rgba<u8> {
    Rgba([r, g, b, 255])
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    #[test]
    fn test_draw_image_same_size_copies() {
        let mut surface = RasterSurface::new(4, 3);
        let frame = RgbaImage::from_pixel(4, 3, Rgba([9, 9, 9, 255]));
        surface.draw_image(&frame).unwrap();
        assert_eq!(surface.pixel(3, 2), Some(Rgba([9, 9, 9, 255])));
    }

    #[test]
    fn test_draw_image_scales_to_surface() {
        let mut surface = RasterSurface::new(8, 8);
        let frame = RgbaImage::from_pixel(2, 2, Rgba([40, 80, 120, 255]));
        surface.draw_image(&frame).unwrap();
        assert_eq!(surface.size(), (8, 8));
        assert_eq!(surface.pixel(7, 7), Some(Rgba([40, 80, 120, 255])));
    }

    #[test]
    fn test_empty_frame_rejected() {
        let mut surface = RasterSurface::filled(2, 2, [1, 2, 3]);
        let err = surface.draw_image(&RgbaImage::new(0, 0)).unwrap_err();
        assert!(matches!(err, ContractError::Surface { .. }));
        assert_eq!(surface.pixel(0, 0), Some(Rgba([1, 2, 3, 255])));
    }

    #[test]
    fn test_thick_stroke() {
        let mut surface = RasterSurface::filled(20, 20, [0, 0, 0]);
        let segment = (SurfacePoint::new(2.0, 10.0), SurfacePoint::new(17.0, 10.0));
        surface.stroke_segments(&[segment], Stroke { colour: [255, 0, 0], thickness: 3 });
        // nothing lands on the frame until composite
        assert_eq!(surface.pixel(10, 10), Some(BLACK));
        surface.composite_overlay(255);
        assert_eq!(surface.pixel(10, 9), Some(RED));
        assert_eq!(surface.pixel(10, 11), Some(RED));
        assert_eq!(surface.pixel(10, 13), Some(BLACK));
    }

    #[test]
    fn test_translucent_joint_blended_once() {
        let mut surface = RasterSurface::filled(20, 20, [0, 0, 0]);
        let a = SurfacePoint::new(2.0, 2.0);
        let b = SurfacePoint::new(10.0, 10.0);
        let c = SurfacePoint::new(18.0, 2.0);
        let stroke = Stroke { colour: [255, 255, 255], thickness: 2 };
        surface.stroke_segments(&[(a, b), (b, c)], stroke);
        surface.fill_circle(b, 2, [255, 255, 255]);
        surface.composite_overlay(128);
        let joint = surface.pixel(10, 10).unwrap();
        let mid = surface.pixel(6, 6).unwrap();
        assert_eq!(joint, mid);
        assert!((127..=129).contains(&joint[0]));
    }

    #[test]
    fn test_composite_clears_layer() {
        let mut surface = RasterSurface::filled(10, 10, [0, 0, 0]);
        surface.fill_circle(SurfacePoint::new(5.0, 5.0), 2, [255, 0, 0]);
        surface.composite_overlay(255);
        assert_eq!(surface.pixel(5, 5), Some(RED));

        let frame = RgbaImage::from_pixel(10, 10, BLACK);
        surface.draw_image(&frame).unwrap();
        surface.composite_overlay(255);
        assert_eq!(surface.pixel(5, 5), Some(BLACK));
    }

    #[test]
    fn test_zero_alpha_composite_leaves_frame() {
        let mut surface = RasterSurface::filled(10, 10, [0, 0, 0]);
        surface.fill_circle(SurfacePoint::new(5.0, 5.0), 2, [255, 0, 0]);
        surface.composite_overlay(0);
        assert_eq!(surface.pixel(5, 5), Some(BLACK));
    }

    #[test]
    fn test_far_negative_endpoint_clipped() {
        let mut surface = RasterSurface::filled(20, 20, [0, 0, 0]);
        let segment = (SurfacePoint::new(10.0, 10.0), SurfacePoint::new(-1e19, 10.0));
        surface.stroke_segments(&[segment], Stroke { colour: [255, 0, 0], thickness: 1 });
        surface.composite_overlay(255);
        assert_eq!(surface.pixel(0, 10), Some(RED));
        assert_eq!(surface.pixel(10, 10), Some(RED));
        assert_eq!(surface.pixel(11, 10), Some(BLACK));
    }

    #[test]
    fn test_far_positive_endpoint_clipped() {
        let mut surface = RasterSurface::filled(20, 20, [0, 0, 0]);
        let segment = (SurfacePoint::new(10.0, 10.0), SurfacePoint::new(3e7, 10.0));
        surface.stroke_segments(&[segment], Stroke { colour: [255, 0, 0], thickness: 3 });
        surface.composite_overlay(255);
        assert_eq!(surface.pixel(19, 10), Some(RED));
        assert_eq!(surface.pixel(19, 11), Some(RED));
        assert_eq!(surface.pixel(8, 10), Some(BLACK));
    }

    #[test]
    fn test_fully_offscreen_segment_ignored() {
        let mut surface = RasterSurface::filled(20, 20, [0, 0, 0]);
        let segment = (SurfacePoint::new(-1e12, -5e11), SurfacePoint::new(1e12, -5e11));
        surface.stroke_segments(&[segment], Stroke { colour: [255, 0, 0], thickness: 3 });
        surface.composite_overlay(255);
        assert!(surface.image().pixels().all(|p| *p == BLACK));
    }

    #[test]
    fn test_fill_circle_clipped_at_edge() {
        let mut surface = RasterSurface::filled(10, 10, [0, 0, 0]);
        surface.fill_circle(SurfacePoint::new(0.0, 0.0), 3, [255, 0, 0]);
        // non-finite and far-away centres are ignored
        surface.fill_circle(SurfacePoint::new(f64::NAN, 5.0), 3, [255, 0, 0]);
        surface.fill_circle(SurfacePoint::new(3e9, -3e9), 3, [255, 0, 0]);
        surface.composite_overlay(255);
        assert_eq!(surface.pixel(0, 0), Some(RED));
        assert_eq!(surface.pixel(3, 0), Some(RED));
        assert_eq!(surface.pixel(3, 3), Some(BLACK));
        assert_eq!(surface.pixel(9, 9), Some(BLACK));
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        RasterSurface::filled(3, 3, [10, 20, 30]).save_png(&path).unwrap();
        assert!(path.exists());
    }
}
