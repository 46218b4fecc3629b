//! Raster helpers: layer compositing, segment clipping, dash layout.

use image::Rgba;

/// `src over dst`, straight (non-premultiplied) alpha
pub fn blend(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0;
    if sa >= 1.0 {
        return src;
    }
    if sa <= 0.0 {
        return dst;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |s: u8, d: u8| {
        let value = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
        value.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}

/// Axis-aligned clip box, bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl ClipBox {
    /// Pixel box of a `width x height` surface grown by `margin` on every side
    pub fn surface(width: u32, height: u32, margin: f64) -> Self {
        Self {
            min_x: -margin,
            min_y: -margin,
            max_x: width as f64 - 1.0 + margin,
            max_y: height as f64 - 1.0 + margin,
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }
}

/// Liang-Barsky clip of `start -> end` against `clip`
///
/// `None` when the segment misses the box, or when an endpoint or the
/// span is not finite.
pub fn clip_segment(
    start: (f64, f64),
    end: (f64, f64),
    clip: ClipBox,
) -> Option<((f64, f64), (f64, f64))> {
    let (x0, y0) = start;
    let dx = end.0 - x0;
    let dy = end.1 - y0;
    if ![x0, y0, dx, dy].iter().all(|v| v.is_finite()) {
        return None;
    }

    let mut t_enter = 0.0_f64;
    let mut t_exit = 1.0_f64;
    let edges = [
        (-dx, x0 - clip.min_x),
        (dx, clip.max_x - x0),
        (-dy, y0 - clip.min_y),
        (dy, clip.max_y - y0),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            // parallel to this edge and outside it
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            if t > t_exit {
                return None;
            }
            t_enter = t_enter.max(t);
        } else {
            if t < t_enter {
                return None;
            }
            t_exit = t_exit.min(t);
        }
    }

    Some((
        (x0 + t_enter * dx, y0 + t_enter * dy),
        (x0 + t_exit * dx, y0 + t_exit * dy),
    ))
}

/// Brush offsets `lo..=hi` for a line of `thickness` pixels
pub fn brush_offsets(thickness: u32) -> std::ops::RangeInclusive<i32> {
    let side = thickness.clamp(1, 256) as i32;
    let lo = -(side - 1) / 2;
    lo..=lo + side - 1
}

/// Split a vertical run from `(x, y_start)` upward by `length` into dashes
///
/// `dash == 0` yields one solid segment.
pub fn vertical_dashes(x: f64, y_start: f64, length: f64, dash: u32) -> Vec<(f64, f64, f64, f64)> {
    if length <= 0.0 {
        return Vec::new();
    }
    if dash == 0 {
        return vec![(x, y_start, x, y_start - length)];
    }
    let dash = dash as f64;
    let mut dashes = Vec::new();
    let mut offset = 0.0;
    while offset < length {
        let end = (offset + dash).min(length);
        dashes.push((x, y_start - offset, x, y_start - end));
        offset += dash * 2.0;
    }
    dashes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_blend_replaces() {
        let out = blend(Rgba([10, 20, 30, 255]), Rgba([200, 100, 0, 255]));
        assert_eq!(out, Rgba([200, 100, 0, 255]));
    }

    #[test]
    fn test_half_alpha_over_opaque() {
        let out = blend(Rgba([0, 0, 0, 255]), Rgba([255, 255, 255, 128]));
        assert_eq!(out[3], 255);
        assert!((127..=129).contains(&out[0]));
    }

    #[test]
    fn test_transparent_source_keeps_destination() {
        let dst = Rgba([1, 2, 3, 255]);
        assert_eq!(blend(dst, Rgba([255, 0, 0, 0])), dst);
    }

    #[test]
    fn test_clip_inside_segment_unchanged() {
        let clip = ClipBox::surface(20, 20, 0.0);
        let clipped = clip_segment((2.0, 3.0), (15.0, 9.0), clip).unwrap();
        assert_eq!(clipped, ((2.0, 3.0), (15.0, 9.0)));
    }

    #[test]
    fn test_clip_far_endpoint_to_box() {
        let clip = ClipBox::surface(20, 20, 0.0);
        let (start, end) = clip_segment((10.0, 10.0), (-1e19, 10.0), clip).unwrap();
        assert_eq!(start, (10.0, 10.0));
        assert!((end.0 - 0.0).abs() < 1e-6);
        assert!((end.1 - 10.0).abs() < 1e-6);

        let (_, end) = clip_segment((10.0, 10.0), (3e7, 10.0), clip).unwrap();
        assert!((end.0 - 19.0).abs() < 1e-6);
    }

    #[test]
    fn test_clip_rejects_misses_and_non_finite() {
        let clip = ClipBox::surface(10, 10, 0.0);
        assert!(clip_segment((-5.0, -5.0), (-1.0, 20.0), clip).is_none());
        assert!(clip_segment((20.0, 2.0), (30.0, 2.0), clip).is_none());
        assert!(clip_segment((1.0, 1.0), (f64::NAN, 2.0), clip).is_none());
        assert!(clip_segment((-f64::MAX, 1.0), (f64::MAX, 1.0), clip).is_none());
    }

    #[test]
    fn test_clip_diagonal_entering_box() {
        let clip = ClipBox::surface(11, 11, 0.0);
        let (start, end) = clip_segment((-10.0, -10.0), (20.0, 20.0), clip).unwrap();
        assert!((start.0 - 0.0).abs() < 1e-9 && (start.1 - 0.0).abs() < 1e-9);
        assert!((end.0 - 10.0).abs() < 1e-9 && (end.1 - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_brush_offsets_centred() {
        assert_eq!(brush_offsets(1), 0..=0);
        assert_eq!(brush_offsets(2), 0..=1);
        assert_eq!(brush_offsets(3), -1..=1);
        assert_eq!(brush_offsets(0), 0..=0);
    }

    #[test]
    fn test_dashes_alternate() {
        let dashes = vertical_dashes(5.0, 100.0, 20.0, 6);
        assert_eq!(dashes.len(), 2);
        assert_eq!(dashes[0], (5.0, 100.0, 5.0, 94.0));
        assert_eq!(dashes[1], (5.0, 88.0, 5.0, 82.0));
        assert_eq!(vertical_dashes(0.0, 10.0, 10.0, 0).len(), 1);
        assert!(vertical_dashes(0.0, 10.0, 0.0, 4).is_empty());
    }
}
