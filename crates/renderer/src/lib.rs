//! # Renderer
//!
//! Skeleton overlay drawing onto a `DrawingSurface`.
//!
//! - `OverlayRenderer`: frame blit, bones, reference lines, markers, status text
//! - `RasterSurface`: `image::RgbaImage` backed surface; `imageproc` draws the
//!   overlay layer, composited once per frame

mod draw;
mod overlay;
mod surface;

pub use overlay::{to_surface, OverlayRenderer, RenderSummary, StatusSinks, NO_DATA};
pub use surface::RasterSurface;
