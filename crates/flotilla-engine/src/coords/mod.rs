//! Coordinate and geometry types shared by the canvas, the batch renderer
//! and callers.
//!
//! Canonical CPU space:
//! - Logical pixels (pre pixel-density)
//! - Origin top-left
//! - +X right, +Y down
//!
//! Device pixels only appear at the raster/GPU boundary.

mod rect;
mod vec2;
mod viewport;

pub use rect::{PixelBounds, Rect};
pub use vec2::Vec2;
pub use viewport::{clamp_pixel_ratio, Viewport, MAX_PIXEL_RATIO, MIN_PIXEL_RATIO};
pub(crate) use viewport::sanitize_scale;
