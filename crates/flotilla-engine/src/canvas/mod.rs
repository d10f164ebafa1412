//! Immediate-mode 2D surface.
//!
//! The canvas is the drawing target for everything that is not worth GPU
//! batching: backgrounds, gradients, text-like overlays and, in 2D-only mode,
//! every primitive. It is a CPU RGBA8 raster (straight alpha) sized in device
//! pixels; every operation takes logical coordinates and scales internally.
//!
//! Blending is source-over with analytic box-filter coverage at the edges.

mod canvas;
mod raster;
mod scratch;

pub use canvas::Canvas;
pub use scratch::{ScratchStats, ScratchSurface};
