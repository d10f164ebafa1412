//! Paint model shared by the draw facade, the canvas and the batch renderer.
//!
//! Scope:
//! - color representation (straight alpha; premultiplied at the GPU boundary)
//! - paint state (fill/stroke/alpha/line width) resolved at record time
//! - paint sources for 2D fills (solid, linear gradients)

pub mod color;
pub mod gradient;
mod paint;
mod state;

pub use color::Color;
pub use gradient::{ColorStop, LinearGradient, SpreadMode};
pub use paint::Paint;
pub use state::PaintState;
