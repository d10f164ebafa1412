//! Flotilla engine crate.
//!
//! Instanced 2D entity rendering: a draw facade that turns thousands of
//! per-entity calls into at most four GPU draw calls per frame, a display
//! surface that composites GPU sprites over an immediate 2D overlay (or runs
//! 2D-only when no GPU is available), and bounded object pools for the
//! transient entities feeding it.

pub mod canvas;
pub mod coords;
pub mod core;
pub mod device;
pub mod draw;
pub mod error;
pub mod fx;
pub mod logging;
pub mod paint;
pub mod pool;
pub mod render;
pub mod surface;
pub mod theme;
pub mod time;
pub mod window;

pub use error::{RenderError, Result};
