//! Display surfaces.
//!
//! [`DisplaySurface`] picks dual-surface (GPU sprites + 2D overlay) or
//! immediate 2D mode once at construction and keeps both layers sized in
//! lockstep afterwards.

mod compositor;
mod config;
mod display;
mod layer;
mod readback;

pub use config::{BackendPreference, DisplayConfig, PresentStatus, PresentTarget};
pub use display::{DisplayMode, DisplaySurface};
pub use layer::LAYER_FORMAT;
