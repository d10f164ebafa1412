//! Drawing facade.
//!
//! [`DrawFacade`] is what gameplay code talks to: paint state, per-entity
//! primitives, beam/laser composition and scratch-based glows on top of the
//! display surface and whichever renderer it supports.

mod effects;
mod facade;

pub use effects::{beam_layers, laser_segments, BEAM_LAYERS, LASER_SEGMENTS};
pub use facade::DrawFacade;
