//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the window, builds a [`DrawFacade`]
//! bound to it and forwards resizes as logical size + pixel ratio.
//!
//! [`DrawFacade`]: crate::draw::DrawFacade

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
