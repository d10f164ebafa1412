use winit::event::WindowEvent;

use super::ctx::FrameCtx;
use crate::coords::Viewport;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by games and demos.
pub trait App {
    /// Called for raw window events before the runtime handles them.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called after the display has been resized (logical px).
    fn on_resize(&mut self, viewport: Viewport) {
        let _ = viewport;
    }

    /// Called once per frame, between the frame clear and flush/present.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl;
}
