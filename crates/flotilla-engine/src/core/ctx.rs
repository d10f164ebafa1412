use crate::coords::Viewport;
use crate::draw::DrawFacade;
use crate::time::FrameTime;

/// Per-frame context passed to [`App::on_frame`](super::App::on_frame).
///
/// The frame has already been cleared; the runtime flushes and presents
/// after the callback returns.
pub struct FrameCtx<'a> {
    pub draw: &'a mut DrawFacade,
    pub time: FrameTime,
}

impl<'a> FrameCtx<'a> {
    pub fn new(draw: &'a mut DrawFacade, time: FrameTime) -> Self {
        Self { draw, time }
    }

    /// Logical drawing area.
    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.draw.surface().viewport()
    }

    #[inline]
    pub fn dt(&self) -> f32 {
        self.time.dt
    }
}
