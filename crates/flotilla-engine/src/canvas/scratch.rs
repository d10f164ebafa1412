use super::Canvas;
use crate::coords::Viewport;

/// Usage counters of a [`ScratchSurface`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ScratchStats {
    /// Times the backing image had to be reallocated.
    pub grow_count: u32,
    /// Completed `with_canvas` scopes.
    pub uses: u64,
    /// Backing image size in device pixels.
    pub capacity: (u32, u32),
}

/// Grow-only offscreen canvas for pre-rendering sprites before compositing.
///
/// The surface is borrowed for the duration of one closure and handed back
/// cleared on the next use; it never shrinks.
#[derive(Debug)]
pub struct ScratchSurface {
    canvas: Canvas,
    grow_count: u32,
    uses: u64,
}

impl Default for ScratchSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl ScratchSurface {
    pub fn new() -> Self {
        Self {
            canvas: Canvas::new(Viewport::new(1.0, 1.0), 1.0),
            grow_count: 0,
            uses: 0,
        }
    }

    /// Runs `f` with a transparent canvas of logical size `viewport`.
    ///
    /// `scale` is the logical-to-device scale of the canvas the result is
    /// blitted onto, so pre-rendered pixels line up one to one.
    pub fn with_canvas<R>(
        &mut self,
        viewport: Viewport,
        scale: f32,
        f: impl FnOnce(&mut Canvas) -> R,
    ) -> R {
        if self.canvas.reset_extent(viewport, scale) {
            self.grow_count += 1;
            log::debug!(
                "scratch surface grew to {}x{}",
                self.canvas.image().width(),
                self.canvas.image().height()
            );
        }
        let out = f(&mut self.canvas);
        self.uses += 1;
        out
    }

    pub fn stats(&self) -> ScratchStats {
        ScratchStats {
            grow_count: self.grow_count,
            uses: self.uses,
            capacity: self.canvas.image().dimensions(),
        }
    }
}
