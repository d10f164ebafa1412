use crate::error::Result;
use crate::render::batch::{CircleEntry, DrawCall, GeometryKind, LineEntry, ShipEntry, TriangleEntry};
use crate::surface::DisplaySurface;

/// Which backend a [`Renderer`] draws with.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Backend {
    /// Batched, instanced GPU draws composited over the 2D overlay.
    Gpu,
    /// Immediate painting onto the 2D canvas.
    Immediate,
}

/// Summary of one flush.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FlushStats {
    pub draw_calls: u32,
    pub circles: u32,
    pub lines: u32,
    pub triangles: u32,
    pub ships: u32,
}

impl FlushStats {
    /// Instances drawn across all kinds.
    pub fn instances(&self) -> u32 {
        self.circles + self.lines + self.triangles + self.ships
    }

    pub(crate) fn record(&mut self, call: DrawCall) {
        self.draw_calls += 1;
        let slot = match call.kind {
            GeometryKind::Circle => &mut self.circles,
            GeometryKind::Line => &mut self.lines,
            GeometryKind::Triangle => &mut self.triangles,
            GeometryKind::Ship => &mut self.ships,
        };
        *slot += call.instances;
    }
}

/// Drawing backend behind the draw facade.
///
/// Colors arrive resolved. Implementations either record (GPU) or paint
/// right away onto the surface's 2D context (immediate); callers never
/// branch on which.
pub trait Renderer {
    fn backend(&self) -> Backend;

    fn fill_circle(&mut self, surface: &mut DisplaySurface, entry: CircleEntry);

    fn line(&mut self, surface: &mut DisplaySurface, entry: LineEntry);

    fn fill_triangle(&mut self, surface: &mut DisplaySurface, entry: TriangleEntry);

    /// Ships have no 2D rendition; immediate backends drop them.
    fn ship(&mut self, entry: ShipEntry);

    /// Recorded primitives not yet drawn.
    fn pending(&self) -> usize;

    /// Draws everything recorded since the last flush and forgets it.
    fn flush(&mut self, surface: &mut DisplaySurface) -> Result<FlushStats>;
}
