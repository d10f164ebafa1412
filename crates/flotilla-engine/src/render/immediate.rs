use crate::error::Result;
use crate::render::batch::{CircleEntry, LineEntry, ShipEntry, TriangleEntry};
use crate::render::renderer::{Backend, FlushStats, Renderer};
use crate::surface::DisplaySurface;

/// Renderer for 2D-only mode: every primitive is painted onto the surface's
/// canvas when it is issued, so nothing is ever pending.
#[derive(Debug, Default)]
pub struct ImmediateRenderer {
    dropped_ships: u64,
    warned_ships: bool,
}

impl ImmediateRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ship draws discarded since construction.
    pub fn dropped_ships(&self) -> u64 {
        self.dropped_ships
    }
}

impl Renderer for ImmediateRenderer {
    fn backend(&self) -> Backend {
        Backend::Immediate
    }

    fn fill_circle(&mut self, surface: &mut DisplaySurface, entry: CircleEntry) {
        surface
            .context_mut()
            .fill_circle(entry.center, entry.radius, entry.color);
    }

    fn line(&mut self, surface: &mut DisplaySurface, entry: LineEntry) {
        surface
            .context_mut()
            .stroke_line(entry.p0, entry.p1, entry.width, entry.color);
    }

    fn fill_triangle(&mut self, surface: &mut DisplaySurface, entry: TriangleEntry) {
        let [a, b, c] = entry.points;
        surface.context_mut().fill_triangle(a, b, c, entry.color);
    }

    fn ship(&mut self, _entry: ShipEntry) {
        self.dropped_ships += 1;
        if !self.warned_ships {
            log::debug!("ship sprites need the GPU backend; dropping ship draws in 2D mode");
            self.warned_ships = true;
        }
    }

    fn pending(&self) -> usize {
        0
    }

    fn flush(&mut self, _surface: &mut DisplaySurface) -> Result<FlushStats> {
        Ok(FlushStats::default())
    }
}
