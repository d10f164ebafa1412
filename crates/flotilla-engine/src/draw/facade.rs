use crate::coords::{Vec2, Viewport};
use crate::error::Result;
use crate::paint::{Color, PaintState};
use crate::render::{
    Backend, BatchRenderer, CircleEntry, FlushStats, ImmediateRenderer, LineEntry, Renderer,
    ShipEntry, TriangleEntry,
};
use crate::surface::{DisplayConfig, DisplaySurface, PresentStatus, PresentTarget, LAYER_FORMAT};
use crate::theme::ShipTheme;

use super::effects::{beam_layers, laser_segments};

/// Per-call drawing API.
///
/// Colors come from the [`PaintState`] and are resolved when a primitive is
/// issued. Filled circles, triangles, lines and ships go through the active
/// [`Renderer`], picked once at construction; stroked shapes and glows always
/// paint onto the 2D context. Coordinates are logical pixels.
pub struct DrawFacade {
    surface: DisplaySurface,
    renderer: Box<dyn Renderer>,
    paint: PaintState,
    /// Primitives issued since the last flush, whatever path they took.
    issued: usize,
}

impl DrawFacade {
    /// Builds the display and the matching renderer.
    ///
    /// If the batch programs fail to build, the display drops its GPU layer
    /// and the facade runs in immediate mode with the same API.
    pub fn new(config: &DisplayConfig, target: PresentTarget) -> Self {
        Self::from_surface(DisplaySurface::new(config, target), BatchRenderer::new)
    }

    /// Pairs `surface` with a renderer, building the batch programs with
    /// `build` when the surface has a GPU layer. A failed build drops the
    /// layer and yields an immediate renderer.
    pub fn from_surface(
        mut surface: DisplaySurface,
        build: impl FnOnce(&wgpu::Device, wgpu::TextureFormat) -> Result<BatchRenderer>,
    ) -> Self {
        let batch = surface.gpu().map(|gpu| build(gpu.device(), LAYER_FORMAT));

        let renderer: Box<dyn Renderer> = match batch {
            Some(Ok(batch)) => Box::new(batch),
            Some(Err(err)) => {
                log::warn!("batch renderer unavailable, falling back to immediate 2D: {err}");
                surface.into_immediate();
                Box::new(ImmediateRenderer::new())
            }
            None => Box::new(ImmediateRenderer::new()),
        };
        log::info!("draw backend: {:?}", renderer.backend());

        Self::with_renderer(surface, renderer)
    }

    /// Pairs an existing display with a renderer.
    pub fn with_renderer(surface: DisplaySurface, renderer: Box<dyn Renderer>) -> Self {
        Self {
            surface,
            renderer,
            paint: PaintState::default(),
            issued: 0,
        }
    }

    // ── paint state ──────────────────────────────────────────────────────

    pub fn set_fill(&mut self, color: Color) {
        self.paint.set_fill(color);
    }

    pub fn set_stroke(&mut self, color: Color) {
        self.paint.set_stroke(color);
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.paint.set_alpha(alpha);
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.paint.set_line_width(width);
    }

    #[inline]
    pub fn paint(&self) -> &PaintState {
        &self.paint
    }

    // ── primitives ───────────────────────────────────────────────────────

    /// Filled circles use the fill color; stroked ones the stroke color and
    /// line width and paint immediately.
    pub fn circle(&mut self, x: f32, y: f32, radius: f32, fill: bool) {
        self.issued += 1;
        let center = Vec2::new(x, y);
        if fill {
            let entry = CircleEntry {
                center,
                radius,
                color: self.paint.resolved_fill(),
            };
            self.renderer.fill_circle(&mut self.surface, entry);
        } else {
            self.surface.context_mut().stroke_circle(
                center,
                radius,
                self.paint.line_width(),
                self.paint.resolved_stroke(),
            );
        }
    }

    /// Segment in the stroke color at the current line width.
    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.issued += 1;
        let entry = LineEntry {
            p0: Vec2::new(x1, y1),
            p1: Vec2::new(x2, y2),
            width: self.paint.line_width(),
            color: self.paint.resolved_stroke(),
        };
        self.renderer.line(&mut self.surface, entry);
    }

    pub fn triangle(&mut self, p0: Vec2, p1: Vec2, p2: Vec2, fill: bool) {
        self.issued += 1;
        if fill {
            let entry = TriangleEntry {
                points: [p0, p1, p2],
                color: self.paint.resolved_fill(),
            };
            self.renderer.fill_triangle(&mut self.surface, entry);
        } else {
            self.surface.context_mut().stroke_triangle(
                p0,
                p1,
                p2,
                self.paint.line_width(),
                self.paint.resolved_stroke(),
            );
        }
    }

    /// Ship sprite. GPU only: in immediate mode the call is dropped.
    ///
    /// `color` is the hull color; global alpha applies. Unknown theme ids
    /// render with the default theme.
    #[allow(clippy::too_many_arguments)]
    pub fn add_ship(
        &mut self,
        x: f32,
        y: f32,
        angle: f32,
        size: f32,
        color: Color,
        is_primary: bool,
        theme_id: u32,
    ) {
        self.issued += 1;
        self.renderer.ship(ShipEntry {
            position: Vec2::new(x, y),
            angle,
            size,
            color: self.paint.resolve(color),
            is_primary,
            theme: ShipTheme::from_id(theme_id),
        });
    }

    /// Layered, shimmering beam of `width` from `from` to `to`.
    pub fn add_beam(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        let color = self.paint.resolve(color);
        for entry in beam_layers(from, to, width, color, self.surface.time()) {
            self.issued += 1;
            self.renderer.line(&mut self.surface, entry);
        }
    }

    /// Segmented laser of `width` from `from` to `to` with travelling pulses.
    pub fn add_laser(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        let color = self.paint.resolve(color);
        let segments = laser_segments(from, to, width, color, self.surface.time());
        for entry in segments.into_iter().flatten() {
            self.issued += 1;
            self.renderer.line(&mut self.surface, entry);
        }
    }

    /// Soft radial glow, pre-rendered on a scratch surface and blitted onto
    /// the 2D context.
    pub fn glow(&mut self, center: Vec2, radius: f32, color: Color) {
        if !(radius.is_finite() && radius > 0.0) || !center.is_finite() {
            return;
        }
        self.issued += 1;
        let color = self.paint.resolve(color);
        let extent = Viewport::new(radius * 2.0, radius * 2.0);
        let corner = Vec2::new(radius, radius);
        self.surface.with_scratch(extent, |scratch, canvas| {
            scratch.fill_radial_glow(corner, radius, color);
            canvas.draw_canvas(scratch, center - corner, 1.0);
        });
    }

    // ── frame ────────────────────────────────────────────────────────────

    /// Clears both layers for a new frame (see [`DisplaySurface::clear`]).
    pub fn clear(&mut self, color: Color) {
        self.surface.clear(color);
    }

    /// Draws everything recorded since the last flush.
    ///
    /// Batches are emptied even when drawing fails. Paint state carries over.
    pub fn flush(&mut self) -> Result<FlushStats> {
        self.issued = 0;
        self.renderer.flush(&mut self.surface)
    }

    /// Composites the overlay under the sprites and presents.
    pub fn present(&mut self) -> PresentStatus {
        self.surface.composite_overlay()
    }

    /// Flushes and presents. A failed flush still presents the overlay.
    pub fn end_frame(&mut self) -> (Result<FlushStats>, PresentStatus) {
        let flushed = self.flush();
        if let Err(err) = &flushed {
            log::warn!("flush failed: {err}");
        }
        (flushed, self.present())
    }

    /// Resizes the display. Should the GPU layer be lost on the way, the
    /// renderer switches to immediate mode; pending batches are dropped.
    pub fn resize(&mut self, width: f32, height: f32, pixel_ratio: f32) {
        self.surface.resize(width, height, pixel_ratio);
        if !self.surface.is_dual() && self.renderer.backend() == Backend::Gpu {
            log::info!("draw backend: {:?}", Backend::Immediate);
            self.renderer = Box::new(ImmediateRenderer::new());
        }
    }

    pub fn advance_time(&mut self, dt: f32) {
        self.surface.advance_time(dt);
    }

    // ── queries ──────────────────────────────────────────────────────────

    #[inline]
    pub fn backend(&self) -> Backend {
        self.renderer.backend()
    }

    /// Recorded primitives waiting for the next flush.
    #[inline]
    pub fn pending(&self) -> usize {
        self.renderer.pending()
    }

    /// Primitives issued since the last flush, batched or painted.
    #[inline]
    pub fn issued(&self) -> usize {
        self.issued
    }

    #[inline]
    pub fn context(&self) -> &crate::canvas::Canvas {
        self.surface.context()
    }

    #[inline]
    pub fn context_mut(&mut self) -> &mut crate::canvas::Canvas {
        self.surface.context_mut()
    }

    #[inline]
    pub fn surface(&self) -> &DisplaySurface {
        &self.surface
    }

    #[inline]
    pub fn surface_mut(&mut self) -> &mut DisplaySurface {
        &mut self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{BEAM_LAYERS, LASER_SEGMENTS};
    use crate::surface::BackendPreference;

    fn immediate(w: f32, h: f32) -> DrawFacade {
        let config = DisplayConfig::new(w, h).with_backend(BackendPreference::ForceImmediate);
        DrawFacade::new(&config, PresentTarget::Offscreen)
    }

    // ── immediate mode ───────────────────────────────────────────────────

    #[test]
    fn filled_circle_paints_at_once() {
        let mut draw = immediate(32.0, 32.0);
        assert_eq!(draw.backend(), Backend::Immediate);
        draw.set_fill(Color::WHITE);
        draw.circle(10.0, 10.0, 5.0, true);
        assert_eq!(draw.pending(), 0);
        assert_eq!(draw.context().pixel(10, 10), Some([255, 255, 255, 255]));
    }

    #[test]
    fn colors_resolve_at_call_time() {
        let mut draw = immediate(40.0, 20.0);
        draw.set_fill(Color::rgb(1.0, 0.0, 0.0));
        draw.circle(10.0, 10.0, 5.0, true);
        draw.set_fill(Color::rgb(0.0, 0.0, 1.0));
        draw.circle(30.0, 10.0, 5.0, true);
        draw.flush().unwrap();
        assert_eq!(draw.context().pixel(10, 10), Some([255, 0, 0, 255]));
        assert_eq!(draw.context().pixel(30, 10), Some([0, 0, 255, 255]));
    }

    #[test]
    fn stroked_circle_leaves_center_empty() {
        let mut draw = immediate(40.0, 40.0);
        draw.set_stroke(Color::WHITE);
        draw.set_line_width(2.0);
        draw.circle(20.0, 20.0, 10.0, false);
        assert_eq!(draw.context().pixel(20, 20), Some([0, 0, 0, 0]));
        assert!(draw.context().pixel(29, 20).is_some_and(|p| p[3] >= 250));
    }

    #[test]
    fn ships_are_dropped_without_gpu() {
        let mut draw = immediate(32.0, 32.0);
        draw.add_ship(16.0, 16.0, 0.0, 8.0, Color::WHITE, true, 3);
        assert_eq!(draw.pending(), 0);
        assert_eq!(draw.context().pixel(16, 16), Some([0, 0, 0, 0]));
    }

    #[test]
    fn alpha_applies_to_lines() {
        let mut draw = immediate(20.0, 20.0);
        draw.set_stroke(Color::WHITE);
        draw.set_line_width(4.0);
        draw.set_alpha(0.5);
        draw.line(0.0, 10.0, 20.0, 10.0);
        let px = draw.context().pixel(10, 10).unwrap();
        assert!((px[3] as i32 - 128).abs() <= 1, "alpha {}", px[3]);
    }

    // ── effects ──────────────────────────────────────────────────────────

    #[test]
    fn beam_and_laser_count_as_lines() {
        let mut draw = immediate(64.0, 64.0);
        draw.add_beam(Vec2::new(0.0, 8.0), Vec2::new(64.0, 8.0), 6.0, Color::WHITE);
        draw.add_laser(Vec2::new(0.0, 40.0), Vec2::new(64.0, 40.0), 2.0, Color::WHITE);
        assert_eq!(draw.issued(), BEAM_LAYERS + LASER_SEGMENTS);
        assert!(draw.context().pixel(32, 8).is_some_and(|p| p[3] > 0));
        draw.flush().unwrap();
        assert_eq!(draw.issued(), 0);
    }

    #[test]
    fn glow_uses_scratch_and_fades_out() {
        let mut draw = immediate(64.0, 64.0);
        draw.glow(Vec2::new(32.0, 32.0), 16.0, Color::WHITE);
        let center = draw.context().pixel(32, 32).unwrap();
        let edge = draw.context().pixel(46, 32).unwrap();
        assert!(center[3] > edge[3]);
        assert_eq!(draw.context().pixel(2, 2), Some([0, 0, 0, 0]));
        assert_eq!(draw.surface().scratch_stats().uses, 1);
    }

    #[test]
    fn end_frame_in_immediate_mode_presents_canvas() {
        let mut draw = immediate(8.0, 8.0);
        draw.clear(Color::BLACK);
        let (flushed, status) = draw.end_frame();
        assert_eq!(flushed.unwrap(), FlushStats::default());
        assert_eq!(status, PresentStatus::CanvasOnly);
    }
}
