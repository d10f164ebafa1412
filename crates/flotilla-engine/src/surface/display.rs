use image::RgbaImage;

use super::config::{BackendPreference, DisplayConfig, PresentStatus, PresentTarget};
use super::layer::{GpuLayer, LAYER_FORMAT};
use super::readback::read_texture;
use crate::canvas::{Canvas, ScratchStats, ScratchSurface};
use crate::coords::{clamp_pixel_ratio, Viewport};
use crate::device::Gpu;
use crate::error::{RenderError, Result};
use crate::paint::Color;
use crate::render::{RenderCtx, RenderTarget};

/// How the display produces frames.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DisplayMode {
    /// GPU sprite layer composited over the 2D overlay.
    Dual,
    /// Everything lands in the 2D canvas.
    Immediate,
}

/// Owns the output surfaces.
///
/// In dual mode a GPU sprite layer and a same-size 2D overlay canvas are kept
/// in lockstep; [`composite_overlay`](Self::composite_overlay) puts the
/// overlay under the sprites every frame. In immediate mode only the canvas
/// exists. Immediate 2D drawing always targets the canvas.
pub struct DisplaySurface {
    viewport: Viewport,
    pixel_ratio: f32,
    /// Set while the device limit holds the output below `pixel_ratio`.
    limited: bool,
    canvas: Canvas,
    scratch: ScratchSurface,
    time: f32,
    gpu: Option<GpuLayer>,
}

impl DisplaySurface {
    /// Builds the display, falling back to immediate mode when the GPU path
    /// cannot be set up. Never fails.
    pub fn new(config: &DisplayConfig, target: PresentTarget) -> Self {
        match Self::try_gpu(config, target) {
            Ok(surface) => surface,
            Err(RenderError::Disabled) => {
                log::info!("display backend: immediate 2D (forced by configuration)");
                Self::immediate(config)
            }
            Err(err) => {
                log::warn!("GPU display unavailable, falling back to immediate 2D: {err}");
                Self::immediate(config)
            }
        }
    }

    /// Builds a 2D-only display.
    pub fn immediate(config: &DisplayConfig) -> Self {
        Self::assemble(config, clamp_pixel_ratio(config.pixel_ratio), None)
    }

    /// Builds a dual-surface display or reports why it cannot.
    pub fn try_gpu(config: &DisplayConfig, target: PresentTarget) -> Result<Self> {
        if config.backend == BackendPreference::ForceImmediate {
            return Err(RenderError::Disabled);
        }

        let ratio = clamp_pixel_ratio(config.pixel_ratio);
        let requested = config.size.device_size(ratio);
        let mut gpu = Gpu::new_blocking(&config.gpu_init(), target.window(), requested)?;

        // Both layers share one scale, so the canvas shrinks with the GPU
        // textures when the device cannot hold the full-ratio extent.
        let scale = config.size.fit_scale(ratio, gpu.max_texture_dimension());
        let size = config.size.scaled_size(scale);
        gpu.resize(size.0, size.1);
        let layer = GpuLayer::new(gpu, size)?;

        log::info!(
            "display backend: GPU sprites over 2D overlay ({}x{} device px, composite {:?})",
            size.0,
            size.1,
            layer.compositor_format()
        );
        let mut surface = Self::assemble(config, scale, Some(layer));
        surface.note_limit(scale);
        Ok(surface)
    }

    fn assemble(config: &DisplayConfig, scale: f32, gpu: Option<GpuLayer>) -> Self {
        Self {
            viewport: config.size,
            pixel_ratio: clamp_pixel_ratio(config.pixel_ratio),
            limited: false,
            canvas: Canvas::with_scale(config.size, scale),
            scratch: ScratchSurface::new(),
            time: 0.0,
            gpu,
        }
    }

    /// Logs once per episode of the device limit capping the output.
    fn note_limit(&mut self, scale: f32) {
        let limited = scale < self.pixel_ratio;
        if limited && !self.limited {
            log::warn!(
                "{}x{} @{} exceeds the GPU texture limit; rendering at scale {scale:.3}",
                self.viewport.width,
                self.viewport.height,
                self.pixel_ratio
            );
        }
        self.limited = limited;
    }

    // ── mode ─────────────────────────────────────────────────────────────

    pub fn mode(&self) -> DisplayMode {
        if self.gpu.is_some() {
            DisplayMode::Dual
        } else {
            DisplayMode::Immediate
        }
    }

    #[inline]
    pub fn is_dual(&self) -> bool {
        self.gpu.is_some()
    }

    /// The device, in dual mode.
    pub fn gpu(&self) -> Option<&Gpu> {
        self.gpu.as_ref().map(|layer| &layer.gpu)
    }

    /// Drops the GPU layer; the canvas and its contents are kept.
    pub fn into_immediate(&mut self) {
        if self.gpu.take().is_some() {
            log::info!("display switched to immediate 2D");
        }
    }

    // ── geometry ─────────────────────────────────────────────────────────

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Clamped device-pixel-ratio.
    #[inline]
    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Logical-to-device scale both layers render at. Equals
    /// [`pixel_ratio`](Self::pixel_ratio) unless the GPU texture limit
    /// forces it lower.
    #[inline]
    pub fn scale(&self) -> f32 {
        self.canvas.scale()
    }

    /// Output size in device pixels (each dimension at least 1).
    #[inline]
    pub fn device_size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    /// Applies a new logical size and device-pixel-ratio.
    ///
    /// Both layers are resized together; shader programs are never rebuilt.
    /// A call that changes nothing is a no-op.
    ///
    /// In dual mode the scale is capped so neither layer exceeds the GPU
    /// texture limit. If the device still rejects the new textures the
    /// display drops to immediate mode.
    pub fn resize(&mut self, width: f32, height: f32, pixel_ratio: f32) {
        let viewport = Viewport::new(width, height);
        let ratio = clamp_pixel_ratio(pixel_ratio);
        if viewport == self.viewport && ratio == self.pixel_ratio {
            return;
        }

        self.viewport = viewport;
        self.pixel_ratio = ratio;
        let scale = match self.gpu.as_ref() {
            Some(layer) => viewport.fit_scale(ratio, layer.max_dimension()),
            None => ratio,
        };
        self.canvas.rescale(viewport, scale);
        self.note_limit(scale);

        let size = self.device_size();
        if let Some(Err(err)) = self.gpu.as_mut().map(|layer| layer.resize(size)) {
            log::warn!("GPU layer resize failed, falling back to immediate 2D: {err}");
            self.into_immediate();
        }
        log::debug!(
            "display resized to {width}x{height} @{ratio} ({}x{} device px)",
            size.0,
            size.1
        );
    }

    // ── time ─────────────────────────────────────────────────────────────

    /// Accumulates frame time for animated shaders. Non-finite or negative
    /// steps are ignored.
    pub fn advance_time(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.time += dt;
        }
    }

    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    // ── 2D ───────────────────────────────────────────────────────────────

    /// The immediate 2D surface: the overlay in dual mode, the only surface
    /// otherwise.
    #[inline]
    pub fn context(&self) -> &Canvas {
        &self.canvas
    }

    #[inline]
    pub fn context_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// Lends a cleared scratch canvas of logical size `viewport` together
    /// with the display canvas, for pre-rendering and blitting in one scope.
    pub fn with_scratch<R>(
        &mut self,
        viewport: Viewport,
        f: impl FnOnce(&mut Canvas, &mut Canvas) -> R,
    ) -> R {
        let scale = self.canvas.scale();
        let canvas = &mut self.canvas;
        self.scratch.with_canvas(viewport, scale, |scratch| f(scratch, canvas))
    }

    pub fn scratch_stats(&self) -> ScratchStats {
        self.scratch.stats()
    }

    // ── frame ────────────────────────────────────────────────────────────

    /// Starts a frame.
    ///
    /// In dual mode the sprite layer is cleared to transparent and the
    /// overlay to `color`; an opaque sprite clear would hide the overlay.
    pub fn clear(&mut self, color: Color) {
        if let Some(layer) = self.gpu.as_ref() {
            layer.clear_sprites();
        }
        self.canvas.clear(color);
    }

    /// Runs `draw` against the sprite layer and submits the recorded work.
    pub fn render_sprites<R>(
        &mut self,
        draw: impl FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>) -> R,
    ) -> Result<R> {
        let layer = self.gpu.as_ref().ok_or(RenderError::NoGpuLayer)?;

        let mut encoder = layer.encoder("flotilla sprite encoder");
        let ctx = RenderCtx::new(
            layer.gpu.device(),
            layer.gpu.queue(),
            LAYER_FORMAT,
            self.viewport,
            self.time,
        );
        let out = {
            let mut target = RenderTarget::new(&mut encoder, &layer.sprite.view);
            draw(&ctx, &mut target)
        };
        layer.gpu.queue().submit(std::iter::once(encoder.finish()));
        Ok(out)
    }

    /// Puts the overlay under the sprite layer and presents the result.
    pub fn composite_overlay(&mut self) -> PresentStatus {
        match self.gpu.as_mut() {
            Some(layer) => layer.composite(self.canvas.image()),
            None => PresentStatus::CanvasOnly,
        }
    }

    // ── readback ─────────────────────────────────────────────────────────

    /// Premultiplied contents of the sprite layer.
    pub fn read_sprite_layer(&self) -> Result<RgbaImage> {
        let layer = self.gpu.as_ref().ok_or(RenderError::NoGpuLayer)?;
        read_texture(layer.gpu.device(), layer.gpu.queue(), &layer.sprite.texture)
    }

    /// The last composited frame when presenting offscreen.
    ///
    /// In immediate mode this is a copy of the canvas. Window targets cannot
    /// be read back.
    pub fn read_presented(&self) -> Result<RgbaImage> {
        let Some(layer) = self.gpu.as_ref() else {
            return Ok(self.canvas.to_image());
        };
        let texture = layer.presented().ok_or_else(|| {
            RenderError::Readback("window targets cannot be read back".into())
        })?;
        read_texture(layer.gpu.device(), layer.gpu.queue(), texture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn immediate(w: f32, h: f32, ratio: f32) -> DisplaySurface {
        DisplaySurface::immediate(&DisplayConfig::new(w, h).with_pixel_ratio(ratio))
    }

    // ── construction ─────────────────────────────────────────────────────

    #[test]
    fn forced_immediate_never_touches_gpu() {
        let config = DisplayConfig::new(64.0, 32.0).with_backend(BackendPreference::ForceImmediate);
        let surface = DisplaySurface::new(&config, PresentTarget::Offscreen);
        assert_eq!(surface.mode(), DisplayMode::Immediate);
        assert!(surface.gpu().is_none());
        assert_eq!(surface.device_size(), (64, 32));
    }

    #[test]
    fn try_gpu_reports_disabled() {
        let config = DisplayConfig::new(8.0, 8.0).with_backend(BackendPreference::ForceImmediate);
        assert!(matches!(
            DisplaySurface::try_gpu(&config, PresentTarget::Offscreen),
            Err(RenderError::Disabled)
        ));
    }

    // ── resize ───────────────────────────────────────────────────────────

    #[test]
    fn resize_clamps_ratio_and_degenerate_size() {
        let mut s = immediate(10.0, 10.0, 1.0);
        s.resize(0.0, 20.0, 8.0);
        assert_eq!(s.pixel_ratio(), 3.0);
        assert_eq!(s.device_size(), (1, 60));
    }

    #[test]
    fn immediate_scale_is_the_clamped_ratio() {
        let mut s = immediate(10_000.0, 10.0, 2.0);
        assert_eq!(s.scale(), 2.0);
        s.resize(20_000.0, 10.0, 5.0);
        assert_eq!(s.scale(), 3.0);
        assert_eq!(s.device_size(), (60_000, 30));
    }

    #[test]
    fn same_size_resize_keeps_pixels() {
        let mut s = immediate(10.0, 10.0, 1.0);
        s.clear(Color::WHITE);
        s.resize(10.0, 10.0, 1.0);
        assert_eq!(s.context().pixel(5, 5), Some([255, 255, 255, 255]));
    }

    // ── frame ────────────────────────────────────────────────────────────

    #[test]
    fn immediate_clear_fills_canvas() {
        let mut s = immediate(4.0, 4.0, 2.0);
        s.clear(Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(s.context().pixel(7, 7), Some([255, 0, 0, 255]));
    }

    #[test]
    fn sprites_need_a_gpu_layer() {
        let mut s = immediate(4.0, 4.0, 1.0);
        assert!(matches!(s.render_sprites(|_, _| ()), Err(RenderError::NoGpuLayer)));
        assert!(matches!(s.read_sprite_layer(), Err(RenderError::NoGpuLayer)));
        assert_eq!(s.composite_overlay(), PresentStatus::CanvasOnly);
    }

    #[test]
    fn time_ignores_bad_steps() {
        let mut s = immediate(4.0, 4.0, 1.0);
        s.advance_time(0.5);
        s.advance_time(-1.0);
        s.advance_time(f32::NAN);
        assert_eq!(s.time(), 0.5);
    }

    #[test]
    fn scratch_is_lent_with_the_canvas() {
        let mut s = immediate(16.0, 16.0, 1.0);
        s.with_scratch(Viewport::new(4.0, 4.0), |scratch, canvas| {
            scratch.clear(Color::WHITE);
            canvas.draw_canvas(scratch, crate::coords::Vec2::new(2.0, 2.0), 1.0);
        });
        assert_eq!(s.context().pixel(3, 3), Some([255, 255, 255, 255]));
        assert_eq!(s.context().pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(s.scratch_stats().uses, 1);
    }
}
