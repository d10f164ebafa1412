use std::sync::Arc;

use winit::window::Window;

use crate::coords::Viewport;
use crate::device::GpuInit;
use crate::paint::Color;

/// Which backend the display may use.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum BackendPreference {
    /// GPU sprites over a 2D overlay when a device can be created; 2D-only otherwise.
    #[default]
    Auto,
    /// Never touch the GPU; everything paints into the 2D canvas.
    ForceImmediate,
}

/// Display construction parameters.
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Logical size.
    pub size: Viewport,
    /// Reported device-pixel-ratio; clamped to `[1, 3]` on use.
    pub pixel_ratio: f32,
    pub backend: BackendPreference,
    /// Forwarded to [`GpuInit::prefer_srgb`].
    pub prefer_srgb: bool,
    /// Forwarded to [`GpuInit::present_mode`].
    pub present_mode: wgpu::PresentMode,
    /// Color the overlay is cleared to at the start of every frame.
    pub clear_color: Color,
    /// Remaining device knobs.
    pub gpu: GpuInit,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            size: Viewport::new(800.0, 600.0),
            pixel_ratio: 1.0,
            backend: BackendPreference::Auto,
            prefer_srgb: false,
            present_mode: wgpu::PresentMode::Fifo,
            clear_color: Color::BLACK,
            gpu: GpuInit::default(),
        }
    }
}

impl DisplayConfig {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Viewport::new(width, height),
            ..Self::default()
        }
    }

    pub fn with_pixel_ratio(mut self, ratio: f32) -> Self {
        self.pixel_ratio = ratio;
        self
    }

    pub fn with_backend(mut self, backend: BackendPreference) -> Self {
        self.backend = backend;
        self
    }

    /// Device parameters with the display-level overrides applied.
    pub(super) fn gpu_init(&self) -> GpuInit {
        GpuInit {
            prefer_srgb: self.prefer_srgb,
            present_mode: self.present_mode,
            ..self.gpu.clone()
        }
    }
}

/// Where composited frames go.
#[derive(Debug, Clone)]
pub enum PresentTarget {
    /// A window swapchain.
    Window(Arc<Window>),
    /// An offscreen texture, read back with
    /// [`DisplaySurface::read_presented`](super::DisplaySurface::read_presented).
    Offscreen,
}

impl PresentTarget {
    pub(super) fn window(&self) -> Option<Arc<Window>> {
        match self {
            Self::Window(w) => Some(Arc::clone(w)),
            Self::Offscreen => None,
        }
    }
}

/// Outcome of [`DisplaySurface::composite_overlay`](super::DisplaySurface::composite_overlay).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PresentStatus {
    /// Composited and handed to the window.
    Presented,
    /// Composited into the offscreen target.
    Offscreen,
    /// 2D-only mode: the canvas itself is the frame.
    CanvasOnly,
    /// Swapchain image unavailable; try again next frame.
    Skipped,
    /// The surface cannot recover (commonly out of memory).
    Fatal,
}
