use std::sync::Arc;

use wgpu::SurfaceError;
use winit::window::Window;

use super::surface::{choose_alpha_mode, choose_surface_format};
use super::{GpuInit, PresentFrame, SurfaceErrorAction};
use crate::error::{RenderError, Result};

/// Swapchain bound to a window, plus its active configuration.
struct WindowSurface {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
}

/// Owns wgpu core objects and, when presenting to a window, the surface
/// configuration.
///
/// This type is the low-level rendering context:
/// - creates and stores Instance/Adapter/Device/Queue
/// - creates and configures the Surface (swapchain), if any
/// - acquires swapchain images for presentation
///
/// Without a window the device renders offscreen only (headless tests,
/// frame captures).
pub struct Gpu {
    /// Kept alive for the lifetime of the adapter and surface.
    _instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,

    /// Present only for window targets. The surface holds an `Arc` of the
    /// window, so it cannot outlive it.
    window: Option<WindowSurface>,

    /// Current drawable size in physical pixels.
    size: (u32, u32),
}

impl Gpu {
    /// Creates a GPU context, bound to `window` when one is given.
    ///
    /// `size` is the initial drawable size in physical pixels; each dimension
    /// is clamped to `1..=max_texture_dimension_2d` of the device.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(init: &GpuInit, window: Option<Arc<Window>>, size: (u32, u32)) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        });

        let surface = match window {
            Some(window) => Some(instance.create_surface(window)?),
            None => None,
        };

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: surface.as_ref(),
                force_fallback_adapter: init.force_fallback_adapter,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("flotilla-engine device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await?;

        let size = clamp_extent(size, device.limits().max_texture_dimension_2d);
        let window = match surface {
            Some(surface) => {
                let caps = surface.get_capabilities(&adapter);
                let format = choose_surface_format(&caps, init.prefer_srgb)
                    .ok_or(RenderError::NoSurfaceFormat)?;

                let config = wgpu::SurfaceConfiguration {
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    format,
                    width: size.0,
                    height: size.1,
                    present_mode: init.present_mode,
                    alpha_mode: choose_alpha_mode(&caps, init.alpha_mode),
                    view_formats: vec![],
                    desired_maximum_frame_latency: init.desired_maximum_frame_latency,
                };
                surface.configure(&device, &config);
                Some(WindowSurface { surface, config })
            }
            None => None,
        };

        let info = adapter.get_info();
        log::info!(
            "gpu ready: {} ({:?}, {})",
            info.name,
            info.backend,
            if window.is_some() { "window" } else { "offscreen" }
        );

        Ok(Self {
            _instance: instance,
            adapter,
            device,
            queue,
            window,
            size,
        })
    }

    /// Blocking variant of [`Gpu::new`].
    pub fn new_blocking(init: &GpuInit, window: Option<Arc<Window>>, size: (u32, u32)) -> Result<Self> {
        pollster::block_on(Self::new(init, window, size))
    }

    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Format of the window swapchain; `None` when rendering offscreen.
    pub fn surface_format(&self) -> Option<wgpu::TextureFormat> {
        self.window.as_ref().map(|w| w.config.format)
    }

    #[inline]
    pub fn has_window(&self) -> bool {
        self.window.is_some()
    }

    /// Largest 2D texture edge the device accepts.
    #[inline]
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    /// Current drawable size (physical pixels).
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Reconfigures the surface after a resize.
    ///
    /// wgpu does not support configuring a surface with a 0x0 size; in that
    /// case configuration is deferred. Sizes above the device limit are
    /// clamped to it.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let (width, height) = clamp_extent((width, height), self.max_texture_dimension());
        if (width, height) == self.size {
            return;
        }
        self.size = (width, height);

        if let Some(w) = self.window.as_mut() {
            w.config.width = width;
            w.config.height = height;
            w.surface.configure(&self.device, &w.config);
            log::debug!("surface reconfigured to {width}x{height}");
        }
    }

    /// Acquires the next swapchain image. `Ok(None)` when offscreen.
    pub fn acquire(&self) -> std::result::Result<Option<PresentFrame>, SurfaceError> {
        let Some(w) = self.window.as_ref() else {
            return Ok(None);
        };
        let surface_texture = w.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Some(PresentFrame { surface_texture, view }))
    }

    /// Converts a `SurfaceError` into a higher-level action.
    pub fn handle_surface_error(&mut self, err: SurfaceError) -> SurfaceErrorAction {
        match err {
            SurfaceError::Lost | SurfaceError::Outdated => {
                if let Some(w) = self.window.as_ref() {
                    w.surface.configure(&self.device, &w.config);
                }
                SurfaceErrorAction::Reconfigured
            }
            SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
            SurfaceError::Timeout => SurfaceErrorAction::SkipFrame,
            SurfaceError::Other => SurfaceErrorAction::SkipFrame,
        }
    }
}

#[cfg(test)]
impl Gpu {
    /// Offscreen device for unit tests: hardware first, then software.
    /// `None` when the machine has no adapter at all.
    pub(crate) fn for_tests() -> Option<Self> {
        let size = (1, 1);
        match Self::new_blocking(&GpuInit::default(), None, size)
            .or_else(|_| Self::new_blocking(&GpuInit::software(), None, size))
        {
            Ok(gpu) => Some(gpu),
            Err(err) => {
                eprintln!("skipping GPU test: {err}");
                None
            }
        }
    }
}

/// Clamps each dimension of `size` to `1..=max`.
fn clamp_extent(size: (u32, u32), max: u32) -> (u32, u32) {
    let max = max.max(1);
    (size.0.clamp(1, max), size.1.clamp(1, max))
}
