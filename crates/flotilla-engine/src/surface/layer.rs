use image::RgbaImage;

use super::compositor::Compositor;
use super::PresentStatus;
use crate::device::{Gpu, SurfaceErrorAction};
use crate::error::{RenderError, Result};
use crate::render::gpu::common::{build_checked, validated};

/// Format of the sprite layer, the overlay upload and the offscreen target.
pub const LAYER_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// A device-sized 2D texture plus its default view.
pub(super) struct LayerTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl LayerTexture {
    fn new(
        device: &wgpu::Device,
        label: &'static str,
        size: (u32, u32),
        usage: wgpu::TextureUsages,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: LAYER_FORMAT,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// GPU half of a dual-surface display: the device, the sprite layer that
/// batched draws land on, the uploaded overlay and the compositor.
pub(super) struct GpuLayer {
    pub gpu: Gpu,
    pub sprite: LayerTexture,
    overlay: LayerTexture,
    /// Composite target when there is no window.
    presented: Option<LayerTexture>,
    compositor: Compositor,
    bind_group: wgpu::BindGroup,
}

impl GpuLayer {
    pub(super) fn new(gpu: Gpu, size: (u32, u32)) -> Result<Self> {
        let format = gpu.surface_format().unwrap_or(LAYER_FORMAT);
        let device = gpu.device();

        let compositor = build_checked(device, "composite", || Compositor::new(device, format))?;
        let (sprite, overlay, presented) = Self::textures(device, size, gpu.has_window())?;
        let bind_group = compositor.bind(device, &overlay.view, &sprite.view);

        Ok(Self {
            gpu,
            sprite,
            overlay,
            presented,
            compositor,
            bind_group,
        })
    }

    /// Creates the three layer textures inside one validation scope, so an
    /// extent the device rejects is an error rather than a panic.
    fn textures(
        device: &wgpu::Device,
        size: (u32, u32),
        has_window: bool,
    ) -> Result<(LayerTexture, LayerTexture, Option<LayerTexture>)> {
        match validated(device, || Self::create_textures(device, size, has_window)) {
            (textures, None) => Ok(textures),
            (_, Some(err)) => Err(RenderError::Resource {
                resource: "layer textures",
                message: err.to_string(),
            }),
        }
    }

    fn create_textures(
        device: &wgpu::Device,
        size: (u32, u32),
        has_window: bool,
    ) -> (LayerTexture, LayerTexture, Option<LayerTexture>) {
        let sprite = LayerTexture::new(
            device,
            "flotilla sprite layer",
            size,
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
        );
        let overlay = LayerTexture::new(
            device,
            "flotilla overlay layer",
            size,
            wgpu::TextureUsages::COPY_DST | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        let presented = (!has_window).then(|| {
            LayerTexture::new(
                device,
                "flotilla presented frame",
                size,
                wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            )
        });
        (sprite, overlay, presented)
    }

    #[inline]
    pub(super) fn size(&self) -> (u32, u32) {
        (self.sprite.texture.width(), self.sprite.texture.height())
    }

    /// Recreates the layer textures at `size`. Pipelines are kept.
    ///
    /// On error the old textures stay bound but no longer match the canvas;
    /// the caller is expected to drop the layer.
    pub(super) fn resize(&mut self, size: (u32, u32)) -> Result<()> {
        if size == self.size() {
            return Ok(());
        }
        self.gpu.resize(size.0, size.1);

        let device = self.gpu.device();
        let (sprite, overlay, presented) = Self::textures(device, size, self.gpu.has_window())?;
        self.bind_group = self.compositor.bind(device, &overlay.view, &sprite.view);
        self.sprite = sprite;
        self.overlay = overlay;
        self.presented = presented;
        Ok(())
    }

    #[inline]
    pub(super) fn max_dimension(&self) -> u32 {
        self.gpu.max_texture_dimension()
    }

    /// Clears the sprite layer to transparent.
    pub(super) fn clear_sprites(&self) {
        let mut encoder = self.encoder("flotilla sprite clear");
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("flotilla sprite clear pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.sprite.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        self.gpu.queue().submit(std::iter::once(encoder.finish()));
    }

    pub(super) fn encoder(&self, label: &'static str) -> wgpu::CommandEncoder {
        self.gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) })
    }

    /// Uploads `overlay` (straight alpha, device size) and composites it
    /// under the sprite layer into the present target.
    pub(super) fn composite(&mut self, overlay: &RgbaImage) -> PresentStatus {
        let (width, height) = overlay.dimensions();
        if (width, height) != self.size() {
            log::warn!(
                "overlay is {width}x{height} but layers are {:?}; skipping frame",
                self.size()
            );
            return PresentStatus::Skipped;
        }

        self.gpu.queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.overlay.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            overlay.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        if let Some(presented) = self.presented.as_ref() {
            let mut encoder = self.encoder("flotilla composite encoder");
            self.compositor.encode(&mut encoder, &self.bind_group, &presented.view);
            self.gpu.queue().submit(std::iter::once(encoder.finish()));
            return PresentStatus::Offscreen;
        }

        let frame = match self.gpu.acquire() {
            Ok(Some(frame)) => frame,
            Ok(None) => return PresentStatus::Skipped,
            Err(err) => {
                log::warn!("surface error: {err}");
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => PresentStatus::Fatal,
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        PresentStatus::Skipped
                    }
                };
            }
        };

        let mut encoder = self.encoder("flotilla composite encoder");
        self.compositor.encode(&mut encoder, &self.bind_group, &frame.view);
        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        frame.present();
        PresentStatus::Presented
    }

    pub(super) fn presented(&self) -> Option<&wgpu::Texture> {
        self.presented.as_ref().map(|p| &p.texture)
    }

    #[inline]
    pub(super) fn compositor_format(&self) -> wgpu::TextureFormat {
        self.compositor.format()
    }
}
