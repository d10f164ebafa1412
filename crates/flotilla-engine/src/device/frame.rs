/// Swapchain image acquired for one composite pass.
///
/// Present or drop it before the next acquire; the swapchain hands out a
/// bounded number of images.
pub struct PresentFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
}

impl PresentFrame {
    /// Call after the commands writing `view` were submitted.
    pub fn present(self) {
        drop(self.view);
        self.surface_texture.present();
    }
}

/// What the display does after `get_current_texture` failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Lost or outdated swapchain was configured again; the next frame retries.
    Reconfigured,
    /// Timeout or driver hiccup; this frame is not presented.
    SkipFrame,
    /// Out of memory. The runtime shuts down.
    Fatal,
}
