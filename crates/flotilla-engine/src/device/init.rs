/// wgpu knobs used when the display builds its GPU layer.
///
/// Sprite rendering needs no optional features; anything added here must be
/// backed by a platform that cannot work without it.
#[derive(Debug, Clone)]
pub struct GpuInit {
    pub backends: wgpu::Backends,
    pub power_preference: wgpu::PowerPreference,

    /// Only accept a software adapter (CI machines, reference captures).
    pub force_fallback_adapter: bool,

    /// Pick an sRGB swapchain format when the surface offers one.
    ///
    /// Off by default: the compositor copies canvas bytes through unchanged,
    /// which is only color-exact on a linear format.
    pub prefer_srgb: bool,

    /// Fifo paces the frame loop to vblank and is always available.
    pub present_mode: wgpu::PresentMode,

    /// Requested swapchain alpha mode; unsupported requests fall back to the
    /// first mode the surface reports.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,

    /// Frames the swapchain may queue ahead. A hint only.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            prefer_srgb: false,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

impl GpuInit {
    /// Software adapter with downlevel limits, for deterministic captures.
    pub fn software() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::LowPower,
            force_fallback_adapter: true,
            required_limits: wgpu::Limits::downlevel_defaults(),
            ..Self::default()
        }
    }

    pub fn with_present_mode(mut self, mode: wgpu::PresentMode) -> Self {
        self.present_mode = mode;
        self
    }
}
