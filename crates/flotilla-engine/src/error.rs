//! Error types of the GPU path.
//!
//! Everything here is recoverable by running the display in 2D-only mode;
//! nothing on the immediate path can fail.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("GPU backend disabled by configuration")]
    Disabled,

    #[error("failed to create presentation surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,

    /// A shader module or pipeline failed validation. The GPU path is built
    /// all-or-nothing, so this fails construction of the whole batch renderer.
    #[error("shader program `{program}` failed to build: {message}")]
    ShaderProgram { program: &'static str, message: String },

    /// A texture or other GPU resource was rejected by validation, e.g. an
    /// extent above the device limit.
    #[error("GPU resource `{resource}` could not be created: {message}")]
    Resource { resource: &'static str, message: String },

    #[error("GPU readback failed: {0}")]
    Readback(String),

    #[error("display surface has no GPU layer")]
    NoGpuLayer,
}

pub type Result<T, E = RenderError> = std::result::Result<T, E>;
