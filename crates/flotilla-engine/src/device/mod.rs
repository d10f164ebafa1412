//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the window Surface (swapchain), when there is one
//! - acquiring swapchain images for presentation

mod frame;
mod gpu;
mod init;
mod surface;

pub use frame::{PresentFrame, SurfaceErrorAction};
pub use gpu::Gpu;
pub use init::GpuInit;
