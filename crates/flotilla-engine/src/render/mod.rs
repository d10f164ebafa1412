//! Rendering subsystem.
//!
//! Primitives are recorded as [`BatchEntry`] values and handed to a
//! [`Renderer`]: the GPU [`BatchRenderer`] collects them into per-kind
//! instance batches drawn at flush, the [`ImmediateRenderer`] paints them
//! onto the 2D canvas straight away.
//!
//! Convention:
//! - CPU geometry is in logical pixels (top-left origin, +Y down).
//! - Vertex shaders convert to NDC using the frame uniform's viewport.
//! - Colors cross the GPU boundary premultiplied.

mod batch;
mod ctx;
pub mod gpu;
mod immediate;
mod renderer;

pub use batch::{
    BatchEntry, CircleEntry, DrawCall, DrawPlan, FrameBatchSet, GeometryKind, LineEntry,
    ShipEntry, TriangleEntry,
};
pub use ctx::{RenderCtx, RenderTarget};
pub use gpu::BatchRenderer;
pub use immediate::ImmediateRenderer;
pub use renderer::{Backend, FlushStats, Renderer};
