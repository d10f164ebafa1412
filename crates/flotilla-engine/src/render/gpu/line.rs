use bytemuck::{Pod, Zeroable};

use crate::coords::Vec2;
use crate::render::batch::LineEntry;

use super::common::{create_program, InstanceBuffer, ProgramDesc};

/// Instanced thick lines.
///
/// Each segment is expanded on the CPU into its four quad corners (butt
/// caps); the vertex stage picks a corner per `vertex_index`, so no base mesh
/// is bound. The fragment stage applies the shared time pulse.
pub(super) struct LineProgram {
    pipeline: wgpu::RenderPipeline,
    instances: InstanceBuffer<LineInstance>,
}

impl LineProgram {
    const VERTICES_PER_INSTANCE: u32 = 6;

    pub(super) fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        frame_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let pipeline = create_program(
            device,
            &ProgramDesc {
                label: "flotilla line program",
                source: include_str!("shaders/line.wgsl"),
                buffers: &[LineInstance::layout()],
                frame_layout,
                format,
            },
        );
        Self {
            pipeline,
            instances: InstanceBuffer::new("flotilla line instances"),
        }
    }

    pub(super) fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, entries: &[LineEntry]) {
        self.instances.staging.clear();
        self.instances.staging.extend(entries.iter().filter_map(LineInstance::expand));
        self.instances.upload(device, queue);
    }

    pub(super) fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, count: u32) {
        // Degenerate segments are skipped during expansion.
        let count = count.min(self.instances.staging.len() as u32);
        let Some(instances) = self.instances.slice(count) else { return };
        rpass.set_pipeline(&self.pipeline);
        rpass.set_vertex_buffer(0, instances);
        rpass.draw(0..Self::VERTICES_PER_INSTANCE, 0..count);
    }
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Instance data layout (48 bytes):
///
///  offset  0  corners [[f32; 2]; 4]  loc 0..3  (p0-n, p1-n, p1+n, p0+n)
///  offset 32  color   [f32; 4]       loc 4     (premultiplied)
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct LineInstance {
    corners: [[f32; 2]; 4],
    color: [f32; 4],
}

impl LineInstance {
    const ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x2,
        1 => Float32x2,
        2 => Float32x2,
        3 => Float32x2,
        4 => Float32x4
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }

    /// Quad corners of a butt-capped segment; `None` when zero-length.
    fn expand(entry: &LineEntry) -> Option<Self> {
        let dir = (entry.p1 - entry.p0).normalized()?;
        let n = dir.perp() * (entry.width * 0.5);
        let at = |p: Vec2| [p.x, p.y];
        Some(Self {
            corners: [
                at(entry.p0 - n),
                at(entry.p1 - n),
                at(entry.p1 + n),
                at(entry.p0 + n),
            ],
            color: entry.color.premultiplied(),
        })
    }
}
