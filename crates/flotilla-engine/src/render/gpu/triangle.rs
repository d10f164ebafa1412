use bytemuck::{Pod, Zeroable};

use crate::render::batch::TriangleEntry;

use super::common::{create_program, InstanceBuffer, ProgramDesc};

/// Instanced flat-colored triangles; one instance per triangle, corners
/// selected by `vertex_index`.
pub(super) struct TriangleProgram {
    pipeline: wgpu::RenderPipeline,
    instances: InstanceBuffer<TriangleInstance>,
}

impl TriangleProgram {
    pub(super) fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        frame_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let pipeline = create_program(
            device,
            &ProgramDesc {
                label: "flotilla triangle program",
                source: include_str!("shaders/triangle.wgsl"),
                buffers: &[TriangleInstance::layout()],
                frame_layout,
                format,
            },
        );
        Self {
            pipeline,
            instances: InstanceBuffer::new("flotilla triangle instances"),
        }
    }

    pub(super) fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, entries: &[TriangleEntry]) {
        self.instances.staging.clear();
        self.instances.staging.extend(entries.iter().map(|e| {
            let [a, b, c] = e.points;
            TriangleInstance {
                p0: [a.x, a.y],
                p1: [b.x, b.y],
                p2: [c.x, c.y],
                color: e.color.premultiplied(),
            }
        }));
        self.instances.upload(device, queue);
    }

    pub(super) fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, count: u32) {
        let Some(instances) = self.instances.slice(count) else { return };
        rpass.set_pipeline(&self.pipeline);
        rpass.set_vertex_buffer(0, instances);
        rpass.draw(0..3, 0..count);
    }
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Instance data layout (40 bytes):
///
///  offset  0  p0     [f32; 2]   loc 0
///  offset  8  p1     [f32; 2]   loc 1
///  offset 16  p2     [f32; 2]   loc 2
///  offset 24  color  [f32; 4]   loc 3  (premultiplied)
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct TriangleInstance {
    p0: [f32; 2],
    p1: [f32; 2],
    p2: [f32; 2],
    color: [f32; 4],
}

impl TriangleInstance {
    const ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x2,
        1 => Float32x2,
        2 => Float32x2,
        3 => Float32x4
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TriangleInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}
