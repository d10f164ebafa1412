use bytemuck::{Pod, Zeroable};

use crate::render::batch::CircleEntry;

use super::common::{create_program, InstanceBuffer, ProgramDesc, QuadMesh, QuadVertex};

/// Instanced filled disks: a signed-distance disk inside a quad slightly
/// larger than `[-r, r]²`, anti-aliased over about one device pixel.
pub(super) struct CircleProgram {
    pipeline: wgpu::RenderPipeline,
    instances: InstanceBuffer<CircleInstance>,
}

impl CircleProgram {
    pub(super) fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        frame_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let pipeline = create_program(
            device,
            &ProgramDesc {
                label: "flotilla circle program",
                source: include_str!("shaders/circle.wgsl"),
                buffers: &[QuadVertex::layout(), CircleInstance::layout()],
                frame_layout,
                format,
            },
        );
        Self {
            pipeline,
            instances: InstanceBuffer::new("flotilla circle instances"),
        }
    }

    pub(super) fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, entries: &[CircleEntry]) {
        self.instances.staging.clear();
        self.instances.staging.extend(entries.iter().map(|e| CircleInstance {
            center: [e.center.x, e.center.y],
            radius: e.radius,
            color: e.color.premultiplied(),
        }));
        self.instances.upload(device, queue);
    }

    pub(super) fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, quad: &QuadMesh, count: u32) {
        let Some(instances) = self.instances.slice(count) else { return };
        rpass.set_pipeline(&self.pipeline);
        rpass.set_vertex_buffer(0, quad.vbo.slice(..));
        rpass.set_vertex_buffer(1, instances);
        rpass.set_index_buffer(quad.ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..QuadMesh::INDEX_COUNT, 0, 0..count);
    }
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Instance data layout (28 bytes):
///
///  offset  0  center  [f32; 2]   loc 1
///  offset  8  radius  f32        loc 2
///  offset 12  color   [f32; 4]   loc 3  (premultiplied)
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct CircleInstance {
    center: [f32; 2],
    radius: f32,
    color: [f32; 4],
}

impl CircleInstance {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        1 => Float32x2, // center
        2 => Float32,   // radius
        3 => Float32x4  // color
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CircleInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}
