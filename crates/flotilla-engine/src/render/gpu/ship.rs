use bytemuck::{Pod, Zeroable};

use crate::render::batch::ShipEntry;

use super::common::{create_program, InstanceBuffer, ProgramDesc, QuadMesh, QuadVertex};

/// Instanced procedural ships.
///
/// Only eight scalars per instance reach the GPU; the fragment stage rebuilds
/// the hull triangle in ship-local space and layers body, outline, glow,
/// exhaust, core highlight and theme modulation on top of it.
pub(super) struct ShipProgram {
    pipeline: wgpu::RenderPipeline,
    instances: InstanceBuffer<ShipInstance>,
}

impl ShipProgram {
    pub(super) fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        frame_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let pipeline = create_program(
            device,
            &ProgramDesc {
                label: "flotilla ship program",
                source: include_str!("shaders/ship.wgsl"),
                buffers: &[QuadVertex::layout(), ShipInstance::layout()],
                frame_layout,
                format,
            },
        );
        Self {
            pipeline,
            instances: InstanceBuffer::new("flotilla ship instances"),
        }
    }

    pub(super) fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, entries: &[ShipEntry]) {
        self.instances.staging.clear();
        self.instances.staging.extend(entries.iter().map(ShipInstance::from_entry));
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

/// Instance data layout (40 bytes):
///
///  offset  0  position  [f32; 2]   loc 1
///  offset  8  angle     f32        loc 2
///  offset 12  size      f32        loc 3
///  offset 16  color     [f32; 4]   loc 4  (straight alpha; the shader premultiplies)
///  offset 32  flags     [u32; 2]   loc 5  (.x = is_primary, .y = theme id)
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ShipInstance {
    position: [f32; 2],
    angle: f32,
    size: f32,
    color: [f32; 4],
    flags: [u32; 2],
}

impl ShipInstance {
    const ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        1 => Float32x2, // position
        2 => Float32,   // angle
        3 => Float32,   // size
        4 => Float32x4, // color
        5 => Uint32x2   // flags
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ShipInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }

    fn from_entry(e: &ShipEntry) -> Self {
        Self {
            position: [e.position.x, e.position.y],
            angle: e.angle,
            size: e.size,
            color: e.color.to_array(),
            flags: [u32::from(e.is_primary), e.theme.id()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;
    use crate::paint::Color;
    use crate::theme::ShipTheme;

    #[test]
    fn flags_carry_primary_and_theme() {
        let inst = ShipInstance::from_entry(&ShipEntry {
            position: Vec2::new(4.0, 5.0),
            angle: 1.0,
            size: 12.0,
            color: Color::WHITE,
            is_primary: true,
            theme: ShipTheme::Void,
        });
        assert_eq!(inst.flags, [1, 3]);
        assert_eq!(std::mem::size_of::<ShipInstance>(), 40);
    }
}
