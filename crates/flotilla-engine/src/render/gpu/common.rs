//! Shared GPU types and utilities used by all instanced programs.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::coords::Viewport;
use crate::error::{RenderError, Result};

/// Minimum instance capacity of a per-kind buffer.
pub(super) const MIN_INSTANCE_CAPACITY: usize = 64;

// ── blend ─────────────────────────────────────────────────────────────────

pub(crate) fn premul_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

// ── frame uniform ─────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct FrameUniform {
    pub viewport: [f32; 2],
    pub time: f32,
    pub _pad: f32, // 16-byte alignment
}

/// Per-frame uniform (viewport + time) shared by every program at group 0.
pub(super) struct FrameBindings {
    ubo: wgpu::Buffer,
    pub layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

impl FrameBindings {
    pub(super) fn new(device: &wgpu::Device) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("flotilla frame bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<FrameUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("flotilla frame ubo"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("flotilla frame bind group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });

        Self { ubo, layout, bind_group }
    }

    pub(super) fn write(&self, queue: &wgpu::Queue, viewport: Viewport, time: f32) {
        queue.write_buffer(
            &self.ubo,
            0,
            bytemuck::bytes_of(&FrameUniform {
                viewport: [viewport.width.max(1.0), viewport.height.max(1.0)],
                time,
                _pad: 0.0,
            }),
        );
    }
}

// ── quad mesh ─────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct QuadVertex {
    pub corner: [f32; 2], // -1..1
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { corner: [-1.0, -1.0] },
    QuadVertex { corner: [1.0, -1.0] },
    QuadVertex { corner: [1.0, 1.0] },
    QuadVertex { corner: [-1.0, 1.0] },
];

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Centered unit quad shared by the circle and ship programs.
pub(super) struct QuadMesh {
    pub vbo: wgpu::Buffer,
    pub ibo: wgpu::Buffer,
}

impl QuadMesh {
    pub(super) const INDEX_COUNT: u32 = QUAD_INDICES.len() as u32;

    pub(super) fn new(device: &wgpu::Device) -> Self {
        Self {
            vbo: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("flotilla quad vbo"),
                contents: bytemuck::cast_slice(&QUAD_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            ibo: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("flotilla quad ibo"),
                contents: bytemuck::cast_slice(&QUAD_INDICES),
                usage: wgpu::BufferUsages::INDEX,
            }),
        }
    }
}

// ── instance buffers ──────────────────────────────────────────────────────

/// Capacity for `required` instances: next power of two, at least
/// [`MIN_INSTANCE_CAPACITY`], never below `current`.
pub(super) fn grown_capacity(current: usize, required: usize) -> usize {
    if required <= current {
        return current;
    }
    required.next_power_of_two().max(MIN_INSTANCE_CAPACITY)
}

/// Grow-only vertex buffer holding one frame's instances of one kind, plus
/// the CPU staging vector they are serialized into.
pub(super) struct InstanceBuffer<T> {
    label: &'static str,
    buffer: Option<wgpu::Buffer>,
    capacity: usize,
    pub staging: Vec<T>,
}

impl<T: Pod> InstanceBuffer<T> {
    pub(super) fn new(label: &'static str) -> Self {
        Self {
            label,
            buffer: None,
            capacity: 0,
            staging: Vec::new(),
        }
    }

    /// Uploads `staging` into the GPU buffer, reallocating it when too small.
    pub(super) fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        if self.staging.is_empty() {
            return;
        }
        let required = self.staging.len();
        if self.buffer.is_none() || required > self.capacity {
            let new_cap = grown_capacity(self.capacity, required);
            self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(self.label),
                size: (new_cap * std::mem::size_of::<T>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.capacity = new_cap;
            log::debug!("{}: grew to {new_cap} instances", self.label);
        }
        if let Some(buffer) = self.buffer.as_ref() {
            queue.write_buffer(buffer, 0, bytemuck::cast_slice(&self.staging));
        }
    }

    /// Slice covering the first `count` uploaded instances.
    pub(super) fn slice(&self, count: u32) -> Option<wgpu::BufferSlice<'_>> {
        let bytes = count as u64 * std::mem::size_of::<T>() as u64;
        self.buffer.as_ref().map(|b| b.slice(..bytes))
    }

    #[cfg(test)]
    pub(super) fn capacity(&self) -> usize {
        self.capacity
    }
}

// ── pipeline construction ─────────────────────────────────────────────────

/// Parameters shared by every instanced program's pipeline.
pub(super) struct ProgramDesc<'a> {
    pub label: &'static str,
    pub source: &'static str,
    pub buffers: &'a [wgpu::VertexBufferLayout<'a>],
    pub frame_layout: &'a wgpu::BindGroupLayout,
    pub format: wgpu::TextureFormat,
}

pub(super) fn create_program(device: &wgpu::Device, desc: &ProgramDesc<'_>) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(desc.label),
        source: wgpu::ShaderSource::Wgsl(desc.source.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(desc.label),
        bind_group_layouts: &[desc.frame_layout],
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: desc.buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: desc.format,
                blend: Some(premul_alpha_blend()),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

/// Runs `build` inside a validation error scope and returns its value
/// together with the first validation error raised, if any.
///
/// wgpu reports invalid descriptors through the scope instead of the
/// uncaptured-error handler, which panics by default.
pub(crate) fn validated<T>(device: &wgpu::Device, build: impl FnOnce() -> T) -> (T, Option<wgpu::Error>) {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = build();
    (value, pollster::block_on(scope.pop()))
}

/// Runs `build` inside a validation error scope.
///
/// Any shader or pipeline validation error raised while building surfaces as
/// [`RenderError::ShaderProgram`] naming `program`.
pub(crate) fn build_checked<T>(
    device: &wgpu::Device,
    program: &'static str,
    build: impl FnOnce() -> T,
) -> Result<T> {
    match validated(device, build) {
        (value, None) => Ok(value),
        (_, Some(err)) => Err(RenderError::ShaderProgram {
            program,
            message: err.to_string(),
        }),
    }
}
