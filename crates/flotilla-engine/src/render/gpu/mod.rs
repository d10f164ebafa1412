//! GPU batch backend.
//!
//! One instanced program per geometry kind, all sharing the frame uniform
//! (viewport + time) at group 0. Programs are built once, up front, inside
//! validation error scopes: either every program builds or construction
//! fails as a whole.

mod circle;
pub(crate) mod common;
mod line;
mod ship;
mod triangle;

use crate::error::Result;
use crate::render::batch::{
    BatchEntry, CircleEntry, FrameBatchSet, GeometryKind, LineEntry, ShipEntry, TriangleEntry,
};
use crate::render::renderer::{Backend, FlushStats, Renderer};
use crate::render::{RenderCtx, RenderTarget};
use crate::surface::DisplaySurface;

use circle::CircleProgram;
use common::{build_checked, FrameBindings, QuadMesh};
use line::LineProgram;
use ship::ShipProgram;
use triangle::TriangleProgram;

/// Accumulates per-kind batches during a frame and draws each non-empty
/// kind with a single instanced call at flush.
pub struct BatchRenderer {
    batches: FrameBatchSet,
    format: wgpu::TextureFormat,

    frame: FrameBindings,
    quad: QuadMesh,

    circles: CircleProgram,
    lines: LineProgram,
    triangles: TriangleProgram,
    ships: ShipProgram,
}

impl BatchRenderer {
    /// Builds every program for render targets of `format`.
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Result<Self> {
        let frame = FrameBindings::new(device);
        let quad = QuadMesh::new(device);

        let layout = &frame.layout;
        let circles = build_checked(device, "circle", || CircleProgram::new(device, format, layout))?;
        let lines = build_checked(device, "line", || LineProgram::new(device, format, layout))?;
        let triangles =
            build_checked(device, "triangle", || TriangleProgram::new(device, format, layout))?;
        let ships = build_checked(device, "ship", || ShipProgram::new(device, format, layout))?;

        log::debug!("batch renderer programs built for {format:?}");

        Ok(Self {
            batches: FrameBatchSet::new(),
            format,
            frame,
            quad,
            circles,
            lines,
            triangles,
            ships,
        })
    }

    #[inline]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Batches recorded since the last flush.
    #[inline]
    pub fn batches(&self) -> &FrameBatchSet {
        &self.batches
    }

    /// Appends an entry; O(1), no GPU work.
    #[inline]
    pub fn record(&mut self, entry: BatchEntry) -> bool {
        self.batches.push(entry)
    }

    /// Uploads every non-empty batch and draws it onto `target` in one
    /// render pass (load, no clear), then empties the batches.
    ///
    /// Pipelines are bound to the format they were built for; a target of
    /// any other format draws nothing and the batches are discarded.
    pub fn draw(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) -> FlushStats {
        let plan = self.batches.plan();
        let mut stats = FlushStats::default();
        if plan.is_empty() {
            return stats;
        }
        if ctx.target_format != self.format {
            log::warn!(
                "batch programs target {:?}, not {:?}; dropping {} entries",
                self.format,
                ctx.target_format,
                self.batches.total()
            );
            self.batches.clear();
            return stats;
        }

        self.frame.write(ctx.queue, ctx.viewport, ctx.time);

        for call in &plan {
            match call.kind {
                GeometryKind::Circle => {
                    self.circles.upload(ctx.device, ctx.queue, self.batches.circles())
                }
                GeometryKind::Line => self.lines.upload(ctx.device, ctx.queue, self.batches.lines()),
                GeometryKind::Triangle => {
                    self.triangles.upload(ctx.device, ctx.queue, self.batches.triangles())
                }
                GeometryKind::Ship => self.ships.upload(ctx.device, ctx.queue, self.batches.ships()),
            }
        }

        {
            let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("flotilla sprite pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_bind_group(0, &self.frame.bind_group, &[]);

            for call in &plan {
                match call.kind {
                    GeometryKind::Circle => self.circles.draw(&mut rpass, &self.quad, call.instances),
                    GeometryKind::Line => self.lines.draw(&mut rpass, call.instances),
                    GeometryKind::Triangle => self.triangles.draw(&mut rpass, call.instances),
                    GeometryKind::Ship => self.ships.draw(&mut rpass, &self.quad, call.instances),
                }
                stats.record(*call);
            }
        }

        self.batches.clear();
        stats
    }
}

impl Renderer for BatchRenderer {
    fn backend(&self) -> Backend {
        Backend::Gpu
    }

    fn fill_circle(&mut self, _surface: &mut DisplaySurface, entry: CircleEntry) {
        self.batches.push(BatchEntry::Circle(entry));
    }

    fn line(&mut self, _surface: &mut DisplaySurface, entry: LineEntry) {
        self.batches.push(BatchEntry::Line(entry));
    }

    fn fill_triangle(&mut self, _surface: &mut DisplaySurface, entry: TriangleEntry) {
        self.batches.push(BatchEntry::Triangle(entry));
    }

    fn ship(&mut self, entry: ShipEntry) {
        self.batches.push(BatchEntry::Ship(entry));
    }

    fn pending(&self) -> usize {
        self.batches.total()
    }

    fn flush(&mut self, surface: &mut DisplaySurface) -> Result<FlushStats> {
        if self.batches.is_empty() {
            return Ok(FlushStats::default());
        }
        let result = surface.render_sprites(|ctx, target| self.draw(ctx, target));
        // Batches never outlive the frame, drawn or not.
        self.batches.clear();
        result
    }
}
