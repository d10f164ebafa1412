//! Per-frame instance batches.
//!
//! Appends are O(1) and touch no GPU state; the batch set is drained into
//! instance buffers at flush. Draw order across geometry kinds is fixed
//! ([`GeometryKind::DRAW_ORDER`]); within a kind, append order is kept.

use crate::coords::Vec2;
use crate::paint::Color;
use crate::theme::ShipTheme;

/// Geometry kinds, one instanced draw call each.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum GeometryKind {
    Circle,
    Line,
    Triangle,
    Ship,
}

impl GeometryKind {
    /// Fixed cross-kind draw order; later kinds render on top.
    pub const DRAW_ORDER: [GeometryKind; 4] = [
        GeometryKind::Circle,
        GeometryKind::Line,
        GeometryKind::Triangle,
        GeometryKind::Ship,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GeometryKind::Circle => "circle",
            GeometryKind::Line => "line",
            GeometryKind::Triangle => "triangle",
            GeometryKind::Ship => "ship",
        }
    }
}

/// Filled disk. Color is resolved (global alpha applied) at append time.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CircleEntry {
    pub center: Vec2,
    pub radius: f32,
    pub color: Color,
}

/// Thick segment with butt caps.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LineEntry {
    pub p0: Vec2,
    pub p1: Vec2,
    pub width: f32,
    pub color: Color,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TriangleEntry {
    pub points: [Vec2; 3],
    pub color: Color,
}

/// Procedurally shaded ship sprite. `angle` is the heading in radians
/// (0 = +X), `size` the nose-to-center distance in logical px.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShipEntry {
    pub position: Vec2,
    pub angle: f32,
    pub size: f32,
    pub color: Color,
    pub is_primary: bool,
    pub theme: ShipTheme,
}

impl CircleEntry {
    fn is_drawable(&self) -> bool {
        self.center.is_finite() && self.radius.is_finite() && self.radius > 0.0 && self.color.a > 0.0
    }
}

impl LineEntry {
    fn is_drawable(&self) -> bool {
        self.p0.is_finite()
            && self.p1.is_finite()
            && self.p0 != self.p1
            && self.width.is_finite()
            && self.width > 0.0
            && self.color.a > 0.0
    }
}

impl TriangleEntry {
    fn is_drawable(&self) -> bool {
        self.points.iter().all(|p| p.is_finite()) && self.color.a > 0.0
    }
}

impl ShipEntry {
    fn is_drawable(&self) -> bool {
        self.position.is_finite()
            && self.angle.is_finite()
            && self.size.is_finite()
            && self.size > 0.0
    }
}

/// One recorded primitive.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum BatchEntry {
    Circle(CircleEntry),
    Line(LineEntry),
    Triangle(TriangleEntry),
    Ship(ShipEntry),
}

impl BatchEntry {
    #[inline]
    pub fn kind(&self) -> GeometryKind {
        match self {
            BatchEntry::Circle(_) => GeometryKind::Circle,
            BatchEntry::Line(_) => GeometryKind::Line,
            BatchEntry::Triangle(_) => GeometryKind::Triangle,
            BatchEntry::Ship(_) => GeometryKind::Ship,
        }
    }
}

/// One instanced draw: `instances` copies of `kind`'s base shape.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DrawCall {
    pub kind: GeometryKind,
    pub instances: u32,
}

/// Ordered draw calls for a frame; at most one per kind, empty kinds omitted.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DrawPlan {
    calls: [DrawCall; 4],
    len: usize,
}

impl DrawPlan {
    #[inline]
    pub fn as_slice(&self) -> &[DrawCall] {
        &self.calls[..self.len]
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, DrawCall> {
        self.as_slice().iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<'a> IntoIterator for &'a DrawPlan {
    type Item = &'a DrawCall;
    type IntoIter = std::slice::Iter<'a, DrawCall>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The four per-kind lists of a frame.
#[derive(Debug, Default, Clone)]
pub struct FrameBatchSet {
    circles: Vec<CircleEntry>,
    lines: Vec<LineEntry>,
    triangles: Vec<TriangleEntry>,
    ships: Vec<ShipEntry>,
}

impl FrameBatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry to its kind's list.
    ///
    /// Entries that cannot produce pixels (non-finite geometry, zero radius
    /// or width, fully transparent fill) are dropped; returns whether the
    /// entry was kept.
    pub fn push(&mut self, entry: BatchEntry) -> bool {
        match entry {
            BatchEntry::Circle(e) => push_if(&mut self.circles, e, e.is_drawable()),
            BatchEntry::Line(e) => push_if(&mut self.lines, e, e.is_drawable()),
            BatchEntry::Triangle(e) => push_if(&mut self.triangles, e, e.is_drawable()),
            BatchEntry::Ship(e) => push_if(&mut self.ships, e, e.is_drawable()),
        }
    }

    #[inline]
    pub fn circles(&self) -> &[CircleEntry] {
        &self.circles
    }

    #[inline]
    pub fn lines(&self) -> &[LineEntry] {
        &self.lines
    }

    #[inline]
    pub fn triangles(&self) -> &[TriangleEntry] {
        &self.triangles
    }

    #[inline]
    pub fn ships(&self) -> &[ShipEntry] {
        &self.ships
    }

    pub fn len(&self, kind: GeometryKind) -> usize {
        match kind {
            GeometryKind::Circle => self.circles.len(),
            GeometryKind::Line => self.lines.len(),
            GeometryKind::Triangle => self.triangles.len(),
            GeometryKind::Ship => self.ships.len(),
        }
    }

    pub fn total(&self) -> usize {
        self.circles.len() + self.lines.len() + self.triangles.len() + self.ships.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Draw calls for the current contents, in [`GeometryKind::DRAW_ORDER`].
    pub fn plan(&self) -> DrawPlan {
        let mut plan = DrawPlan {
            calls: [DrawCall { kind: GeometryKind::Circle, instances: 0 }; 4],
            len: 0,
        };
        for kind in GeometryKind::DRAW_ORDER {
            let instances = self.len(kind);
            if instances > 0 {
                plan.calls[plan.len] = DrawCall { kind, instances: instances as u32 };
                plan.len += 1;
            }
        }
        plan
    }

    /// All entries in draw order.
    pub fn entries(&self) -> impl Iterator<Item = BatchEntry> + '_ {
        self.circles
            .iter()
            .copied()
            .map(BatchEntry::Circle)
            .chain(self.lines.iter().copied().map(BatchEntry::Line))
            .chain(self.triangles.iter().copied().map(BatchEntry::Triangle))
            .chain(self.ships.iter().copied().map(BatchEntry::Ship))
    }

    /// Empties every list, keeping allocations.
    pub fn clear(&mut self) {
        self.circles.clear();
        self.lines.clear();
        self.triangles.clear();
        self.ships.clear();
    }
}

#[inline]
fn push_if<T>(list: &mut Vec<T>, value: T, keep: bool) -> bool {
    if keep {
        list.push(value);
    }
    keep
}
