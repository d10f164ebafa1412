use image::Rgba;

use crate::coords::Vec2;
use crate::paint::Color;

/// Length of `[center - 0.5, center + 0.5] ∩ [lo, hi]`: the exact 1D coverage
/// of a unit pixel by a span.
#[inline]
pub(super) fn span_coverage(center: f32, lo: f32, hi: f32) -> f32 {
    ((center + 0.5).min(hi) - (center - 0.5).max(lo)).max(0.0)
}

/// Coverage of a pixel centered at `p` by a disk.
#[inline]
pub(super) fn disk_coverage(p: Vec2, center: Vec2, radius: f32) -> f32 {
    (radius - (p - center).length() + 0.5).clamp(0.0, 1.0)
}

/// Coverage of a pixel centered at `p` by an annulus of `half_width` around `radius`.
#[inline]
pub(super) fn ring_coverage(p: Vec2, center: Vec2, radius: f32, half_width: f32) -> f32 {
    let d = (p - center).length();
    span_coverage(d, radius - half_width, radius + half_width).min(1.0)
}

/// Thick segment with butt caps, in device space.
#[derive(Debug, Copy, Clone)]
pub(super) struct Segment {
    origin: Vec2,
    dir: Vec2,
    length: f32,
    half_width: f32,
}

impl Segment {
    /// Returns `None` for zero-length segments or non-positive widths.
    pub(super) fn new(p0: Vec2, p1: Vec2, width: f32) -> Option<Self> {
        if width.is_nan() || width <= 0.0 {
            return None;
        }
        let delta = p1 - p0;
        let dir = delta.normalized()?;
        Some(Self {
            origin: p0,
            dir,
            length: delta.length(),
            half_width: width * 0.5,
        })
    }

    #[inline]
    pub(super) fn coverage(&self, p: Vec2) -> f32 {
        let rel = p - self.origin;
        let along = rel.dot(self.dir);
        let across = rel.dot(self.dir.perp());
        span_coverage(along, 0.0, self.length)
            * span_coverage(across, -self.half_width, self.half_width)
    }
}

/// Filled triangle as three inward edge functions, in device space.
#[derive(Debug, Copy, Clone)]
pub(super) struct Triangle {
    edges: [(Vec2, Vec2); 3],
}

impl Triangle {
    /// Returns `None` for degenerate (zero-area) triangles.
    pub(super) fn new(a: Vec2, b: Vec2, c: Vec2) -> Option<Self> {
        let area = (b - a).cross(c - a);
        if !area.is_finite() || area.abs() <= f32::EPSILON {
            return None;
        }
        // Inward normals flip with winding.
        let sign = area.signum();
        let edge = |from: Vec2, to: Vec2| {
            let n = (to - from).perp() * sign;
            (from, n.normalized().unwrap_or_default())
        };
        Some(Self {
            edges: [edge(a, b), edge(b, c), edge(c, a)],
        })
    }

    #[inline]
    pub(super) fn coverage(&self, p: Vec2) -> f32 {
        let inside = self
            .edges
            .iter()
            .map(|(origin, normal)| (p - *origin).dot(*normal))
            .fold(f32::INFINITY, f32::min);
        (inside + 0.5).clamp(0.0, 1.0)
    }
}

/// Straight-alpha source-over of `src` scaled by `coverage` onto `dst`.
#[inline]
pub(super) fn blend_over(dst: &mut Rgba<u8>, src: Color, coverage: f32) {
    let sa = src.a * coverage;
    if sa <= 0.0 {
        return;
    }
    if sa >= 1.0 {
        *dst = Rgba(src.to_rgba8());
        return;
    }

    let [dr, dg, db, da] = dst.0;
    let d = Color::from_rgba8(dr, dg, db, da);
    let da = d.a * (1.0 - sa);
    let out_a = sa + da;
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }

    let mix = |s: f32, d: f32| (s * sa + d * da) / out_a;
    *dst = Rgba(Color::rgba(mix(src.r, d.r), mix(src.g, d.g), mix(src.b, d.b), out_a).to_rgba8());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_coverage_is_exact_overlap() {
        assert_eq!(span_coverage(5.5, 0.0, 10.0), 1.0);
        assert_eq!(span_coverage(0.5, 0.25, 10.0), 0.75);
        assert_eq!(span_coverage(20.0, 0.0, 10.0), 0.0);
    }

    #[test]
    fn segment_has_butt_caps() {
        let s = Segment::new(Vec2::new(0.0, 5.0), Vec2::new(10.0, 5.0), 2.0).unwrap();
        assert_eq!(s.coverage(Vec2::new(5.5, 5.5)), 1.0);
        assert_eq!(s.coverage(Vec2::new(11.0, 5.0)), 0.0);
        assert_eq!(s.coverage(Vec2::new(5.5, 8.5)), 0.0);
    }

    #[test]
    fn degenerate_shapes_are_rejected() {
        assert!(Segment::new(Vec2::new(1.0, 1.0), Vec2::new(1.0, 1.0), 2.0).is_none());
        assert!(Segment::new(Vec2::zero(), Vec2::new(1.0, 0.0), 0.0).is_none());
        assert!(Triangle::new(Vec2::zero(), Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)).is_none());
    }

    #[test]
    fn triangle_coverage_ignores_winding() {
        let (a, b, c) = (Vec2::new(0.0, 0.0), Vec2::new(20.0, 0.0), Vec2::new(0.0, 20.0));
        let p = Vec2::new(5.0, 5.0);
        assert_eq!(Triangle::new(a, b, c).unwrap().coverage(p), 1.0);
        assert_eq!(Triangle::new(a, c, b).unwrap().coverage(p), 1.0);
        assert_eq!(Triangle::new(a, b, c).unwrap().coverage(Vec2::new(30.0, 30.0)), 0.0);
    }

    #[test]
    fn blend_over_opaque_replaces() {
        let mut px = Rgba([10, 20, 30, 255]);
        blend_over(&mut px, Color::rgb(1.0, 0.0, 0.0), 1.0);
        assert_eq!(px.0, [255, 0, 0, 255]);
    }

    #[test]
    fn blend_over_half_alpha_onto_transparent_keeps_color() {
        let mut px = Rgba([0, 0, 0, 0]);
        blend_over(&mut px, Color::rgba(0.0, 0.0, 1.0, 0.5), 1.0);
        assert_eq!(px.0, [0, 0, 255, 128]);
    }
}
