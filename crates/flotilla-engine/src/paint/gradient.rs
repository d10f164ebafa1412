use crate::coords::Vec2;

use super::Color;

/// Gradient spread behavior outside [0, 1] range.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SpreadMode {
    /// Clamp to edge stops.
    Pad,
    /// Repeat the gradient pattern.
    Repeat,
    /// Mirror-repeat the gradient pattern.
    Reflect,
}

impl SpreadMode {
    fn apply(self, t: f32) -> f32 {
        match self {
            SpreadMode::Pad => t.clamp(0.0, 1.0),
            SpreadMode::Repeat => t - t.floor(),
            SpreadMode::Reflect => {
                let m = t.rem_euclid(2.0);
                if m > 1.0 { 2.0 - m } else { m }
            }
        }
    }
}

/// A single gradient stop.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorStop {
    pub t: f32,
    pub color: Color,
}

impl ColorStop {
    #[inline]
    pub const fn new(t: f32, color: Color) -> Self {
        Self { t, color }
    }
}

/// Linear gradient in logical pixel space, used for overlay backgrounds.
///
/// Stops are expected sorted by `t`; [`LinearGradient::new`] sorts them.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub start: Vec2,
    pub end: Vec2,
    pub stops: Vec<ColorStop>,
    pub spread: SpreadMode,
}

impl LinearGradient {
    pub fn new(start: Vec2, end: Vec2, mut stops: Vec<ColorStop>, spread: SpreadMode) -> Self {
        stops.sort_by(|a, b| a.t.total_cmp(&b.t));
        Self { start, end, stops, spread }
    }

    /// Vertical two-stop gradient from `top` at `y0` to `bottom` at `y1`.
    pub fn vertical(y0: f32, y1: f32, top: Color, bottom: Color) -> Self {
        Self::new(
            Vec2::new(0.0, y0),
            Vec2::new(0.0, y1),
            vec![ColorStop::new(0.0, top), ColorStop::new(1.0, bottom)],
            SpreadMode::Pad,
        )
    }

    /// Returns true when the gradient definition is structurally usable.
    pub fn is_valid(&self) -> bool {
        self.start.is_finite()
            && self.end.is_finite()
            && self.stops.iter().all(|s| s.t.is_finite() && s.color.is_finite())
            && !self.stops.is_empty()
            && (self.end.x != self.start.x || self.end.y != self.start.y)
    }

    /// Gradient parameter of a point (projection onto the start→end axis).
    #[inline]
    pub fn param_at(&self, p: Vec2) -> f32 {
        let axis = self.end - self.start;
        let len2 = axis.dot(axis);
        if len2 <= f32::EPSILON {
            return 0.0;
        }
        (p - self.start).dot(axis) / len2
    }

    /// Color at gradient parameter `t` after applying the spread mode.
    pub fn sample(&self, t: f32) -> Color {
        let t = self.spread.apply(t);
        let Some(first) = self.stops.first() else {
            return Color::TRANSPARENT;
        };
        if t <= first.t {
            return first.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.t {
                let span = b.t - a.t;
                let local = if span > f32::EPSILON { (t - a.t) / span } else { 1.0 };
                return a.color.lerp(b.color, local);
            }
        }
        self.stops[self.stops.len() - 1].color
    }
}
