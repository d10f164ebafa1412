use super::Color;

/// Mutable paint state of the draw facade.
///
/// Colors are resolved (global alpha folded in) when a primitive is recorded,
/// never at flush time: changing the state after a call does not affect
/// primitives already recorded.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PaintState {
    fill: Color,
    stroke: Color,
    line_width: f32,
    alpha: f32,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            fill: Color::BLACK,
            stroke: Color::BLACK,
            line_width: 1.0,
            alpha: 1.0,
        }
    }
}

impl PaintState {
    #[inline]
    pub fn set_fill(&mut self, color: Color) {
        self.fill = color;
    }

    #[inline]
    pub fn set_stroke(&mut self, color: Color) {
        self.stroke = color;
    }

    /// Sets the global alpha, clamped to `[0, 1]` (non-finite → 1).
    #[inline]
    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 1.0 };
    }

    /// Sets the stroke width in logical pixels; negative or non-finite widths are ignored.
    #[inline]
    pub fn set_line_width(&mut self, width: f32) {
        if width.is_finite() && width >= 0.0 {
            self.line_width = width;
        }
    }

    #[inline]
    pub fn fill(&self) -> Color {
        self.fill
    }

    #[inline]
    pub fn stroke(&self) -> Color {
        self.stroke
    }

    #[inline]
    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    #[inline]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Fill color with global alpha applied.
    #[inline]
    pub fn resolved_fill(&self) -> Color {
        self.fill.scale_alpha(self.alpha).clamped()
    }

    /// Stroke color with global alpha applied.
    #[inline]
    pub fn resolved_stroke(&self) -> Color {
        self.stroke.scale_alpha(self.alpha).clamped()
    }

    /// Resolves an explicit color against the global alpha.
    #[inline]
    pub fn resolve(&self, color: Color) -> Color {
        color.scale_alpha(self.alpha).clamped()
    }
}
