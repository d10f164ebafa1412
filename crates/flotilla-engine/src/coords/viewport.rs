/// Smallest device-pixel-ratio honored by the display surface.
pub const MIN_PIXEL_RATIO: f32 = 1.0;

/// Largest device-pixel-ratio honored by the display surface.
///
/// Embedding hosts have been seen to report ratios well above what any panel
/// delivers; anything past this only multiplies fill cost.
pub const MAX_PIXEL_RATIO: f32 = 3.0;

/// Viewport size in logical pixels.
///
/// Renderers treat this as the coordinate basis for converting logical px
/// positions to NDC in shaders.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Device-pixel dimensions for this viewport at `pixel_ratio`.
    ///
    /// The ratio is clamped with [`clamp_pixel_ratio`] and each dimension is
    /// at least one pixel, so the result is always a legal GPU extent.
    pub fn device_size(self, pixel_ratio: f32) -> (u32, u32) {
        self.scaled_size(clamp_pixel_ratio(pixel_ratio))
    }

    /// Device-pixel dimensions at an already resolved logical-to-device
    /// `scale`. Only the one-pixel floor applies.
    pub fn scaled_size(self, scale: f32) -> (u32, u32) {
        let scale = sanitize_scale(scale);
        (to_device_px(self.width, scale), to_device_px(self.height, scale))
    }

    /// Logical-to-device scale for `pixel_ratio` that keeps both device
    /// dimensions within `max_dimension`.
    ///
    /// Equals the clamped ratio unless that would exceed the limit; then the
    /// scale drops, below `MIN_PIXEL_RATIO` if the logical size alone is too
    /// large. The aspect ratio is kept.
    pub fn fit_scale(self, pixel_ratio: f32, max_dimension: u32) -> f32 {
        let limit = max_dimension.max(1) as f32;
        let mut scale = clamp_pixel_ratio(pixel_ratio);
        for logical in [self.width, self.height] {
            if logical.is_finite() && logical * scale > limit {
                scale = limit / logical;
            }
        }
        scale
    }
}

/// Non-finite or non-positive scales map to `MIN_PIXEL_RATIO`.
#[inline]
pub(crate) fn sanitize_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        MIN_PIXEL_RATIO
    }
}

/// Clamps a reported device-pixel-ratio into `[MIN_PIXEL_RATIO, MAX_PIXEL_RATIO]`.
///
/// Non-finite input maps to `MIN_PIXEL_RATIO`.
#[inline]
pub fn clamp_pixel_ratio(ratio: f32) -> f32 {
    if ratio.is_finite() {
        ratio.clamp(MIN_PIXEL_RATIO, MAX_PIXEL_RATIO)
    } else {
        MIN_PIXEL_RATIO
    }
}

fn to_device_px(logical: f32, scale: f32) -> u32 {
    if !logical.is_finite() || logical <= 0.0 {
        return 1;
    }
    ((logical * scale).round() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_is_clamped() {
        assert_eq!(clamp_pixel_ratio(0.5), 1.0);
        assert_eq!(clamp_pixel_ratio(2.0), 2.0);
        assert_eq!(clamp_pixel_ratio(7.5), 3.0);
        assert_eq!(clamp_pixel_ratio(f32::NAN), 1.0);
    }

    #[test]
    fn device_size_scales_and_rounds() {
        assert_eq!(Viewport::new(100.0, 50.5).device_size(2.0), (200, 101));
    }

    #[test]
    fn zero_dimension_clamps_to_one_pixel() {
        assert_eq!(Viewport::new(0.0, 0.0).device_size(2.0), (1, 1));
        assert_eq!(Viewport::new(-4.0, 10.0).device_size(1.0), (1, 10));
    }

    #[test]
    fn fit_scale_keeps_ratio_within_limit() {
        let vp = Viewport::new(800.0, 600.0);
        assert_eq!(vp.fit_scale(2.0, 8192), 2.0);
        assert_eq!(vp.fit_scale(9.0, 8192), 3.0);
    }

    #[test]
    fn fit_scale_shrinks_to_the_limit() {
        let vp = Viewport::new(4000.0, 10.0);
        let scale = vp.fit_scale(3.0, 2048);
        assert!(scale < 1.0);
        let (w, h) = vp.scaled_size(scale);
        assert_eq!(w, 2048);
        assert!(h >= 1 && h <= 2048);
    }

    #[test]
    fn fit_scale_limits_both_axes() {
        for vp in [
            Viewport::new(1000.0, 3000.0),
            Viewport::new(5461.3, 1234.5),
            Viewport::new(16384.0, 16384.0),
        ] {
            let (w, h) = vp.scaled_size(vp.fit_scale(3.0, 4096));
            assert!(w <= 4096 && h <= 4096, "{vp:?} -> {w}x{h}");
        }
    }

    #[test]
    fn scaled_size_does_not_clamp_the_scale() {
        assert_eq!(Viewport::new(100.0, 40.0).scaled_size(0.5), (50, 20));
        assert_eq!(Viewport::new(100.0, 40.0).scaled_size(f32::NAN), (100, 40));
    }

    #[test]
    fn device_size_is_deterministic() {
        let vp = Viewport::new(333.3, 187.7);
        assert_eq!(vp.device_size(1.75), vp.device_size(1.75));
    }
}
