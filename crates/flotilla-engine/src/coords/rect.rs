use super::Vec2;

/// Axis-aligned rectangle in logical pixels (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

/// Inclusive-exclusive pixel span `[x0, x1) × [y0, y1)` inside a raster.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PixelBounds {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelBounds {
    #[inline]
    pub fn is_empty(self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Square bounding box of a circle.
    #[inline]
    pub fn around(center: Vec2, radius: f32) -> Self {
        let r = radius.abs();
        Rect::new(center.x - r, center.y - r, r * 2.0, r * 2.0)
    }

    /// Smallest rectangle containing every point.
    ///
    /// Returns an empty rect at the origin when `points` is empty.
    pub fn bounding(points: &[Vec2]) -> Self {
        let Some(first) = points.first() else {
            return Rect::default();
        };
        let (mut lo, mut hi) = (*first, *first);
        for p in &points[1..] {
            lo = Vec2::new(lo.x.min(p.x), lo.y.min(p.y));
            hi = Vec2::new(hi.x.max(p.x), hi.y.max(p.y));
        }
        Rect::new(lo.x, lo.y, hi.x - lo.x, hi.y - lo.y)
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        Vec2::new(self.origin.x + self.size.x, self.origin.y + self.size.y)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Grows the rectangle by `amount` on every side.
    #[inline]
    pub fn inflate(self, amount: f32) -> Self {
        Rect::new(
            self.origin.x - amount,
            self.origin.y - amount,
            self.size.x + amount * 2.0,
            self.size.y + amount * 2.0,
        )
    }

    /// Normalizes the rectangle so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        let mut x = self.origin.x;
        let mut y = self.origin.y;
        let mut w = self.size.x;
        let mut h = self.size.y;

        if w < 0.0 {
            x += w;
            w = -w;
        }
        if h < 0.0 {
            y += h;
            h = -h;
        }

        Rect::new(x, y, w, h)
    }

    /// Maps the rect to device pixels (`scale` = device pixels per logical
    /// pixel) and clips it to a `width × height` raster.
    ///
    /// Partially covered edge pixels are included.
    pub fn to_pixel_bounds(self, scale: f32, width: u32, height: u32) -> PixelBounds {
        let r = self.normalized();
        let clamp_x = |v: f32| (v.max(0.0) as u32).min(width);
        let clamp_y = |v: f32| (v.max(0.0) as u32).min(height);

        if !r.origin.is_finite() || !r.size.is_finite() {
            return PixelBounds { x0: 0, y0: 0, x1: 0, y1: 0 };
        }

        PixelBounds {
            x0: clamp_x((r.origin.x * scale).floor()),
            y0: clamp_y((r.origin.y * scale).floor()),
            x1: clamp_x(((r.origin.x + r.size.x) * scale).ceil()),
            y1: clamp_y(((r.origin.y + r.size.y) * scale).ceil()),
        }
    }
}
