use image::{imageops, Rgba, RgbaImage};

use super::raster::{self, Segment, Triangle};
use crate::coords::{clamp_pixel_ratio, sanitize_scale, Rect, Vec2, Viewport};
use crate::paint::{Color, Paint};

/// CPU raster for immediate 2D drawing.
///
/// The backing image may be larger than the drawable extent (scratch reuse);
/// every operation clips to `width() × height()`.
pub struct Canvas {
    image: RgbaImage,
    width: u32,
    height: u32,
    viewport: Viewport,
    scale: f32,
}

impl Canvas {
    /// Creates a transparent canvas for `viewport` at `pixel_ratio`.
    pub fn new(viewport: Viewport, pixel_ratio: f32) -> Self {
        Self::with_scale(viewport, clamp_pixel_ratio(pixel_ratio))
    }

    /// Creates a transparent canvas at a resolved logical-to-device `scale`.
    ///
    /// Unlike [`Canvas::new`] the scale is not clamped to the pixel-ratio
    /// range; displays limited by the GPU texture size go below it.
    pub fn with_scale(viewport: Viewport, scale: f32) -> Self {
        let scale = sanitize_scale(scale);
        let (width, height) = viewport.scaled_size(scale);
        Self {
            image: RgbaImage::new(width, height),
            width,
            height,
            viewport,
            scale,
        }
    }

    /// Resizes to `viewport` at `pixel_ratio`.
    ///
    /// Returns `true` when the device size changed; the contents are then
    /// cleared to transparent. Same-size calls keep the pixels.
    pub fn resize(&mut self, viewport: Viewport, pixel_ratio: f32) -> bool {
        self.rescale(viewport, clamp_pixel_ratio(pixel_ratio))
    }

    /// [`Canvas::resize`] at a resolved scale (see [`Canvas::with_scale`]).
    pub fn rescale(&mut self, viewport: Viewport, scale: f32) -> bool {
        let scale = sanitize_scale(scale);
        let (width, height) = viewport.scaled_size(scale);
        self.viewport = viewport;
        self.scale = scale;

        if (width, height) == (self.width, self.height) {
            return false;
        }
        self.image = RgbaImage::new(width, height);
        self.width = width;
        self.height = height;
        true
    }

    /// Reuses the backing image for a new extent, growing it if needed, and
    /// clears the extent to transparent. Returns `true` when it grew.
    pub(super) fn reset_extent(&mut self, viewport: Viewport, scale: f32) -> bool {
        let scale = sanitize_scale(scale);
        let (width, height) = viewport.scaled_size(scale);

        let grew = width > self.image.width() || height > self.image.height();
        if grew {
            self.image = RgbaImage::new(width.max(self.image.width()), height.max(self.image.height()));
        }

        self.viewport = viewport;
        self.scale = scale;
        self.width = width;
        self.height = height;

        if !grew {
            for y in 0..height {
                for x in 0..width {
                    self.image.put_pixel(x, y, Rgba([0, 0, 0, 0]));
                }
            }
        }
        grew
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Logical size.
    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Device pixels per logical pixel.
    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Backing image. Larger than the extent only for scratch canvases.
    #[inline]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Copy of the drawable extent.
    pub fn to_image(&self) -> RgbaImage {
        imageops::crop_imm(&self.image, 0, 0, self.width, self.height).to_image()
    }

    /// Straight-alpha RGBA at a device pixel, `None` outside the extent.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        (x < self.width && y < self.height).then(|| self.image.get_pixel(x, y).0)
    }

    /// Pixel under a logical position.
    pub fn pixel_at(&self, p: Vec2) -> Option<[u8; 4]> {
        if !p.is_finite() || p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        self.pixel((p.x * self.scale) as u32, (p.y * self.scale) as u32)
    }

    // ── drawing ───────────────────────────────────────────────────────────

    /// Replaces every pixel of the extent with `color` (no blending).
    pub fn clear(&mut self, color: Color) {
        let px = Rgba(color.to_rgba8());
        for y in 0..self.height {
            for x in 0..self.width {
                self.image.put_pixel(x, y, px);
            }
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        let r = rect.normalized();
        let (x0, y0) = (r.origin.x * self.scale, r.origin.y * self.scale);
        let (x1, y1) = (r.max().x * self.scale, r.max().y * self.scale);
        self.cover(r, paint, |p| {
            raster::span_coverage(p.x, x0, x1) * raster::span_coverage(p.y, y0, y1)
        });
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        if !(radius.is_finite() && radius > 0.0) || !center.is_finite() {
            return;
        }
        let (c, r) = (center * self.scale, radius * self.scale);
        self.cover(Rect::around(center, radius), &Paint::Solid(color), |p| {
            raster::disk_coverage(p, c, r)
        });
    }

    pub fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color) {
        if !(radius.is_finite() && width.is_finite() && width > 0.0) || !center.is_finite() {
            return;
        }
        let (c, r, hw) = (center * self.scale, radius.abs() * self.scale, width * self.scale * 0.5);
        let bounds = Rect::around(center, radius.abs() + width * 0.5);
        self.cover(bounds, &Paint::Solid(color), |p| raster::ring_coverage(p, c, r, hw));
    }

    /// Thick line with butt caps.
    pub fn stroke_line(&mut self, p0: Vec2, p1: Vec2, width: f32, color: Color) {
        if !(p0.is_finite() && p1.is_finite() && width.is_finite()) {
            return;
        }
        let Some(segment) = Segment::new(p0 * self.scale, p1 * self.scale, width * self.scale)
        else {
            return;
        };
        let bounds = Rect::bounding(&[p0, p1]).inflate(width * 0.5);
        self.cover(bounds, &Paint::Solid(color), |p| segment.coverage(p));
    }

    pub fn fill_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color) {
        if !(a.is_finite() && b.is_finite() && c.is_finite()) {
            return;
        }
        let s = self.scale;
        let Some(tri) = Triangle::new(a * s, b * s, c * s) else {
            return;
        };
        self.cover(Rect::bounding(&[a, b, c]), &Paint::Solid(color), |p| tri.coverage(p));
    }

    pub fn stroke_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, width: f32, color: Color) {
        self.stroke_line(a, b, width, color);
        self.stroke_line(b, c, width, color);
        self.stroke_line(c, a, width, color);
    }

    /// Soft radial falloff, `color` at the center fading quadratically to
    /// transparent at `radius`.
    pub fn fill_radial_glow(&mut self, center: Vec2, radius: f32, color: Color) {
        if !(radius.is_finite() && radius > 0.0) || !center.is_finite() {
            return;
        }
        let (c, r) = (center * self.scale, radius * self.scale);
        self.cover(Rect::around(center, radius), &Paint::Solid(color), |p| {
            let falloff = (1.0 - (p - c).length() / r).max(0.0);
            falloff * falloff
        });
    }

    /// Composites the extent of `src` with its top-left at logical `origin`.
    ///
    /// Pixels are copied 1:1 in device space; both canvases are expected to
    /// share a pixel ratio.
    pub fn draw_canvas(&mut self, src: &Canvas, origin: Vec2, alpha: f32) {
        if !origin.is_finite() || alpha.is_nan() || alpha <= 0.0 {
            return;
        }
        let alpha = alpha.min(1.0);
        let ox = (origin.x * self.scale).round() as i64;
        let oy = (origin.y * self.scale).round() as i64;

        for sy in 0..src.height {
            let dy = oy + sy as i64;
            if dy < 0 || dy >= self.height as i64 {
                continue;
            }
            for sx in 0..src.width {
                let dx = ox + sx as i64;
                if dx < 0 || dx >= self.width as i64 {
                    continue;
                }
                let [r, g, b, a] = src.image.get_pixel(sx, sy).0;
                if a == 0 {
                    continue;
                }
                let dst = self.image.get_pixel_mut(dx as u32, dy as u32);
                raster::blend_over(dst, Color::from_rgba8(r, g, b, a), alpha);
            }
        }
    }

    /// Shades every device pixel under `bounds` (logical) with the given
    /// coverage function, evaluated at device-space pixel centers.
    fn cover(&mut self, bounds: Rect, paint: &Paint, mut coverage: impl FnMut(Vec2) -> f32) {
        if let Paint::Solid(c) = paint {
            if c.clamped().a <= 0.0 {
                return;
            }
        }

        let px = bounds.inflate(1.0).to_pixel_bounds(self.scale, self.width, self.height);
        let inv_scale = 1.0 / self.scale;
        for y in px.y0..px.y1 {
            for x in px.x0..px.x1 {
                let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let cov = coverage(center);
                if cov <= 0.0 {
                    continue;
                }
                let color = match paint {
                    Paint::Solid(c) => *c,
                    Paint::LinearGradient(g) => g.sample(g.param_at(center * inv_scale)),
                };
                raster::blend_over(self.image.get_pixel_mut(x, y), color.clamped(), cov.min(1.0));
            }
        }
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("scale", &self.scale)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::LinearGradient;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn canvas(w: f32, h: f32, ratio: f32) -> Canvas {
        Canvas::new(Viewport::new(w, h), ratio)
    }

    // ── sizing ────────────────────────────────────────────────────────────

    #[test]
    fn device_size_follows_pixel_ratio() {
        let c = canvas(10.0, 8.0, 2.0);
        assert_eq!((c.width(), c.height()), (20, 16));
        let c = canvas(10.0, 8.0, 7.0);
        assert_eq!((c.width(), c.height()), (30, 24));
    }

    #[test]
    fn same_size_resize_keeps_pixels() {
        let mut c = canvas(4.0, 4.0, 1.0);
        c.clear(Color::rgb(1.0, 0.0, 0.0));
        assert!(!c.resize(Viewport::new(4.0, 4.0), 1.0));
        assert_eq!(c.pixel(0, 0), Some(RED));
        assert!(c.resize(Viewport::new(5.0, 4.0), 1.0));
        assert_eq!(c.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn resolved_scale_may_go_below_one() {
        let mut c = Canvas::with_scale(Viewport::new(40.0, 20.0), 0.5);
        assert_eq!((c.width(), c.height()), (20, 10));
        c.fill_circle(Vec2::new(20.0, 10.0), 6.0, Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(c.pixel_at(Vec2::new(20.0, 10.0)), Some(RED));
        assert!(c.rescale(Viewport::new(40.0, 20.0), 0.25));
        assert_eq!((c.width(), c.height()), (10, 5));
    }

    #[test]
    fn zero_size_is_one_pixel() {
        let c = canvas(0.0, 0.0, 1.0);
        assert_eq!((c.width(), c.height()), (1, 1));
    }

    // ── shapes ────────────────────────────────────────────────────────────

    #[test]
    fn fill_circle_paints_inside_only() {
        let mut c = canvas(40.0, 40.0, 1.0);
        c.clear(Color::rgb(1.0, 0.0, 0.0));
        c.fill_circle(Vec2::new(20.0, 20.0), 6.0, Color::rgb(0.0, 0.0, 1.0));
        assert_eq!(c.pixel(20, 20), Some(BLUE));
        assert_eq!(c.pixel(2, 2), Some(RED));
        assert_eq!(c.pixel(20, 30), Some(RED));
    }

    #[test]
    fn fill_circle_is_scaled_by_ratio() {
        let mut c = canvas(20.0, 20.0, 2.0);
        c.fill_circle(Vec2::new(10.0, 10.0), 4.0, Color::WHITE);
        assert_eq!(c.pixel(20, 20), Some([255; 4]));
        assert_eq!(c.pixel(20, 26), Some([255; 4]));
        assert_eq!(c.pixel(20, 30), Some([0; 4]));
    }

    #[test]
    fn stroke_circle_leaves_center_empty() {
        let mut c = canvas(40.0, 40.0, 1.0);
        c.stroke_circle(Vec2::new(20.0, 20.0), 10.0, 2.0, Color::WHITE);
        assert_eq!(c.pixel(20, 20), Some([0; 4]));
        assert!(c.pixel_at(Vec2::new(29.0, 20.0)).is_some_and(|p| p[3] >= 250));
    }

    #[test]
    fn stroke_line_covers_its_width() {
        let mut c = canvas(20.0, 20.0, 1.0);
        c.stroke_line(Vec2::new(2.0, 10.0), Vec2::new(18.0, 10.0), 4.0, Color::WHITE);
        assert_eq!(c.pixel(10, 9), Some([255; 4]));
        assert_eq!(c.pixel(10, 14), Some([0; 4]));
        assert_eq!(c.pixel(0, 10), Some([0; 4]));
    }

    #[test]
    fn fill_triangle_paints_interior() {
        let mut c = canvas(30.0, 30.0, 1.0);
        c.fill_triangle(
            Vec2::new(0.0, 0.0),
            Vec2::new(30.0, 0.0),
            Vec2::new(0.0, 30.0),
            Color::WHITE,
        );
        assert_eq!(c.pixel(5, 5), Some([255; 4]));
        assert_eq!(c.pixel(25, 25), Some([0; 4]));
    }

    #[test]
    fn fill_rect_with_vertical_gradient() {
        let mut c = canvas(4.0, 100.0, 1.0);
        let g = LinearGradient::vertical(0.0, 100.0, Color::BLACK, Color::WHITE);
        c.fill_rect(Rect::new(0.0, 0.0, 4.0, 100.0), &Paint::from(g));
        let top = c.pixel(1, 0).unwrap()[0];
        let bottom = c.pixel(1, 99).unwrap()[0];
        assert!(top < 10, "top={top}");
        assert!(bottom > 245, "bottom={bottom}");
    }

    #[test]
    fn transparent_paint_is_noop() {
        let mut c = canvas(10.0, 10.0, 1.0);
        c.clear(Color::rgb(1.0, 0.0, 0.0));
        c.fill_circle(Vec2::new(5.0, 5.0), 4.0, Color::TRANSPARENT);
        assert_eq!(c.pixel(5, 5), Some(RED));
    }

    // ── compositing ───────────────────────────────────────────────────────

    #[test]
    fn draw_canvas_blits_with_offset() {
        let mut dst = canvas(20.0, 20.0, 1.0);
        let mut src = canvas(4.0, 4.0, 1.0);
        src.clear(Color::rgb(0.0, 0.0, 1.0));
        dst.draw_canvas(&src, Vec2::new(10.0, 10.0), 1.0);
        assert_eq!(dst.pixel(10, 10), Some(BLUE));
        assert_eq!(dst.pixel(13, 13), Some(BLUE));
        assert_eq!(dst.pixel(14, 14), Some([0; 4]));
        assert_eq!(dst.pixel(9, 9), Some([0; 4]));
    }

    #[test]
    fn draw_canvas_clips_negative_origin() {
        let mut dst = canvas(8.0, 8.0, 1.0);
        let mut src = canvas(4.0, 4.0, 1.0);
        src.clear(Color::WHITE);
        dst.draw_canvas(&src, Vec2::new(-2.0, -2.0), 1.0);
        assert_eq!(dst.pixel(1, 1), Some([255; 4]));
        assert_eq!(dst.pixel(2, 2), Some([0; 4]));
    }

    #[test]
    fn to_image_crops_to_extent() {
        let mut c = canvas(8.0, 8.0, 1.0);
        c.reset_extent(Viewport::new(3.0, 2.0), 1.0);
        let img = c.to_image();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(c.image().dimensions(), (8, 8));
    }
}
