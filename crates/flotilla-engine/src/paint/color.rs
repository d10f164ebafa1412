/// Straight-alpha RGBA color, channels in `[0, 1]`.
///
/// Callers hand colors over in straight alpha (the way gameplay code picks
/// them); conversion to premultiplied form happens at the GPU boundary via
/// [`Color::premultiplied`].
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Creates a color from straight RGBA bytes (`0`–`255`).
    #[inline]
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Creates an opaque color from a `0xRRGGBB` literal.
    #[inline]
    pub fn from_hex(rgb: u32) -> Self {
        Self::from_rgba8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 255)
    }

    /// Parses `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn parse_hex(text: &str) -> Option<Self> {
        let hex = text.trim().trim_start_matches('#');
        let nibble = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();

        match hex.len() {
            3 => Some(Self::from_rgba8(
                nibble(0)? * 17,
                nibble(1)? * 17,
                nibble(2)? * 17,
                255,
            )),
            6 => Some(Self::from_rgba8(byte(0)?, byte(2)?, byte(4)?, 255)),
            8 => Some(Self::from_rgba8(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// Returns the color with alpha replaced.
    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Returns the color with alpha multiplied by `factor`.
    #[inline]
    pub fn scale_alpha(self, factor: f32) -> Self {
        Self { a: self.a * factor, ..self }
    }

    /// Multiplies RGB by `factor` (alpha untouched), clamped to `[0, 1]`.
    #[inline]
    pub fn brighten(self, factor: f32) -> Self {
        Self {
            r: (self.r * factor).clamp(0.0, 1.0),
            g: (self.g * factor).clamp(0.0, 1.0),
            b: (self.b * factor).clamp(0.0, 1.0),
            a: self.a,
        }
    }

    /// Component-wise linear interpolation.
    #[inline]
    pub fn lerp(self, to: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: self.r + (to.r - self.r) * t,
            g: self.g + (to.g - self.g) * t,
            b: self.b + (to.b - self.b) * t,
            a: self.a + (to.a - self.a) * t,
        }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    /// Clamps all channels to `[0, 1]`; non-finite channels become 0.
    #[inline]
    pub fn clamped(self) -> Self {
        let c = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        Self { r: c(self.r), g: c(self.g), b: c(self.b), a: c(self.a) }
    }

    /// Straight-alpha channels as an array (clamped).
    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        let c = self.clamped();
        [c.r, c.g, c.b, c.a]
    }

    /// Premultiplied channels as an array (clamped), the form the GPU
    /// blend state expects.
    #[inline]
    pub fn premultiplied(self) -> [f32; 4] {
        let c = self.clamped();
        [c.r * c.a, c.g * c.a, c.b * c.a, c.a]
    }

    /// Straight-alpha RGBA bytes.
    #[inline]
    pub fn to_rgba8(self) -> [u8; 4] {
        let [r, g, b, a] = self.to_array();
        let q = |v: f32| (v * 255.0).round() as u8;
        [q(r), q(g), q(b), q(a)]
    }
}
