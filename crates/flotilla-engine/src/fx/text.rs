use super::Transient;
use crate::coords::Vec2;
use crate::draw::DrawFacade;
use crate::paint::Color;
use crate::pool::Recycle;

/// Segment masks for 0-9; bit 0 is the top bar, then clockwise, bit 6 is
/// the middle bar.
const DIGIT_SEGMENTS: [u8; 10] = [0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F];

/// Digit cell width relative to its height.
const DIGIT_ASPECT: f32 = 0.5;

/// Gap between digits relative to the height.
const DIGIT_GAP: f32 = 0.2;

/// Rising, fading number (damage ticks, score pops), drawn as seven-segment
/// strokes on the 2D overlay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloatingText {
    /// Center of the number's baseline row.
    pub position: Vec2,
    pub value: u32,
    /// Digit height in logical px.
    pub size: f32,
    pub color: Color,
    /// Upward speed in px/s.
    pub rise: f32,
    age: f32,
    ttl: f32,
}

impl FloatingText {
    pub fn show(&mut self, position: Vec2, value: u32, size: f32, color: Color, ttl: f32) {
        *self = Self {
            position,
            value,
            size,
            color,
            rise: size * 2.0,
            age: 0.0,
            ttl,
        };
    }

    /// Opacity: full for the first half of the lifetime, then a linear fade.
    pub fn opacity(&self) -> f32 {
        if self.ttl <= 0.0 {
            return 0.0;
        }
        let t = self.age / self.ttl;
        (2.0 * (1.0 - t)).clamp(0.0, 1.0)
    }

    /// Strokes of every digit, in logical px, for the current position.
    pub fn strokes(&self) -> Vec<(Vec2, Vec2)> {
        let digits = self.value.to_string();
        let h = self.size;
        let w = h * DIGIT_ASPECT;
        let advance = w + h * DIGIT_GAP;
        let total = advance * digits.len() as f32 - h * DIGIT_GAP;
        let left = self.position.x - total * 0.5;
        let top = self.position.y - h;

        digits
            .bytes()
            .enumerate()
            .flat_map(|(i, b)| {
                let origin = Vec2::new(left + advance * i as f32, top);
                digit_strokes(b - b'0', w, h).map(move |(p0, p1)| (origin + p0, origin + p1))
            })
            .collect()
    }
}

/// Lit segments of `digit` in a `w × h` cell with its top-left at the origin.
fn digit_strokes(digit: u8, w: f32, h: f32) -> impl Iterator<Item = (Vec2, Vec2)> {
    let mid = h * 0.5;
    let segments = [
        (Vec2::new(0.0, 0.0), Vec2::new(w, 0.0)),
        (Vec2::new(w, 0.0), Vec2::new(w, mid)),
        (Vec2::new(w, mid), Vec2::new(w, h)),
        (Vec2::new(0.0, h), Vec2::new(w, h)),
        (Vec2::new(0.0, mid), Vec2::new(0.0, h)),
        (Vec2::new(0.0, 0.0), Vec2::new(0.0, mid)),
        (Vec2::new(0.0, mid), Vec2::new(w, mid)),
    ];
    let mask = DIGIT_SEGMENTS.get(digit as usize).copied().unwrap_or(0);
    segments
        .into_iter()
        .enumerate()
        .filter(move |(bit, _)| mask & (1 << bit) != 0)
        .map(|(_, segment)| segment)
}

impl Recycle for FloatingText {
    fn recycle(&mut self) {
        *self = Self::default();
    }
}

impl Transient for FloatingText {
    fn update(&mut self, dt: f32) -> bool {
        self.age += dt;
        self.position.y -= self.rise * dt;
        self.age < self.ttl
    }

    fn draw(&self, draw: &mut DrawFacade) {
        let color = draw.paint().resolve(self.color.scale_alpha(self.opacity()));
        let width = (self.size * 0.12).max(1.0);
        let canvas = draw.context_mut();
        for (p0, p1) in self.strokes() {
            canvas.stroke_line(p0, p1, width, color);
        }
    }
}
