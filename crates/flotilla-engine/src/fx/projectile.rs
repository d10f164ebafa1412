use super::Transient;
use crate::coords::Vec2;
use crate::draw::DrawFacade;
use crate::paint::Color;
use crate::pool::Recycle;

/// Trail length, in seconds of travel.
const TRAIL_SECONDS: f32 = 0.04;

/// Damage-carrying shot. Lives until it expires or [`Projectile::hit`] is
/// called; gameplay code reads `damage` and resolves the hit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projectile {
    pub position: Vec2,
    pub velocity: Vec2,
    pub damage: f32,
    pub width: f32,
    pub color: Color,
    ttl: f32,
    spent: bool,
}

impl Projectile {
    #[allow(clippy::too_many_arguments)]
    pub fn fire(&mut self, position: Vec2, velocity: Vec2, damage: f32, width: f32, color: Color, ttl: f32) {
        *self = Self {
            position,
            velocity,
            damage,
            width,
            color,
            ttl,
            spent: false,
        };
    }

    /// Marks the shot as resolved; it is released on the next update.
    pub fn hit(&mut self) {
        self.spent = true;
    }

    pub fn is_spent(&self) -> bool {
        self.spent
    }

    /// Tail end of the trail.
    pub fn tail(&self) -> Vec2 {
        self.position - self.velocity * TRAIL_SECONDS
    }
}

impl Recycle for Projectile {
    fn recycle(&mut self) {
        *self = Self::default();
    }
}

impl Transient for Projectile {
    fn update(&mut self, dt: f32) -> bool {
        if self.spent {
            return false;
        }
        self.ttl -= dt;
        self.position += self.velocity * dt;
        self.ttl > 0.0
    }

    fn draw(&self, draw: &mut DrawFacade) {
        draw.set_stroke(self.color);
        draw.set_line_width(self.width);
        let tail = self.tail();
        draw.line(tail.x, tail.y, self.position.x, self.position.y);
    }
}
