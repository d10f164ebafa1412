use super::Transient;
use crate::coords::Vec2;
use crate::draw::DrawFacade;
use crate::paint::Color;
use crate::pool::Recycle;

/// Fading, shrinking spark.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub color: Color,
    /// Velocity retained per second, in `[0, 1]`.
    pub drag: f32,
    life: f32,
    max_life: f32,
}

impl Particle {
    /// Restarts the particle with `life` seconds to live.
    pub fn spawn(&mut self, position: Vec2, velocity: Vec2, radius: f32, color: Color, life: f32) {
        self.position = position;
        self.velocity = velocity;
        self.radius = radius;
        self.color = color;
        self.drag = 1.0;
        self.life = life.max(0.0);
        self.max_life = self.life;
    }

    /// Remaining life in `[0, 1]`.
    pub fn life_fraction(&self) -> f32 {
        if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

impl Recycle for Particle {
    fn recycle(&mut self) {
        *self = Self::default();
    }
}

impl Transient for Particle {
    fn update(&mut self, dt: f32) -> bool {
        self.life -= dt;
        if self.life <= 0.0 {
            return false;
        }
        self.position += self.velocity * dt;
        self.velocity = self.velocity * self.drag.clamp(0.0, 1.0).powf(dt);
        true
    }

    fn draw(&self, draw: &mut DrawFacade) {
        let t = self.life_fraction();
        draw.set_fill(self.color.scale_alpha(t));
        draw.circle(self.position.x, self.position.y, self.radius * (0.4 + 0.6 * t), true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_then_expires() {
        let mut p = Particle::default();
        p.spawn(Vec2::zero(), Vec2::new(10.0, 0.0), 2.0, Color::WHITE, 0.5);
        assert!(p.update(0.25));
        assert_eq!(p.position, Vec2::new(2.5, 0.0));
        assert!((p.life_fraction() - 0.5).abs() < 1e-6);
        assert!(!p.update(0.3));
    }

    #[test]
    fn drag_slows_down() {
        let mut p = Particle::default();
        p.spawn(Vec2::zero(), Vec2::new(8.0, 0.0), 1.0, Color::WHITE, 2.0);
        p.drag = 0.25;
        p.update(1.0);
        assert!((p.velocity.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn recycle_clears_state() {
        let mut p = Particle::default();
        p.spawn(Vec2::new(1.0, 1.0), Vec2::new(1.0, 0.0), 1.0, Color::WHITE, 1.0);
        p.recycle();
        assert_eq!(p, Particle::default());
    }
}
