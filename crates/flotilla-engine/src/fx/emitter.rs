use std::f32::consts::TAU;

use super::Particle;
use crate::coords::Vec2;
use crate::paint::Color;
use crate::pool::Pool;

/// Golden angle in radians; consecutive particles never line up.
const GOLDEN_ANGLE: f32 = 2.399_963;

/// Burst spawner. Directions follow a golden-angle spiral and speeds a
/// low-discrepancy sequence, so bursts are even and reproducible without an
/// RNG.
#[derive(Debug, Clone, PartialEq)]
pub struct Emitter {
    pub origin: Vec2,
    /// Particles per burst.
    pub count: usize,
    /// Speed range in px/s.
    pub speed: (f32, f32),
    pub radius: f32,
    /// Lifetime in seconds.
    pub life: f32,
    pub color: Color,
    /// Fraction of velocity kept per second.
    pub drag: f32,
    /// Rotates successive bursts so they do not overlap exactly.
    phase: f32,
}

impl Default for Emitter {
    fn default() -> Self {
        Self {
            origin: Vec2::zero(),
            count: 16,
            speed: (40.0, 120.0),
            radius: 2.0,
            life: 0.6,
            color: Color::WHITE,
            drag: 0.2,
            phase: 0.0,
        }
    }
}

impl Emitter {
    pub fn new(origin: Vec2, color: Color) -> Self {
        Self {
            origin,
            color,
            ..Self::default()
        }
    }

    /// Spawns `count` particles into `pool`, evicting the oldest active
    /// particles when it is full.
    pub fn burst(&mut self, pool: &mut Pool<Particle>) {
        let (lo, hi) = self.speed;
        for k in 0..self.count {
            let angle = (self.phase + k as f32 * GOLDEN_ANGLE) % TAU;
            let spread = (k as f32 * 0.618_034).fract();
            let velocity = Vec2::from_angle(angle) * (lo + (hi - lo) * spread);

            let handle = pool.acquire();
            if let Some(p) = pool.get_mut(handle) {
                p.spawn(self.origin, velocity, self.radius, self.color, self.life);
                p.drag = self.drag;
            }
        }
        self.phase = (self.phase + GOLDEN_ANGLE * self.count as f32) % TAU;
    }
}
