//! Pooled transient entities.
//!
//! Short-lived things spawned in bursts every frame: particles, projectiles
//! and floating damage numbers. Each lives in a [`Pool`] and is stepped and
//! drawn through the helpers here.
//!
//! Cosmetic entities are spawned with [`Pool::acquire`] and may be evicted
//! under pressure. Projectiles carry damage and are spawned with
//! [`Pool::try_acquire`], which never evicts.

mod emitter;
mod particle;
mod projectile;
mod text;

pub use emitter::Emitter;
pub use particle::Particle;
pub use projectile::Projectile;
pub use text::FloatingText;

use crate::draw::DrawFacade;
use crate::pool::{Pool, Recycle};

/// A pooled entity with a frame update and a draw.
pub trait Transient: Recycle {
    /// Advances by `dt` seconds. Returns `false` once the entity is done.
    fn update(&mut self, dt: f32) -> bool;

    fn draw(&self, draw: &mut DrawFacade);
}

/// Updates every active entity and releases the finished ones.
/// Returns how many were released.
pub fn step<T: Transient>(pool: &mut Pool<T>, dt: f32) -> usize {
    pool.retain_active(|entity| entity.update(dt))
}

/// Draws every active entity, oldest first.
pub fn draw_all<T: Transient>(pool: &Pool<T>, draw: &mut DrawFacade) {
    for (_, entity) in pool.iter_active() {
        entity.draw(draw);
    }
}
