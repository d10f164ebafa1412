//! Swarm scene shared by the windowed and headless entry points.

use std::f32::consts::TAU;

use flotilla_engine::coords::{Rect, Vec2, Viewport};
use flotilla_engine::draw::DrawFacade;
use flotilla_engine::fx::{self, Emitter, FloatingText, Particle, Projectile};
use flotilla_engine::paint::{Color, LinearGradient, Paint};
use flotilla_engine::pool::{Pool, PoolConfig};
use flotilla_engine::theme::ShipTheme;

const VOLLEY_INTERVAL: f32 = 0.35;
const BURST_INTERVAL: f32 = 0.8;

struct Ship {
    orbit: f32,
    /// Angular speed in rad/s; the sign picks the direction.
    speed: f32,
    phase: f32,
    size: f32,
    color: Color,
    theme: u32,
    primary: bool,
}

impl Ship {
    fn angle(&self, t: f32) -> f32 {
        self.phase + t * self.speed
    }

    fn position(&self, center: Vec2, t: f32) -> Vec2 {
        center + Vec2::from_angle(self.angle(t)) * self.orbit
    }

    /// Tangent to the orbit.
    fn heading(&self, t: f32) -> f32 {
        self.angle(t) + self.speed.signum() * TAU / 4.0
    }
}

pub struct Swarm {
    ships: Vec<Ship>,
    particles: Pool<Particle>,
    shots: Pool<Projectile>,
    ticks: Pool<FloatingText>,
    emitter: Emitter,
    time: f32,
    volley_timer: f32,
    burst_timer: f32,
    bursts: u32,
}

impl Swarm {
    pub fn new(ship_count: usize) -> Self {
        let palette = [
            Color::from_hex(0x4fc3f7),
            Color::from_hex(0xffb74d),
            Color::from_hex(0xba68c8),
            Color::from_hex(0x81c784),
        ];
        let ships = (0..ship_count)
            .map(|i| {
                let k = i as f32;
                let ring = (k * 0.618_034).fract();
                let direction = if i % 2 == 0 { 1.0 } else { -0.8 };
                Ship {
                    orbit: 40.0 + ring * 320.0,
                    speed: direction * 0.35 * (1.2 - ring),
                    phase: k * 2.399_963,
                    size: 5.0 + (k * 0.414_214).fract() * 5.0,
                    color: palette[i % palette.len()],
                    theme: ShipTheme::ALL[i % ShipTheme::ALL.len()].id(),
                    primary: i % 50 == 0,
                }
            })
            .collect();

        Self {
            ships,
            particles: Pool::recycling(PoolConfig::new(256, 2048)),
            shots: Pool::recycling(PoolConfig::new(32, 256)),
            ticks: Pool::recycling(PoolConfig::new(16, 64)),
            emitter: Emitter::new(Vec2::zero(), Color::from_hex(0xfff176)),
            time: 0.0,
            volley_timer: 0.0,
            burst_timer: 0.0,
            bursts: 0,
        }
    }

    pub fn update(&mut self, dt: f32, viewport: Viewport) {
        self.time += dt;
        let center = Vec2::new(viewport.width * 0.5, viewport.height * 0.5);

        self.volley_timer += dt;
        if self.volley_timer >= VOLLEY_INTERVAL {
            self.volley_timer -= VOLLEY_INTERVAL;
            self.fire_volley(center);
        }

        self.burst_timer += dt;
        if self.burst_timer >= BURST_INTERVAL && !self.ships.is_empty() {
            self.burst_timer -= BURST_INTERVAL;
            self.bursts += 1;
            let ship = &self.ships[(self.bursts as usize * 37) % self.ships.len()];
            let at = ship.position(center, self.time);

            self.emitter.origin = at;
            self.emitter.burst(&mut self.particles);

            let tick = self.ticks.acquire();
            if let Some(text) = self.ticks.get_mut(tick) {
                text.show(at, 10 + (self.bursts * 7) % 90, 10.0, Color::WHITE, 0.9);
            }
        }

        fx::step(&mut self.particles, dt);
        fx::step(&mut self.shots, dt);
        fx::step(&mut self.ticks, dt);
    }

    fn fire_volley(&mut self, center: Vec2) {
        for ship in self.ships.iter().filter(|s| s.primary) {
            let from = ship.position(center, self.time);
            let Some(dir) = (center - from).normalized() else {
                continue;
            };
            // Shots carry damage: never evict one in flight.
            let Some(handle) = self.shots.try_acquire() else {
                log::debug!("shot pool full, volley truncated");
                break;
            };
            if let Some(shot) = self.shots.get_mut(handle) {
                shot.fire(from, dir * 320.0, 12.0, 2.0, ship.color.brighten(1.4), 1.2);
            }
        }
    }

    pub fn draw(&self, draw: &mut DrawFacade) {
        let viewport = draw.surface().viewport();
        let center = Vec2::new(viewport.width * 0.5, viewport.height * 0.5);

        let sky = LinearGradient::vertical(
            0.0,
            viewport.height,
            Color::from_hex(0x0b1026),
            Color::from_hex(0x1c1030),
        );
        draw.context_mut().fill_rect(
            Rect::new(0.0, 0.0, viewport.width, viewport.height),
            &Paint::from(sky),
        );
        draw.glow(center, 60.0, Color::from_hex(0xffe082).with_alpha(0.6));

        // Station.
        draw.set_alpha(1.0);
        draw.set_fill(Color::from_hex(0x37474f));
        draw.circle(center.x, center.y, 18.0, true);
        draw.set_stroke(Color::from_hex(0x90a4ae));
        draw.set_line_width(2.0);
        draw.circle(center.x, center.y, 24.0, false);

        for (i, ship) in self.ships.iter().filter(|s| s.primary).enumerate() {
            let from = ship.position(center, self.time);
            if i % 2 == 0 {
                draw.add_beam(from, center, 6.0, ship.color);
            } else {
                draw.add_laser(from, center, 2.0, Color::from_hex(0xff5252));
            }
        }

        for ship in &self.ships {
            let p = ship.position(center, self.time);
            draw.add_ship(
                p.x,
                p.y,
                ship.heading(self.time),
                ship.size,
                ship.color,
                ship.primary,
                ship.theme,
            );
        }

        fx::draw_all(&self.particles, draw);
        fx::draw_all(&self.shots, draw);
        fx::draw_all(&self.ticks, draw);
    }

    pub fn live_entities(&self) -> usize {
        self.particles.active_len() + self.shots.active_len() + self.ticks.active_len()
    }
}
