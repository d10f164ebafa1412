//! Beam and laser looks composed from plain line entries.
//!
//! Both trade a handful of extra line instances for not needing a dedicated
//! beam program; every segment still lands in the single line batch.

use std::f32::consts::TAU;

use crate::coords::Vec2;
use crate::paint::Color;
use crate::render::LineEntry;

/// Concentric layers of a beam, widest and faintest first.
pub const BEAM_LAYERS: usize = 6;

/// Segments a laser is cut into along its length.
pub const LASER_SEGMENTS: usize = 12;

/// Beam shimmer frequency in Hz.
const BEAM_SHIMMER_RATE: f32 = 3.0;

/// Laser pulses travel this many beam lengths per second.
const LASER_PULSE_SPEED: f32 = 1.5;

/// Sideways wobble of laser segments, as a fraction of the width.
const LASER_WOBBLE: f32 = 0.2;

/// Layers of a beam from `from` to `to`.
///
/// Outer layers are wide and faint in `color`; inner layers narrow towards a
/// white-hot core. The mix towards white shimmers with `time`.
pub fn beam_layers(from: Vec2, to: Vec2, width: f32, color: Color, time: f32) -> [LineEntry; BEAM_LAYERS] {
    let shimmer = 0.5 + 0.5 * (time * BEAM_SHIMMER_RATE * TAU).sin();

    std::array::from_fn(|i| {
        // 0 for the outermost layer, 1 for the core.
        let t = i as f32 / (BEAM_LAYERS - 1) as f32;
        let layer_width = width * (1.0 - 0.85 * t);
        let heat = t * t * (0.6 + 0.4 * shimmer);
        let alpha = 0.15 + 0.85 * t;

        LineEntry {
            p0: from,
            p1: to,
            width: layer_width,
            color: color.lerp(Color::WHITE, heat).scale_alpha(alpha),
        }
    })
}

/// Segments of a laser from `from` to `to`.
///
/// Brightness pulses travel from `from` towards `to`; segments wobble
/// sideways by a fraction of `width`. Degenerate (zero-length) lasers yield
/// `None`.
pub fn laser_segments(
    from: Vec2,
    to: Vec2,
    width: f32,
    color: Color,
    time: f32,
) -> Option<[LineEntry; LASER_SEGMENTS]> {
    let dir = (to - from).normalized()?;
    let normal = dir.perp();
    let wobble = |k: usize| {
        let phase = time * TAU + k as f32 * 1.7;
        from.lerp(to, k as f32 / LASER_SEGMENTS as f32) + normal * (width * LASER_WOBBLE * phase.sin())
    };

    Some(std::array::from_fn(|k| {
        let pulse = time * LASER_PULSE_SPEED - (k as f32 + 0.5) / LASER_SEGMENTS as f32;
        let intensity = 0.5 + 0.5 * (pulse * TAU).sin();
        // Endpoints stay on the axis so the laser always hits its target.
        let p0 = if k == 0 { from } else { wobble(k) };
        let p1 = if k + 1 == LASER_SEGMENTS { to } else { wobble(k + 1) };
        LineEntry {
            p0,
            p1,
            width,
            color: color
                .lerp(Color::WHITE, 0.4 * intensity)
                .scale_alpha(0.55 + 0.45 * intensity),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── beam ─────────────────────────────────────────────────────────────

    #[test]
    fn beam_narrows_towards_core() {
        let layers = beam_layers(Vec2::zero(), Vec2::new(100.0, 0.0), 10.0, Color::rgb(0.0, 0.5, 1.0), 0.0);
        for pair in layers.windows(2) {
            assert!(pair[1].width < pair[0].width);
            assert!(pair[1].color.a > pair[0].color.a);
        }
        assert_eq!(layers[0].width, 10.0);
    }

    #[test]
    fn beam_colors_change_over_time() {
        let (a, b) = (Vec2::zero(), Vec2::new(0.0, 50.0));
        let c = Color::rgb(1.0, 0.0, 0.0);
        let early = beam_layers(a, b, 4.0, c, 0.0);
        let later = beam_layers(a, b, 4.0, c, 1.0 / (4.0 * BEAM_SHIMMER_RATE));
        assert_ne!(early[BEAM_LAYERS - 1].color, later[BEAM_LAYERS - 1].color);
    }

    // ── laser ────────────────────────────────────────────────────────────

    #[test]
    fn laser_is_continuous_and_anchored() {
        let (from, to) = (Vec2::new(10.0, 10.0), Vec2::new(110.0, 10.0));
        let segs = laser_segments(from, to, 3.0, Color::WHITE, 0.37).unwrap();
        assert_eq!(segs[0].p0, from);
        assert_eq!(segs[LASER_SEGMENTS - 1].p1, to);
        for pair in segs.windows(2) {
            assert_eq!(pair[0].p1, pair[1].p0);
        }
    }

    #[test]
    fn degenerate_laser_is_empty() {
        let p = Vec2::new(5.0, 5.0);
        assert!(laser_segments(p, p, 3.0, Color::WHITE, 0.0).is_none());
    }
}
