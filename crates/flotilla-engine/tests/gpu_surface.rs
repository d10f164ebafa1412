//! GPU integration tests. Require a wgpu adapter; without one every test
//! logs a note and returns early.
//!
//! Everything renders offscreen and is read back.

use std::sync::{Mutex, MutexGuard, OnceLock};

use flotilla_engine::coords::Vec2;
use flotilla_engine::device::GpuInit;
use flotilla_engine::draw::DrawFacade;
use flotilla_engine::paint::Color;
use flotilla_engine::error::RenderError;
use flotilla_engine::render::{
    Backend, BatchEntry, BatchRenderer, CircleEntry, RenderCtx, Renderer,
};
use flotilla_engine::surface::{
    DisplayConfig, DisplayMode, DisplaySurface, PresentStatus, PresentTarget, LAYER_FORMAT,
};

const RED: Color = Color::rgb(1.0, 0.0, 0.0);
const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);

fn gpu_test_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Hardware adapter first, then a software one.
fn gpu_surface(width: f32, height: f32) -> Option<DisplaySurface> {
    let config = DisplayConfig::new(width, height);
    let software = DisplayConfig {
        gpu: GpuInit::software(),
        ..config.clone()
    };
    match DisplaySurface::try_gpu(&config, PresentTarget::Offscreen)
        .or_else(|_| DisplaySurface::try_gpu(&software, PresentTarget::Offscreen))
    {
        Ok(surface) => Some(surface),
        Err(err) => {
            eprintln!("skipping GPU test: {err}");
            None
        }
    }
}

fn gpu_facade(width: f32, height: f32) -> Option<DrawFacade> {
    let surface = gpu_surface(width, height)?;
    let device = surface.gpu()?.device();
    let batch = BatchRenderer::new(device, LAYER_FORMAT).expect("batch programs build");
    Some(DrawFacade::with_renderer(surface, Box::new(batch)))
}

fn assert_px(actual: [u8; 4], expected: [u8; 4]) {
    for (a, e) in actual.iter().zip(expected) {
        assert!((*a as i32 - e as i32).abs() <= 1, "pixel {actual:?}, expected {expected:?}");
    }
}

#[test]
fn clear_makes_sprites_transparent_and_overlay_opaque() {
    let _lock = gpu_test_lock();
    let Some(mut surface) = gpu_surface(24.0, 16.0) else {
        return;
    };
    assert_eq!(surface.mode(), DisplayMode::Dual);

    surface.clear(GREEN);

    let sprites = surface.read_sprite_layer().expect("sprite readback");
    assert_eq!(sprites.dimensions(), (24, 16));
    assert!(sprites.pixels().all(|p| p.0[3] == 0));
    assert!(surface.context().image().pixels().all(|p| p.0 == [0, 255, 0, 255]));
}

#[test]
fn resize_is_idempotent_and_clamped() {
    let _lock = gpu_test_lock();
    let Some(mut surface) = gpu_surface(32.0, 32.0) else {
        return;
    };

    surface.resize(40.0, 20.0, 2.0);
    assert_eq!(surface.device_size(), (80, 40));
    surface.resize(40.0, 20.0, 2.0);
    assert_eq!(surface.device_size(), (80, 40));
    assert_eq!(surface.read_sprite_layer().expect("readback").dimensions(), (80, 40));

    surface.resize(0.0, 20.0, 9.0);
    assert_eq!(surface.device_size(), (1, 60));
    assert_eq!(surface.read_sprite_layer().expect("readback").dimensions(), (1, 60));
}

#[test]
fn one_draw_call_per_kind() {
    let _lock = gpu_test_lock();
    let Some(mut draw) = gpu_facade(256.0, 256.0) else {
        return;
    };
    assert_eq!(draw.backend(), Backend::Gpu);

    draw.clear(Color::BLACK);
    draw.set_fill(Color::WHITE);
    draw.set_stroke(Color::WHITE);
    for i in 0..500 {
        let x = (i % 50) as f32 * 5.0;
        let y = (i / 50) as f32 * 5.0;
        draw.circle(x, y, 2.0, true);
        draw.line(x, y, x + 3.0, y + 3.0);
        draw.triangle(Vec2::new(x, y), Vec2::new(x + 2.0, y), Vec2::new(x, y + 2.0), true);
        draw.add_ship(x, y + 100.0, i as f32 * 0.1, 6.0, Color::WHITE, i % 7 == 0, i as u32 % 9);
    }
    assert_eq!(draw.pending(), 2000);

    let stats = draw.flush().expect("flush");
    assert_eq!(stats.draw_calls, 4);
    assert_eq!((stats.circles, stats.lines, stats.triangles, stats.ships), (500, 500, 500, 500));
    assert_eq!(draw.pending(), 0);

    // A second, smaller frame reuses the grown buffers.
    draw.circle(10.0, 10.0, 3.0, true);
    let stats = draw.flush().expect("flush");
    assert_eq!(stats.draw_calls, 1);
    assert_eq!(stats.circles, 1);
}

#[test]
fn colors_resolve_when_appended() {
    let _lock = gpu_test_lock();
    let Some(mut draw) = gpu_facade(48.0, 16.0) else {
        return;
    };

    draw.clear(Color::BLACK);
    draw.set_fill(RED);
    draw.circle(8.0, 8.0, 6.0, true);
    draw.set_fill(BLUE);
    draw.circle(32.0, 8.0, 6.0, true);
    draw.flush().expect("flush");

    let sprites = draw.surface().read_sprite_layer().expect("readback");
    assert_px(sprites.get_pixel(8, 8).0, [255, 0, 0, 255]);
    assert_px(sprites.get_pixel(32, 8).0, [0, 0, 255, 255]);
    assert_eq!(sprites.get_pixel(20, 8).0[3], 0);
}

#[test]
fn later_appends_and_later_kinds_draw_on_top() {
    let _lock = gpu_test_lock();
    let Some(mut draw) = gpu_facade(48.0, 16.0) else {
        return;
    };

    draw.clear(Color::BLACK);

    // Same kind: append order.
    draw.set_fill(RED);
    draw.circle(8.0, 8.0, 6.0, true);
    draw.set_fill(BLUE);
    draw.circle(8.0, 8.0, 6.0, true);

    // Across kinds: triangles draw after circles whatever the call order.
    draw.set_fill(GREEN);
    draw.triangle(Vec2::new(24.0, 0.0), Vec2::new(48.0, 0.0), Vec2::new(24.0, 16.0), true);
    draw.set_fill(RED);
    draw.circle(30.0, 4.0, 3.0, true);
    draw.flush().expect("flush");

    let sprites = draw.surface().read_sprite_layer().expect("readback");
    assert_px(sprites.get_pixel(8, 8).0, [0, 0, 255, 255]);
    assert_px(sprites.get_pixel(30, 4).0, [0, 255, 0, 255]);
}

#[test]
fn composite_puts_overlay_under_sprites() {
    let _lock = gpu_test_lock();
    let Some(mut draw) = gpu_facade(32.0, 32.0) else {
        return;
    };

    draw.clear(GREEN);
    draw.set_fill(RED);
    draw.circle(8.0, 8.0, 6.0, true);
    let (flushed, status) = draw.end_frame();
    flushed.expect("flush");
    assert_eq!(status, PresentStatus::Offscreen);

    let frame = draw.surface().read_presented().expect("readback");
    assert_px(frame.get_pixel(8, 8).0, [255, 0, 0, 255]);
    assert_px(frame.get_pixel(24, 24).0, [0, 255, 0, 255]);
}

#[test]
fn ships_render_procedurally() {
    let _lock = gpu_test_lock();
    let Some(mut draw) = gpu_facade(64.0, 64.0) else {
        return;
    };

    draw.clear(Color::BLACK);
    draw.add_ship(32.0, 32.0, 0.0, 16.0, Color::rgb(0.2, 0.6, 1.0), true, 0);
    draw.advance_time(0.5);
    draw.flush().expect("flush");

    let sprites = draw.surface().read_sprite_layer().expect("readback");
    assert!(sprites.get_pixel(32, 32).0[3] > 200, "hull should be opaque");
    assert_eq!(sprites.get_pixel(2, 2).0[3], 0, "far corner stays empty");
}

#[test]
fn batch_renderer_reports_backend() {
    let _lock = gpu_test_lock();
    let Some(surface) = gpu_surface(8.0, 8.0) else {
        return;
    };
    let Some(gpu) = surface.gpu() else {
        return;
    };
    let batch = BatchRenderer::new(gpu.device(), LAYER_FORMAT).expect("batch programs build");
    assert_eq!(batch.backend(), Backend::Gpu);
    assert_eq!(batch.format(), LAYER_FORMAT);
}

// ── device limits ───────────────────────────────────────────────────────

#[test]
fn resize_past_the_texture_limit_lowers_the_scale() {
    let _lock = gpu_test_lock();
    let Some(mut surface) = gpu_surface(32.0, 32.0) else {
        return;
    };
    let Some(max) = surface.gpu().map(|gpu| gpu.max_texture_dimension()) else {
        return;
    };

    surface.resize(max as f32 * 2.0, 10.0, 3.0);
    assert!(surface.is_dual());
    assert!(surface.scale() < 1.0, "scale {}", surface.scale());
    assert_eq!(surface.pixel_ratio(), 3.0);

    let (width, height) = surface.device_size();
    assert_eq!(width, max);
    assert!(height >= 1 && height <= max);
    let sprites = surface.read_sprite_layer().expect("sprite readback");
    assert_eq!(sprites.dimensions(), (width, height));

    surface.clear(GREEN);
    assert_eq!(surface.composite_overlay(), PresentStatus::Offscreen);

    surface.resize(32.0, 32.0, 2.0);
    assert_eq!(surface.scale(), 2.0);
    assert_eq!(surface.device_size(), (64, 64));
    assert_eq!(surface.read_sprite_layer().expect("readback").dimensions(), (64, 64));
}

#[test]
fn oversized_initial_size_starts_within_the_limit() {
    let _lock = gpu_test_lock();
    let Some(surface) = gpu_surface(100_000.0, 16.0) else {
        return;
    };
    let Some(max) = surface.gpu().map(|gpu| gpu.max_texture_dimension()) else {
        return;
    };

    assert_eq!(surface.mode(), DisplayMode::Dual);
    let (width, height) = surface.device_size();
    assert!(width <= max && height <= max);
    assert_eq!(surface.context().width(), width);
    assert_eq!(
        surface.read_sprite_layer().expect("sprite readback").dimensions(),
        (width, height)
    );
}

#[test]
fn software_display_never_panics_on_oversized_config() {
    let _lock = gpu_test_lock();
    let config = DisplayConfig {
        gpu: GpuInit::software(),
        ..DisplayConfig::new(4000.0, 10.0).with_pixel_ratio(3.0)
    };
    let surface = DisplaySurface::new(&config, PresentTarget::Offscreen);
    let (width, height) = surface.device_size();
    match surface.gpu().map(|gpu| gpu.max_texture_dimension()) {
        Some(max) => {
            assert!(width <= max && height <= max);
            assert_eq!(
                surface.read_sprite_layer().expect("sprite readback").dimensions(),
                (width, height)
            );
        }
        None => assert_eq!((width, height), (12000, 30)),
    }
}

// ── batch construction ──────────────────────────────────────────────────

#[test]
fn non_blendable_format_fails_the_whole_batch() {
    let _lock = gpu_test_lock();
    let Some(surface) = gpu_surface(8.0, 8.0) else {
        return;
    };
    let Some(gpu) = surface.gpu() else {
        return;
    };
    let result = BatchRenderer::new(gpu.device(), wgpu::TextureFormat::Rgba32Uint);
    assert!(matches!(result, Err(RenderError::ShaderProgram { program: "circle", .. })));
}

#[test]
fn failed_batch_build_falls_back_to_immediate() {
    let _lock = gpu_test_lock();
    let Some(surface) = gpu_surface(32.0, 32.0) else {
        return;
    };
    assert!(surface.is_dual());

    let mut draw = DrawFacade::from_surface(surface, |_, _| {
        Err(RenderError::ShaderProgram {
            program: "circle",
            message: "rejected".into(),
        })
    });
    assert_eq!(draw.backend(), Backend::Immediate);
    assert_eq!(draw.surface().mode(), DisplayMode::Immediate);
    assert!(draw.surface().gpu().is_none());

    draw.set_fill(Color::WHITE);
    draw.circle(10.0, 10.0, 5.0, true);
    assert_eq!(draw.pending(), 0);
    assert_eq!(draw.context().pixel(10, 10), Some([255, 255, 255, 255]));
    assert_eq!(draw.present(), PresentStatus::CanvasOnly);
}

#[test]
fn mismatched_target_format_draws_nothing() {
    let _lock = gpu_test_lock();
    let Some(mut surface) = gpu_surface(16.0, 16.0) else {
        return;
    };
    let Some(gpu) = surface.gpu() else {
        return;
    };
    let mut batch = BatchRenderer::new(gpu.device(), LAYER_FORMAT).expect("batch programs build");
    batch.record(BatchEntry::Circle(CircleEntry {
        center: Vec2::new(8.0, 8.0),
        radius: 6.0,
        color: RED,
    }));

    surface.clear(Color::BLACK);
    let stats = surface
        .render_sprites(|ctx, target| {
            let other = RenderCtx::new(
                ctx.device,
                ctx.queue,
                wgpu::TextureFormat::Bgra8Unorm,
                ctx.viewport,
                ctx.time,
            );
            batch.draw(&other, target)
        })
        .expect("sprite pass");
    assert_eq!(stats.draw_calls, 0);
    assert_eq!(batch.pending(), 0);

    let sprites = surface.read_sprite_layer().expect("sprite readback");
    assert_eq!(sprites.get_pixel(8, 8).0[3], 0);
}
