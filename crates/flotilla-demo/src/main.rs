//! Orbiting swarm demo.
//!
//! Windowed by default. `--headless` renders a fixed number of frames
//! offscreen and writes the last one as a PNG.

mod scene;

use anyhow::{Context, Result};
use clap::Parser;
use flotilla_engine::core::{App, AppControl, FrameCtx};
use flotilla_engine::draw::DrawFacade;
use flotilla_engine::logging::{LoggingConfig, init_logging};
use flotilla_engine::surface::{BackendPreference, DisplayConfig, PresentTarget};
use flotilla_engine::time::FrameTime;
use flotilla_engine::window::{Runtime, RuntimeConfig};

use scene::Swarm;

const HEADLESS_DT: f32 = 1.0 / 60.0;

/// Thousands of ships orbiting a station, drawn through the instanced
/// renderer.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Skip the GPU path and draw everything on the 2D canvas
    #[arg(long = "2d")]
    force_2d: bool,

    /// Number of ships in the swarm
    #[arg(long, default_value_t = 2000)]
    ships: usize,

    /// Render this many frames offscreen instead of opening a window
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u64>,

    /// Where `--headless` writes its last frame
    #[arg(long, value_name = "PATH", default_value = "frame.png")]
    out: String,
}

impl Args {
    fn display(&self) -> DisplayConfig {
        let backend = if self.force_2d {
            BackendPreference::ForceImmediate
        } else {
            BackendPreference::Auto
        };
        DisplayConfig::new(1280.0, 720.0).with_backend(backend)
    }
}

struct SwarmApp {
    swarm: Swarm,
}

impl App for SwarmApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        self.swarm.update(ctx.dt(), ctx.viewport());
        self.swarm.draw(ctx.draw);
        AppControl::Continue
    }
}

fn run_headless(args: &Args, frames: u64) -> Result<()> {
    let display = args.display();
    let mut draw = DrawFacade::new(&display, PresentTarget::Offscreen);
    let mut swarm = Swarm::new(args.ships);
    log::info!("headless: {frames} frames on the {:?} backend", draw.backend());

    for index in 0..frames {
        let time = FrameTime::fixed(HEADLESS_DT, index);
        draw.advance_time(time.dt);
        draw.clear(display.clear_color);
        swarm.update(time.dt, draw.surface().viewport());
        swarm.draw(&mut draw);

        let issued = draw.issued();
        let (flushed, status) = draw.end_frame();
        let stats = flushed.context("flush failed")?;
        log::debug!(
            "frame {index}: {issued} primitives, {} draw calls, {status:?}",
            stats.draw_calls
        );
    }

    log::info!("{} pooled effects alive at the end", swarm.live_entities());

    let image = draw
        .surface()
        .read_presented()
        .context("failed to read back the presented frame")?;
    image
        .save(&args.out)
        .with_context(|| format!("failed to write {}", args.out))?;
    log::info!("wrote {}x{} frame to {}", image.width(), image.height(), args.out);
    Ok(())
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let args = Args::parse();
    if let Some(frames) = args.headless {
        return run_headless(&args, frames);
    }

    let app = SwarmApp {
        swarm: Swarm::new(args.ships),
    };
    Runtime::run(RuntimeConfig::default(), args.display(), app)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("flotilla-demo").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_to_windowed_auto() {
        let args = parse(&[]).unwrap();
        assert!(!args.force_2d);
        assert_eq!(args.ships, 2000);
        assert_eq!(args.headless, None);
        assert_eq!(args.out, "frame.png");
        assert_eq!(args.display().backend, BackendPreference::Auto);
    }

    #[test]
    fn flags_are_parsed() {
        let args = parse(&["--2d", "--headless", "5", "--ships", "10", "--out", "a.png"]).unwrap();
        assert!(args.force_2d);
        assert_eq!(args.headless, Some(5));
        assert_eq!(args.ships, 10);
        assert_eq!(args.out, "a.png");
        assert_eq!(args.display().backend, BackendPreference::ForceImmediate);
    }

    #[test]
    fn bad_arguments_are_rejected() {
        assert!(parse(&["--frobnicate"]).is_err());
        assert!(parse(&["--headless"]).is_err());
        assert!(parse(&["--ships", "many"]).is_err());
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
