use std::sync::Arc;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::coords::Viewport;
use crate::core::{App as CoreApp, AppControl, FrameCtx};
use crate::draw::DrawFacade;
use crate::surface::{DisplayConfig, PresentStatus, PresentTarget};
use crate::time::FrameClock;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "flotilla".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window and drives `app` until it exits or the window closes.
    ///
    /// `display` supplies everything but the size and pixel ratio, which come
    /// from the window.
    pub fn run<A>(config: RuntimeConfig, display: DisplayConfig, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, display, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        Ok(())
    }
}

struct WindowEntry {
    window: Arc<Window>,
    draw: DrawFacade,
    clock: FrameClock,
    warned_canvas_only: bool,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    display: DisplayConfig,
    app: A,

    entry: Option<WindowEntry>,
    exit_requested: bool,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, display: DisplayConfig, app: A) -> Self {
        Self {
            config,
            display,
            app,
            entry: None,
            exit_requested: false,
        }
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let scale = window.scale_factor();
        let mut display = self.display.clone();
        display.size = logical_viewport(window.inner_size(), scale);
        display.pixel_ratio = scale as f32;

        let draw = DrawFacade::new(&display, PresentTarget::Window(Arc::clone(&window)));
        self.app.on_resize(draw.surface().viewport());

        self.entry = Some(WindowEntry {
            window,
            draw,
            clock: FrameClock::default(),
            warned_canvas_only: false,
        });
        Ok(())
    }

    fn resize(&mut self, size: PhysicalSize<u32>, scale: f64) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        let viewport = logical_viewport(size, scale);
        entry.draw.resize(viewport.width, viewport.height, scale as f32);
        entry.clock.reset();
        self.app.on_resize(entry.draw.surface().viewport());
        entry.window.request_redraw();
    }

    fn redraw(&mut self) -> AppControl {
        let Some(entry) = self.entry.as_mut() else {
            return AppControl::Continue;
        };

        let time = entry.clock.tick();
        entry.draw.advance_time(time.dt);
        entry.draw.clear(self.display.clear_color);

        let control = {
            let mut ctx = FrameCtx::new(&mut entry.draw, time);
            self.app.on_frame(&mut ctx)
        };

        entry.window.pre_present_notify();
        let (_, status) = entry.draw.end_frame();
        match status {
            PresentStatus::Fatal => {
                log::error!("surface lost beyond recovery; exiting");
                return AppControl::Exit;
            }
            PresentStatus::CanvasOnly if !entry.warned_canvas_only => {
                log::warn!("display runs without a GPU layer; window output is unavailable");
                entry.warned_canvas_only = true;
            }
            _ => {}
        }
        control
    }
}

fn logical_viewport(size: PhysicalSize<u32>, scale: f64) -> Viewport {
    let logical: LogicalSize<f64> = size.to_logical(scale);
    Viewport::new(logical.width as f32, logical.height as f32)
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            log::error!("failed to create window: {e:#}");
            self.exit_requested = true;
            event_loop.exit();
            return;
        }

        if let Some(entry) = self.entry.as_ref() {
            entry.window.request_redraw();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Continuous redraw: the scene animates every frame.
        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some(entry) = self.entry.as_ref() {
            entry.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }
        if self.entry.as_ref().map(|e| e.window.id()) != Some(window_id) {
            return;
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.exit_requested = true;
            event_loop.exit();
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                self.entry = None;
                self.exit_requested = true;
            }

            WindowEvent::Resized(new_size) => {
                let scale = self.entry.as_ref().map_or(1.0, |e| e.window.scale_factor());
                self.resize(*new_size, scale);
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let size = self.entry.as_ref().map(|e| e.window.inner_size());
                if let Some(size) = size {
                    self.resize(size, *scale_factor);
                }
            }

            WindowEvent::RedrawRequested => {
                if self.redraw() == AppControl::Exit {
                    self.exit_requested = true;
                }
            }

            _ => {}
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }
}
