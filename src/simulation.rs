//! Simulation builder and runner

use crate::config::{EmitterConfig, FlurryConfig, RenderConfig};
use crate::error::SimulationError;
use crate::gpu::GpuState;
use crate::system::ParticleSystem;
use crate::time::Time;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

/// A windowed particle simulation.
///
/// Use method chaining to configure, then call `.run()` to start.
///
/// Controls: drag with the left mouse button to orbit, scroll to zoom,
/// `F5` to reset, `Space` to pause and `Escape` to quit.
pub struct Simulation {
    config: FlurryConfig,
    seed: Option<u64>,
}

impl Simulation {
    /// Create a new simulation with default settings.
    pub fn new() -> Self {
        Self {
            config: FlurryConfig::default(),
            seed: None,
        }
    }

    /// Use a full config, usually loaded from a file.
    pub fn with_config(mut self, config: FlurryConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the emitter parameters.
    pub fn with_emitter(mut self, emitter: EmitterConfig) -> Self {
        self.config.emitter = emitter;
        self
    }

    /// Set the window and camera parameters.
    pub fn with_render_config(mut self, render: RenderConfig) -> Self {
        self.config.render = render;
        self
    }

    /// Use a fixed seed for particle randomization.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Run the simulation. This blocks until the window is closed.
    pub fn run(self) -> Result<(), SimulationError> {
        let FlurryConfig { emitter, render } = self.config;
        let system = match self.seed {
            Some(seed) => ParticleSystem::with_seed(emitter, seed)?,
            None => ParticleSystem::new(emitter)?,
        };

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(system, render);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

struct App {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    system: ParticleSystem,
    render: RenderConfig,
    time: Time,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    error: Option<SimulationError>,
}

impl App {
    fn new(system: ParticleSystem, render: RenderConfig) -> Self {
        Self {
            window: None,
            gpu_state: None,
            system,
            render,
            time: Time::new(),
            mouse_pressed: false,
            last_mouse_pos: None,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: SimulationError) {
        log::error!("{err}");
        self.error.get_or_insert(err);
        event_loop.exit();
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SimulationError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.render.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render.width,
                self.render.height,
            ));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu_state = pollster::block_on(GpuState::new(
            window.clone(),
            self.system.store(),
            &self.render,
        ))?;

        self.window = Some(window);
        self.gpu_state = Some(gpu_state);
        // The first frame should not see the time spent creating the device.
        self.time = Time::new();
        Ok(())
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode) {
        match code {
            KeyCode::F5 => {
                self.system.reset();
                log::info!("reset to {} particles", self.system.active_count());
            }
            KeyCode::Space => {
                self.time.toggle_pause();
                log::info!("{}", if self.time.is_paused() { "paused" } else { "resumed" });
            }
            KeyCode::Escape => event_loop.exit(),
            _ => {}
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let dt = self.time.update();
        if !self.time.is_paused() {
            self.system.tick(dt);
        }

        let Some(gpu_state) = &mut self.gpu_state else {
            return;
        };
        self.system.upload(gpu_state);

        match gpu_state.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                gpu_state.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => log::error!("render error: {e:?}"),
        }

        if let Some(window) = &self.window {
            if self.time.frame() % 30 == 0 {
                window.set_title(&format!(
                    "{} | {:.0} fps | {} particles",
                    self.render.title,
                    self.time.fps(),
                    self.system.active_count()
                ));
            }
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.init_window(event_loop) {
                self.fail(event_loop, err);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, code),
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let Some((last_x, last_y)) = self.last_mouse_pos {
                        let dx = position.x - last_x;
                        let dy = position.y - last_y;

                        if let Some(gpu_state) = &mut self.gpu_state {
                            gpu_state.camera.orbit(dx as f32, dy as f32);
                        }
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.camera.zoom(scroll);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}
