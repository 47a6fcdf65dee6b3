//! Heliwave binary: window, event loop, and the per-frame bridge between
//! the simulation and the renderer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use heliwave::cli::Args;
use heliwave::input::{Control, InputState};
use heliwave::ocean::OceanMesh;
use heliwave::params::{OceanPatch, RecordingConfig, RenderConfig};
use heliwave::rendering::{
    heli_instances, pad_instance, OceanUniforms, PropInstance, PropUniforms, RenderSystem,
    SkyUniforms, HELI_INSTANCE_COUNT,
};
use heliwave::sim::Simulation;

/// Main application state
struct App {
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,

    sim: Simulation,
    input: InputState,
    ocean_mesh: OceanMesh,

    render_config: RenderConfig,
    recording: Option<RecordingConfig>,
    start_wireframe: bool,

    last_frame: Option<Instant>,
    frame_num: usize,
    fps_frames: u32,
    fps_window_start: Instant,
}

impl App {
    fn new(args: &Args, recording: Option<RecordingConfig>) -> Self {
        let seed = args.resolved_seed();
        info!(
            "scattering {} helipads with seed {seed}, sea scale {}",
            args.helipads, args.sea_scale
        );

        Self {
            window: None,
            render_system: None,
            sim: Simulation::new(args.helipads, seed, args.sea_scale),
            input: InputState::new(),
            ocean_mesh: OceanMesh::new(&OceanPatch::default()),
            render_config: args.render_config(),
            recording,
            start_wireframe: args.wireframe,
            last_frame: None,
            frame_num: 0,
            fps_frames: 0,
            fps_window_start: Instant::now(),
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        let window_attributes = Window::default_attributes()
            .with_title("Heliwave")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let render_system = pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            &self.ocean_mesh,
            self.sim.pads.pads.len(),
            self.recording.clone(),
            self.start_wireframe,
        ));
        let render_system = match render_system {
            Ok(render_system) => render_system,
            Err(e) => {
                error!("failed to initialize rendering: {e}");
                event_loop.exit();
                return;
            }
        };

        info!("controls: W/S collective, A/D pedals, arrows cyclic, F1 wireframe, Esc quits");

        self.window = Some(window);
        self.render_system = Some(render_system);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                self.render_config.window_width = size.width.max(1);
                self.render_config.window_height = size.height.max(1);
                if let Some(render_system) = &mut self.render_system {
                    render_system.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state,
                        physical_key: PhysicalKey::Code(code),
                        repeat,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, code, state, repeat),
            WindowEvent::RedrawRequested => {
                self.frame(event_loop);
            }
            _ => {}
        }
    }
}

impl App {
    fn handle_key(
        &mut self,
        event_loop: &ActiveEventLoop,
        code: KeyCode,
        state: ElementState,
        repeat: bool,
    ) {
        match code {
            KeyCode::Escape if state == ElementState::Pressed => event_loop.exit(),
            KeyCode::F1 if state == ElementState::Pressed && !repeat => {
                if let Some(render_system) = &mut self.render_system {
                    let on = render_system.toggle_wireframe();
                    info!("wireframe {}", if on { "on" } else { "off" });
                }
            }
            _ => {
                if let Some(control) = Control::from_key(code) {
                    match state {
                        ElementState::Pressed => self.input.press(control),
                        ElementState::Released => self.input.release(control),
                    }
                }
            }
        }
    }

    /// Advance the simulation one frame and draw it.
    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(render_system) = &mut self.render_system else {
            return;
        };

        // Recording replaces wall-clock time with the capture frame rate so
        // the PNG sequence plays back at true speed regardless of how long
        // each frame took to save.
        let now = Instant::now();
        let dt_raw = match &self.recording {
            Some(config) => 1.0 / config.fps as f32,
            None => self
                .last_frame
                .map(|last| (now - last).as_secs_f32())
                .unwrap_or(0.0),
        };
        self.last_frame = Some(now);

        let snapshot = self.input.snapshot();
        self.sim.advance(dt_raw, &snapshot);

        let (view_proj, eye) = self.sim.camera.view_proj(&self.render_config);
        let sun_dir = self.render_config.sun_direction().to_array();
        let hull = self.sim.hull_position;

        render_system.update_sky_uniforms(&SkyUniforms {
            inv_view_proj: view_proj.inverse().to_cols_array_2d(),
            sun_dir,
            _pad0: 0.0,
            camera_pos: eye.to_array(),
            _pad1: 0.0,
        });
        render_system.update_ocean_uniforms(&OceanUniforms {
            view_proj: view_proj.to_cols_array_2d(),
            waves: self.sim.sea.packed(),
            patch_offset: [hull.x, hull.z],
            time: self.sim.clock,
            _pad0: 0.0,
            sun_dir,
            _pad1: 0.0,
            camera_pos: eye.to_array(),
            _pad2: 0.0,
        });
        render_system.update_prop_uniforms(&PropUniforms {
            view_proj: view_proj.to_cols_array_2d(),
            light_dir: self.sim.sun.direction().to_array(),
            _pad0: 0.0,
            sun_dir,
            _pad1: 0.0,
        });

        let mut instances: Vec<PropInstance> =
            Vec::with_capacity(HELI_INSTANCE_COUNT + self.sim.pads.pads.len());
        instances.extend_from_slice(&heli_instances(
            self.sim.hull_position,
            self.sim.hull_orientation,
            self.sim.rotor_position,
            self.sim.rotor_orientation,
            self.sim.rotor_spin,
        ));
        for pad in &self.sim.pads.pads {
            instances.push(pad_instance(pad.position, pad.orientation));
        }
        render_system.update_instances(&instances);

        match render_system.render(self.frame_num) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                render_system.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("out of GPU memory, shutting down");
                event_loop.exit();
                return;
            }
            Err(e) => warn!("dropped frame: {e:?}"),
        }
        self.frame_num += 1;

        self.fps_frames += 1;
        if now - self.fps_window_start > Duration::from_secs(1) {
            debug!("fps: {}", self.fps_frames);
            self.fps_frames = 0;
            self.fps_window_start = now;
        }

        if let Some(config) = &self.recording {
            if self.frame_num >= config.total_frames() {
                info!(
                    "recorded {} frames to {}",
                    self.frame_num,
                    config.frames_dir()
                );
                event_loop.exit();
            }
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let recording = match args.recording_config() {
        Ok(recording) => recording,
        Err(e) => {
            error!("could not prepare recording directory: {e}");
            std::process::exit(1);
        }
    };
    if let Some(config) = &recording {
        info!(
            "recording {} frames at {} fps to {}",
            config.total_frames(),
            config.fps,
            config.frames_dir()
        );
    }

    let mut app = App::new(&args, recording);
    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            error!("failed to create event loop: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = event_loop.run_app(&mut app) {
        error!("event loop error: {e}");
    }
}
