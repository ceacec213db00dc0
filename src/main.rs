//! Swale demo host - a wind-blown grass patch with live-tunable parameters.
//!
//! The host owns the render loop, clock, and camera; the grass core only
//! ever sees an immutable config snapshot plus accumulated simulation
//! time. Keyboard bindings stand in for a debug panel:
//!
//! Space pause | J/K time scale | Up/Down wind strength |
//! Left/Right wind direction | -/= patch size | ,/. blade count |
//! N/M segments | drag to orbit

use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use glam::{Vec2, Vec3};
use swale::core::{camera::Camera, logging, time::{FrameTimer, SimClock}};
use swale::grass::{FieldNoise, GrassConfig, GrassSystem};
use swale::render::{
    buffer::CameraBuffer,
    context::GpuContext,
    pipeline::ground::GroundUniforms,
    pipeline::{GrassPipeline, GroundPipeline},
    texture::DepthTexture,
};

const FIELD_SEED: u32 = 1481;
const FIELD_SIZE: u32 = 256;

struct RenderResources {
    camera_buffer: CameraBuffer,
    ground_pipeline: GroundPipeline,
    grass_pipeline: GrassPipeline,
    depth: DepthTexture,
}

impl RenderResources {
    fn new(gpu: &GpuContext, grass: &GrassSystem, width: u32, height: u32) -> Self {
        let camera_buffer = CameraBuffer::new(&gpu.device);
        let ground_pipeline = GroundPipeline::new(&gpu.device, &camera_buffer, gpu.format());

        let field = FieldNoise::bake(FIELD_SEED, FIELD_SIZE);
        let (topology, instances) = grass.build_geometry();
        let grass_pipeline = GrassPipeline::new(
            &gpu.device,
            &gpu.queue,
            &camera_buffer,
            &topology,
            instances,
            &field,
            gpu.format(),
        );

        let depth = DepthTexture::new(&gpu.device, width, height);

        Self {
            camera_buffer,
            ground_pipeline,
            grass_pipeline,
            depth,
        }
    }
}

struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    resources: Option<RenderResources>,
    camera: Camera,
    grass: GrassSystem,
    timer: FrameTimer,
    clock: SimClock,
    wind_angle: f32,
    orbiting: bool,
}

impl App {
    fn new() -> Self {
        Self {
            window: None,
            gpu: None,
            resources: None,
            camera: Camera::look_at(Vec3::new(1.0, 0.75, 1.0), Vec3::ZERO, Vec3::Y),
            grass: GrassSystem::new(GrassConfig::default()),
            timer: FrameTimer::new(),
            clock: SimClock::new(),
            wind_angle: 0.0,
            orbiting: false,
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode) {
        let config = *self.grass.config();
        match code {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::Space => {
                self.clock.paused = !self.clock.paused;
                log::info!("time {}", if self.clock.paused { "paused" } else { "running" });
            }
            KeyCode::KeyJ => {
                self.clock.time_scale = (self.clock.time_scale - 0.25).max(0.0);
                log::info!("time scale {:.2}", self.clock.time_scale);
            }
            KeyCode::KeyK => {
                self.clock.time_scale = (self.clock.time_scale + 0.25).min(3.0);
                log::info!("time scale {:.2}", self.clock.time_scale);
            }
            KeyCode::ArrowUp => {
                self.grass
                    .set_wind_strength((config.wind.strength + 0.05).min(2.0));
            }
            KeyCode::ArrowDown => {
                self.grass
                    .set_wind_strength((config.wind.strength - 0.05).max(0.0));
            }
            KeyCode::ArrowLeft | KeyCode::ArrowRight => {
                let step = if code == KeyCode::ArrowLeft { 0.1 } else { -0.1 };
                self.wind_angle += step;
                self.grass.set_wind_direction(Vec2::new(
                    self.wind_angle.cos(),
                    self.wind_angle.sin(),
                ));
            }
            KeyCode::Minus => {
                self.grass.set_patch_size((config.patch_size - 0.05).max(0.1));
            }
            KeyCode::Equal => {
                self.grass.set_patch_size((config.patch_size + 0.05).min(10.0));
            }
            KeyCode::Comma => {
                self.grass.set_blade_count((config.blade_count / 2).max(512));
            }
            KeyCode::Period => {
                self.grass
                    .set_blade_count((config.blade_count * 2).min(1024 * 1024));
            }
            KeyCode::KeyN => {
                self.grass.set_segments(config.segments.saturating_sub(1).max(2));
            }
            KeyCode::KeyM => {
                self.grass.set_segments((config.segments + 1).min(10));
            }
            _ => {}
        }
    }

    fn render_frame(&mut self) {
        let (Some(gpu), Some(resources)) = (&self.gpu, &mut self.resources) else {
            return;
        };

        self.timer.tick();
        self.clock.advance(self.timer.delta_secs());

        // Destructive parameter changes coalesce into one synchronous
        // rebuild; the previous buffers stay renderable until the swap.
        if let Some((topology, instances)) = self.grass.take_rebuild_request() {
            resources
                .grass_pipeline
                .rebuild(&gpu.device, &topology, instances);
        }

        resources.camera_buffer.update(&gpu.queue, &self.camera);
        resources.grass_pipeline.update_uniforms(
            &gpu.queue,
            &self.grass.build_uniforms(self.clock.elapsed()),
        );
        resources.ground_pipeline.update_uniforms(
            &gpu.queue,
            &GroundUniforms {
                half_extent: (self.grass.config().patch_size * 1.5).max(2.5),
                ..GroundUniforms::default()
            },
        );

        // A dropped frame is recoverable; skip the draw and retry.
        let frame = match gpu.get_current_texture() {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("surface texture unavailable, skipping frame: {}", e);
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        resources.ground_pipeline.render(
            &mut encoder,
            &view,
            &resources.depth.view,
            resources.camera_buffer.bind_group(),
        );
        resources.grass_pipeline.render(
            &mut encoder,
            &view,
            &resources.depth.view,
            resources.camera_buffer.bind_group(),
        );

        gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        if let Some(window) = &self.window {
            let config = self.grass.config();
            window.set_title(&format!(
                "Swale - {:.1} FPS | {} blades x {} segments | wind {:.2}",
                self.timer.fps(),
                config.blade_count,
                config.segments,
                config.wind.strength,
            ));
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title("Swale")
            .with_inner_size(PhysicalSize::new(1280, 720));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("Failed to create window"),
        );

        let gpu = pollster::block_on(GpuContext::new(window.clone()))
            .expect("Failed to create GPU context");

        let size = window.inner_size();
        self.camera.set_aspect(size.width as f32, size.height as f32);

        log::info!("Window created: {}x{}", size.width, size.height);

        let resources = RenderResources::new(&gpu, &self.grass, size.width, size.height);

        self.window = Some(window);
        self.resources = Some(resources);
        self.gpu = Some(gpu);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size.width, size.height);
                    self.camera.set_aspect(size.width as f32, size.height as f32);
                    if let Some(resources) = &mut self.resources {
                        resources.depth = DepthTexture::new(&gpu.device, size.width, size.height);
                    }
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        self.handle_key(event_loop, code);
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.orbiting = state == ElementState::Pressed;
                }
            }
            WindowEvent::RedrawRequested => {
                self.render_frame();
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.orbiting {
                self.camera
                    .orbit(Vec3::ZERO, delta.0 as f32 * 0.005, delta.1 as f32 * 0.005);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() {
    logging::init();
    log::info!("Swale starting...");

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
    }
}
