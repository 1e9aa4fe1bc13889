// SPDX-License-Identifier: MIT OR Apache-2.0
//! Window, graphics setup and the event loop driving the canvas runtime.

use crate::config::{AppConfig, AppError, Result};
use crate::input;
use crate::overlay::OverlayWindow;
use crate::render::{EguiSceneRenderer, EguiTextMeasurer};
use egui_wgpu::wgpu;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};
use wirecanvas_graph::{demo_graph, demo_registry, NodeVisual};
use wirecanvas_runtime::{FrameOutcome, InputQueue, Runtime};

/// Graphics state for wgpu rendering
struct GraphicsState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    egui_renderer: egui_wgpu::Renderer,
}

impl GraphicsState {
    fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| AppError::RendererInit(e.to_string()))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| AppError::RendererInit("no suitable GPU adapter".to_string()))?;

        tracing::info!("Using GPU: {}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Wirecanvas Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            },
            None,
        ))
        .map_err(|e| AppError::RendererInit(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(wgpu::TextureFormat::is_srgb)
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| AppError::RendererInit("surface reports no formats".to_string()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            egui_renderer,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn render(
        &mut self,
        egui_ctx: &egui::Context,
        full_output: egui::FullOutput,
        window: &Window,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Canvas Encoder"),
        });

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer.update_texture(&self.device, &self.queue, *id, image_delta);
        }

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Canvas Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color {
                                r: 0.1,
                                g: 0.1,
                                b: 0.1,
                                a: 1.0,
                            }),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();

            self.egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        Ok(())
    }
}

/// State that exists once the window is open
struct CanvasRunning {
    window: Arc<Window>,
    graphics: GraphicsState,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    runtime: Runtime,
    input: InputQueue,
    scene_renderer: EguiSceneRenderer,
    measurer: EguiTextMeasurer,
    overlay: OverlayWindow,
}

impl CanvasRunning {
    fn new(event_loop: &ActiveEventLoop, config: &AppConfig) -> Result<Self> {
        let window_attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height))
            .with_min_inner_size(winit::dpi::LogicalSize::new(320, 240));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .map_err(|e| AppError::WindowCreation(e.to_string()))?,
        );

        tracing::info!("Initializing graphics...");
        let graphics = GraphicsState::new(Arc::clone(&window))?;

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2 * 1024),
        );

        let size = window.inner_size();
        let input = InputQueue::new();
        let mut runtime = Runtime::new(
            config.runtime.clone(),
            egui::vec2(size.width as f32, size.height as f32),
            Box::new(input.clone()),
        )?;

        let mut overlay = OverlayWindow::new(config.show_overlay);
        overlay.attach(runtime.debug());

        if config.seed_demo_graph {
            seed_demo_graph(&mut runtime, config);
        }

        let mut scene_renderer = EguiSceneRenderer::new(egui_ctx.clone());
        scene_renderer.set_pixels_per_point(window.scale_factor() as f32);
        let measurer = EguiTextMeasurer::new(egui_ctx.clone());

        tracing::info!("Canvas initialized, window size {:?}", size);

        Ok(Self {
            window,
            graphics,
            egui_ctx,
            egui_state,
            runtime,
            input,
            scene_renderer,
            measurer,
            overlay,
        })
    }

    /// Run the canvas frame inside an egui pass and present it
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let now = Instant::now();
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            let outcome = self
                .runtime
                .frame(now, &mut self.measurer, &mut self.scene_renderer);
            if outcome == FrameOutcome::Rendered {
                tracing::trace!("Frame {}", self.runtime.time().frame);
            }
            self.scene_renderer.paint();
            self.overlay.ui(ctx, &self.runtime);
        });

        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output.clone());

        match self.graphics.render(&self.egui_ctx, full_output, &self.window) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = self.window.inner_size();
                self.graphics.resize(size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("Out of GPU memory!");
                event_loop.exit();
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("Surface timeout");
            }
        }
    }
}

/// Place every node of the demo graph on the canvas
fn seed_demo_graph(runtime: &mut Runtime, config: &AppConfig) {
    let registry = demo_registry();
    for placement in demo_graph() {
        let Some(data) = registry.create(placement.type_id) else {
            tracing::warn!("Demo graph references unknown node type '{}'", placement.type_id);
            continue;
        };
        runtime.add_object(Box::new(
            NodeVisual::new(data)
                .with_config(config.layout.clone())
                .with_position(placement.position),
        ));
    }
    tracing::debug!("Seeded {} demo nodes", runtime.object_count());
}

/// Main application
pub struct CanvasApp {
    config: AppConfig,
    running: Option<CanvasRunning>,
    error: Option<AppError>,
}

impl CanvasApp {
    /// Create the application; the window opens once the event loop resumes
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            running: None,
            error: None,
        }
    }

    /// Run the application until the window closes
    pub fn run(config: AppConfig) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut app = CanvasApp::new(config);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl ApplicationHandler for CanvasApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }

        tracing::info!("Creating canvas window...");
        match CanvasRunning::new(event_loop, &self.config) {
            Ok(running) => self.running = Some(running),
            Err(error) => {
                tracing::error!("Startup failed: {error}");
                self.error = Some(error);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(running) = &mut self.running else {
            return;
        };

        let response = running.egui_state.on_window_event(&running.window, &event);

        match &event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                tracing::debug!("Window resized to {:?}", new_size);
                running.graphics.resize(*new_size);
                input::forward(&running.input, &event);
                running.window.request_redraw();
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                running.scene_renderer.set_pixels_per_point(*scale_factor as f32);
            }
            WindowEvent::RedrawRequested => running.redraw(event_loop),
            _ if input::passes_to_canvas(
                &event,
                response.consumed,
                running.runtime.pointer().is_dragging(),
            ) =>
            {
                if input::forward(&running.input, &event) {
                    running.window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(running) = &self.running else {
            return;
        };
        let now = Instant::now();
        if running.runtime.frame_due(now) {
            running.window.request_redraw();
        }
        let interval = Duration::from_secs_f64(running.runtime.config().frame_interval());
        event_loop.set_control_flow(ControlFlow::WaitUntil(now + interval));
    }
}
