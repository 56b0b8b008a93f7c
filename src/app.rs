// ============================================================================
// app.rs — LifeRewind
// Application state and winit event-loop handler. Translates raw input into
// core commands, ticks the sandbox once per frame, and renders the result.
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{Key, NamedKey},
    window::{Window, WindowAttributes},
};

use crate::camera::CameraState;
use crate::config::SandboxConfig;
use crate::input::PointerState;
use crate::metrics::GridStats;
use crate::pipeline::{create_grid_pipeline, GridPipeline};
use crate::playback::{Command, PlaybackState, Sandbox};
use crate::renderer::HudRenderer;
use crate::ui::{self, ControlPanel};

// ======================== Application ========================

pub struct App {
    state: Option<AppState>,
    config: SandboxConfig,
}

struct AppState {
    // GPU
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,

    // Core + rendering
    sandbox: Sandbox,
    pipeline: GridPipeline,
    hud: HudRenderer,

    // Window
    window: Arc<Window>,

    // View & input
    camera: CameraState,
    pointer: PointerState,
    panel: ControlPanel,

    // egui
    egui_ctx: egui::Context,
    egui_winit_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,

    // Commands gathered from input and UI, drained into each tick
    pending: Vec<Command>,

    // Timing
    last_redraw: Instant,
    fps: f32,

    config: SandboxConfig,
}

impl App {
    pub fn new(config: SandboxConfig) -> Self {
        Self {
            state: None,
            config,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let window_attrs = WindowAttributes::default()
            .with_title(self.config.window_title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(1600u32, 900u32));

        let window = Arc::new(event_loop.create_window(window_attrs).unwrap());

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone()).unwrap();

        let (device, queue, surface_config) =
            pollster::block_on(init_gpu(&instance, &surface, &window));

        surface.configure(&device, &surface_config);

        let sandbox = Sandbox::new(&self.config);
        let pipeline = create_grid_pipeline(&device, &self.config, surface_config.format);
        let hud = HudRenderer::new(&device, &queue, surface_config.format);

        let mut camera = CameraState::default();
        camera.center_on(
            surface_config.width as f32,
            surface_config.height as f32,
            self.config.grid_width,
            self.config.grid_height,
        );

        // ---- Initialize egui ----
        let egui_ctx = egui::Context::default();
        let mut visuals = egui::Visuals::dark();
        visuals.window_fill = egui::Color32::from_rgba_premultiplied(27, 27, 35, 235);
        visuals.panel_fill = egui::Color32::from_rgba_premultiplied(20, 20, 28, 230);
        egui_ctx.set_visuals(visuals);

        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            event_loop,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let egui_renderer =
            egui_wgpu::Renderer::new(&device, surface_config.format, None, 1, false);

        log::info!(
            "LifeRewind initialized: {}x{} cells, {} frame history, {:.2}s period",
            self.config.grid_width,
            self.config.grid_height,
            self.config.history_size,
            self.config.simulate_period,
        );

        self.state = Some(AppState {
            device,
            queue,
            surface,
            surface_config,
            sandbox,
            pipeline,
            hud,
            window: window.clone(),
            camera,
            pointer: PointerState::default(),
            panel: ControlPanel::new(self.config.simulate_period),
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            pending: Vec::new(),
            last_redraw: Instant::now(),
            fps: 0.0,
            config: self.config.clone(),
        });

        // Initial redraw — required on macOS with winit 0.30
        window.request_redraw();
    }

    fn about_to_wait(&mut self, _event_loop: &winit::event_loop::ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        // Pass events to egui first
        let egui_response = state.egui_winit_state.on_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::KeyboardInput { event, .. } => {
                handle_keyboard(state, event_loop, &event, egui_response.consumed);
            }

            WindowEvent::CursorMoved { position, .. } => {
                state.pointer.pos = [position.x as f32, position.y as f32];
                if state.pointer.middle_down {
                    state.camera.drag_to(state.pointer.pos);
                }
            }

            WindowEvent::MouseInput { state: button_state, button, .. } => {
                handle_mouse_button(state, button, button_state, egui_response.consumed);
            }

            WindowEvent::MouseWheel { delta, .. } => {
                if !egui_response.consumed {
                    let scroll = match &delta {
                        MouseScrollDelta::LineDelta(_, y) => *y,
                        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.01,
                    };
                    state.camera.apply_scroll(
                        scroll,
                        state.config.grid_width,
                        state.config.grid_height,
                    );
                }
            }

            WindowEvent::Resized(new_size) => {
                if new_size.width > 0 && new_size.height > 0 {
                    state.surface_config.width = new_size.width;
                    state.surface_config.height = new_size.height;
                    state.surface.configure(&state.device, &state.surface_config);
                }
            }

            WindowEvent::RedrawRequested => {
                redraw(state);
            }

            _ => {}
        }
    }
}

// ======================== GPU Initialization ========================

async fn init_gpu(
    instance: &wgpu::Instance,
    surface: &wgpu::Surface<'_>,
    window: &Window,
) -> (wgpu::Device, wgpu::Queue, wgpu::SurfaceConfiguration) {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(surface),
            force_fallback_adapter: false,
        })
        .await
        .expect(
            "Failed to find a suitable GPU adapter.\n\
             LifeRewind requires a GPU with Vulkan, Metal, or DX12 support.",
        );

    log::info!("GPU: {}", adapter.get_info().name);

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("liferewind_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        )
        .await
        .expect("Failed to create device");

    let size = window.inner_size();
    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps
        .formats
        .iter()
        .find(|f| f.is_srgb())
        .copied()
        .unwrap_or(surface_caps.formats[0]);

    let surface_config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: surface_format,
        width: size.width.max(1),
        height: size.height.max(1),
        // The simulation is frame-rate independent; vsync pacing is fine.
        present_mode: wgpu::PresentMode::Fifo,
        alpha_mode: surface_caps.alpha_modes[0],
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };

    (device, queue, surface_config)
}

// ======================== Input Handling ========================

fn handle_keyboard(
    state: &mut AppState,
    event_loop: &winit::event_loop::ActiveEventLoop,
    event: &winit::event::KeyEvent,
    egui_consumed: bool,
) {
    let pressed = event.state.is_pressed();

    // Global hotkeys — always handled, even when egui has focus
    match &event.logical_key {
        Key::Named(NamedKey::Escape) if pressed => event_loop.exit(),
        Key::Named(NamedKey::F1) if pressed => {
            state.panel.show_panel = !state.panel.show_panel;
        }
        _ => {}
    }

    if egui_consumed {
        return;
    }

    match &event.logical_key {
        Key::Named(NamedKey::Space) if pressed => {
            state.pending.push(if state.sandbox.state() == PlaybackState::Playing {
                Command::Pause
            } else {
                Command::Play
            });
        }

        Key::Character(c) => match c.as_str() {
            "r" | "R" if pressed => state.pending.push(Command::Reset),
            "n" | "N" if pressed => state.pending.push(Command::Sprinkle {
                fill: state.panel.noise_fill as f64,
            }),
            "h" | "H" if pressed => {
                state.panel.extended_hud = !state.panel.extended_hud;
            }
            _ => {}
        },

        _ => {}
    }
}

fn handle_mouse_button(
    state: &mut AppState,
    button: MouseButton,
    button_state: ElementState,
    egui_consumed: bool,
) {
    let pressed = button_state == ElementState::Pressed;
    match button {
        MouseButton::Left => {
            // Releases always land, otherwise a press consumed by egui
            // would leave a stuck button.
            state.pointer.left_down = pressed && !egui_consumed;
            if pressed {
                state.pointer.begin_stroke();
            }
        }
        MouseButton::Right => {
            state.pointer.right_down = pressed && !egui_consumed;
            if pressed {
                state.pointer.begin_stroke();
            }
        }
        MouseButton::Middle => {
            if pressed && !egui_consumed {
                state.pointer.middle_down = true;
                state.camera.begin_drag(state.pointer.pos);
            } else if !pressed {
                state.pointer.middle_down = false;
                state.camera.end_drag();
            }
        }
        _ => {}
    }
}

/// Emit paint commands from the current pointer state: once on a fresh
/// press, then again whenever the cursor crosses into a new cell.
fn collect_paint_commands(state: &mut AppState) {
    if state.sandbox.state() != PlaybackState::Editing {
        return;
    }
    if !(state.pointer.left_down || state.pointer.right_down) {
        return;
    }
    if state.egui_ctx.wants_pointer_input() {
        return;
    }
    let Some((x, y)) = state.camera.cell_at(
        state.pointer.pos,
        state.config.grid_width,
        state.config.grid_height,
    ) else {
        return;
    };
    if state.pointer.last_paint_cell == Some((x, y)) {
        return;
    }
    state.pointer.last_paint_cell = Some((x, y));
    state.pending.push(Command::Paint {
        x,
        y,
        alive: !state.pointer.right_down,
    });
}

// ======================== Frame Rendering ========================

fn redraw(state: &mut AppState) {
    // FPS (exponential moving average)
    let now = Instant::now();
    let dt = now.duration_since(state.last_redraw).as_secs_f32().max(0.0001);
    state.last_redraw = now;
    state.fps = state.fps * 0.95 + (1.0 / dt) * 0.05;

    collect_paint_commands(state);

    // ---- egui frame (reads the pre-tick view, emits commands) ----
    let raw_input = state.egui_winit_state.take_egui_input(&state.window);
    let full_output = {
        let view = state.sandbox.view();
        let stats = GridStats::from_grid(view.grid);
        let ring = state.sandbox.ring();
        let panel = &mut state.panel;
        let pending = &mut state.pending;
        state.egui_ctx.run(raw_input, |ctx| {
            ui::render_ui(ctx, &view, &stats, ring, panel, pending);
        })
    };
    state
        .egui_winit_state
        .handle_platform_output(&state.window, full_output.platform_output);

    // ---- Tick the core ----
    state.sandbox.set_simulate_period(state.panel.period);
    let commands = std::mem::take(&mut state.pending);
    state.sandbox.tick(dt, &commands);

    // ---- Upload display data ----
    let hover = if state.sandbox.state() == PlaybackState::Editing
        && !state.egui_ctx.wants_pointer_input()
    {
        state.camera.cell_at(
            state.pointer.pos,
            state.config.grid_width,
            state.config.grid_height,
        )
    } else {
        None
    };

    let win_w = state.surface_config.width;
    let win_h = state.surface_config.height;
    {
        let view = state.sandbox.view();
        let stats = GridStats::from_grid(view.grid);
        state
            .pipeline
            .upload(&state.queue, view.grid, &state.camera.uniforms(), hover);
        state.hud.prepare(
            &state.device,
            &state.queue,
            &view,
            &stats,
            state.fps,
            state.camera.zoom,
            state.sandbox.simulate_period(),
            state.panel.extended_hud,
            win_w,
            win_h,
        );
    }

    // ---- Render pass ----
    let output = match state.surface.get_current_texture() {
        Ok(t) => t,
        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
            state.surface.configure(&state.device, &state.surface_config);
            return;
        }
        Err(e) => {
            log::error!("Surface error: {:?}", e);
            return;
        }
    };

    let view = output
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = state
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("grid_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&state.pipeline.render_pipeline);
        pass.set_bind_group(0, &state.pipeline.bind_group, &[]);
        pass.draw(0..6, 0..1);

        state.hud.render(&mut pass);
    }

    state.queue.submit(std::iter::once(encoder.finish()));

    // ---- egui render pass (on top, separate encoder) ----
    let paint_jobs = state
        .egui_ctx
        .tessellate(full_output.shapes, full_output.pixels_per_point);

    for (id, image_delta) in &full_output.textures_delta.set {
        state
            .egui_renderer
            .update_texture(&state.device, &state.queue, *id, image_delta);
    }

    let screen_descriptor = egui_wgpu::ScreenDescriptor {
        size_in_pixels: [win_w, win_h],
        pixels_per_point: full_output.pixels_per_point,
    };

    let mut egui_encoder = state
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });

    state.egui_renderer.update_buffers(
        &state.device,
        &state.queue,
        &mut egui_encoder,
        &paint_jobs,
        &screen_descriptor,
    );

    render_egui_pass(
        &state.egui_renderer,
        &mut egui_encoder,
        &view,
        &paint_jobs,
        &screen_descriptor,
    );

    state.queue.submit(std::iter::once(egui_encoder.finish()));

    output.present();

    for id in &full_output.textures_delta.free {
        state.egui_renderer.free_texture(id);
    }
    state.hud.trim();

    state.window.request_redraw();
}

// ======================== egui Render Helper ========================

/// Render egui paint jobs into a render pass.
/// Extracted as a free function to decouple the egui::Renderer lifetime
/// from the AppState borrow, allowing the render pass encoder to be local.
fn render_egui_pass(
    renderer: &egui_wgpu::Renderer,
    encoder: &mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    paint_jobs: &[egui::ClippedPrimitive],
    screen_descriptor: &egui_wgpu::ScreenDescriptor,
) {
    let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("egui_render_pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    // forget_lifetime converts RenderPass<'encoder> → RenderPass<'static>
    // which is required by egui_wgpu::Renderer::render in wgpu 24.
    let mut pass = pass.forget_lifetime();
    renderer.render(&mut pass, paint_jobs, screen_descriptor);
}
