use std::sync::Arc;

use egui_wgpu::ScreenDescriptor;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::export::{self, SnapshotConfig};
use crate::renderer::Renderer;
use crate::survey::{run_survey, PatternSurvey, SurveyParams};
use crate::ui::{self, UiActions, UiState};

/// Application state managing the survey, rendering, and user interaction.
pub struct App {
    /// GPU resources (initialized after window creation).
    gpu: Option<GpuState>,
    /// Current survey of the range.
    survey: PatternSurvey,
    /// Vertical distance between adjacent pattern rows, in plot units.
    spacing: u32,
    ui_state: UiState,
}

struct GpuState {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: Renderer,
    egui_ctx: egui::Context,
    egui_input: egui_winit::State,
}

impl App {
    pub fn new(params: SurveyParams, spacing: u32) -> Self {
        let survey = run_survey(params);
        survey.print_key();
        let ui_state = UiState::new(&params, spacing);

        Self {
            gpu: None,
            survey,
            spacing,
            ui_state,
        }
    }

    fn initialize_gpu(&mut self, window: Arc<Window>) {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("Failed to create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("No suitable GPU adapter found");

        log::info!("GPU adapter: {:?}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            },
            None,
        ))
        .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let egui_ctx = egui::Context::default();
        let egui_input = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window.as_ref(),
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = Renderer::new(&device, surface_format);

        self.gpu = Some(GpuState {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_ctx,
            egui_input,
        });
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if let Some(ref mut gpu) = self.gpu {
            if new_size.width > 0 && new_size.height > 0 {
                gpu.config.width = new_size.width;
                gpu.config.height = new_size.height;
                gpu.surface.configure(&gpu.device, &gpu.config);
            }
        }
    }

    /// Re-run the survey with new parameters and refresh the stdout key.
    fn resurvey(&mut self, params: SurveyParams, spacing: u32) {
        self.survey = run_survey(params);
        self.survey.print_key();
        self.spacing = spacing;
    }

    fn export_snapshot(&self) {
        match export::export_snapshot(&self.survey, &SnapshotConfig::default()) {
            Ok(result) => log::info!("Snapshot written to {}", result.path.display()),
            Err(e) => log::error!("Snapshot export failed: {e}"),
        }
    }

    fn render_frame(&mut self) {
        let mut actions = UiActions::default();
        {
            let Some(ref mut gpu) = self.gpu else { return };

            // Run the egui frame.
            let raw_input = gpu.egui_input.take_egui_input(&gpu.window);
            let survey = &self.survey;
            let spacing = self.spacing;
            let ui_state = &mut self.ui_state;
            let full_output = gpu.egui_ctx.run(raw_input, |ctx| {
                actions = ui::draw_ui(ctx, ui_state, survey, spacing);
            });
            gpu.egui_input
                .handle_platform_output(&gpu.window, full_output.platform_output);

            // Paint it.
            let output = match gpu.surface.get_current_texture() {
                Ok(tex) => tex,
                Err(wgpu::SurfaceError::Lost) => {
                    gpu.surface.configure(&gpu.device, &gpu.config);
                    return;
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of GPU memory");
                    return;
                }
                Err(e) => {
                    log::warn!("Surface error: {e:?}");
                    return;
                }
            };

            let view = output
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default());

            let primitives = gpu
                .egui_ctx
                .tessellate(full_output.shapes, full_output.pixels_per_point);
            let screen = ScreenDescriptor {
                size_in_pixels: [gpu.config.width, gpu.config.height],
                pixels_per_point: full_output.pixels_per_point,
            };

            let mut encoder = gpu
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Frame Encoder"),
                });
            gpu.renderer.render(
                &gpu.device,
                &gpu.queue,
                &mut encoder,
                &view,
                &primitives,
                &full_output.textures_delta,
                &screen,
            );
            gpu.queue.submit(std::iter::once(encoder.finish()));
            output.present();

            // Update window title with survey status.
            let unresolved = if self.survey.has_unresolved() {
                " (+other)"
            } else {
                ""
            };
            gpu.window.set_title(&format!(
                "Hancock | base {} | n = 1..={} | {} patterns{unresolved}",
                self.survey.params.base,
                self.survey.params.limit,
                self.survey.distinct_patterns(),
            ));

            // Request next frame.
            gpu.window.request_redraw();
        }

        if let Some(params) = actions.apply {
            self.resurvey(params.survey_params(), params.spacing);
            self.ui_state.base_str = params.base.to_string();
            self.ui_state.limit_str = params.limit.to_string();
            self.ui_state.spacing_str = params.spacing.to_string();
        }
        if actions.export_snapshot {
            self.export_snapshot();
        }
        if actions.quit {
            std::process::exit(0);
        }
    }

    fn handle_key(&mut self, event: KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }

        match event.logical_key {
            Key::Named(NamedKey::Escape) => {
                std::process::exit(0);
            }
            Key::Character(ref c) => match c.as_str() {
                "k" => {
                    self.ui_state.show_key = !self.ui_state.show_key;
                    log::info!(
                        "Pattern key {}",
                        if self.ui_state.show_key { "shown" } else { "hidden" }
                    );
                }
                "s" => self.export_snapshot(),
                _ => {}
            },
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_none() {
            let attrs = WindowAttributes::default()
                .with_title("Hancock Pattern Explorer")
                .with_inner_size(PhysicalSize::new(1280u32, 800));

            let window = Arc::new(
                event_loop
                    .create_window(attrs)
                    .expect("Failed to create window"),
            );

            self.initialize_gpu(window);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // The overlay sees every event first; keys typed into its text
        // fields must not fall through to the app shortcuts.
        if let Some(ref mut gpu) = self.gpu {
            let response = gpu.egui_input.on_window_event(&gpu.window, &event);
            if response.repaint {
                gpu.window.request_redraw();
            }
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.resize(size);
            }
            WindowEvent::RedrawRequested => {
                self.render_frame();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.handle_key(event);
            }
            _ => {}
        }
    }
}
