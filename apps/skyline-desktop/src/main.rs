mod keys;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use egui::Context as EguiContext;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use skyline_assets::{FacadeTextureSet, SkyboxImages};
use skyline_input::{InputCommand, KeySnapshot, Keymap};
use skyline_kernel::plane::MAX_EXTENT;
use skyline_kernel::{Scene, ViewerState};
use skyline_render::{CityMesh, FrameUniforms, Theme, aspect_ratio};
use skyline_render_wgpu::{CityRenderer, SceneUpload, ShaderSources};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ThemeArg {
    /// Textured facades, green ground, white light
    Textured,
    /// Flat-shaded faces, gray ground, blue light
    Flat,
}

#[derive(Parser)]
#[command(name = "skyline-desktop", about = "Fly through a procedurally generated city")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Visual theme
    #[arg(long, value_enum, default_value = "textured")]
    theme: ThemeArg,

    /// City extent in world units (defaults to the theme's)
    #[arg(long, value_parser = clap::value_parser!(i32).range(..=i64::from(MAX_EXTENT)))]
    extent: Option<i32>,

    /// Seed for building layout and light orientation
    #[arg(long, default_value = "1")]
    seed: u64,

    /// Directory containing `textures/`
    #[arg(long, default_value = ".")]
    assets: PathBuf,

    /// Directory with `lit.wgsl` / `skybox.wgsl` overrides
    #[arg(long)]
    shader_dir: Option<PathBuf>,

    /// Initial window width
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height
    #[arg(long, default_value = "720")]
    height: u32,
}

/// Scene data prepared before a window exists, consumed by GPU setup.
struct SceneAssets {
    mesh: CityMesh,
    facades: Option<FacadeTextureSet>,
    skybox: SkyboxImages,
    shaders: ShaderSources,
}

impl SceneAssets {
    fn load(cli: &Cli, theme: &Theme, scene: &Scene) -> Result<Self> {
        let facades = if theme.uses_facade_textures() {
            Some(
                FacadeTextureSet::load(&cli.assets, theme.facade_files)
                    .context("loading facade textures")?,
            )
        } else {
            None
        };
        let skybox = SkyboxImages::load(&cli.assets, theme.skybox_extension)
            .context("loading skybox faces")?;
        let shaders =
            ShaderSources::load(cli.shader_dir.as_deref()).context("loading shader sources")?;
        Ok(Self {
            mesh: CityMesh::build(scene, theme),
            facades,
            skybox,
            shaders,
        })
    }
}

/// Application state.
struct AppState {
    theme: Theme,
    seed: u64,
    building_count: usize,
    viewer: ViewerState,
    keymap: Keymap,
    keys: KeySnapshot,
    show_hud: bool,
    last_command: Option<InputCommand>,
    frames: u64,
    frame_errors: u64,
}

impl AppState {
    fn new(theme: Theme, seed: u64, scene: &Scene, viewer: ViewerState) -> Self {
        Self {
            theme,
            seed,
            building_count: scene.building_count(),
            viewer,
            keymap: Keymap::default(),
            keys: KeySnapshot::new(),
            show_hud: true,
            last_command: None,
            frames: 0,
            frame_errors: 0,
        }
    }

    fn handle_key(&mut self, code: KeyCode, pressed: bool, repeat: bool) {
        if code == KeyCode::F1 {
            if pressed && !repeat {
                self.show_hud = !self.show_hud;
            }
            return;
        }
        let Some(key) = keys::map_key(code) else {
            return;
        };
        if pressed {
            self.keys.press(key);
        } else {
            self.keys.release(key);
        }
    }

    /// Resolve and apply at most one command. Returns `false` on quit.
    fn tick(&mut self) -> bool {
        let command = self.keymap.resolve(&self.keys);
        self.keys.end_frame();
        let Some(command) = command else {
            return true;
        };
        self.last_command = Some(command);
        let running = self.viewer.step(command);
        if command.is_light() {
            let p = self.viewer.light.world_position();
            tracing::debug!(
                command = command.label(),
                on = self.viewer.light.is_on(),
                x = p.x,
                y = p.y,
                z = p.z,
                "light moved"
            );
        } else if command.is_camera() {
            let p = self.viewer.camera.position();
            tracing::debug!(command = command.label(), x = p.x, y = p.y, z = p.z, "camera moved");
        } else if command == InputCommand::Reset {
            tracing::info!("view reset");
        }
        running
    }

    fn draw_ui(&self, ctx: &EguiContext) {
        if !self.show_hud {
            return;
        }
        let camera = &self.viewer.camera;
        let light = &self.viewer.light;

        egui::Window::new("Skyline")
            .default_width(260.0)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Theme: {}  Seed: {}", self.theme.name, self.seed));
                ui.label(format!("Buildings: {}", self.building_count));
                ui.separator();
                let p = camera.position();
                let f = camera.forward();
                ui.label(format!("Camera: ({:.1}, {:.1}, {:.1})", p.x, p.y, p.z));
                ui.label(format!("Forward: ({:.2}, {:.2}, {:.2})", f.x, f.y, f.z));
                let lp = light.world_position();
                ui.label(format!(
                    "Light: ({:.1}, {:.1}, {:.1}) {}",
                    lp.x,
                    lp.y,
                    lp.z,
                    if light.is_on() { "on" } else { "off" }
                ));
                ui.label(format!(
                    "Last: {}",
                    self.last_command.map_or("-", InputCommand::label)
                ));
                ui.label(format!("Frames: {}  GPU errors: {}", self.frames, self.frame_errors));
                ui.separator();
                ui.small("Arrows: pan/move | W/S: up/down | A/D: strafe | X/Y: pitch");
                ui.small("H/G/J/N: orbit light | K: roll | L: light | R: reset | Q: quit");
                ui.small("F1: toggle HUD");
            });
    }
}

/// Everything tied to the window and GPU device.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: CityRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct GpuApp {
    state: AppState,
    window_size: PhysicalSize<u32>,
    pending: Option<SceneAssets>,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    fatal: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(state: AppState, assets: SceneAssets, window_size: PhysicalSize<u32>) -> Self {
        Self {
            state,
            window_size,
            pending: Some(assets),
            gpu: None,
            egui_ctx: EguiContext::default(),
            fatal: None,
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let assets = self
            .pending
            .take()
            .ok_or_else(|| anyhow!("scene assets already uploaded"))?;

        let attrs = Window::default_attributes()
            .with_title(format!("Skyline ({})", self.state.theme.name))
            .with_inner_size(self.window_size);
        let window = Arc::new(event_loop.create_window(attrs).context("creating window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("creating surface")?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no compatible GPU adapter"))?;
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("skyline_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("creating device")?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
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

        let renderer = CityRenderer::new(
            &device,
            &queue,
            surface_format,
            config.width,
            config.height,
            SceneUpload {
                mesh: &assets.mesh,
                facades: assets.facades.as_ref(),
                skybox: &assets.skybox,
                clear_color: self.state.theme.clear_color,
            },
            &assets.shaders,
        )
        .context("building city renderer")?;

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            width = config.width,
            height = config.height,
            "GPU initialized"
        );

        self.gpu = Some(Gpu {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        });
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if !self.state.tick() {
            tracing::info!("quit requested");
            event_loop.exit();
            return;
        }
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let frame = FrameUniforms::compute(
            &self.state.viewer.camera,
            &self.state.viewer.light,
            aspect_ratio(gpu.config.width, gpu.config.height),
        );
        self.state.frames += 1;
        if !gpu.renderer.render(&gpu.device, &gpu.queue, &view, &frame) {
            self.state.frame_errors += 1;
        }

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let state = &self.state;
        let full_output = self.egui_ctx.run(raw_input, |ctx| state.draw_ui(ctx));
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);
        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() || self.fatal.is_some() {
            return;
        }
        if let Err(err) = self.init_gpu(event_loop) {
            tracing::error!("startup failed: {err:#}");
            self.fatal = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Focused(false) => {
                self.state.keys.clear();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.config.width = new_size.width.max(1);
                    gpu.config.height = new_size.height.max(1);
                    gpu.surface.configure(&gpu.device, &gpu.config);
                    gpu.renderer
                        .resize(&gpu.device, gpu.config.width, gpu.config.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        repeat,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(code, key_state == ElementState::Pressed, repeat);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let theme = match cli.theme {
        ThemeArg::Textured => Theme::textured(),
        ThemeArg::Flat => Theme::flat(),
    };
    let extent = cli.extent.unwrap_or(theme.extent);
    tracing::info!(theme = theme.name, extent, seed = cli.seed, "skyline-desktop starting");

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(cli.seed);
    let scene = Scene::from_rng(extent, &mut rng);
    let viewer = theme
        .initial_viewer(&mut rng)
        .context("placing camera and light")?;
    let assets = SceneAssets::load(&cli, &theme, &scene).inspect_err(|err| {
        tracing::error!("startup failed: {err:#}");
    })?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let state = AppState::new(theme, cli.seed, &scene, viewer);
    let mut app = GpuApp::new(state, assets, PhysicalSize::new(cli.width, cli.height));
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
