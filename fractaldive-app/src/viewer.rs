//! Window, surface and frame loop.

use crate::frame_timer::FrameTimer;
use crate::keymap::HeldKeys;
use fractaldive_core::{ConfigError, FrameCommand, InputController, ViewState, ViewerConfig};
use fractaldive_gpu::{
    build_builtin_kernel, build_kernel, load_shader_source, CompiledProgram, FractalRenderer,
    FrameOutcome, GpuContext, GpuError,
};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowBuilder};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Gpu(#[from] GpuError),

    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("Cannot create window: {0}")]
    Window(#[from] winit::error::OsError),
}

/// Build the kernel from `config.kernel_path`, falling back to the built-in
/// kernel if the override cannot be read, compiled or linked.
fn load_kernel(ctx: &GpuContext, config: &ViewerConfig) -> Result<CompiledProgram, GpuError> {
    if let Some(path) = &config.kernel_path {
        let source_id = path.display().to_string();
        let result = load_shader_source(path)
            .and_then(|source| build_kernel(&ctx.device, &source_id, &source));
        match result {
            Ok(program) => {
                log::info!("Using kernel from {source_id}");
                return Ok(program);
            }
            Err(e) if e.is_shader_error() => {
                log::error!("{e}");
                log::warn!("Falling back to the built-in kernel");
            }
            Err(e) => return Err(e),
        }
    }
    build_builtin_kernel(&ctx.device)
}

fn choose_surface_config(
    surface: &wgpu::Surface<'_>,
    ctx: &GpuContext,
    size: PhysicalSize<u32>,
    vsync: bool,
) -> Result<wgpu::SurfaceConfiguration, GpuError> {
    let caps = surface.get_capabilities(&ctx.adapter);
    // The palette is written as-is, without an sRGB encode.
    let format = caps
        .formats
        .iter()
        .copied()
        .find(|f| !f.is_srgb())
        .or_else(|| caps.formats.first().copied())
        .ok_or_else(|| GpuError::Context("surface reports no supported formats".into()))?;
    let present_mode = if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    };
    log::info!("Surface format {format:?}, present mode {present_mode:?}");

    Ok(wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode,
        desired_maximum_frame_latency: 2,
        alpha_mode: caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto),
        view_formats: vec![],
    })
}

struct Viewer {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    ctx: GpuContext,
    renderer: FractalRenderer,
    view: ViewState,
    controller: InputController,
    held: HeldKeys,
    timer: FrameTimer,
}

impl Viewer {
    fn new(window: Arc<Window>, config: &ViewerConfig) -> Result<Self, AppError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(Arc::clone(&window))
            .map_err(GpuError::from)?;
        let ctx = pollster::block_on(GpuContext::for_surface(&instance, &surface))?;

        let size = window.inner_size();
        let surface_config = choose_surface_config(&surface, &ctx, size, config.vsync)?;
        surface.configure(&ctx.device, &surface_config);

        let kernel = load_kernel(&ctx, config)?;
        let renderer = FractalRenderer::new(
            &ctx,
            kernel,
            surface_config.format,
            (surface_config.width, surface_config.height),
        )?;

        let profile = config.control_profile()?;
        let view = ViewState::from_preset(
            config.start_variant,
            profile.presets.get(config.start_variant),
            config.max_iterations,
        );
        log::info!("Starting at {} {view:?}", config.start_variant);

        Ok(Self {
            window,
            surface,
            surface_config,
            ctx,
            renderer,
            view,
            controller: InputController::new(profile),
            held: HeldKeys::default(),
            timer: FrameTimer::new(Instant::now()),
        })
    }

    fn reconfigure(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.surface_config.width = size.width;
        self.surface_config.height = size.height;
        self.surface.configure(&self.ctx.device, &self.surface_config);
    }

    /// Run one frame. Returns `Ok(false)` once the viewer should close.
    fn frame(&mut self) -> Result<bool, AppError> {
        let input = self.held.snapshot();
        if self.controller.apply(&input, &mut self.view) == FrameCommand::Quit {
            log::info!("Quit requested");
            return Ok(false);
        }

        let size = self.window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Ok(true);
        }
        if (size.width, size.height) != (self.surface_config.width, self.surface_config.height) {
            self.reconfigure(size);
        }

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated; reconfiguring");
                self.reconfigure(size);
                return Ok(true);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out acquiring surface texture");
                return Ok(true);
            }
            Err(e) => return Err(GpuError::from(e).into()),
        };
        let target = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let outcome = self.renderer.render_frame(
            &self.ctx,
            &target,
            (self.surface_config.width, self.surface_config.height),
            &self.view,
        );
        self.window.pre_present_notify();
        frame.present();

        if let FrameOutcome::Rendered(_) = outcome {
            if let Some(ms) = self.timer.tick(Instant::now()) {
                log::info!("{ms:.2} ms / frame");
            }
        }
        Ok(true)
    }

    fn handle_window_event(
        &mut self,
        event: &WindowEvent,
        elwt: &EventLoopWindowTarget<()>,
    ) -> Result<(), AppError> {
        match event {
            WindowEvent::CloseRequested => self.held.request_quit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        ..
                    },
                ..
            } => self.held.handle_key_event(*key, *state),
            WindowEvent::Focused(false) => self.held.reset(),
            WindowEvent::Resized(size) => self.reconfigure(*size),
            WindowEvent::RedrawRequested => {
                if !self.frame()? {
                    elwt.exit();
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Open the window and run the frame loop until quit.
pub fn run(config: ViewerConfig) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let window = Arc::new(
        WindowBuilder::new()
            .with_title(&config.window.title)
            .with_inner_size(LogicalSize::new(config.window.width, config.window.height))
            .build(&event_loop)?,
    );

    let mut viewer = Viewer::new(Arc::clone(&window), &config)?;
    let mut fatal: Option<AppError> = None;

    event_loop.run(|event, elwt| match event {
        Event::WindowEvent { event, window_id } if window_id == window.id() => {
            if let Err(e) = viewer.handle_window_event(&event, elwt) {
                fatal = Some(e);
                elwt.exit();
            }
        }
        Event::AboutToWait => window.request_redraw(),
        _ => {}
    })?;

    match fatal {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
