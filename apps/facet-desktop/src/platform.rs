use facet_assets::{MeshData, TextureData};
use facet_common::{Camera, SceneObject};
use facet_input::{InputState, Key, MouseButton};
use facet_kernel::{Platform, WindowSettings};
use facet_render::{RenderView, Renderer};
use facet_render_wgpu::{GpuMesh, GpuTexture, MeshRenderer, RenderError};
use std::sync::Arc;
use std::time::Duration;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Fullscreen, Window, WindowId};

/// Pumps allowed before giving up on the first `resumed` callback.
const STARTUP_PUMPS: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("event loop error: {0}")]
    EventLoop(String),
    #[error("window creation failed: {0}")]
    Window(String),
    #[error("graphics initialization failed: {0}")]
    Gpu(String),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("window was not created")]
    NoWindow,
}

struct Gpu {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: MeshRenderer,
    pending: Option<wgpu::SurfaceTexture>,
}

/// Winit state the event pump writes into.
struct WindowApp {
    settings: WindowSettings,
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    input: InputState,
    close_requested: bool,
    error: Option<PlatformError>,
}

impl WindowApp {
    fn create(&mut self, event_loop: &ActiveEventLoop) -> Result<(), PlatformError> {
        let mut attrs = Window::default_attributes()
            .with_title(self.settings.title.clone())
            .with_inner_size(PhysicalSize::new(self.settings.width, self.settings.height))
            .with_resizable(self.settings.resizable)
            .with_visible(false);
        if self.settings.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| PlatformError::Window(e.to_string()))?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(Arc::clone(&window))
            .map_err(|e| PlatformError::Gpu(e.to_string()))?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| PlatformError::Gpu("no compatible adapter".into()))?;
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("facet_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(|e| PlatformError::Gpu(e.to_string()))?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or_else(|| PlatformError::Gpu("surface reports no formats".into()))?;
        let present_mode = if self.settings.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: self.settings.v_blanks.clamp(1, 3),
        };
        surface.configure(&device, &config);
        let renderer = MeshRenderer::new(&device, &queue, format, config.width, config.height)?;

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            width = config.width,
            height = config.height,
            vsync = self.settings.vsync,
            "window created"
        );
        self.window = Some(window);
        self.gpu = Some(Gpu {
            surface,
            device,
            queue,
            config,
            renderer,
            pending: None,
        });
        Ok(())
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if let Some(gpu) = &mut self.gpu {
            gpu.config.width = size.width.max(1);
            gpu.config.height = size.height.max(1);
            gpu.surface.configure(&gpu.device, &gpu.config);
        }
    }
}

fn map_key(code: KeyCode) -> Key {
    match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyE => Key::E,
        KeyCode::Space => Key::Space,
        KeyCode::Escape => Key::Escape,
        _ => Key::Other,
    }
}

fn map_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Left,
        winit::event::MouseButton::Right => MouseButton::Right,
        _ => MouseButton::Other,
    }
}

impl ApplicationHandler for WindowApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.create(event_loop) {
            tracing::error!("platform startup failed: {e}");
            self.error = Some(e);
            self.close_requested = true;
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.close_requested = true,
            WindowEvent::Resized(size) => self.resize(size),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                self.input
                    .keyboard
                    .set(map_key(code), state == ElementState::Pressed);
            }
            WindowEvent::MouseInput { button, state, .. } => {
                self.input
                    .mouse
                    .button(map_button(button), state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.mouse.cursor_moved(position.x, position.y);
            }
            WindowEvent::CursorEntered { .. } => self.input.mouse.cursor_entered(true),
            WindowEvent::CursorLeft { .. } => self.input.mouse.cursor_entered(false),
            WindowEvent::Focused(false) => self.input.keyboard.clear(),
            _ => {}
        }
    }
}

/// A winit window with a wgpu surface, driven from the game loop by pumping
/// pending events on every `present`.
pub struct DesktopPlatform {
    event_loop: EventLoop<()>,
    app: WindowApp,
}

impl DesktopPlatform {
    /// Open the window hidden and bring up the GPU. [`Platform::show`] makes
    /// it visible.
    pub fn new(settings: WindowSettings) -> Result<Self, PlatformError> {
        let mut event_loop = EventLoop::new().map_err(|e| PlatformError::EventLoop(e.to_string()))?;
        let mut app = WindowApp {
            settings,
            window: None,
            gpu: None,
            input: InputState::new(),
            close_requested: false,
            error: None,
        };
        for _ in 0..STARTUP_PUMPS {
            if app.gpu.is_some() || app.error.is_some() {
                break;
            }
            if let PumpStatus::Exit(_) =
                event_loop.pump_app_events(Some(Duration::from_millis(10)), &mut app)
            {
                break;
            }
        }
        if let Some(e) = app.error.take() {
            return Err(e);
        }
        if app.gpu.is_none() {
            return Err(PlatformError::NoWindow);
        }
        Ok(Self { event_loop, app })
    }

    pub fn input(&self) -> &InputState {
        &self.app.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.app.input
    }

    /// Ask the loop to stop at the top of its next iteration.
    pub fn request_close(&mut self) {
        self.app.close_requested = true;
    }

    pub fn upload_mesh(&self, mesh: &MeshData) -> Result<GpuMesh, PlatformError> {
        let gpu = self.app.gpu.as_ref().ok_or(PlatformError::NoWindow)?;
        Ok(GpuMesh::upload(&gpu.device, mesh)?)
    }

    pub fn upload_texture(&self, texture: &TextureData) -> Result<Arc<GpuTexture>, PlatformError> {
        let gpu = self.app.gpu.as_ref().ok_or(PlatformError::NoWindow)?;
        Ok(Arc::new(GpuTexture::upload(
            &gpu.device,
            &gpu.queue,
            gpu.renderer.texture_layout(),
            texture,
        )))
    }

    /// Render `objects` into the next swapchain image. The image is shown by
    /// the following `present`.
    pub fn draw(&mut self, objects: &[SceneObject<GpuMesh>], camera: &Camera) {
        let Some(gpu) = &mut self.app.gpu else {
            return;
        };
        if let Some(stale) = gpu.pending.take() {
            stale.present();
        }
        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::warn!("surface error: {e}");
                return;
            }
        };
        let target = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let view = RenderView {
            camera: *camera,
            width: gpu.config.width,
            height: gpu.config.height,
        };
        let commands = gpu
            .renderer
            .frame(&gpu.device, &gpu.queue, &target)
            .draw(objects, &view);
        gpu.queue.submit(std::iter::once(commands));
        gpu.pending = Some(output);
    }
}

impl Platform for DesktopPlatform {
    fn should_close(&self) -> bool {
        self.app.close_requested
    }

    fn show(&mut self) {
        if let Some(window) = &self.app.window {
            window.set_visible(true);
        }
    }

    fn present(&mut self) {
        if let Some(frame) = self.app.gpu.as_mut().and_then(|gpu| gpu.pending.take()) {
            frame.present();
        }
        if let PumpStatus::Exit(code) = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.app)
        {
            tracing::debug!(code, "event loop exited");
            self.app.close_requested = true;
        }
    }

    fn set_title(&mut self, title: &str) {
        if let Some(window) = &self.app.window {
            window.set_title(title);
        }
    }

    fn vsync(&self) -> bool {
        self.app.settings.vsync
    }

    fn drawable_size(&self) -> (u32, u32) {
        match &self.app.gpu {
            Some(gpu) => (gpu.config.width, gpu.config.height),
            None => (self.app.settings.width, self.app.settings.height),
        }
    }

    fn destroy(&mut self) {
        if let Some(gpu) = self.app.gpu.take() {
            gpu.renderer.destroy();
        }
        self.app.window = None;
        tracing::debug!("window destroyed");
    }
}
