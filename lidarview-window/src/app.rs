use crate::camera::{OrbitCamera, SharedCamera};
use crate::config::ViewerConfig;
use crate::controls::{GestureRouter, MouseFallback, MouseGesture, TouchEvent, TouchTracker};
use crate::frame::{FrameRenderer, Viewport};
use lidarview_data::{DecodeError, PointBuffer, decode_pcd, generate_axis_circles};
use lidarview_gpu::wgpu;
use lidarview_gpu::{
    DEPTH_FORMAT, GpuScene, Renderer, RendererError, SceneError, ShaderError, ShaderProgram,
    ShaderSources, SurfaceWrapper,
};
use std::sync::Arc;
use tracing::{error, info, trace, warn};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("Failed to load scan: {0}")]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error("GPU setup failed: {0}")]
    Renderer(#[from] RendererError),
    #[error("Failed to build scene: {0}")]
    Scene(#[from] SceneError),
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
}

/// Run a viewer session until the window is closed.
pub fn run(config: ViewerConfig) -> Result<(), ViewerError> {
    init_tracing(&config.log_level);

    // Scan and shader sources are read before any GPU object exists.
    let (points, shaders) = prepare(&config)?;

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, points, shaders);
    let run_result = event_loop.run_app(&mut app);
    let app_result = app.finish();
    run_result?;
    app_result
}

fn init_tracing(level: &str) {
    #[cfg(feature = "tracy")]
    {
        use tracing_subscriber::Layer;
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;
        tracing_subscriber::registry()
            .with(tracing_tracy::TracyLayer::default())
            .with(
                tracing_subscriber::fmt::layer().with_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
                ),
            )
            .init();
    }

    #[cfg(not(feature = "tracy"))]
    {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
            )
            .with_target(false)
            .init();
    }
}

fn prepare(config: &ViewerConfig) -> Result<(PointBuffer, ShaderSources), ViewerError> {
    let points = decode_pcd(&config.scan_path)?;
    let shaders = match &config.shader_dir {
        Some(dir) => {
            info!("Loading shaders from {}", dir.display());
            ShaderSources::load(dir)?
        }
        None => ShaderSources::builtin(),
    };
    Ok((points, shaders))
}

struct App {
    config: ViewerConfig,
    init_data: Option<(PointBuffer, ShaderSources)>,
    state: Option<ViewerState>,
    error: Option<ViewerError>,
}

impl App {
    fn new(config: ViewerConfig, points: PointBuffer, shaders: ShaderSources) -> Self {
        Self {
            config,
            init_data: Some((points, shaders)),
            state: None,
            error: None,
        }
    }

    fn finish(self) -> Result<(), ViewerError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.error.is_some() {
            return;
        }
        let Some((points, shaders)) = self.init_data.take() else {
            return;
        };

        match ViewerState::new(event_loop, &self.config, points, &shaders) {
            Ok(state) => self.state = Some(state),
            Err(err) => {
                error!("Failed to initialize viewer: {err}");
                self.error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if state.window.id() != window_id {
            return;
        }

        if state.handle_input(event_loop, &event) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size),
            WindowEvent::RedrawRequested => {
                let _frame_span = tracing::info_span!("frame").entered();
                match state.render() {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        state.surface.reconfigure(state.renderer.device());
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        error!("GPU Out of Memory - exiting");
                        event_loop.exit();
                    }
                    Err(e) => warn!("Skipping frame: {e:?}"),
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = self.state.as_ref() {
            state.window.request_redraw();
        }
    }
}

struct ViewerState {
    window: Arc<Window>,
    renderer: Renderer,
    surface: SurfaceWrapper,
    scene: GpuScene,
    frame: FrameRenderer,
    camera: SharedCamera,
    router: GestureRouter,
    touches: TouchTracker,
    mouse: MouseFallback,
    depth_view: wgpu::TextureView,
}

impl ViewerState {
    fn new(
        event_loop: &ActiveEventLoop,
        config: &ViewerConfig,
        points: PointBuffer,
        shaders: &ShaderSources,
    ) -> Result<Self, ViewerError> {
        let title = format!("{} - {} points", config.title, points.len());
        let window_attributes = Window::default_attributes()
            .with_title(title)
            .with_inner_size(PhysicalSize::new(1280, 720));
        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let size = window.inner_size();
        let viewport = Viewport::new(size.width, size.height);

        let (renderer, surface) = pollster::block_on(Renderer::with_surface(
            window.clone(),
            viewport.width(),
            viewport.height(),
        ))?;

        let program = ShaderProgram::compile(renderer.device(), shaders)?;
        let mut scene = GpuScene::new(
            renderer.device(),
            renderer.queue(),
            &program,
            surface.format(),
        )?;

        let circles = generate_axis_circles(config.circle_radius, config.circle_segments);
        let frame = FrameRenderer::new(points, circles, viewport);
        frame.upload(&mut scene)?;
        info!("Viewing {} points", frame.point_count());

        let camera = SharedCamera::new(OrbitCamera::new(config.limits, config.projection));
        let depth_view =
            create_depth_view(renderer.device(), viewport.width(), viewport.height());

        Ok(Self {
            window,
            renderer,
            surface,
            scene,
            frame,
            camera,
            router: GestureRouter::new(),
            touches: TouchTracker::new(),
            mouse: MouseFallback::new(),
            depth_view,
        })
    }

    /// Returns true if the event was consumed.
    fn handle_input(&mut self, event_loop: &ActiveEventLoop, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => match code {
                KeyCode::Escape => {
                    event_loop.exit();
                    true
                }
                KeyCode::KeyR => {
                    self.camera.update(OrbitCamera::reset);
                    true
                }
                _ => false,
            },
            WindowEvent::Touch(touch) => {
                if let Some(gesture) = self.touches.handle_touch(touch) {
                    self.route(&gesture);
                }
                true
            }
            _ => match self.mouse.handle_window_event(event) {
                Some(MouseGesture::Touch(gesture)) => {
                    self.route(&gesture);
                    true
                }
                Some(MouseGesture::Zoom(amount)) => {
                    self.camera.update(|camera| camera.zoom(amount));
                    true
                }
                None => false,
            },
        }
    }

    fn route(&mut self, gesture: &TouchEvent) {
        let router = &mut self.router;
        self.camera.update(|camera| router.handle(gesture, camera));
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        let device = self.renderer.device();
        self.surface.resize(device, new_size.width, new_size.height);
        self.frame.resize(new_size.width, new_size.height);
        self.depth_view = create_depth_view(device, new_size.width, new_size.height);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let camera = self.camera.snapshot();
        trace!("eye at {}", camera.eye());
        self.frame.render(&camera, &mut self.scene);

        let mut encoder =
            self.renderer
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Frame Encoder"),
                });
        self.scene
            .encode(&mut encoder, &surface_view, &self.depth_view);

        self.renderer.queue().submit(Some(encoder.finish()));
        surface_texture.present();
        Ok(())
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
