//! Lidarview GPU Crate
//!
//! wgpu bring-up and the draw backend used by the scan viewer: device and
//! surface creation, shader programs with explicit compile/link errors, the
//! pipelines for points and line loops, and the [`DrawBackend`] seam the
//! frame renderer talks to.

mod builder;
pub mod draw;
mod pipeline;
pub mod scene;
pub mod shader;
pub mod shaders;
mod surface;
mod types;

pub use builder::{BufferBuildError, BufferBuilder, BufferUsage};
pub use draw::{DrawBackend, DrawCommand, MeshSlot, Primitive, RecordingBackend};
pub use pipeline::{PipelineBuildError, RenderPipelineBuilder};
pub use scene::{DEPTH_FORMAT, GpuScene, SceneError};
pub use shader::{ShaderError, ShaderProgram, ShaderSources, ShaderStage};
pub use surface::SurfaceWrapper;
pub use types::DrawUniforms;
pub use wgpu;

use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("Request Adapter Error: {0}")]
    RequestAdapterError(#[from] wgpu::RequestAdapterError),
    #[error("Request Device Error: {0}")]
    RequestDeviceError(#[from] wgpu::RequestDeviceError),
    #[error("Surface Error: {0}")]
    RequestSurfaceError(#[from] wgpu::SurfaceError),
    #[error("Create surface error: {0}")]
    CreateSurfaceError(#[from] wgpu::CreateSurfaceError),
    #[error("Surface reports no supported texture formats")]
    UnsupportedSurface,
}

/// Owns the wgpu adapter, device and queue for one viewer session.
pub struct Renderer {
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl Renderer {
    /// Create a renderer together with a configured surface for `target`.
    ///
    /// The adapter is chosen to be compatible with the surface.
    pub async fn with_surface(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<(Self, SurfaceWrapper), RendererError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::from_env_or_default());
        let surface = instance.create_surface(target)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await?;
        info!("Using adapter: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Lidarview Device"),
                required_limits: adapter.limits(),
                ..Default::default()
            })
            .await?;

        let renderer = Self {
            adapter,
            device,
            queue,
        };
        let surface = renderer.configure_surface(surface, width, height)?;
        Ok((renderer, surface))
    }

    /// Configure `surface` for presentation at the given size.
    pub fn configure_surface(
        &self,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
    ) -> Result<SurfaceWrapper, RendererError> {
        let caps = surface.get_capabilities(&self.adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(RendererError::UnsupportedSurface)?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&self.device, &config);
        info!(
            "Surface configured: {}x{} {:?}",
            config.width, config.height, config.format
        );

        Ok(SurfaceWrapper::new(surface, config))
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}
