use crate::shader::{ShaderError, ShaderProgram};
use crate::shaders::{FRAGMENT_ENTRY, VERTEX_ENTRY};
use tracing::error;

/// Builder for creating render pipelines
pub struct RenderPipelineBuilder<'a> {
    device: &'a wgpu::Device,
    program: Option<&'a ShaderProgram>,
    label: Option<String>,
    layout: Option<wgpu::PipelineLayout>,
    vertex_buffers: Vec<wgpu::VertexBufferLayout<'static>>,
    primitive: Option<wgpu::PrimitiveState>,
    depth_stencil: Option<wgpu::DepthStencilState>,
    fragment_targets: Vec<Option<wgpu::ColorTargetState>>,
}

impl<'a> RenderPipelineBuilder<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self {
            device,
            program: None,
            label: None,
            layout: None,
            vertex_buffers: Vec::new(),
            primitive: None,
            depth_stencil: None,
            fragment_targets: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_program(mut self, program: &'a ShaderProgram) -> Self {
        self.program = Some(program);
        self
    }

    pub fn with_layout(mut self, layout: wgpu::PipelineLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_vertex_buffer(mut self, buffer: wgpu::VertexBufferLayout<'static>) -> Self {
        self.vertex_buffers.push(buffer);
        self
    }

    pub fn with_primitive(mut self, primitive: wgpu::PrimitiveState) -> Self {
        self.primitive = Some(primitive);
        self
    }

    pub fn with_depth_stencil(mut self, depth_stencil: wgpu::DepthStencilState) -> Self {
        self.depth_stencil = Some(depth_stencil);
        self
    }

    pub fn with_fragment_target(mut self, target: Option<wgpu::ColorTargetState>) -> Self {
        self.fragment_targets.push(target);
        self
    }

    /// Link the program's stages into a render pipeline.
    ///
    /// Interface mismatches between the stages and the layout surface as
    /// [`ShaderError::Link`].
    pub fn build(self) -> Result<wgpu::RenderPipeline, PipelineBuildError> {
        let program = self.program.ok_or(PipelineBuildError::MissingProgram)?;

        let pipeline_layout = self.layout.unwrap_or_else(|| {
            self.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: None,
                    bind_group_layouts: &[],
                    push_constant_ranges: &[],
                })
        });

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: self.label.as_deref(),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: program.vertex(),
                    entry_point: Some(VERTEX_ENTRY),
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    buffers: &self.vertex_buffers,
                },
                primitive: self.primitive.unwrap_or_else(|| wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                }),
                depth_stencil: self.depth_stencil,
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                fragment: Some(wgpu::FragmentState {
                    module: program.fragment(),
                    entry_point: Some(FRAGMENT_ENTRY),
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    targets: &self.fragment_targets,
                }),
                multiview: None,
                cache: None,
            });

        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            let message = err.to_string();
            error!(
                "Pipeline {:?} link log:\n{message}",
                self.label.as_deref().unwrap_or("<unnamed>")
            );
            return Err(ShaderError::Link { message }.into());
        }

        Ok(pipeline)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineBuildError {
    #[error("Shader program is required")]
    MissingProgram,
    #[error(transparent)]
    Shader(#[from] ShaderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_error_is_shader_error() {
        let err: PipelineBuildError = ShaderError::Link {
            message: "location 0 is not provided by the vertex stage".into(),
        }
        .into();
        assert!(matches!(
            err,
            PipelineBuildError::Shader(ShaderError::Link { .. })
        ));
        assert!(err.to_string().contains("failed to link"));
    }

    #[test]
    fn test_missing_program_message() {
        assert_eq!(
            PipelineBuildError::MissingProgram.to_string(),
            "Shader program is required"
        );
    }
}
