//! wgpu execution of [`DrawCommand`]s.

use crate::builder::{BufferBuildError, BufferBuilder, BufferUsage};
use crate::draw::{DrawBackend, DrawCommand, MeshSlot, Primitive};
use crate::pipeline::{PipelineBuildError, RenderPipelineBuilder};
use crate::shader::ShaderProgram;
use crate::types::DrawUniforms;
use glam::Vec3;
use std::collections::HashMap;
use tracing::{debug, warn};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Draws accepted per frame; further draws are dropped.
pub const MAX_DRAWS_PER_FRAME: usize = 16;

const UNIFORM_SIZE: u64 = std::mem::size_of::<DrawUniforms>() as u64;

const POSITION_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: 12,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[wgpu::VertexAttribute {
        offset: 0,
        shader_location: 0,
        format: wgpu::VertexFormat::Float32x3,
    }],
};

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error(transparent)]
    Pipeline(#[from] PipelineBuildError),
    #[error(transparent)]
    Buffer(#[from] BufferBuildError),
    #[error("{slot:?} has {count} vertices, more than a single draw can address")]
    TooManyVertices { slot: MeshSlot, count: usize },
    #[error("{slot:?} needs a {bytes} byte vertex buffer, device limit is {limit} bytes")]
    MeshTooLarge { slot: MeshSlot, bytes: u64, limit: u64 },
}

struct GpuMesh {
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

/// Vertex buffers, pipelines and per-draw uniforms for one surface format.
pub struct GpuScene {
    device: wgpu::Device,
    queue: wgpu::Queue,
    point_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_stride: u64,
    bind_group: wgpu::BindGroup,
    meshes: HashMap<MeshSlot, GpuMesh>,
    pending: Vec<DrawCommand>,
}

impl GpuScene {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        program: &ShaderProgram,
        color_format: wgpu::TextureFormat,
    ) -> Result<Self, SceneError> {
        let uniform_stride = uniform_stride(device.limits().min_uniform_buffer_offset_alignment);
        let uniform_buffer = BufferBuilder::new(device)
            .label("Draw Uniforms")
            .size(uniform_stride * MAX_DRAWS_PER_FRAME as u64)
            .usage(BufferUsage::Uniform)
            .build()?;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(UNIFORM_SIZE),
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(UNIFORM_SIZE),
                }),
            }],
        });

        let build_pipeline = |label: &str, topology: wgpu::PrimitiveTopology| {
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(label),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });
            RenderPipelineBuilder::new(device)
                .with_label(label)
                .with_program(program)
                .with_layout(layout)
                .with_vertex_buffer(POSITION_LAYOUT)
                .with_primitive(wgpu::PrimitiveState {
                    topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                })
                .with_fragment_target(Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                }))
                .with_depth_stencil(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                })
                .build()
        };

        let point_pipeline = build_pipeline("Point Pipeline", wgpu::PrimitiveTopology::PointList)?;
        let line_pipeline = build_pipeline("Line Loop Pipeline", wgpu::PrimitiveTopology::LineStrip)?;

        Ok(Self {
            device: device.clone(),
            queue: queue.clone(),
            point_pipeline,
            line_pipeline,
            uniform_buffer,
            uniform_stride,
            bind_group,
            meshes: HashMap::new(),
            pending: Vec::new(),
        })
    }

    /// Write the queued draws' uniforms and record them into one pass that
    /// clears color to black and depth to 1.0.
    pub fn encode(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
    ) {
        let commands = std::mem::take(&mut self.pending);

        let mut uniforms = vec![0u8; self.uniform_stride as usize * commands.len()];
        for (i, command) in commands.iter().enumerate() {
            let offset = i * self.uniform_stride as usize;
            let block = DrawUniforms::new(command.mvp, command.color);
            uniforms[offset..offset + UNIFORM_SIZE as usize]
                .copy_from_slice(bytemuck::bytes_of(&block));
        }
        if !uniforms.is_empty() {
            self.queue.write_buffer(&self.uniform_buffer, 0, &uniforms);
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scan Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        for (i, command) in commands.iter().enumerate() {
            let Some(mesh) = self.meshes.get(&command.slot) else {
                continue;
            };
            let pipeline = match command.primitive {
                Primitive::Points => &self.point_pipeline,
                Primitive::LineLoop => &self.line_pipeline,
            };
            let offset = (i as u64 * self.uniform_stride) as u32;
            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[offset]);
            render_pass.set_vertex_buffer(0, mesh.buffer.slice(..));
            render_pass.draw(0..mesh.vertex_count, 0..1);
        }
    }
}

impl DrawBackend for GpuScene {
    type Error = SceneError;

    fn upload(&mut self, slot: MeshSlot, vertices: &[Vec3]) -> Result<(), SceneError> {
        let vertices = match slot {
            MeshSlot::PointCloud => vertices.to_vec(),
            MeshSlot::Circle(_) => closed_loop(vertices),
        };
        if vertices.is_empty() {
            self.meshes.remove(&slot);
            return Ok(());
        }
        let vertex_count =
            checked_vertex_count(slot, vertices.len(), self.device.limits().max_buffer_size)?;

        let buffer = BufferBuilder::new(&self.device)
            .label(format!("{slot:?} Vertices"))
            .with_pod_data(&vertices)
            .usage(BufferUsage::Vertex)
            .build()?;
        debug!("Uploaded {} vertices to {:?}", vertices.len(), slot);
        self.meshes.insert(
            slot,
            GpuMesh {
                buffer,
                vertex_count,
            },
        );
        Ok(())
    }

    fn draw(&mut self, command: &DrawCommand) {
        if self.pending.len() >= MAX_DRAWS_PER_FRAME {
            warn!("Draw limit of {MAX_DRAWS_PER_FRAME} reached, dropping {:?}", command.slot);
            return;
        }
        self.pending.push(*command);
    }
}

/// Round the uniform block size up to the device's dynamic offset alignment.
fn uniform_stride(alignment: u32) -> u64 {
    let alignment = u64::from(alignment.max(1));
    UNIFORM_SIZE.div_ceil(alignment) * alignment
}

/// Vertex count of a mesh that fits in one vertex buffer of at most
/// `max_buffer_size` bytes.
fn checked_vertex_count(
    slot: MeshSlot,
    count: usize,
    max_buffer_size: u64,
) -> Result<u32, SceneError> {
    let vertex_count =
        u32::try_from(count).map_err(|_| SceneError::TooManyVertices { slot, count })?;
    let bytes = u64::from(vertex_count) * POSITION_LAYOUT.array_stride;
    if bytes > max_buffer_size {
        return Err(SceneError::MeshTooLarge {
            slot,
            bytes,
            limit: max_buffer_size,
        });
    }
    Ok(vertex_count)
}

/// Line strips do not wrap around, so repeat the first vertex when needed.
fn closed_loop(vertices: &[Vec3]) -> Vec<Vec3> {
    let mut out = vertices.to_vec();
    if let (Some(&first), Some(&last)) = (vertices.first(), vertices.last())
        && vertices.len() > 1
        && first != last
    {
        out.push(first);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_stride_alignment() {
        assert_eq!(uniform_stride(256), 256);
        assert_eq!(uniform_stride(64), 128);
        assert_eq!(uniform_stride(16), 80);
        assert_eq!(uniform_stride(0), 80);
    }

    #[test]
    fn test_vertex_count_within_limit() {
        let count = checked_vertex_count(MeshSlot::PointCloud, 1000, 12_000).unwrap();
        assert_eq!(count, 1000);
    }

    #[test]
    fn test_scan_larger_than_buffer_limit() {
        // 22.4M points at 12 bytes each exceed the 256 MiB default limit.
        let limit = 256 * 1024 * 1024;
        match checked_vertex_count(MeshSlot::PointCloud, 22_400_000, limit) {
            Err(SceneError::MeshTooLarge { slot, bytes, limit: reported }) => {
                assert_eq!(slot, MeshSlot::PointCloud);
                assert_eq!(bytes, 22_400_000 * 12);
                assert_eq!(reported, limit);
            }
            other => panic!("Expected MeshTooLarge, got {other:?}"),
        }
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_vertex_count_past_u32() {
        let count = u32::MAX as usize + 1;
        assert!(matches!(
            checked_vertex_count(MeshSlot::PointCloud, count, u64::MAX),
            Err(SceneError::TooManyVertices { count: c, .. }) if c == count
        ));
    }

    #[test]
    fn test_closed_loop_keeps_closed_input() {
        let closed = [Vec3::X, Vec3::Y, Vec3::X];
        assert_eq!(closed_loop(&closed), closed.to_vec());
    }

    #[test]
    fn test_closed_loop_closes_open_input() {
        let open = [Vec3::X, Vec3::Y, Vec3::Z];
        assert_eq!(closed_loop(&open), vec![Vec3::X, Vec3::Y, Vec3::Z, Vec3::X]);
    }

    #[test]
    fn test_closed_loop_single_vertex() {
        assert_eq!(closed_loop(&[Vec3::X]), vec![Vec3::X]);
        assert!(closed_loop(&[]).is_empty());
    }
}
