use glam::{Mat4, Vec4};

/// Per-draw uniform block shared between host and shader.
/// Matches `DrawUniforms` in `vertex.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct DrawUniforms {
    pub mvp: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl DrawUniforms {
    pub fn new(mvp: Mat4, color: Vec4) -> Self {
        Self {
            mvp: mvp.to_cols_array_2d(),
            color: color.to_array(),
        }
    }
}
