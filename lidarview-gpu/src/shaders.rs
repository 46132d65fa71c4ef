//! Shader source code embedded at compile time.
//!
//! The built-in programs satisfy the viewer's contract: the vertex stage takes
//! a `vec3<f32>` position at location 0 and both stages read a uniform block
//! holding the MVP matrix and a draw color.

/// Vertex shader - transforms positions by the per-draw MVP matrix.
pub const VERTEX: &str = include_str!("../shaders/vertex.wgsl");

/// Fragment shader - writes the per-draw color.
pub const FRAGMENT: &str = include_str!("../shaders/fragment.wgsl");

/// Vertex shader entry point name.
pub const VERTEX_ENTRY: &str = "vs_main";

/// Fragment shader entry point name.
pub const FRAGMENT_ENTRY: &str = "fs_main";
