//! Shader programs: WGSL sources for both stages, compiled with explicit
//! error reporting instead of wgpu's uncaptured-error panic.

use crate::shaders;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// File names looked up in a shader directory.
pub const VERTEX_FILE: &str = "vertex.wgsl";
pub const FRAGMENT_FILE: &str = "fragment.wgsl";

/// Pipeline stage a shader belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("Failed to read shader asset {path}: {source}")]
    Asset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{stage} shader failed to compile: {message}")]
    Compile { stage: ShaderStage, message: String },
    #[error("Shader program failed to link: {message}")]
    Link { message: String },
}

/// WGSL source text for the vertex and fragment stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSources {
    /// Sources compiled into the binary.
    pub fn builtin() -> Self {
        Self {
            vertex: shaders::VERTEX.to_string(),
            fragment: shaders::FRAGMENT.to_string(),
        }
    }

    /// Load `vertex.wgsl` and `fragment.wgsl` from `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ShaderError> {
        let dir = dir.as_ref();
        Ok(Self {
            vertex: read_asset(&dir.join(VERTEX_FILE))?,
            fragment: read_asset(&dir.join(FRAGMENT_FILE))?,
        })
    }
}

fn read_asset(path: &Path) -> Result<String, ShaderError> {
    let source = std::fs::read_to_string(path).map_err(|source| ShaderError::Asset {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read shader asset {} ({} bytes)", path.display(), source.len());
    Ok(source)
}

/// Compiled vertex and fragment modules.
///
/// Linking happens when a pipeline is built from the program; see
/// [`RenderPipelineBuilder`](crate::RenderPipelineBuilder).
pub struct ShaderProgram {
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
}

impl ShaderProgram {
    pub fn compile(device: &wgpu::Device, sources: &ShaderSources) -> Result<Self, ShaderError> {
        let vertex = compile_stage(device, ShaderStage::Vertex, &sources.vertex)?;
        let fragment = compile_stage(device, ShaderStage::Fragment, &sources.fragment)?;
        Ok(Self { vertex, fragment })
    }

    pub fn vertex(&self) -> &wgpu::ShaderModule {
        &self.vertex
    }

    pub fn fragment(&self) -> &wgpu::ShaderModule {
        &self.fragment
    }
}

fn compile_stage(
    device: &wgpu::Device,
    stage: ShaderStage,
    source: &str,
) -> Result<wgpu::ShaderModule, ShaderError> {
    let label = format!("{stage} shader");
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        let message = err.to_string();
        error!("{stage} shader compile log:\n{message}");
        return Err(ShaderError::Compile { stage, message });
    }
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_sources_name_entry_points() {
        let sources = ShaderSources::builtin();
        assert!(sources.vertex.contains(shaders::VERTEX_ENTRY));
        assert!(sources.fragment.contains(shaders::FRAGMENT_ENTRY));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = std::env::temp_dir().join(format!("lidarview-shaders-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(VERTEX_FILE), "// vertex").unwrap();
        std::fs::write(dir.join(FRAGMENT_FILE), "// fragment").unwrap();

        let result = ShaderSources::load(&dir);
        std::fs::remove_dir_all(&dir).ok();

        let sources = result.unwrap();
        assert_eq!(sources.vertex, "// vertex");
        assert_eq!(sources.fragment, "// fragment");
    }

    #[test]
    fn test_missing_asset_reports_path() {
        let dir = std::env::temp_dir().join("lidarview-shaders-missing");
        match ShaderSources::load(&dir) {
            Err(ShaderError::Asset { path, .. }) => assert_eq!(path, dir.join(VERTEX_FILE)),
            other => panic!("Expected Asset error, got {other:?}"),
        }
    }

    #[test]
    fn test_compile_error_names_stage() {
        let err = ShaderError::Compile {
            stage: ShaderStage::Fragment,
            message: "unknown identifier".into(),
        };
        assert_eq!(
            err.to_string(),
            "fragment shader failed to compile: unknown identifier"
        );
    }
}
