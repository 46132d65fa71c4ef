use crate::camera::{CameraLimits, Projection};
use clap::Parser;
use std::path::PathBuf;

/// Lidarview - orbit viewer for binary PCD scans
#[derive(Parser, Debug, Clone)]
#[command(name = "lidarview")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Scan file, relative to the scans directory unless absolute
    #[arg(short, long, default_value = "scan1.pcd")]
    pub file: PathBuf,

    /// Directory holding scan files
    #[arg(long, default_value = "Scans")]
    pub scans_dir: PathBuf,

    /// Load vertex.wgsl and fragment.wgsl from this directory instead of the built-in shaders
    #[arg(long)]
    pub shader_dir: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Everything a viewer session needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub scan_path: PathBuf,
    pub shader_dir: Option<PathBuf>,
    pub log_level: String,
    pub title: String,
    pub limits: CameraLimits,
    pub projection: Projection,
    pub circle_radius: f32,
    pub circle_segments: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            scan_path: PathBuf::from("Scans").join("scan1.pcd"),
            shader_dir: None,
            log_level: "info".to_string(),
            title: "Lidarview".to_string(),
            limits: CameraLimits::default(),
            projection: Projection::default(),
            circle_radius: 1.0,
            circle_segments: 100,
        }
    }
}

impl From<Args> for ViewerConfig {
    fn from(args: Args) -> Self {
        // join() keeps an absolute file as-is
        let scan_path = args.scans_dir.join(&args.file);
        Self {
            scan_path,
            shader_dir: args.shader_dir,
            log_level: args.log_level,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let config = ViewerConfig::from(Args::parse_from(["lidarview"]));
        assert_eq!(config.scan_path, PathBuf::from("Scans/scan1.pcd"));
        assert_eq!(config.shader_dir, None);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.circle_segments, 100);
    }

    #[test]
    fn test_relative_file_joins_scans_dir() {
        let args = Args::parse_from(["lidarview", "--file", "street.pcd", "--scans-dir", "data"]);
        assert_eq!(ViewerConfig::from(args).scan_path, PathBuf::from("data/street.pcd"));
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_file_overrides_scans_dir() {
        let args = Args::parse_from(["lidarview", "-f", "/tmp/scan.pcd"]);
        assert_eq!(ViewerConfig::from(args).scan_path, PathBuf::from("/tmp/scan.pcd"));
    }

    #[test]
    fn test_shader_dir_and_log_level() {
        let args = Args::parse_from([
            "lidarview",
            "--shader-dir",
            "assets/shaders",
            "--log-level",
            "debug",
        ]);
        let config = ViewerConfig::from(args);
        assert_eq!(config.shader_dir, Some(PathBuf::from("assets/shaders")));
        assert_eq!(config.log_level, "debug");
    }
}
