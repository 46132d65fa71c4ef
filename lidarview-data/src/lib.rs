//! Lidarview Data Crate
//!
//! Scan decoding and reference geometry for the point-cloud viewer.
//! This crate is GPU-agnostic and only produces CPU-side vertex buffers.

pub mod circle;
pub mod error;
pub mod pcd;
pub mod types;

pub use circle::{generate_axis_circles, generate_circle};
pub use error::DecodeError;
pub use pcd::{PcdHeader, decode_pcd, decode_pcd_bytes};
pub use types::{CircleBuffer, CirclePlane, PointBuffer};
