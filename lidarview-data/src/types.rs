//! CPU-side vertex buffers for the scan viewer.
//!
//! Both buffer types are immutable once built. GPU upload goes through
//! [`PointBuffer::as_bytes`] / [`CircleBuffer::as_bytes`], which expose the
//! positions as tightly packed native-order `f32` triples.

use glam::Vec3;

/// Decoded point positions from a scan file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointBuffer {
    positions: Vec<Vec3>,
}

impl PointBuffer {
    /// Wrap already decoded positions.
    pub fn new(positions: Vec<Vec3>) -> Self {
        Self { positions }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Positions in file order.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Raw bytes of the packed x,y,z floats.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }
}

/// Axis-aligned plane a reference circle lies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CirclePlane {
    XY,
    YZ,
    ZX,
}

impl CirclePlane {
    /// All planes in draw order.
    pub const ALL: [CirclePlane; 3] = [CirclePlane::XY, CirclePlane::YZ, CirclePlane::ZX];

    /// Place the in-plane coordinates `(a, b)` into 3D.
    pub fn place(self, a: f32, b: f32) -> Vec3 {
        match self {
            CirclePlane::XY => Vec3::new(a, b, 0.0),
            CirclePlane::YZ => Vec3::new(0.0, a, b),
            CirclePlane::ZX => Vec3::new(a, 0.0, b),
        }
    }

    /// Index of the coordinate that is always zero for this plane.
    pub fn normal_axis(self) -> usize {
        match self {
            CirclePlane::XY => 2,
            CirclePlane::YZ => 0,
            CirclePlane::ZX => 1,
        }
    }
}

/// Closed circle outline in one plane. The first and last vertex coincide.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleBuffer {
    plane: CirclePlane,
    vertices: Vec<Vec3>,
}

impl CircleBuffer {
    pub(crate) fn new(plane: CirclePlane, vertices: Vec<Vec3>) -> Self {
        Self { plane, vertices }
    }

    pub fn plane(&self) -> CirclePlane {
        self.plane
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_buffer_bytes_are_packed_triples() {
        let buffer = PointBuffer::new(vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)]);
        let bytes = buffer.as_bytes();
        assert_eq!(bytes.len(), 2 * 3 * 4);

        let floats: &[f32] = bytemuck::cast_slice(bytes);
        assert_eq!(floats, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_empty_point_buffer() {
        let buffer = PointBuffer::default();
        assert!(buffer.is_empty());
        assert!(buffer.as_bytes().is_empty());
    }

    #[test]
    fn test_plane_placement() {
        assert_eq!(CirclePlane::XY.place(1.0, 2.0), Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(CirclePlane::YZ.place(1.0, 2.0), Vec3::new(0.0, 1.0, 2.0));
        assert_eq!(CirclePlane::ZX.place(1.0, 2.0), Vec3::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn test_normal_axis_is_zero_after_placement() {
        for plane in CirclePlane::ALL {
            let p = plane.place(3.0, -4.0);
            assert_eq!(p.to_array()[plane.normal_axis()], 0.0);
        }
    }
}
