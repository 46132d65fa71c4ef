//! Reference circles drawn around the orbit target.
//!
//! One circle per axis-aligned plane gives the viewer a sense of orientation
//! while the scan itself is being rotated.

use crate::types::{CircleBuffer, CirclePlane};
use tracing::debug;

/// Generate a closed circle outline of `segments + 1` vertices in `plane`.
///
/// Vertex `i` sits at angle `i * 2π / segments`, so the last vertex repeats
/// the first and a line strip over the buffer closes the loop. With zero
/// segments the buffer holds only the starting vertex.
pub fn generate_circle(radius: f32, segments: u32, plane: CirclePlane) -> CircleBuffer {
    if segments == 0 {
        return CircleBuffer::new(plane, vec![plane.place(radius, 0.0)]);
    }

    let step = std::f64::consts::TAU / segments as f64;
    let vertices = (0..=segments)
        .map(|i| {
            let angle = i as f64 * step;
            let a = angle.cos() as f32 * radius;
            let b = angle.sin() as f32 * radius;
            plane.place(a, b)
        })
        .collect::<Vec<_>>();

    debug!(
        "Generated {:?} circle: radius={}, {} vertices",
        plane,
        radius,
        vertices.len()
    );

    CircleBuffer::new(plane, vertices)
}

/// Generate the XY, YZ and ZX circles in that order.
pub fn generate_axis_circles(radius: f32, segments: u32) -> [CircleBuffer; 3] {
    CirclePlane::ALL.map(|plane| generate_circle(radius, segments, plane))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_vertex_count_is_segments_plus_one() {
        for segments in [1, 3, 16, 100] {
            let circle = generate_circle(1.0, segments, CirclePlane::XY);
            assert_eq!(circle.len(), segments as usize + 1);
        }
    }

    #[test]
    fn test_loop_is_closed() {
        for plane in CirclePlane::ALL {
            let circle = generate_circle(2.5, 100, plane);
            let first = circle.vertices()[0];
            let last = *circle.vertices().last().unwrap();
            assert!(first.abs_diff_eq(last, 1e-5), "{plane:?}: {first} vs {last}");
        }
    }

    #[test]
    fn test_off_plane_coordinate_is_zero() {
        for plane in CirclePlane::ALL {
            let circle = generate_circle(1.0, 64, plane);
            for v in circle.vertices() {
                assert_eq!(v.to_array()[plane.normal_axis()], 0.0, "{plane:?}");
            }
        }
    }

    #[test]
    fn test_vertices_lie_on_radius() {
        let circle = generate_circle(3.0, 32, CirclePlane::ZX);
        for v in circle.vertices() {
            assert!((v.length() - 3.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_plane_mapping_of_first_quarter() {
        // i = 1 of 4 segments is at 90 degrees: (cos, sin) = (0, 1).
        let xy = generate_circle(1.0, 4, CirclePlane::XY);
        let yz = generate_circle(1.0, 4, CirclePlane::YZ);
        let zx = generate_circle(1.0, 4, CirclePlane::ZX);
        assert!(xy.vertices()[1].abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-6));
        assert!(yz.vertices()[1].abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), 1e-6));
        assert!(zx.vertices()[1].abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), 1e-6));
        assert_eq!(yz.vertices()[0], Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_deterministic() {
        let a = generate_circle(1.0, 100, CirclePlane::YZ);
        let b = generate_circle(1.0, 100, CirclePlane::YZ);
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_segments() {
        let circle = generate_circle(2.0, 0, CirclePlane::XY);
        assert_eq!(circle.vertices(), &[Vec3::new(2.0, 0.0, 0.0)]);
    }

    #[test]
    fn test_axis_circles_order() {
        let circles = generate_axis_circles(1.0, 8);
        let planes: Vec<_> = circles.iter().map(|c| c.plane()).collect();
        assert_eq!(planes, CirclePlane::ALL.to_vec());
    }
}
