//! Per-frame composition of the scan and its reference circles.

use crate::camera::OrbitCamera;
use glam::{Mat4, Vec4};
use lidarview_data::{CircleBuffer, CirclePlane, PointBuffer};
use lidarview_gpu::{DrawBackend, DrawCommand, MeshSlot, Primitive};
use tracing::info;

/// Color of the point cloud.
pub const POINT_COLOR: Vec4 = Vec4::ONE;

/// Color of the reference circle in `plane`.
pub fn plane_color(plane: CirclePlane) -> Vec4 {
    match plane {
        CirclePlane::XY => Vec4::new(1.0, 0.0, 0.0, 1.0),
        CirclePlane::YZ => Vec4::new(0.0, 1.0, 0.0, 1.0),
        CirclePlane::ZX => Vec4::new(0.0, 0.0, 1.0, 1.0),
    }
}

/// Drawable size in pixels, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    width: u32,
    height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Matrices for one draw. `mvp = projection * (view * model)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformSet {
    pub view: Mat4,
    pub projection: Mat4,
    pub model: Mat4,
    pub mvp: Mat4,
}

impl TransformSet {
    pub fn new(view: Mat4, projection: Mat4, model: Mat4) -> Self {
        Self {
            view,
            projection,
            model,
            mvp: projection * (view * model),
        }
    }

    fn with_model(&self, model: Mat4) -> Self {
        Self::new(self.view, self.projection, model)
    }
}

/// Owns the scan and circle geometry and turns a camera snapshot into draws.
pub struct FrameRenderer {
    points: PointBuffer,
    circles: [CircleBuffer; 3],
    viewport: Viewport,
}

impl FrameRenderer {
    pub fn new(
        points: PointBuffer,
        circles: [CircleBuffer; 3],
        viewport: Viewport,
    ) -> Self {
        Self {
            points,
            circles,
            viewport,
        }
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
    }

    /// Push the point and circle geometry to `backend`.
    pub fn upload<B: DrawBackend>(&self, backend: &mut B) -> Result<(), B::Error> {
        backend.upload(MeshSlot::PointCloud, self.points.positions())?;
        for circle in &self.circles {
            backend.upload(MeshSlot::Circle(circle.plane()), circle.vertices())?;
        }
        info!(
            "Uploaded {} points and {} reference circles",
            self.points.len(),
            self.circles.len()
        );
        Ok(())
    }

    /// Transforms for the point cloud, whose model matrix is the identity.
    pub fn transforms(&self, camera: &OrbitCamera) -> TransformSet {
        let (view, projection) = camera.compute_view(self.viewport.aspect());
        TransformSet::new(view, projection, Mat4::IDENTITY)
    }

    /// Draws for one frame: the points, then the XY, YZ and ZX circles
    /// centered on the orbit target.
    pub fn plan(&self, camera: &OrbitCamera) -> Vec<DrawCommand> {
        let base = self.transforms(camera);
        let mut commands = Vec::with_capacity(1 + self.circles.len());

        if !self.points.is_empty() {
            commands.push(DrawCommand {
                slot: MeshSlot::PointCloud,
                primitive: Primitive::Points,
                mvp: base.mvp,
                color: POINT_COLOR,
            });
        }

        let circle = base.with_model(Mat4::from_translation(camera.state().target));
        for buffer in self.circles.iter().filter(|c| !c.is_empty()) {
            commands.push(DrawCommand {
                slot: MeshSlot::Circle(buffer.plane()),
                primitive: Primitive::LineLoop,
                mvp: circle.mvp,
                color: plane_color(buffer.plane()),
            });
        }
        commands
    }

    pub fn render<B: DrawBackend>(&self, camera: &OrbitCamera, backend: &mut B) {
        for command in self.plan(camera) {
            backend.draw(&command);
        }
    }
}
