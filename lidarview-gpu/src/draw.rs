//! The seam between frame planning and GPU submission.
//!
//! The frame renderer decides *what* to draw each frame and hands
//! [`DrawCommand`]s to a [`DrawBackend`]. [`GpuScene`](crate::GpuScene)
//! executes them on wgpu; [`RecordingBackend`] keeps them in memory.

use glam::{Mat4, Vec3, Vec4};
use lidarview_data::CirclePlane;
use std::collections::HashMap;

/// Identifies an uploaded vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshSlot {
    PointCloud,
    Circle(CirclePlane),
}

/// How the vertices of a slot are assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Points,
    /// Consecutive vertices joined by lines, last back to first.
    LineLoop,
}

/// A single draw of one uploaded slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub slot: MeshSlot,
    pub primitive: Primitive,
    pub mvp: Mat4,
    pub color: Vec4,
}

pub trait DrawBackend {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Replace the vertex data held for `slot`.
    fn upload(&mut self, slot: MeshSlot, vertices: &[Vec3]) -> Result<(), Self::Error>;

    /// Queue a draw. Commands execute in submission order.
    fn draw(&mut self, command: &DrawCommand);
}

/// In-memory backend that stores uploads and draw commands.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    meshes: HashMap<MeshSlot, Vec<Vec3>>,
    pub commands: Vec<DrawCommand>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mesh(&self, slot: MeshSlot) -> Option<&[Vec3]> {
        self.meshes.get(&slot).map(Vec::as_slice)
    }

    /// Take the recorded commands, leaving the list empty.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl DrawBackend for RecordingBackend {
    type Error = std::convert::Infallible;

    fn upload(&mut self, slot: MeshSlot, vertices: &[Vec3]) -> Result<(), Self::Error> {
        self.meshes.insert(slot, vertices.to_vec());
        Ok(())
    }

    fn draw(&mut self, command: &DrawCommand) {
        self.commands.push(*command);
    }
}
