//! Lidarview viewer
//!
//! Opens a window on a decoded scan and lets touch (or mouse) gestures orbit,
//! zoom and pan around it, with reference circles marking the orbit target.

mod app;
pub mod camera;
pub mod config;
pub mod controls;
pub mod frame;

pub use app::{ViewerError, run};
pub use camera::{CameraLimits, CameraState, OrbitCamera, Projection, SharedCamera};
pub use config::{Args, ViewerConfig};
pub use controls::{GestureRouter, GestureState, TouchAction, TouchEvent, TouchTracker};
pub use frame::{FrameRenderer, TransformSet, Viewport};
