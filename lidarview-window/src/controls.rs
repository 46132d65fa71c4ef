//! Touch gesture routing.
//!
//! Per-finger winit touches are folded into whole-gesture [`TouchEvent`]s by
//! [`TouchTracker`], then [`GestureRouter`] turns them into camera motion:
//! one finger orbits, two fingers pinch-zoom and pan. On desktop,
//! [`MouseFallback`] drives the same router with the left button and wheel.

use crate::camera::OrbitCamera;
use glam::Vec2;
use tracing::trace;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, Touch, TouchPhase, WindowEvent};

/// Pinch separation change to zoom units.
const PINCH_ZOOM_SCALE: f32 = 0.01;

/// Gesture phase, modeled on platform motion events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    /// First finger touched.
    Down,
    /// Another finger joined.
    PointerDown,
    Move,
    /// A finger lifted while others remain.
    PointerUp,
    /// Last finger lifted.
    Up,
    Cancel,
}

/// A gesture event with every live pointer position, in order of first
/// contact. A lifting pointer is still listed in its own up event.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub action: TouchAction,
    pub pointers: Vec<Vec2>,
}

impl TouchEvent {
    pub fn new(action: TouchAction, pointers: impl Into<Vec<Vec2>>) -> Self {
        Self {
            action,
            pointers: pointers.into(),
        }
    }
}

/// Values remembered between events.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GestureState {
    pub previous: Vec2,
    pub previous_midpoint: Vec2,
    pub previous_separation: f32,
}

/// Maps gesture events onto an [`OrbitCamera`].
#[derive(Debug, Default)]
pub struct GestureRouter {
    state: GestureState,
}

impl GestureRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn handle(&mut self, event: &TouchEvent, camera: &mut OrbitCamera) {
        if matches!(
            event.action,
            TouchAction::Up | TouchAction::PointerUp | TouchAction::Cancel
        ) {
            self.state.previous_separation = 0.0;
            self.state.previous_midpoint = Vec2::ZERO;
        }

        match event.pointers.as_slice() {
            [position] => self.single(event.action, *position, camera),
            [a, b] => self.pinch(event.action, *a, *b, camera),
            _ => {}
        }
    }

    fn single(&mut self, action: TouchAction, position: Vec2, camera: &mut OrbitCamera) {
        if matches!(action, TouchAction::Down | TouchAction::Move) {
            let delta = position - self.state.previous;
            trace!("orbit by {delta}");
            camera.rotate(-delta.x, delta.y);
        }
        self.state.previous = position;
    }

    fn pinch(&mut self, action: TouchAction, a: Vec2, b: Vec2, camera: &mut OrbitCamera) {
        let midpoint = (a + b) * 0.5;
        let separation = a.distance(b);

        if action == TouchAction::Move {
            let moved = midpoint - self.state.previous_midpoint;
            let spread = separation - self.state.previous_separation;
            trace!("pinch spread {spread}, pan {moved}");
            camera.zoom(spread * PINCH_ZOOM_SCALE);
            camera.pan(-moved.x, -moved.y);
        }

        self.state.previous_midpoint = midpoint;
        self.state.previous_separation = separation;
    }
}

/// Folds per-finger touches into [`TouchEvent`]s.
#[derive(Debug, Default)]
pub struct TouchTracker {
    active: Vec<(u64, Vec2)>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_touch(&mut self, touch: &Touch) -> Option<TouchEvent> {
        let position = Vec2::new(touch.location.x as f32, touch.location.y as f32);
        self.track(touch.id, touch.phase, position)
    }

    pub fn track(&mut self, id: u64, phase: TouchPhase, position: Vec2) -> Option<TouchEvent> {
        match phase {
            TouchPhase::Started => {
                self.active.push((id, position));
                let action = if self.active.len() == 1 {
                    TouchAction::Down
                } else {
                    TouchAction::PointerDown
                };
                Some(TouchEvent::new(action, self.positions()))
            }
            TouchPhase::Moved => {
                let slot = self.active.iter_mut().find(|(active, _)| *active == id)?;
                slot.1 = position;
                Some(TouchEvent::new(TouchAction::Move, self.positions()))
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                let index = self.active.iter().position(|(active, _)| *active == id)?;
                self.active[index].1 = position;
                let action = match phase {
                    TouchPhase::Cancelled => TouchAction::Cancel,
                    _ if self.active.len() == 1 => TouchAction::Up,
                    _ => TouchAction::PointerUp,
                };
                let event = TouchEvent::new(action, self.positions());
                self.active.remove(index);
                Some(event)
            }
        }
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    fn positions(&self) -> Vec<Vec2> {
        self.active.iter().map(|(_, position)| *position).collect()
    }
}

/// Output of the mouse fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum MouseGesture {
    Touch(TouchEvent),
    /// Zoom amount in orbit distance units.
    Zoom(f32),
}

/// Left-button drag as a single pointer, wheel as zoom.
#[derive(Debug, Default)]
pub struct MouseFallback {
    cursor: Option<Vec2>,
    dragging: bool,
}

impl MouseFallback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) -> Option<MouseGesture> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(Vec2::new(position.x as f32, position.y as f32))
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.left_button(*state == ElementState::Pressed),
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                Some(MouseGesture::Zoom(lines))
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.end_drag()
            }
            _ => None,
        }
    }

    pub fn cursor_moved(&mut self, position: Vec2) -> Option<MouseGesture> {
        self.cursor = Some(position);
        self.dragging
            .then(|| MouseGesture::Touch(TouchEvent::new(TouchAction::Move, [position])))
    }

    pub fn left_button(&mut self, pressed: bool) -> Option<MouseGesture> {
        if !pressed {
            return self.end_drag();
        }
        let position = self.cursor?;
        self.dragging = true;
        Some(MouseGesture::Touch(TouchEvent::new(
            TouchAction::Down,
            [position],
        )))
    }

    fn end_drag(&mut self) -> Option<MouseGesture> {
        if !std::mem::take(&mut self.dragging) {
            return None;
        }
        let pointers: Vec<Vec2> = self.cursor.into_iter().collect();
        Some(MouseGesture::Touch(TouchEvent::new(TouchAction::Up, pointers)))
    }
}
