use glam::{Mat4, Vec3};
use parking_lot::Mutex;
use std::sync::Arc;

/// Orbit parameters in degrees plus the point being orbited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    /// Rotation around the vertical axis, unbounded.
    pub yaw: f32,
    /// Elevation, wrapped into `[0, 360)`.
    pub pitch: f32,
    /// Eye distance from `target`.
    pub distance: f32,
    pub target: Vec3,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 20.0,
            distance: 20.0,
            target: Vec3::ZERO,
        }
    }
}

impl CameraState {
    /// Eye position on the orbit sphere.
    pub fn eye(&self) -> Vec3 {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();
        let offset = Vec3::new(
            pitch.cos() * yaw.sin(),
            pitch.sin(),
            pitch.cos() * yaw.cos(),
        );
        self.target + offset * self.distance
    }

    /// Up vector, flipped once the orbit passes over the pole.
    ///
    /// The sign test runs in f64: exactly 90 degrees keeps +Y, exactly 270
    /// gives -Y.
    pub fn up(&self) -> Vec3 {
        if f64::from(self.pitch).to_radians().cos() > 0.0 {
            Vec3::Y
        } else {
            Vec3::NEG_Y
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, self.up())
    }
}

/// Bounds and speeds applied by the gesture mutators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraLimits {
    pub min_distance: f32,
    pub max_distance: f32,
    /// Pan distance per pixel, per unit of orbit distance.
    pub pan_speed: f32,
}

impl Default for CameraLimits {
    fn default() -> Self {
        Self {
            min_distance: 1.0,
            max_distance: 100.0,
            pan_speed: 0.001,
        }
    }
}

/// Projection matrix configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y: 60.0,
            near: 1.0,
            far: 100.0,
        }
    }
}

impl Projection {
    /// Right-handed perspective with a `[0, 1]` depth range.
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y.to_radians(), aspect, self.near, self.far)
    }
}

/// Camera orbiting a target point, driven by touch gestures.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrbitCamera {
    state: CameraState,
    limits: CameraLimits,
    projection: Projection,
}

impl OrbitCamera {
    pub fn new(limits: CameraLimits, projection: Projection) -> Self {
        Self {
            state: CameraState::default(),
            limits,
            projection,
        }
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    /// Orbit by the given angles in degrees.
    pub fn rotate(&mut self, d_yaw: f32, d_pitch: f32) {
        self.state.yaw -= d_yaw;
        let pitch = (self.state.pitch + d_pitch).rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative inputs
        self.state.pitch = if pitch >= 360.0 { 0.0 } else { pitch };
    }

    /// Move towards the target by `delta`, clamped to the distance limits.
    pub fn zoom(&mut self, delta: f32) {
        self.state.distance = (self.state.distance - delta)
            .clamp(self.limits.min_distance, self.limits.max_distance);
    }

    /// Shift the target in the screen plane, scaled by the orbit distance.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let speed = self.state.distance * self.limits.pan_speed;
        let yaw = self.state.yaw.to_radians();
        let right = Vec3::new(-yaw.cos(), yaw.sin(), 0.0);
        let up = Vec3::Z;
        self.state.target += right * dx * speed + up * dy * speed;
    }

    /// View and projection matrices for the given aspect ratio.
    pub fn compute_view(&self, aspect: f32) -> (Mat4, Mat4) {
        (self.state.view_matrix(), self.projection.matrix(aspect))
    }

    pub fn eye(&self) -> Vec3 {
        self.state.eye()
    }

    pub fn reset(&mut self) {
        self.state = CameraState::default();
    }
}

/// Camera shared between input handling and the render loop.
///
/// Mutations happen under the lock; the renderer copies the whole camera
/// once per frame with [`SharedCamera::snapshot`].
#[derive(Debug, Clone, Default)]
pub struct SharedCamera {
    inner: Arc<Mutex<OrbitCamera>>,
}

impl SharedCamera {
    pub fn new(camera: OrbitCamera) -> Self {
        Self {
            inner: Arc::new(Mutex::new(camera)),
        }
    }

    pub fn snapshot(&self) -> OrbitCamera {
        *self.inner.lock()
    }

    /// Run `f` with exclusive access to the camera.
    pub fn update<R>(&self, f: impl FnOnce(&mut OrbitCamera) -> R) -> R {
        f(&mut *self.inner.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let camera = OrbitCamera::default();
        assert_eq!(
            camera.state(),
            CameraState {
                yaw: 0.0,
                pitch: 20.0,
                distance: 20.0,
                target: Vec3::ZERO
            }
        );
    }

    #[test]
    fn test_zoom_stays_in_bounds() {
        let mut camera = OrbitCamera::default();
        for _ in 0..50 {
            camera.zoom(10.0);
        }
        assert_eq!(camera.state().distance, 1.0);
        for _ in 0..50 {
            camera.zoom(-10.0);
        }
        assert_eq!(camera.state().distance, 100.0);
    }

    #[test]
    fn test_zoom_moves_closer() {
        let mut camera = OrbitCamera::default();
        camera.zoom(0.5);
        assert_eq!(camera.state().distance, 19.5);
    }

    #[test]
    fn test_pitch_wraps() {
        let mut camera = OrbitCamera::default();
        let deltas = [350.0, -1000.0, 0.25, 719.0, -20.0, -1e-6, 3600.0, -359.9];
        for d in deltas {
            camera.rotate(0.0, d);
            let pitch = camera.state().pitch;
            assert!((0.0..360.0).contains(&pitch), "pitch {pitch} after {d}");
        }
    }

    #[test]
    fn test_rotate_subtracts_yaw() {
        let mut camera = OrbitCamera::default();
        camera.rotate(-10.0, 0.0);
        assert_eq!(camera.state().yaw, 10.0);
        assert_eq!(camera.state().pitch, 20.0);
    }

    #[test]
    fn test_eye_at_default_pose() {
        let camera = OrbitCamera::default();
        let p = 20f32.to_radians();
        let expected = Vec3::new(0.0, p.sin(), p.cos()) * 20.0;
        assert!(camera.eye().abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn test_up_flips_past_vertical() {
        let mut camera = OrbitCamera::default();
        assert_eq!(camera.state().up(), Vec3::Y);
        camera.rotate(0.0, 100.0);
        assert_eq!(camera.state().up(), Vec3::NEG_Y);
        camera.rotate(0.0, 180.0);
        assert_eq!(camera.state().up(), Vec3::Y);
    }

    #[test]
    fn test_up_at_exact_poles() {
        let at = |pitch| CameraState {
            pitch,
            ..CameraState::default()
        };
        assert_eq!(at(90.0).up(), Vec3::Y);
        assert_eq!(at(270.0).up(), Vec3::NEG_Y);
        assert_eq!(at(180.0).up(), Vec3::NEG_Y);
        assert_eq!(at(0.0).up(), Vec3::Y);

        // A 70 px drag from the default pitch lands exactly on 90.
        let mut camera = OrbitCamera::default();
        camera.rotate(0.0, 70.0);
        assert_eq!(camera.state().pitch, 90.0);
        assert_eq!(camera.state().up(), Vec3::Y);
    }

    #[test]
    fn test_compute_view_is_deterministic() {
        let mut camera = OrbitCamera::default();
        camera.rotate(33.3, 47.1);
        camera.pan(12.0, -7.0);
        let a = camera.compute_view(16.0 / 9.0);
        let b = camera.compute_view(16.0 / 9.0);
        assert_eq!(a.0.to_cols_array(), b.0.to_cols_array());
        assert_eq!(a.1.to_cols_array(), b.1.to_cols_array());
    }

    #[test]
    fn test_view_maps_target_in_front_of_eye() {
        let camera = OrbitCamera::default();
        let (view, _) = camera.compute_view(1.0);
        let target = view.transform_point3(Vec3::ZERO);
        assert!(target.z < 0.0);
        assert!((target.length() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_pan_uses_yaw_and_distance() {
        let mut camera = OrbitCamera::default();
        camera.pan(100.0, 50.0);
        // yaw 0: right = (-1, 0, 0); speed = 20 * 0.001
        assert!(
            camera
                .state()
                .target
                .abs_diff_eq(Vec3::new(-2.0, 0.0, 1.0), 1e-5)
        );

        let mut camera = OrbitCamera::default();
        camera.rotate(-90.0, 0.0);
        camera.pan(100.0, 0.0);
        assert!(
            camera
                .state()
                .target
                .abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-5)
        );
    }

    #[test]
    fn test_reset() {
        let mut camera = OrbitCamera::default();
        camera.rotate(5.0, 5.0);
        camera.zoom(3.0);
        camera.reset();
        assert_eq!(camera.state(), CameraState::default());
    }

    #[test]
    fn test_shared_snapshots_are_consistent() {
        let shared = SharedCamera::default();
        let writer = {
            let shared = shared.clone();
            std::thread::spawn(move || {
                for i in 0..2000 {
                    let k = i as f32;
                    shared.update(|camera| {
                        camera.state = CameraState {
                            yaw: k,
                            pitch: k % 360.0,
                            distance: 1.0 + k % 99.0,
                            target: Vec3::splat(k),
                        };
                    });
                }
            })
        };

        for _ in 0..2000 {
            let s = shared.snapshot().state();
            if s == CameraState::default() {
                continue;
            }
            assert_eq!(s.pitch, s.yaw % 360.0);
            assert_eq!(s.distance, 1.0 + s.yaw % 99.0);
            assert_eq!(s.target, Vec3::splat(s.yaw));
        }
        writer.join().unwrap();
    }
}
