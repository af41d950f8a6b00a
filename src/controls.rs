//! Orbit camera controller.
//!
//! Keeps the camera on a sphere around a target point. Rotation requests
//! accumulate in a spherical delta that is bled into the camera position a
//! fraction at a time, so motion eases in and out. Auto-rotation feeds the
//! same delta every update while the user is not dragging.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::scene::PerspectiveCamera;

/// Keeps the polar angle away from the poles where `look_at` degenerates.
const POLE_EPSILON: f32 = 1e-6;

/// Spherical coordinates around the orbit target, Y up.
///
/// `phi` is the polar angle from +Y, `theta` the azimuth around Y measured
/// from +Z toward +X.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    /// Spherical coordinates of `offset`.
    pub fn from_vec3(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    /// Cartesian offset for these coordinates.
    pub fn to_vec3(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

/// Damped, auto-rotating orbit controls.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Whether the wheel changes the orbit radius.
    pub enable_zoom: bool,
    /// Whether a secondary drag moves the target.
    pub enable_pan: bool,
    /// Ease rotation instead of applying it in one update.
    pub enable_damping: bool,
    /// Fraction of the pending rotation applied per update.
    pub damping_factor: f32,
    /// Rotate around the target continuously.
    pub auto_rotate: bool,
    /// Auto-rotation speed; 2.0 is one orbit every 30 seconds at 60 updates
    /// per second.
    pub auto_rotate_speed: f32,
    /// Drag sensitivity.
    pub rotate_speed: f32,
    /// Smallest polar angle.
    pub min_polar_angle: f32,
    /// Largest polar angle.
    pub max_polar_angle: f32,
    /// Closest orbit radius when zooming.
    pub min_distance: f32,
    /// Farthest orbit radius when zooming.
    pub max_distance: f32,
    spherical: Spherical,
    spherical_delta: Spherical,
    scale: f32,
    pan_offset: Vec3,
    dragging: bool,
}

impl OrbitControls {
    /// Controls orbiting the origin from the camera's current position.
    pub fn new(camera: &PerspectiveCamera) -> Self {
        let target = Vec3::ZERO;
        Self {
            target,
            enable_zoom: true,
            enable_pan: true,
            enable_damping: false,
            damping_factor: 0.05,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            rotate_speed: 1.0,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            spherical: Spherical::from_vec3(camera.position - target),
            spherical_delta: Spherical::default(),
            scale: 1.0,
            pan_offset: Vec3::ZERO,
            dragging: false,
        }
    }

    /// Current spherical coordinates of the camera.
    pub fn spherical(&self) -> Spherical {
        self.spherical
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Rotation applied per update by auto-rotation.
    pub fn auto_rotation_angle(&self) -> f32 {
        TAU / 60.0 / 60.0 * self.auto_rotate_speed
    }

    /// Queue a rotation around the vertical axis.
    pub fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    /// Queue a change of polar angle.
    pub fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    // ========== Pointer Input ==========

    /// A rotation drag started.
    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    /// A rotation drag ended.
    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Rotate by a pointer movement of `(dx, dy)` pixels over an element
    /// `element_height` pixels tall. A full-height drag turns a full circle.
    pub fn drag(&mut self, dx: f32, dy: f32, element_height: f32) {
        if !self.dragging || element_height <= 0.0 {
            return;
        }
        self.rotate_left(TAU * dx / element_height * self.rotate_speed);
        self.rotate_up(TAU * dy / element_height * self.rotate_speed);
    }

    /// Move the target by a pointer movement of `(dx, dy)` pixels, so the
    /// point under the cursor follows it. Ignored unless panning is enabled.
    pub fn pan(&mut self, dx: f32, dy: f32, element_height: f32, camera: &PerspectiveCamera) {
        if !self.enable_pan || element_height <= 0.0 {
            return;
        }
        let half_height =
            (camera.position - self.target).length() * (camera.fov.to_radians() / 2.0).tan();
        let right = camera.quaternion * Vec3::X;
        let up = camera.quaternion * Vec3::Y;
        self.pan_offset += (up * dy - right * dx) * 2.0 * half_height / element_height;
    }

    /// Wheel input. Ignored unless zoom is enabled.
    pub fn wheel(&mut self, delta: f32) {
        if !self.enable_zoom || delta == 0.0 {
            return;
        }
        let step = 0.95_f32.powf(delta.abs());
        self.scale *= if delta > 0.0 { step } else { 1.0 / step };
    }

    /// Advance damping and auto-rotation and move `camera` accordingly.
    ///
    /// Call once per frame. Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let before = camera.position;

        self.spherical = Spherical::from_vec3(camera.position - self.target);

        if self.auto_rotate && !self.dragging {
            self.rotate_left(self.auto_rotation_angle());
        }

        if self.enable_damping {
            self.spherical.theta += self.spherical_delta.theta * self.damping_factor;
            self.spherical.phi += self.spherical_delta.phi * self.damping_factor;
        } else {
            self.spherical.theta += self.spherical_delta.theta;
            self.spherical.phi += self.spherical_delta.phi;
        }

        self.spherical.phi = self
            .spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(POLE_EPSILON, PI - POLE_EPSILON);

        if self.enable_zoom {
            self.spherical.radius =
                (self.spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);
        }
        self.scale = 1.0;

        self.target += self.pan_offset;
        self.pan_offset = Vec3::ZERO;

        camera.position = self.target + self.spherical.to_vec3();
        camera.look_at(self.target);

        if self.enable_damping {
            self.spherical_delta.theta *= 1.0 - self.damping_factor;
            self.spherical_delta.phi *= 1.0 - self.damping_factor;
        } else {
            self.spherical_delta = Spherical::default();
        }

        camera.position.distance_squared(before) > 1e-12
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(45.0, 1.0, 0.1, 100.0);
        camera.position = Vec3::new(0.0, 1.0, 0.5).normalize() * 5.0;
        camera.look_at(Vec3::ZERO);
        camera
    }

    #[test]
    fn test_spherical_roundtrip() {
        let offset = Vec3::new(1.0, 2.0, -3.0);
        let back = Spherical::from_vec3(offset).to_vec3();
        assert!((back - offset).length() < 1e-5);
    }

    #[test]
    fn test_update_without_input_keeps_camera() {
        let mut camera = camera();
        let start = camera.position;
        let mut controls = OrbitControls::new(&camera);
        assert!(!controls.update(&mut camera));
        assert!((camera.position - start).length() < 1e-5);
    }

    #[test]
    fn test_auto_rotate_reaches_steady_rate() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&camera);
        controls.enable_damping = true;
        controls.auto_rotate = true;
        controls.auto_rotate_speed = 19.0;

        let mut last_theta = controls.spherical().theta;
        let mut step = 0.0;
        for _ in 0..400 {
            controls.update(&mut camera);
            let theta = controls.spherical().theta;
            step = theta - last_theta;
            if step > PI {
                step -= TAU;
            } else if step < -PI {
                step += TAU;
            }
            last_theta = theta;
        }

        // With damping, the pending delta converges so that exactly the
        // auto-rotation angle is applied each update.
        assert!((step.abs() - controls.auto_rotation_angle()).abs() < 1e-4, "step {}", step);
        assert!((camera.position.length() - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_polar_angle_is_clamped() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&camera);
        controls.min_polar_angle = 0.1 * PI;
        controls.max_polar_angle = 0.9 * PI;

        controls.begin_drag();
        controls.drag(0.0, 10_000.0, 500.0);
        controls.update(&mut camera);
        assert!(controls.spherical().phi >= 0.1 * PI - 1e-6);

        controls.drag(0.0, -10_000.0, 500.0);
        controls.update(&mut camera);
        assert!(controls.spherical().phi <= 0.9 * PI + 1e-6);
    }

    #[test]
    fn test_drag_requires_begin() {
        let mut camera = camera();
        let start = camera.position;
        let mut controls = OrbitControls::new(&camera);
        controls.drag(100.0, 0.0, 500.0);
        controls.update(&mut camera);
        assert!((camera.position - start).length() < 1e-5);
    }

    #[test]
    fn test_auto_rotate_pauses_while_dragging() {
        let mut camera = camera();
        let start = camera.position;
        let mut controls = OrbitControls::new(&camera);
        controls.auto_rotate = true;
        controls.begin_drag();
        controls.update(&mut camera);
        assert!((camera.position - start).length() < 1e-5);
    }

    #[test]
    fn test_pan_moves_target_only_when_enabled() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&camera);
        controls.enable_pan = false;
        controls.pan(50.0, 0.0, 500.0, &camera);
        controls.update(&mut camera);
        assert_eq!(controls.target, Vec3::ZERO);

        controls.enable_pan = true;
        controls.pan(50.0, 0.0, 500.0, &camera);
        controls.update(&mut camera);
        assert!(controls.target.x < 0.0);
        assert!(((camera.position - controls.target).length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_wheel_ignored_when_zoom_disabled() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&camera);
        controls.enable_zoom = false;
        controls.wheel(3.0);
        controls.update(&mut camera);
        assert!((camera.position.length() - 5.0).abs() < 1e-5);

        controls.enable_zoom = true;
        controls.wheel(3.0);
        controls.update(&mut camera);
        assert!(camera.position.length() < 5.0);
    }
}
