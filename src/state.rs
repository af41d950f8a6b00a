//! Application state shared by the frame loop and the event handlers.

use glam::{Mat4, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::ParamsError;
use crate::impulse::{self, THROW_IMPULSE};
use crate::params::SimulationParams;
use crate::physics::PhysicsWorld;
use crate::scene::{ContainerSize, Scene};

/// Everything a running simulation owns.
pub struct AppState {
    params: SimulationParams,
    world: PhysicsWorld,
    scene: Scene,
    rng: StdRng,
}

impl AppState {
    /// Build the world and scene, throw every cube once, then reveal them.
    pub fn new(
        params: SimulationParams,
        container: ContainerSize,
        device_pixel_ratio: f32,
    ) -> Result<Self, ParamsError> {
        Self::with_rng(params, container, device_pixel_ratio, StdRng::from_entropy())
    }

    /// Like [`new`](Self::new), with reproducible throws.
    pub fn with_seed(
        params: SimulationParams,
        container: ContainerSize,
        device_pixel_ratio: f32,
        seed: u64,
    ) -> Result<Self, ParamsError> {
        Self::with_rng(params, container, device_pixel_ratio, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        params: SimulationParams,
        container: ContainerSize,
        device_pixel_ratio: f32,
        rng: StdRng,
    ) -> Result<Self, ParamsError> {
        params.validate()?;

        let world = PhysicsWorld::new(&params);
        let scene = Scene::new(container, device_pixel_ratio, &params);
        let mut state = Self { params, world, scene, rng };

        state.sync_instances();
        state.scene.cubes.mark_needs_update();
        impulse::throw_all(&mut state.world, &mut state.rng, THROW_IMPULSE);
        state.scene.cubes.material.visible = true;

        log::info!(
            "Simulation ready: {} boxes of size {} in a container of size {}, gravity {}",
            state.params.box_count,
            state.params.box_size,
            state.params.container_size,
            state.params.gravity
        );
        Ok(state)
    }

    /// One frame of simulation, minus presenting.
    ///
    /// Moves the camera, advances physics one fixed step, copies every body
    /// pose into its instance, flags the instances for upload, and points
    /// gravity down relative to the camera.
    pub fn step(&mut self) {
        let scene = &mut self.scene;
        scene.controls.update(&mut scene.camera);

        self.world.advance();

        self.sync_instances();
        self.scene.cubes.mark_needs_update();

        let gravity = self.camera_gravity();
        self.world.set_gravity(gravity);
    }

    fn sync_instances(&mut self) {
        for (index, (position, rotation)) in self.world.box_poses().enumerate() {
            self.scene
                .cubes
                .set_matrix_at(index, Mat4::from_rotation_translation(rotation, position));
        }
    }

    /// Gravity of the configured magnitude, pointing down in camera space.
    pub fn camera_gravity(&self) -> Vec3 {
        self.scene.camera.quaternion * Vec3::new(0.0, -self.params.gravity, 0.0)
    }

    // ========== Event Handlers ==========

    /// The container changed size. Returns false if the size was ignored.
    pub fn on_resize(&mut self, container: ContainerSize) -> bool {
        let resized = self.scene.resize(container);
        if resized {
            log::debug!("Resized to {}x{}", container.width, container.height);
        }
        resized
    }

    /// Device pixel ratio changed.
    pub fn on_scale_factor_changed(&mut self, device_pixel_ratio: f32) {
        self.scene.set_pixel_ratio(device_pixel_ratio);
    }

    /// Re-throw every cube.
    pub fn on_double_click(&mut self) {
        impulse::throw_all(&mut self.world, &mut self.rng, THROW_IMPULSE);
    }

    pub fn begin_drag(&mut self) {
        self.scene.controls.begin_drag();
    }

    pub fn end_drag(&mut self) {
        self.scene.controls.end_drag();
    }

    /// Rotation drag by `delta` pixels.
    pub fn on_drag(&mut self, delta: Vec2) {
        let height = self.scene.viewport.height as f32;
        self.scene.controls.drag(delta.x, delta.y, height);
    }

    /// Secondary-button drag by `delta` pixels.
    pub fn on_pan(&mut self, delta: Vec2) {
        let scene = &mut self.scene;
        let height = scene.viewport.height as f32;
        scene.controls.pan(delta.x, delta.y, height, &scene.camera);
    }

    /// Wheel movement in lines.
    pub fn on_wheel(&mut self, lines: f32) {
        self.scene.controls.wheel(lines);
    }

    // ========== Accessors ==========

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::with_seed(SimulationParams::default(), ContainerSize::new(800, 600), 1.0, 3)
            .expect("default params are valid")
    }

    #[test]
    fn test_startup_throws_and_reveals() {
        let state = state();
        assert!(state.scene().cubes.material.visible);
        for i in 0..state.world().box_count() {
            assert_eq!(state.world().box_position(i), Vec3::ZERO);
            let v = state.world().box_velocity(i);
            assert!((v.abs() - Vec3::splat(THROW_IMPULSE)).length() < 1e-3, "{:?}", v);
        }
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        let params = SimulationParams { box_count: 0, ..Default::default() };
        assert!(AppState::new(params, ContainerSize::new(800, 600), 1.0).is_err());

        // Upward gravity would break the camera-down contract.
        let params = SimulationParams { gravity: -10.0, ..Default::default() };
        assert!(matches!(
            AppState::new(params, ContainerSize::new(800, 600), 1.0),
            Err(ParamsError::Negative { name: "gravity", .. })
        ));
    }

    #[test]
    fn test_step_syncs_instances() {
        let mut state = state();
        let version = state.scene().cubes.version();
        state.step();

        assert_ne!(state.scene().cubes.version(), version);
        for (i, (position, rotation)) in state.world().box_poses().enumerate() {
            let expected = Mat4::from_rotation_translation(rotation, position);
            assert_eq!(state.scene().cubes.matrix_at(i), expected);
        }
    }

    #[test]
    fn test_gravity_follows_camera() {
        let mut state = state();
        for _ in 0..30 {
            state.step();
            let gravity = state.world().gravity();
            assert!((gravity.length() - 10.0).abs() < 1e-3);
            let camera_down = state.scene().camera.quaternion * Vec3::NEG_Y;
            assert!(gravity.normalize().dot(camera_down) > 0.9999);
        }
    }

    #[test]
    fn test_seeded_states_match() {
        let mut a = state();
        let mut b = state();
        a.step();
        b.step();
        for i in 0..a.world().box_count() {
            assert_eq!(a.world().box_position(i), b.world().box_position(i));
        }
    }

    #[test]
    fn test_double_click_rethrows() {
        let mut state = state();
        for _ in 0..5 {
            state.step();
        }
        let before: Vec<Vec3> = (0..state.world().box_count())
            .map(|i| state.world().box_velocity(i))
            .collect();
        state.on_double_click();
        let changed = (0..state.world().box_count())
            .filter(|&i| (state.world().box_velocity(i) - before[i]).length() > 1.0)
            .count();
        assert_eq!(changed, state.world().box_count());
    }

    #[test]
    fn test_resize() {
        let mut state = state();
        assert!(state.on_resize(ContainerSize::new(640, 320)));
        assert_eq!(state.scene().camera.aspect, 2.0);
        assert!(!state.on_resize(ContainerSize::new(0, 0)));
        assert_eq!(state.scene().viewport.width, 640);
    }
}
