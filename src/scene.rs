//! CPU-side scene model.
//!
//! Everything the renderer draws lives here: a perspective camera driven by
//! [`OrbitControls`], the container outline, and one instanced mesh holding a
//! transform per cube. The GPU side only reads this state; it never writes
//! back.

use std::f32::consts::PI;

use glam::{Mat3, Mat4, Quat, Vec3};

use crate::controls::OrbitControls;
use crate::geometry::{box_edges, rounded_box, MeshData};
use crate::params::SimulationParams;

/// Vertical field of view in degrees.
pub const CAMERA_FOV: f32 = 45.0;
/// Near clip distance.
pub const CAMERA_NEAR: f32 = 0.1;
/// Far clip distance.
pub const CAMERA_FAR: f32 = 100.0;
/// Distance of the camera from the origin at startup.
pub const CAMERA_DISTANCE: f32 = 5.0;
/// Device pixel ratios above this are clamped.
pub const MAX_PIXEL_RATIO: f32 = 2.0;
/// Auto-rotation speed of the orbit controls.
pub const AUTO_ROTATE_SPEED: f32 = 19.0;
/// Bevel subdivisions of the rounded cube.
pub const CUBE_SEGMENTS: u32 = 2;
/// Bevel radius as a fraction of the cube edge.
pub const CUBE_RADIUS_RATIO: f32 = 0.2;

/// Size of the element hosting the drawing surface, in CSS (logical) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContainerSize {
    pub width: u32,
    pub height: u32,
}

impl ContainerSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero, e.g. a minimized window.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Drawing area of the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in CSS pixels.
    pub width: u32,
    /// Height in CSS pixels.
    pub height: u32,
    /// Device pixels per CSS pixel, at most [`MAX_PIXEL_RATIO`].
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(container: ContainerSize, device_pixel_ratio: f32) -> Self {
        let pixel_ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio.min(MAX_PIXEL_RATIO)
        } else {
            1.0
        };
        Self {
            width: container.width,
            height: container.height,
            pixel_ratio,
        }
    }

    /// Width over height, or 1 for an empty viewport.
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Size of the backing framebuffer in device pixels. Never zero.
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        let scale = |v: u32| ((v as f32 * self.pixel_ratio).round() as u32).max(1);
        (scale(self.width), scale(self.height))
    }
}

/// Perspective camera with an explicit orientation.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    /// Rotation from camera space (looking down -Z, Y up) to world space.
    pub quaternion: Quat,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            quaternion: Quat::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Turn the camera so its -Z axis points at `target`, keeping +Y up.
    pub fn look_at(&mut self, target: Vec3) {
        let back = (self.position - target).normalize_or_zero();
        if back == Vec3::ZERO {
            return;
        }
        let mut right = Vec3::Y.cross(back);
        if right.length_squared() < 1e-12 {
            // Looking straight up or down.
            right = Vec3::X;
        }
        let right = right.normalize();
        let up = back.cross(right);
        self.quaternion = Quat::from_mat3(&Mat3::from_cols(right, up, back)).normalize();
    }

    /// Recompute the projection after changing `fov`, `aspect`, `near` or `far`.
    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.quaternion, self.position).inverse()
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}

/// Flat, unlit material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasicMaterial {
    /// Linear RGB.
    pub color: Vec3,
    pub visible: bool,
}

impl BasicMaterial {
    pub fn new(color: Vec3) -> Self {
        Self { color, visible: true }
    }
}

/// One geometry drawn many times, each copy with its own transform.
///
/// Writes through [`set_matrix_at`](Self::set_matrix_at) are not picked up by
/// the renderer until [`mark_needs_update`](Self::mark_needs_update) bumps
/// the version.
#[derive(Debug, Clone)]
pub struct InstancedMesh {
    pub geometry: MeshData,
    pub material: BasicMaterial,
    matrices: Vec<Mat4>,
    version: u64,
}

impl InstancedMesh {
    /// `count` instances, all at the identity transform.
    pub fn new(geometry: MeshData, material: BasicMaterial, count: usize) -> Self {
        Self {
            geometry,
            material,
            matrices: vec![Mat4::IDENTITY; count],
            version: 0,
        }
    }

    pub fn count(&self) -> usize {
        self.matrices.len()
    }

    pub fn set_matrix_at(&mut self, index: usize, matrix: Mat4) {
        self.matrices[index] = matrix;
    }

    pub fn matrix_at(&self, index: usize) -> Mat4 {
        self.matrices[index]
    }

    pub fn matrices(&self) -> &[Mat4] {
        &self.matrices
    }

    /// Flag the instance transforms for upload.
    pub fn mark_needs_update(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Changes every time the transforms are flagged for upload.
    pub fn version(&self) -> u64 {
        self.version
    }
}

/// Unindexed line list.
#[derive(Debug, Clone)]
pub struct LineSegments {
    pub segments: Vec<(Vec3, Vec3)>,
    pub material: BasicMaterial,
}

impl LineSegments {
    pub fn new(segments: Vec<(Vec3, Vec3)>, material: BasicMaterial) -> Self {
        Self { segments, material }
    }

    /// Endpoints flattened in draw order.
    pub fn vertices(&self) -> Vec<[f32; 3]> {
        self.segments
            .iter()
            .flat_map(|(a, b)| [a.to_array(), b.to_array()])
            .collect()
    }
}

/// Everything drawn each frame.
#[derive(Debug, Clone)]
pub struct Scene {
    /// Clear color, linear RGB.
    pub background: Vec3,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    /// One instance per cube, index-aligned with the physics bodies.
    pub cubes: InstancedMesh,
    /// Edges of the container.
    pub outline: LineSegments,
    pub viewport: Viewport,
}

impl Scene {
    /// Build the scene for a container of the given size.
    ///
    /// The cubes start hidden; the caller reveals them once startup is done.
    pub fn new(
        container: ContainerSize,
        device_pixel_ratio: f32,
        params: &SimulationParams,
    ) -> Self {
        let viewport = Viewport::new(container, device_pixel_ratio);

        let mut camera =
            PerspectiveCamera::new(CAMERA_FOV, viewport.aspect(), CAMERA_NEAR, CAMERA_FAR);
        camera.position = Vec3::new(0.0, 1.0, 0.5).normalize() * CAMERA_DISTANCE;
        camera.look_at(Vec3::ZERO);

        let mut controls = OrbitControls::new(&camera);
        controls.enable_zoom = false;
        controls.enable_pan = false;
        controls.enable_damping = true;
        controls.auto_rotate = true;
        controls.auto_rotate_speed = AUTO_ROTATE_SPEED;
        controls.min_polar_angle = 0.1 * PI;
        controls.max_polar_angle = 0.9 * PI;

        let size = params.box_size;
        let geometry = rounded_box(size, size, size, CUBE_SEGMENTS, CUBE_RADIUS_RATIO * size);
        let cubes = InstancedMesh::new(
            geometry,
            BasicMaterial { color: Vec3::ZERO, visible: false },
            params.box_count,
        );

        let outline =
            LineSegments::new(box_edges(params.container_size), BasicMaterial::new(Vec3::ZERO));

        Self {
            background: Vec3::ONE,
            camera,
            controls,
            cubes,
            outline,
            viewport,
        }
    }

    /// Fit camera and viewport to a new container size.
    ///
    /// Returns false, changing nothing, when the container is empty.
    pub fn resize(&mut self, container: ContainerSize) -> bool {
        if container.is_empty() {
            return false;
        }
        self.viewport.width = container.width;
        self.viewport.height = container.height;
        self.camera.aspect = self.viewport.aspect();
        self.camera.update_projection_matrix();
        true
    }

    /// Change the device pixel ratio, e.g. after moving to another monitor.
    pub fn set_pixel_ratio(&mut self, device_pixel_ratio: f32) {
        self.viewport = Viewport::new(
            ContainerSize::new(self.viewport.width, self.viewport.height),
            device_pixel_ratio,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        Scene::new(ContainerSize::new(800, 600), 1.0, &SimulationParams::default())
    }

    #[test]
    fn test_camera_starts_looking_at_origin() {
        let scene = scene();
        assert!((scene.camera.position.length() - 5.0).abs() < 1e-5);

        // The origin sits straight ahead at the camera distance.
        let origin = scene.camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-4, "{:?}", origin);
    }

    #[test]
    fn test_look_at_keeps_up_vector_vertical() {
        let mut camera = PerspectiveCamera::new(45.0, 1.0, 0.1, 100.0);
        camera.position = Vec3::new(3.0, 2.0, -1.0);
        camera.look_at(Vec3::ZERO);

        let right = camera.quaternion * Vec3::X;
        assert!(right.y.abs() < 1e-5);
        let forward = camera.quaternion * Vec3::NEG_Z;
        assert!((forward - (-camera.position.normalize())).length() < 1e-5);
    }

    #[test]
    fn test_controls_configuration() {
        let controls = scene().controls;
        assert!(!controls.enable_zoom);
        assert!(!controls.enable_pan);
        assert!(controls.enable_damping);
        assert!(controls.auto_rotate);
        assert_eq!(controls.auto_rotate_speed, 19.0);
        assert!((controls.min_polar_angle - 0.1 * PI).abs() < 1e-6);
        assert!((controls.max_polar_angle - 0.9 * PI).abs() < 1e-6);
    }

    #[test]
    fn test_cubes_start_hidden() {
        let scene = scene();
        assert_eq!(scene.cubes.count(), 100);
        assert!(!scene.cubes.material.visible);
        assert!(scene.outline.material.visible);
        assert_eq!(scene.outline.segments.len(), 12);
        assert_eq!(scene.background, Vec3::ONE);
    }

    #[test]
    fn test_resize_updates_aspect_and_viewport() {
        let mut scene = scene();
        assert!(scene.resize(ContainerSize::new(1000, 500)));
        assert_eq!(scene.camera.aspect, 2.0);
        assert_eq!((scene.viewport.width, scene.viewport.height), (1000, 500));

        let expected = Mat4::perspective_rh(45.0_f32.to_radians(), 2.0, 0.1, 100.0);
        assert_eq!(scene.camera.projection_matrix(), expected);
    }

    #[test]
    fn test_empty_resize_is_ignored() {
        let mut scene = scene();
        assert!(!scene.resize(ContainerSize::new(0, 600)));
        assert_eq!(scene.viewport.width, 800);
        assert!((scene.camera.aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_pixel_ratio_is_capped() {
        let viewport = Viewport::new(ContainerSize::new(400, 300), 3.0);
        assert_eq!(viewport.pixel_ratio, 2.0);
        assert_eq!(viewport.drawing_buffer_size(), (800, 600));

        let viewport = Viewport::new(ContainerSize::new(400, 300), 1.5);
        assert_eq!(viewport.drawing_buffer_size(), (600, 450));
    }

    #[test]
    fn test_instance_version_bumps_only_on_request() {
        let mut cubes = scene().cubes;
        let version = cubes.version();
        cubes.set_matrix_at(4, Mat4::from_translation(Vec3::X));
        assert_eq!(cubes.version(), version);
        assert_eq!(cubes.matrix_at(4), Mat4::from_translation(Vec3::X));

        cubes.mark_needs_update();
        assert_ne!(cubes.version(), version);
    }
}
