//! Rigid-body world: six static walls and N dynamic cubes.
//!
//! Wraps a rapier pipeline and exposes only what the frame loop needs: one
//! fixed step per call, a writable gravity vector, impulses, and body poses
//! as glam types.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Quat, Vec3};
use rapier3d::na::{Quaternion, Translation3, UnitQuaternion};
use rapier3d::prelude::*;

use crate::params::SimulationParams;

/// Friction applied to every contact.
pub const CONTACT_FRICTION: f32 = 0.1;
/// Restitution applied to every contact.
pub const CONTACT_RESTITUTION: f32 = 0.9;
/// Mass of each dynamic cube.
pub const BOX_MASS: f32 = 1.0;

/// The simulation space.
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    walls: Vec<RigidBodyHandle>,
    boxes: Vec<RigidBodyHandle>,
}

impl PhysicsWorld {
    /// Build the container walls and the cubes described by `params`.
    ///
    /// Every cube starts at the origin, overlapping the others; the solver
    /// separates them once they start moving.
    pub fn new(params: &SimulationParams) -> Self {
        let mut world = Self {
            gravity: vector![0.0, -params.gravity, 0.0],
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            walls: Vec::with_capacity(6),
            boxes: Vec::with_capacity(params.box_count),
        };

        for i in 0..6 {
            let (position, rotation) = wall_pose(i, params.container_size);
            world.add_wall(position, rotation);
        }

        let half = params.collider_half_extent();
        for _ in 0..params.box_count {
            world.add_box(half, params.container_size);
        }

        world
    }

    fn add_wall(&mut self, position: Vec3, rotation: Quat) {
        let body = RigidBodyBuilder::fixed()
            .position(to_isometry(position, rotation))
            .build();
        let handle = self.bodies.insert(body);

        // The half-space normal is the wall's local +Z, pointing into the box.
        let collider = ColliderBuilder::halfspace(Vector::z_axis())
            .friction(CONTACT_FRICTION)
            .restitution(CONTACT_RESTITUTION)
            .build();
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);
        self.walls.push(handle);
    }

    fn add_box(&mut self, half_extent: f32, lookahead: f32) {
        // Shape-cast CCD skips half-spaces, so walls are caught with
        // speculative contacts along each step's predicted motion instead.
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![0.0, 0.0, 0.0])
            .can_sleep(true)
            .soft_ccd_prediction(lookahead)
            .build();
        let handle = self.bodies.insert(body);

        let collider = ColliderBuilder::cuboid(half_extent, half_extent, half_extent)
            .mass(BOX_MASS)
            .friction(CONTACT_FRICTION)
            .restitution(CONTACT_RESTITUTION)
            .build();
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);

        // Impulses applied before the first step need the mass already in place.
        self.bodies[handle].recompute_mass_properties_from_colliders(&self.colliders);
        self.boxes.push(handle);
    }

    /// Advance the simulation by exactly one fixed timestep.
    pub fn advance(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }

    /// Length of one fixed step in seconds.
    pub fn timestep(&self) -> f32 {
        self.integration_parameters.dt
    }

    /// Current gravity vector.
    pub fn gravity(&self) -> Vec3 {
        Vec3::new(self.gravity.x, self.gravity.y, self.gravity.z)
    }

    /// Overwrite the gravity used by subsequent steps.
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = vector![gravity.x, gravity.y, gravity.z];
    }

    /// Number of dynamic cubes.
    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    /// Apply an instantaneous impulse to cube `index`, waking it if asleep.
    pub fn apply_impulse(&mut self, index: usize, impulse: Vec3) {
        if let Some(body) = self.boxes.get(index).and_then(|h| self.bodies.get_mut(*h)) {
            body.apply_impulse(vector![impulse.x, impulse.y, impulse.z], true);
        }
    }

    /// Position of cube `index`.
    pub fn box_position(&self, index: usize) -> Vec3 {
        let t = self.bodies[self.boxes[index]].translation();
        Vec3::new(t.x, t.y, t.z)
    }

    /// Orientation of cube `index`.
    pub fn box_rotation(&self, index: usize) -> Quat {
        to_quat(self.bodies[self.boxes[index]].rotation())
    }

    /// Linear velocity of cube `index`.
    pub fn box_velocity(&self, index: usize) -> Vec3 {
        let v = self.bodies[self.boxes[index]].linvel();
        Vec3::new(v.x, v.y, v.z)
    }

    /// Mass of cube `index`.
    pub fn box_mass(&self, index: usize) -> f32 {
        self.bodies[self.boxes[index]].mass()
    }

    /// Position and orientation of every cube, in creation order.
    pub fn box_poses(&self) -> impl Iterator<Item = (Vec3, Quat)> + '_ {
        self.boxes.iter().map(|handle| {
            let body = &self.bodies[*handle];
            let t = body.translation();
            (Vec3::new(t.x, t.y, t.z), to_quat(body.rotation()))
        })
    }

    /// Position and inward normal of each wall.
    pub fn walls(&self) -> Vec<(Vec3, Vec3)> {
        self.walls
            .iter()
            .map(|handle| {
                let body = &self.bodies[*handle];
                let t = body.translation();
                let normal = to_quat(body.rotation()) * Vec3::Z;
                (Vec3::new(t.x, t.y, t.z), normal)
            })
            .collect()
    }
}

/// Placement of wall `index` (0..6) for a container of edge `size`.
///
/// Even indices sit on the negative side of their axis, odd ones on the
/// positive side. Walls 0-1 are on X, 2-3 on Y, 4-5 on Z.
pub fn wall_pose(index: usize, size: f32) -> (Vec3, Quat) {
    let sign = if index % 2 == 1 { 1.0 } else { -1.0 };
    let offset = sign * 0.5 * size;

    match index {
        0 | 1 => (Vec3::new(offset, 0.0, 0.0), Quat::from_rotation_y(-sign * FRAC_PI_2)),
        2 | 3 => (Vec3::new(0.0, offset, 0.0), Quat::from_rotation_x(sign * FRAC_PI_2)),
        4 => (Vec3::new(0.0, 0.0, offset), Quat::IDENTITY),
        _ => (Vec3::new(0.0, 0.0, offset), Quat::from_rotation_y(PI)),
    }
}

fn to_isometry(position: Vec3, rotation: Quat) -> Isometry<Real> {
    let rotation = UnitQuaternion::new_normalize(Quaternion::new(
        rotation.w, rotation.x, rotation.y, rotation.z,
    ));
    Isometry::from_parts(Translation3::new(position.x, position.y, position.z), rotation)
}

fn to_quat(rotation: &UnitQuaternion<Real>) -> Quat {
    Quat::from_xyzw(rotation.i, rotation.j, rotation.k, rotation.w)
}
