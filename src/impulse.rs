//! Randomized throws.

use glam::Vec3;
use rand::Rng;

use crate::physics::PhysicsWorld;

/// Magnitude of each impulse component.
pub const THROW_IMPULSE: f32 = 7.0;

/// An impulse whose components are each independently `+magnitude` or
/// `-magnitude`, so every octant is equally likely.
pub fn random_impulse<R: Rng + ?Sized>(rng: &mut R, magnitude: f32) -> Vec3 {
    let mut component = || if rng.gen_bool(0.5) { magnitude } else { -magnitude };
    Vec3::new(component(), component(), component())
}

/// Throw every cube in a random octant direction.
pub fn throw_all<R: Rng + ?Sized>(world: &mut PhysicsWorld, rng: &mut R, magnitude: f32) {
    for index in 0..world.box_count() {
        world.apply_impulse(index, random_impulse(rng, magnitude));
    }
    log::debug!("Threw {} boxes with impulse {}", world.box_count(), magnitude);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SimulationParams;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn octant(v: Vec3) -> usize {
        (v.x > 0.0) as usize | ((v.y > 0.0) as usize) << 1 | ((v.z > 0.0) as usize) << 2
    }

    #[test]
    fn test_components_are_plus_or_minus_magnitude() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let v = random_impulse(&mut rng, THROW_IMPULSE);
            for c in v.to_array() {
                assert_eq!(c.abs(), THROW_IMPULSE);
            }
        }
    }

    #[test]
    fn test_octants_are_uniform() {
        let mut rng = StdRng::seed_from_u64(42);
        let trials = 80_000;
        let mut counts = [0usize; 8];
        for _ in 0..trials {
            counts[octant(random_impulse(&mut rng, 1.0))] += 1;
        }

        // Expected 10_000 each; 5% is far beyond the sampling noise.
        for count in counts {
            assert!((count as f32 - 10_000.0).abs() < 500.0, "counts {:?}", counts);
        }
    }

    #[test]
    fn test_throw_all_sets_velocities() {
        let params = SimulationParams { box_count: 16, ..Default::default() };
        let mut world = PhysicsWorld::new(&params);
        let mut rng = StdRng::seed_from_u64(7);
        throw_all(&mut world, &mut rng, THROW_IMPULSE);

        // Unit mass, so velocity equals the impulse.
        for i in 0..world.box_count() {
            let v = world.box_velocity(i);
            for c in v.to_array() {
                assert!((c.abs() - THROW_IMPULSE).abs() < 1e-4, "velocity {:?}", v);
            }
        }
    }
}
