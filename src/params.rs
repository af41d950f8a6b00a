//! Simulation parameters.

use crate::error::ParamsError;

/// Fraction of the cube edge used as the collider half-extent.
///
/// Slightly larger than half the edge so the rounded render mesh never
/// visibly overlaps a neighbour.
pub const COLLIDER_HALF_EXTENT_RATIO: f32 = 0.6;

/// Fixed configuration of a run. Immutable once the simulation starts.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParams {
    /// Number of dynamic cubes.
    pub box_count: usize,
    /// Edge length of each cube.
    pub box_size: f32,
    /// Edge length of the cube-shaped container.
    pub container_size: f32,
    /// Gravity magnitude in units/s². Zero turns gravity off.
    pub gravity: f32,
}

impl SimulationParams {
    /// Half-extent of each cube's collider.
    pub fn collider_half_extent(&self) -> f32 {
        COLLIDER_HALF_EXTENT_RATIO * self.box_size
    }

    /// Largest distance a cube center can sit from the origin along any axis
    /// while resting flat against a wall.
    pub fn max_center_offset(&self) -> f32 {
        0.5 * self.container_size - self.collider_half_extent()
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), ParamsError> {
        for (name, value) in [
            ("box_size", self.box_size),
            ("container_size", self.container_size),
            ("gravity", self.gravity),
        ] {
            if !value.is_finite() {
                return Err(ParamsError::NotFinite { name });
            }
        }

        if self.box_count == 0 {
            return Err(ParamsError::NotPositive { name: "box_count", value: 0.0 });
        }
        if self.box_size <= 0.0 {
            return Err(ParamsError::NotPositive { name: "box_size", value: self.box_size });
        }
        if self.container_size <= 0.0 {
            return Err(ParamsError::NotPositive {
                name: "container_size",
                value: self.container_size,
            });
        }
        if self.gravity < 0.0 {
            return Err(ParamsError::Negative { name: "gravity", value: self.gravity });
        }
        if self.max_center_offset() <= 0.0 {
            return Err(ParamsError::BoxTooLarge {
                box_size: self.box_size,
                container_size: self.container_size,
            });
        }

        Ok(())
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            box_count: 100,
            box_size: 0.03,
            container_size: 1.0,
            gravity: 10.0,
        }
    }
}
