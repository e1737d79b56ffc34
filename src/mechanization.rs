//! Strapdown mechanization: rotate body-frame specific force into the
//! global frame and double-integrate it into velocity and position.

use nalgebra::{Rotation3, Vector3};
use ndarray::Array2;

/// Standard gravity used for the uniform z-channel compensation (m/s²).
pub const GRAVITY: f64 = 9.81;

/// Subtract gravity from the body-frame z channel of every sample.
///
/// This assumes the sensor's z axis is aligned with local vertical at rest
/// and applies the same offset regardless of attitude; it is a known
/// simplification, not a full gravity-vector rotation.
pub fn compensate_gravity(accelerations: &mut Array2<f64>) {
    for mut row in accelerations.rows_mut() {
        row[2] -= GRAVITY;
    }
}

/// Per-run kinematic state. Position and velocity start at zero; each step
/// depends only on the previous state and the current rotated specific
/// force (semi-implicit Euler: velocity is updated first, then position
/// uses the new velocity).
#[derive(Clone, Debug)]
pub struct StrapdownMechanizer {
    dt: f64,
    velocity: Vector3<f64>,
    position: Vector3<f64>,
}

impl StrapdownMechanizer {
    pub fn new(dt: f64) -> Self {
        Self {
            dt,
            velocity: Vector3::zeros(),
            position: Vector3::zeros(),
        }
    }

    /// Advance one step and return the new position.
    pub fn step(
        &mut self,
        orientation: &Rotation3<f64>,
        specific_force: Vector3<f64>,
    ) -> Vector3<f64> {
        let global_accel = orientation * specific_force;
        self.velocity += global_accel * self.dt;
        self.position += self.velocity * self.dt;
        self.position
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.velocity
    }

    pub fn position(&self) -> Vector3<f64> {
        self.position
    }
}
