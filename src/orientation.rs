//! Body-attitude integration from angular-rate samples, plus the
//! magnetometer heading override.

use nalgebra::{Rotation3, UnitQuaternion, Vector3};

/// Accumulates a 3-D rotation from body-frame angular rates at a fixed
/// time step.
///
/// Each step builds the incremental rotation from `omega * dt` as three
/// elemental rotations about x, then y, then z, and composes it on the
/// right (body-frame relative). This is a small-rotation approximation,
/// not an exact exponential map, and no re-orthogonalization happens by
/// default, so numerical drift accumulates over long runs. Both are
/// deliberate: they match the reconstruction this crate reproduces.
#[derive(Clone, Debug)]
pub struct OrientationIntegrator {
    orientation: Rotation3<f64>,
    dt: f64,
    renormalize_every: Option<usize>,
    steps: usize,
}

impl OrientationIntegrator {
    /// Start from the identity attitude. Never renormalizes.
    pub fn new(dt: f64) -> Self {
        Self {
            orientation: Rotation3::identity(),
            dt,
            renormalize_every: None,
            steps: 0,
        }
    }

    /// Like [`new`](Self::new), but re-orthonormalizes the accumulated
    /// rotation every `every` steps. Opt-in; trades fidelity to the
    /// undamped accumulation for better matrix conditioning on long runs.
    pub fn with_renormalization(dt: f64, every: usize) -> Self {
        Self {
            renormalize_every: Some(every.max(1)),
            ..Self::new(dt)
        }
    }

    pub fn current(&self) -> &Rotation3<f64> {
        &self.orientation
    }

    /// Advance one step with the body-frame angular rate (rad/s).
    pub fn step(&mut self, omega: Vector3<f64>) {
        let delta = Rotation3::from_euler_angles(
            omega.x * self.dt,
            omega.y * self.dt,
            omega.z * self.dt,
        );
        self.orientation *= delta;
        self.steps += 1;
        if let Some(every) = self.renormalize_every {
            if self.steps % every == 0 {
                self.renormalize();
            }
        }
    }

    /// Replace the heading component: `orientation = R_z(heading) *
    /// orientation`. Full substitution, not a weighted blend; the
    /// gyro-derived heading of the current state is discarded.
    pub fn override_heading(&mut self, heading: f64) {
        self.orientation = Rotation3::from_euler_angles(0.0, 0.0, heading) * self.orientation;
    }

    /// Snap the accumulated matrix back onto the rotation group.
    pub fn renormalize(&mut self) {
        self.orientation =
            UnitQuaternion::from_rotation_matrix(&self.orientation).to_rotation_matrix();
    }
}

/// Magnetic heading from the in-plane field components and the local
/// declination: `atan2(m_y, m_x) + declination`.
pub fn magnetic_heading(field: &Vector3<f64>, declination: f64) -> f64 {
    field.y.atan2(field.x) + declination
}
