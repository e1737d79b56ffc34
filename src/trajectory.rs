//! The trajectory engine: wires filtering, orientation integration,
//! heading correction, and mechanization into the two supported pipeline
//! variants.
//!
//! Both variants are pure functions of their input batches and
//! configuration. Given identical inputs they produce bit-identical
//! position sequences; there is no hidden clock, RNG, or shared state
//! between runs.

use nalgebra::Vector3;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::batch::{check_aligned, InertialBatch, MagnetometerBatch};
use crate::error::{Result, TrajectoryError};
use crate::mechanization::{compensate_gravity, StrapdownMechanizer};
use crate::orientation::{magnetic_heading, OrientationIntegrator};
use crate::signal::lowpass_filtfilt;

/// Low-pass design parameters for the magnetometer variant.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Cutoff frequency in Hz.
    pub cutoff: f64,
    /// Sampling frequency in Hz.
    pub sample_rate: f64,
    /// Butterworth order.
    pub order: usize,
}

/// Configuration surface for a trajectory run.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TrajectoryConfig {
    /// Uniform sample interval in seconds. Must be positive and finite.
    pub dt: f64,
    /// Subtract 9.81 m/s² from the body z channel before integration.
    /// Used by the IMU-only variant (on by default); the magnetometer
    /// variant never compensates.
    pub gravity_compensation: bool,
    /// Acceleration low-pass parameters, used by the magnetometer variant.
    pub filter: FilterConfig,
    /// Optional attitude renormalization interval (steps). Off by default;
    /// see [`OrientationIntegrator`].
    pub renormalize_every: Option<usize>,
}

impl TrajectoryConfig {
    /// Defaults for a given time step: gravity compensation on, order-5
    /// low-pass with a 0.1 Hz cutoff at the batch's own sample rate, no
    /// renormalization.
    pub fn new(dt: f64) -> Self {
        Self {
            dt,
            gravity_compensation: true,
            filter: FilterConfig {
                cutoff: 0.1,
                sample_rate: 1.0 / dt,
                order: 5,
            },
            renormalize_every: None,
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(TrajectoryError::InvalidTimeStep(self.dt));
        }
        Ok(())
    }

    fn integrator(&self) -> OrientationIntegrator {
        match self.renormalize_every {
            Some(every) => OrientationIntegrator::with_renormalization(self.dt, every),
            None => OrientationIntegrator::new(self.dt),
        }
    }
}

/// IMU-only variant: optional gravity compensation, then orientation
/// integration and mechanization. Returns one position per input sample;
/// row 0 is always the origin.
pub fn imu_trajectory(imu: &InertialBatch, config: &TrajectoryConfig) -> Result<Array2<f64>> {
    config.validate()?;
    let mut accelerations = imu.accelerations().to_owned();
    if config.gravity_compensation {
        compensate_gravity(&mut accelerations);
    }
    log::debug!(
        "imu pipeline: {} samples, dt={}, gravity_compensation={}",
        imu.len(),
        config.dt,
        config.gravity_compensation
    );
    Ok(integrate(imu, &accelerations, None, config))
}

/// IMU + magnetometer variant: low-pass filter the accelerations, then
/// integrate orientation with the per-step magnetometer heading override.
/// No gravity compensation in this variant.
///
/// Fails before the first integration step when the batches are not
/// index-aligned or the filter design is invalid.
pub fn imu_mag_trajectory(
    imu: &InertialBatch,
    magnetometer: &MagnetometerBatch,
    config: &TrajectoryConfig,
) -> Result<Array2<f64>> {
    config.validate()?;
    check_aligned(imu.len(), magnetometer.len())?;
    let accelerations = lowpass_filtfilt(
        imu.accelerations(),
        config.filter.cutoff,
        config.filter.sample_rate,
        config.filter.order,
    )?;
    log::debug!(
        "imu+mag pipeline: {} samples, dt={}, cutoff={} Hz",
        imu.len(),
        config.dt,
        config.filter.cutoff
    );
    Ok(integrate(imu, &accelerations, Some(magnetometer), config))
}

/// Shared first-order recurrence over the sample batch. Step 0 is the
/// fixed initial condition; step i composes the gyro delta, optionally
/// overrides the heading, rotates the specific force, and advances the
/// kinematic state.
fn integrate(
    imu: &InertialBatch,
    accelerations: &Array2<f64>,
    magnetometer: Option<&MagnetometerBatch>,
    config: &TrajectoryConfig,
) -> Array2<f64> {
    let n = imu.len();
    let rates = imu.angular_rates();
    let mut integrator = config.integrator();
    let mut mechanizer = StrapdownMechanizer::new(config.dt);
    let mut positions = Array2::zeros((n, 3));

    for i in 1..n {
        integrator.step(Vector3::new(rates[[i, 0]], rates[[i, 1]], rates[[i, 2]]));

        if let Some(mag) = magnetometer {
            let field = mag.field();
            let heading = magnetic_heading(
                &Vector3::new(field[[i, 0]], field[[i, 1]], field[[i, 2]]),
                mag.declination()[i],
            );
            integrator.override_heading(heading);
        }

        let force = Vector3::new(
            accelerations[[i, 0]],
            accelerations[[i, 1]],
            accelerations[[i, 2]],
        );
        let position = mechanizer.step(integrator.current(), force);
        positions[[i, 0]] = position.x;
        positions[[i, 1]] = position.y;
        positions[[i, 2]] = position.z;
    }
    positions
}
