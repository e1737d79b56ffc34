//! Dead-reckoning trajectory reconstruction from logged inertial,
//! magnetometer and GPS samples.
//!
//! The core is a batch transform over in-memory numeric arrays: angular
//! rates are integrated into an orientation sequence, specific force is
//! rotated into the global frame and double-integrated into positions, and
//! GPS fixes are projected independently onto a local tangent plane for
//! comparison. File parsing and calibration live in adapter modules; the
//! pipelines themselves never touch a file, a clock, or a prompt, so equal
//! inputs always produce bit-identical trajectories.
//!
//! Two pipeline variants exist, selected explicitly by the caller:
//!
//! - [`trajectory::imu_trajectory`]: gravity compensation (configurable)
//!   followed by orientation integration and strapdown mechanization.
//! - [`trajectory::imu_mag_trajectory`]: zero-phase low-pass filtering of
//!   the accelerations, orientation integration with a per-step
//!   magnetometer heading override, then mechanization.
//!
//! Known limitations, kept deliberately: the orientation delta is an
//! Euler-angle small-rotation approximation with no renormalization (drift
//! accumulates unless the optional hook is enabled), the heading override
//! is a full substitution rather than a weighted blend, and the GPS
//! projection cannot represent motion on the negative side of either axis.

pub mod batch;
pub mod calibration;
pub mod error;
pub mod geodesy;
pub mod io;
pub mod mechanization;
pub mod orientation;
pub mod signal;
pub mod trajectory;

pub use batch::{InertialBatch, MagnetometerBatch};
pub use calibration::SensorCalibration;
pub use error::{Result, TrajectoryError};
pub use geodesy::{project_to_local_plane, GpsFix};
pub use trajectory::{imu_mag_trajectory, imu_trajectory, FilterConfig, TrajectoryConfig};
