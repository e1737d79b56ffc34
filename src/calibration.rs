//! Bias and soft-iron style corrections for raw sensor batches.
//!
//! The core pipelines are agnostic to calibration; this adapter is applied
//! (or not) before samples reach them.

use nalgebra::{Matrix3, Vector3};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrajectoryError};

/// A bias subtraction followed by two successive 3×3 linear corrections,
/// applied row-wise: `v' = calibration * (correction * (v - bias))`.
///
/// Matrices are stored row-major so a calibration can be read from JSON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SensorCalibration {
    pub bias: [f64; 3],
    pub correction: [[f64; 3]; 3],
    pub calibration: [[f64; 3]; 3],
}

impl SensorCalibration {
    /// No-op calibration: zero bias, identity matrices.
    pub fn identity() -> Self {
        Self {
            bias: [0.0; 3],
            correction: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            calibration: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Apply to an N×3 sample batch, returning a corrected copy.
    pub fn apply(&self, samples: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        if samples.ncols() != 3 {
            return Err(TrajectoryError::ChannelMismatch {
                expected: 3,
                actual: samples.ncols(),
            });
        }
        let bias = Vector3::from_row_slice(&self.bias);
        let correction = Matrix3::from_fn(|r, c| self.correction[r][c]);
        let calibration = Matrix3::from_fn(|r, c| self.calibration[r][c]);

        let mut corrected = samples.to_owned();
        for mut row in corrected.rows_mut() {
            let v = Vector3::new(row[0], row[1], row[2]) - bias;
            let out = calibration * (correction * v);
            row[0] = out.x;
            row[1] = out.y;
            row[2] = out.z;
        }
        Ok(corrected)
    }
}

impl Default for SensorCalibration {
    fn default() -> Self {
        Self::identity()
    }
}
