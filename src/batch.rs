use ndarray::{s, Array2, ArrayView2};

use crate::error::{Result, TrajectoryError};

/// Number of channels in an inertial record: ax, ay, az, gx, gy, gz.
pub const INERTIAL_CHANNELS: usize = 6;

/// Number of channels in a magnetometer record: mx, my, mz, declination.
pub const MAGNETOMETER_CHANNELS: usize = 4;

/// An N×6 batch of inertial samples taken at a uniform interval.
///
/// Columns 0..3 are linear accelerations (m/s², body frame), columns 3..6
/// are angular rates (rad/s, body frame). The batch owns its data; the
/// pipelines never mutate it in place.
#[derive(Clone, Debug)]
pub struct InertialBatch {
    data: Array2<f64>,
}

impl InertialBatch {
    pub fn new(data: Array2<f64>) -> Result<Self> {
        if data.nrows() == 0 {
            return Err(TrajectoryError::EmptyInput);
        }
        if data.ncols() != INERTIAL_CHANNELS {
            return Err(TrajectoryError::ChannelMismatch {
                expected: INERTIAL_CHANNELS,
                actual: data.ncols(),
            });
        }
        Ok(Self { data })
    }

    /// Build a batch from per-sample `[ax, ay, az, gx, gy, gz]` rows.
    pub fn from_rows(rows: &[[f64; INERTIAL_CHANNELS]]) -> Result<Self> {
        let mut data = Array2::zeros((rows.len(), INERTIAL_CHANNELS));
        for (i, row) in rows.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                data[[i, j]] = *value;
            }
        }
        Self::new(data)
    }

    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// Acceleration channels (N×3 view).
    pub fn accelerations(&self) -> ArrayView2<'_, f64> {
        self.data.slice(s![.., 0..3])
    }

    /// Angular-rate channels (N×3 view).
    pub fn angular_rates(&self) -> ArrayView2<'_, f64> {
        self.data.slice(s![.., 3..6])
    }
}

/// An N×4 batch of magnetometer samples, index-aligned with an inertial
/// batch. Columns 0..3 are the field components, column 3 is the magnetic
/// declination for that step (radians).
#[derive(Clone, Debug)]
pub struct MagnetometerBatch {
    data: Array2<f64>,
}

impl MagnetometerBatch {
    pub fn new(data: Array2<f64>) -> Result<Self> {
        if data.nrows() == 0 {
            return Err(TrajectoryError::EmptyInput);
        }
        if data.ncols() != MAGNETOMETER_CHANNELS {
            return Err(TrajectoryError::ChannelMismatch {
                expected: MAGNETOMETER_CHANNELS,
                actual: data.ncols(),
            });
        }
        Ok(Self { data })
    }

    pub fn from_rows(rows: &[[f64; MAGNETOMETER_CHANNELS]]) -> Result<Self> {
        let mut data = Array2::zeros((rows.len(), MAGNETOMETER_CHANNELS));
        for (i, row) in rows.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                data[[i, j]] = *value;
            }
        }
        Self::new(data)
    }

    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// Field components (N×3 view).
    pub fn field(&self) -> ArrayView2<'_, f64> {
        self.data.slice(s![.., 0..3])
    }

    /// Per-step declination (length-N view).
    pub fn declination(&self) -> ndarray::ArrayView1<'_, f64> {
        self.data.column(3)
    }
}

/// Check that two index-aligned batches have equal length.
pub fn check_aligned(left: usize, right: usize) -> Result<()> {
    if left != right {
        return Err(TrajectoryError::ShapeMismatch { left, right });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn rejects_empty_batch() {
        let err = InertialBatch::new(Array2::zeros((0, 6))).unwrap_err();
        assert_eq!(err, TrajectoryError::EmptyInput);
    }

    #[test]
    fn rejects_wrong_channel_count() {
        let err = InertialBatch::new(Array2::zeros((4, 5))).unwrap_err();
        assert_eq!(
            err,
            TrajectoryError::ChannelMismatch {
                expected: 6,
                actual: 5
            }
        );
    }

    #[test]
    fn splits_accel_and_rate_channels() {
        let batch = InertialBatch::new(arr2(&[[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]])).unwrap();
        assert_eq!(batch.accelerations()[[0, 2]], 3.0);
        assert_eq!(batch.angular_rates()[[0, 0]], 4.0);
    }

    #[test]
    fn magnetometer_declination_column() {
        let batch = MagnetometerBatch::from_rows(&[[0.3, 0.1, -0.2, 0.05]]).unwrap();
        assert_eq!(batch.field()[[0, 1]], 0.1);
        assert_eq!(batch.declination()[0], 0.05);
    }

    #[test]
    fn aligned_check() {
        assert!(check_aligned(3, 3).is_ok());
        assert_eq!(
            check_aligned(3, 4).unwrap_err(),
            TrajectoryError::ShapeMismatch { left: 3, right: 4 }
        );
    }
}
