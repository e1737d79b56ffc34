//! Projection of GPS fixes onto a local tangent plane anchored at the
//! first fix.

use geo::{GeodesicDistance, Point};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrajectoryError};

/// A single GPS fix in degrees. No fixed reporting rate is assumed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsFix {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Geodesic distance in meters between two (lat, lon) pairs.
pub fn geodesic_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    Point::new(lon1, lat1).geodesic_distance(&Point::new(lon2, lat2))
}

/// Convert a fix sequence into local Cartesian offsets (meters) relative to
/// the first fix. Returns an N×3 array; the first row is always the origin
/// and z is always 0.
///
/// Per fix, x is the geodesic distance to the origin holding longitude
/// fixed (north-south separation) and y the distance holding latitude fixed
/// (east-west separation). Known limitation: geodesic distance is
/// non-negative, so fixes south or west of the origin fold onto the same
/// positive offsets as their northern/eastern mirrors. The projection is a
/// flat-earth approximation and is not reanchored for large spans.
pub fn project_to_local_plane(fixes: &[GpsFix]) -> Result<Array2<f64>> {
    if fixes.is_empty() {
        return Err(TrajectoryError::EmptyInput);
    }

    let origin = fixes[0];
    let mut local = Array2::zeros((fixes.len(), 3));
    for (i, fix) in fixes.iter().enumerate() {
        let x = geodesic_meters(origin.latitude, origin.longitude, fix.latitude, origin.longitude);
        let y = geodesic_meters(origin.latitude, origin.longitude, origin.latitude, fix.longitude);
        if i > 0 && x == 0.0 && y == 0.0 {
            log::debug!("fix {i} coincides with the origin");
        }
        local[[i, 0]] = x;
        local[[i, 1]] = y;
        // z stays 0: the plane carries no altitude information.
    }
    Ok(local)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        const R: f64 = 6_371_000.0;
        let d_lat = (lat2 - lat1).to_radians();
        let d_lon = (lon2 - lon1).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).max(0.0).sqrt());
        R * c
    }

    #[test]
    fn first_fix_maps_to_origin() {
        let fixes = [GpsFix::new(52.2297, 21.0122), GpsFix::new(52.2307, 21.0122)];
        let local = project_to_local_plane(&fixes).unwrap();
        assert_eq!(local[[0, 0]], 0.0);
        assert_eq!(local[[0, 1]], 0.0);
        assert_eq!(local[[0, 2]], 0.0);
    }

    #[test]
    fn longitude_offset_lands_on_y_axis() {
        let fixes = [GpsFix::new(52.0, 21.0), GpsFix::new(52.0, 21.01)];
        let local = project_to_local_plane(&fixes).unwrap();
        let expected = haversine_meters(52.0, 21.0, 52.0, 21.01);
        assert_eq!(local[[1, 0]], 0.0);
        // Ellipsoidal vs. spherical distance differ by well under 1%.
        assert!((local[[1, 1]] - expected).abs() / expected < 0.01);
        assert_eq!(local[[1, 2]], 0.0);
    }

    #[test]
    fn latitude_offset_lands_on_x_axis() {
        let fixes = [GpsFix::new(52.0, 21.0), GpsFix::new(52.02, 21.0)];
        let local = project_to_local_plane(&fixes).unwrap();
        // ~0.02 degrees of latitude is roughly 2.2 km.
        assert!(local[[1, 0]] > 2_000.0 && local[[1, 0]] < 2_400.0);
        assert_eq!(local[[1, 1]], 0.0);
    }

    #[test]
    fn opposite_sides_of_origin_collide() {
        // The projection cannot represent sign: a fix south of the origin
        // maps to the same magnitude as its northern mirror.
        let fixes = [
            GpsFix::new(52.0, 21.0),
            GpsFix::new(52.01, 21.0),
            GpsFix::new(51.99, 21.0),
        ];
        let local = project_to_local_plane(&fixes).unwrap();
        assert!((local[[1, 0]] - local[[2, 0]]).abs() < 1.0);
        assert!(local[[1, 0]] > 0.0 && local[[2, 0]] > 0.0);
    }

    #[test]
    fn coincident_fix_is_a_valid_zero() {
        let fixes = [GpsFix::new(52.0, 21.0), GpsFix::new(52.0, 21.0)];
        let local = project_to_local_plane(&fixes).unwrap();
        assert_eq!(local[[1, 0]], 0.0);
        assert_eq!(local[[1, 1]], 0.0);
    }

    #[test]
    fn empty_sequence_rejected() {
        assert_eq!(
            project_to_local_plane(&[]).unwrap_err(),
            TrajectoryError::EmptyInput
        );
    }
}
