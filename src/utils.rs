extern crate nalgebra as na;
use self::na::{Matrix3, Vector3};

/// Returns the angle between the two provided directions, in radians.
///
/// Computed with atan2 rather than acos so that nearly parallel and nearly
/// antiparallel directions do not lose precision or degenerate into NaN.
pub fn angular_separation(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    a.cross(b).norm().atan2(a.dot(b))
}

/// Rotation about the Z axis by the provided angle in radians (R3 rotation).
pub fn r3(angle_rad: f64) -> Matrix3<f64> {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0)
}

/// Returns the provided angle bounded between 0.0 and 360.0 degrees.
pub fn between_0_360(angle: f64) -> f64 {
    let mut bounded = angle % 360.0;
    if bounded < 0.0 {
        bounded += 360.0;
    }
    bounded
}

/// Unit direction on the sphere from a declination-like latitude and a
/// right-ascension-like longitude, both in radians.
pub fn radec_to_direction(longitude_rad: f64, latitude_rad: f64) -> Vector3<f64> {
    let (slat, clat) = latitude_rad.sin_cos();
    let (slon, clon) = longitude_rad.sin_cos();
    Vector3::new(clat * clon, clat * slon, slat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn separation_limits() {
        let x = Vector3::x();
        let y = Vector3::y();
        assert_abs_diff_eq!(angular_separation(&x, &y), FRAC_PI_2, epsilon = 1e-15);
        assert_abs_diff_eq!(angular_separation(&x, &x), 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(angular_separation(&x, &(-x)), PI, epsilon = 1e-15);
    }

    #[test]
    fn r3_rotates_x_toward_minus_y() {
        let r = r3(FRAC_PI_2) * Vector3::x();
        assert_abs_diff_eq!(r[0], 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(r[1], -1.0, epsilon = 1e-15);
    }

    #[test]
    fn angle_bounding() {
        assert_abs_diff_eq!(between_0_360(-90.0), 270.0);
        assert_abs_diff_eq!(between_0_360(725.0), 5.0, epsilon = 1e-12);
    }
}
