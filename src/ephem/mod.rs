/*
    Asteria, field of regard computation for space survey planning
    Copyright (C) 2021-onwards The Asteria Developers

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

/*! Analytic Sun and Moon ephemerides, and Earth rotation.

These are the truncated low-precision series of the Astronomical Almanac,
evaluated in the geocentric equatorial frame of date. Worst case errors are
about 0.01 degrees for the Sun and 0.3 degrees for the Moon, both orders of
magnitude below the degree-scale separation thresholds the visibility
constraints enforce.
*/

use crate::linalg::Vector3;
use crate::time::Epoch;
use crate::utils::{between_0_360, r3};

/// Astronomical unit, in km.
pub const AU_KM: f64 = 149_597_870.700;

/// WGS-84 Earth equatorial radius, in km.
pub const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6_378.137;

/// Mean Earth radius, in km, used for magnetic shell normalization.
pub const EARTH_MEAN_RADIUS_KM: f64 = 6_371.008_8;

/// IAU Sun radius, in km.
pub const SUN_RADIUS_KM: f64 = 696_342.0;

/// Mean Moon radius, in km.
pub const MOON_RADIUS_KM: f64 = 1_737.4;

const DAYS_PER_CENTURY: f64 = 36_525.0;
const J2000_JDE: f64 = 2_451_545.0;
const MJD_TO_JD: f64 = 2_400_000.5;
const TT_TAI_OFFSET_DAYS: f64 = 32.184 / 86_400.0;

/// Julian centuries of Terrestrial Time since J2000.0.
fn centuries_tt(epoch: Epoch) -> f64 {
    (epoch.to_mjd_tai_days() + MJD_TO_JD + TT_TAI_OFFSET_DAYS - J2000_JDE) / DAYS_PER_CENTURY
}

/// Mean obliquity of the ecliptic, in radians (IAU 1980 series).
pub fn mean_obliquity(epoch: Epoch) -> f64 {
    let t = centuries_tt(epoch);
    (23.439_291_11 - 0.013_004_167 * t - 1.639e-7 * t * t + 5.036e-7 * t * t * t).to_radians()
}

/// Greenwich mean sidereal time, in radians, approximating UT1 with UTC.
pub fn gmst(epoch: Epoch) -> f64 {
    let d = epoch.to_mjd_utc_days() + MJD_TO_JD - J2000_JDE;
    let t = d / DAYS_PER_CENTURY;
    between_0_360(
        280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * t * t
            - t * t * t / 38_710_000.0,
    )
    .to_radians()
}

/// Rotates a position from the quasi-inertial frame of date (TEME) into the
/// Earth fixed frame, using GMST as the rotation angle.
pub fn teme_to_ecef(epoch: Epoch, position: &Vector3<f64>) -> Vector3<f64> {
    r3(gmst(epoch)) * position
}

/// Inverse of [`teme_to_ecef`].
pub fn ecef_to_teme(epoch: Epoch, position: &Vector3<f64>) -> Vector3<f64> {
    r3(-gmst(epoch)) * position
}

/// Geocentric position of the Sun, in km, equatorial frame of date.
pub fn sun_position(epoch: Epoch) -> Vector3<f64> {
    let t = centuries_tt(epoch);
    // Mean longitude and mean anomaly of the Sun
    let l0 = 280.466_46 + 36_000.769_83 * t + 0.000_303_2 * t * t;
    let m = (357.529_11 + 35_999.050_29 * t - 0.000_153_7 * t * t).to_radians();
    // Equation of center
    let c = (1.914_602 - 0.004_817 * t - 0.000_014 * t * t) * m.sin()
        + (0.019_993 - 0.000_101 * t) * (2.0 * m).sin()
        + 0.000_289 * (3.0 * m).sin();
    let lambda = (l0 + c).to_radians();
    let ecc = 0.016_708_634 - 0.000_042_037 * t - 0.000_000_126_7 * t * t;
    let nu = m + c.to_radians();
    let distance_au = 1.000_001_018 * (1.0 - ecc * ecc) / (1.0 + ecc * nu.cos());
    let eps = mean_obliquity(epoch);
    let (sl, cl) = lambda.sin_cos();
    let (se, ce) = eps.sin_cos();
    distance_au * AU_KM * Vector3::new(cl, sl * ce, sl * se)
}

/// Geocentric position of the Moon, in km, equatorial frame of date.
///
/// Truncated series: the six largest longitude terms, four latitude terms
/// and the principal parallax terms.
pub fn moon_position(epoch: Epoch) -> Vector3<f64> {
    let t = centuries_tt(epoch);

    // Principal arguments, in degrees
    let elongation = 135.0 + 477_198.87 * t;
    let evection = 259.3 - 413_335.36 * t;
    let variation = 235.7 + 890_534.22 * t;
    let yearly = 269.9 + 954_397.70 * t;
    let solar_anomaly = 357.5 + 35_999.05 * t;
    let node_term = 186.5 + 966_404.03 * t;

    let lambda = (218.32 + 481_267.881 * t
        + 6.29 * elongation.to_radians().sin()
        - 1.27 * evection.to_radians().sin()
        + 0.66 * variation.to_radians().sin()
        + 0.21 * yearly.to_radians().sin()
        - 0.19 * solar_anomaly.to_radians().sin()
        - 0.11 * node_term.to_radians().sin())
    .to_radians();

    let beta = (5.13 * (93.3 + 483_202.02 * t).to_radians().sin()
        + 0.28 * (228.2 + 960_400.89 * t).to_radians().sin()
        - 0.28 * (318.3 + 6_003.15 * t).to_radians().sin()
        - 0.17 * (217.6 - 407_332.21 * t).to_radians().sin())
    .to_radians();

    let parallax = (0.950_8 + 0.051_8 * elongation.to_radians().cos()
        + 0.009_5 * evection.to_radians().cos()
        + 0.007_8 * variation.to_radians().cos()
        + 0.002_8 * yearly.to_radians().cos())
    .to_radians();

    let distance_km = EARTH_EQUATORIAL_RADIUS_KM / parallax.sin();

    let eps = mean_obliquity(epoch);
    let (sl, cl) = lambda.sin_cos();
    let (sb, cb) = beta.sin_cos();
    let (se, ce) = eps.sin_cos();
    distance_km * Vector3::new(cb * cl, cb * sl * ce - sb * se, cb * sl * se + sb * ce)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::angular_separation;
    use approx::assert_abs_diff_eq;

    #[test]
    fn obliquity_at_j2000() {
        let epoch = Epoch::from_gregorian_utc_at_noon(2000, 1, 1);
        assert_abs_diff_eq!(mean_obliquity(epoch).to_degrees(), 23.439_291, epsilon = 1e-4);
    }

    #[test]
    fn gmst_at_j2000() {
        let epoch = Epoch::from_gregorian_utc_at_noon(2000, 1, 1);
        // UTC lags TT by about 64 s in 2000, well under the tolerance here
        assert_abs_diff_eq!(gmst(epoch).to_degrees(), 280.460_6, epsilon = 0.3);
    }

    #[test]
    fn sun_near_march_equinox() {
        // 2023 March equinox was at 21:24 UTC
        let epoch = Epoch::from_gregorian_utc(2023, 3, 20, 21, 24, 0, 0);
        let sun = sun_position(epoch);
        let declination_deg = (sun[2] / sun.norm()).asin().to_degrees();
        assert_abs_diff_eq!(declination_deg, 0.0, epsilon = 0.1);
        // Perihelion is in early January: distance slightly under 1 AU in March
        let distance_au = sun.norm() / AU_KM;
        assert!((0.98..1.02).contains(&distance_au), "sun at {distance_au} AU");
    }

    #[test]
    fn sun_near_june_solstice() {
        let epoch = Epoch::from_gregorian_utc(2022, 6, 21, 9, 14, 0, 0);
        let sun = sun_position(epoch);
        let declination_deg = (sun[2] / sun.norm()).asin().to_degrees();
        assert_abs_diff_eq!(declination_deg, 23.43, epsilon = 0.1);
    }

    #[test]
    fn moon_distance_and_motion() {
        let epoch = Epoch::from_gregorian_utc_at_midnight(2023, 6, 1);
        let moon = moon_position(epoch);
        let distance = moon.norm();
        // Perigee to apogee, with room for the truncated parallax series
        assert!(
            (350_000.0..415_000.0).contains(&distance),
            "moon at {distance} km"
        );
        // The Moon covers about 13 degrees per day against the stars
        let next = moon_position(epoch + 1.0 * hifitime::Unit::Day);
        let moved_deg = angular_separation(&moon, &next).to_degrees();
        assert!((10.0..17.0).contains(&moved_deg), "moon moved {moved_deg} deg");
    }

    #[test]
    fn ecef_round_trip() {
        let epoch = Epoch::from_gregorian_utc_at_midnight(2022, 1, 1);
        let teme = Vector3::new(-4_400.0, 5_100.0, 1_200.0);
        let back = ecef_to_teme(epoch, &teme_to_ecef(epoch, &teme));
        assert_abs_diff_eq!((back - teme).norm(), 0.0, epsilon = 1e-9);
    }
}
