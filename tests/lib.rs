extern crate asteria;

mod cadence;
mod exclusion;
mod field_of_regard;

use asteria::orbit::Orbit;

/// ISS element set from mid 2020.
pub fn iss_orbit() -> Orbit {
    Orbit::from_tle(
        "1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992",
        "2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008",
    )
    .unwrap()
}

/// Near-circular test orbit with a mean motion of exactly 15 rev/day, i.e. a
/// 96 minute period, at 53 degrees of inclination.
pub fn circular_orbit() -> Orbit {
    Orbit::from_tle(
        "1 99999U 23001A   23001.00000000  .00000000  00000-0  00000-0 0  9997",
        "2 99999  53.0000   0.0000 0001000   0.0000   0.0000 15.00000000000013",
    )
    .unwrap()
}
