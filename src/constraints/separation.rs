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

use snafu::prelude::*;

use super::{
    all_finite, ConstraintError, ConstraintEval, NonFiniteGeometrySnafu, VisibilityConstraint,
};
use crate::ephem;
use crate::linalg::Vector3;
use crate::time::Epoch;
use crate::utils::angular_separation;
use std::fmt;

/// Shared body-separation evaluation: the body's apparent direction is
/// topocentric (geocentric body position minus observer position), which
/// matters for the Moon at LEO where the parallax reaches a full degree.
fn separation_eval(
    label: &dyn fmt::Display,
    body_geocentric_km: Vector3<f64>,
    epoch: Epoch,
    observer_km: &Vector3<f64>,
    directions: &[Vector3<f64>],
    min_separation_rad: f64,
) -> Result<ConstraintEval, ConstraintError> {
    let apparent = body_geocentric_km - observer_km;
    ensure!(
        all_finite(&[&apparent, observer_km]) && apparent.norm() > 0.0,
        NonFiniteGeometrySnafu {
            constraint: label.to_string(),
            epoch
        }
    );
    let apparent = apparent.normalize();
    Ok(ConstraintEval::PerDirection(
        directions
            .iter()
            .map(|dir| angular_separation(dir, &apparent) >= min_separation_rad)
            .collect(),
    ))
}

/// Satisfied when a candidate direction keeps at least the configured angle
/// from the apparent Sun.
#[derive(Clone, Debug)]
pub struct SunSeparationConstraint {
    min_separation_rad: f64,
}

impl SunSeparationConstraint {
    pub fn new(min_separation_deg: f64) -> Self {
        Self {
            min_separation_rad: min_separation_deg.to_radians(),
        }
    }
}

impl fmt::Display for SunSeparationConstraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "sun separation constraint ({:.1} deg)",
            self.min_separation_rad.to_degrees()
        )
    }
}

impl VisibilityConstraint for SunSeparationConstraint {
    fn evaluate(
        &self,
        epoch: Epoch,
        observer_km: &Vector3<f64>,
        directions: &[Vector3<f64>],
    ) -> Result<ConstraintEval, ConstraintError> {
        separation_eval(
            self,
            ephem::sun_position(epoch),
            epoch,
            observer_km,
            directions,
            self.min_separation_rad,
        )
    }
}

/// Satisfied when a candidate direction keeps at least the configured angle
/// from the apparent Moon.
#[derive(Clone, Debug)]
pub struct MoonSeparationConstraint {
    min_separation_rad: f64,
}

impl MoonSeparationConstraint {
    pub fn new(min_separation_deg: f64) -> Self {
        Self {
            min_separation_rad: min_separation_deg.to_radians(),
        }
    }
}

impl fmt::Display for MoonSeparationConstraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "moon separation constraint ({:.1} deg)",
            self.min_separation_rad.to_degrees()
        )
    }
}

impl VisibilityConstraint for MoonSeparationConstraint {
    fn evaluate(
        &self,
        epoch: Epoch,
        observer_km: &Vector3<f64>,
        directions: &[Vector3<f64>],
    ) -> Result<ConstraintEval, ConstraintError> {
        separation_eval(
            self,
            ephem::moon_position(epoch),
            epoch,
            observer_km,
            directions,
            self.min_separation_rad,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn antisolar_direction_always_passes() {
        let epoch = Epoch::from_gregorian_utc_at_midnight(2023, 4, 15);
        let sun = ephem::sun_position(epoch);
        let observer = Vector3::new(6_928.0, 0.0, 0.0);
        let antisolar = -sun.normalize();
        let toward = sun.normalize();

        let constraint = SunSeparationConstraint::new(46.0);
        let eval = constraint
            .evaluate(epoch, &observer, &[antisolar, toward])
            .unwrap();
        assert_eq!(eval, ConstraintEval::PerDirection(vec![true, false]));
    }

    #[test]
    fn moon_parallax_is_applied() {
        let epoch = Epoch::from_gregorian_utc_at_midnight(2023, 4, 15);
        let moon = ephem::moon_position(epoch);
        // Observer offset perpendicular to the Moon direction shifts the
        // apparent Moon by about a degree at LEO
        let perp = moon.cross(&Vector3::z()).normalize() * 6_928.0;
        let apparent = (moon - perp).normalize();
        let shift = angular_separation(&moon.normalize(), &apparent).to_degrees();
        assert!((0.5..1.5).contains(&shift), "parallax shift {shift} deg");

        // A direction right at the geocentric Moon position still sits within
        // the exclusion radius of the apparent Moon
        let constraint = MoonSeparationConstraint::new(23.0);
        let eval = constraint
            .evaluate(epoch, &perp, &[moon.normalize()])
            .unwrap();
        assert_eq!(eval, ConstraintEval::PerDirection(vec![false]));
    }
}
