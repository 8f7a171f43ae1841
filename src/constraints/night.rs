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

use super::{ConstraintError, ConstraintEval, DegenerateObserverSnafu, VisibilityConstraint};
use crate::ephem::{self, EARTH_EQUATORIAL_RADIUS_KM, SUN_RADIUS_KM};
use crate::linalg::Vector3;
use crate::time::Epoch;
use crate::utils::angular_separation;
use std::fmt;

/// Satisfied while the spacecraft is in orbit night, i.e. inside the Earth's
/// umbra: the Sun's disk fully occulted by the Earth's disk as seen from the
/// spacecraft.
///
/// This gates on time and observer position only, never on the sky
/// direction. The terminator itself resolves deterministically: a spacecraft
/// exactly on the umbra boundary counts as in night (`<=` comparison), and
/// the test is a pure function of its inputs so repeated queries cannot
/// disagree.
#[derive(Clone, Copy, Debug, Default)]
pub struct OrbitNightConstraint;

impl OrbitNightConstraint {
    pub fn new() -> Self {
        Self
    }

    /// Umbra test at the provided epoch and geocentric TEME position.
    pub fn in_night(
        &self,
        epoch: Epoch,
        observer_km: &Vector3<f64>,
    ) -> Result<bool, ConstraintError> {
        let distance = observer_km.norm();
        ensure!(
            distance.is_finite() && distance > EARTH_EQUATORIAL_RADIUS_KM,
            DegenerateObserverSnafu {
                epoch,
                norm: distance
            }
        );
        let sun_apparent = ephem::sun_position(epoch) - observer_km;
        let earth_apparent_radius = (EARTH_EQUATORIAL_RADIUS_KM / distance).asin();
        let sun_apparent_radius = (SUN_RADIUS_KM / sun_apparent.norm()).asin();
        let separation = angular_separation(&sun_apparent, &-observer_km);
        Ok(separation + sun_apparent_radius <= earth_apparent_radius)
    }
}

impl fmt::Display for OrbitNightConstraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "orbit night constraint")
    }
}

impl VisibilityConstraint for OrbitNightConstraint {
    fn evaluate(
        &self,
        epoch: Epoch,
        observer_km: &Vector3<f64>,
        _directions: &[Vector3<f64>],
    ) -> Result<ConstraintEval, ConstraintError> {
        Ok(ConstraintEval::WholeField(
            self.in_night(epoch, observer_km)?,
        ))
    }
}
