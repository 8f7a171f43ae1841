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
use crate::ephem::EARTH_EQUATORIAL_RADIUS_KM;
use crate::linalg::Vector3;
use crate::time::Epoch;
use crate::utils::angular_separation;
use std::fmt;

/// Satisfied when a candidate direction clears the Earth's limb by at least
/// the configured margin.
///
/// The Earth's apparent angular radius is recomputed from the observer
/// altitude at every call, so the same constraint serves eccentric orbits.
#[derive(Clone, Debug)]
pub struct EarthLimbConstraint {
    min_separation_rad: f64,
}

impl EarthLimbConstraint {
    pub fn new(min_separation_deg: f64) -> Self {
        Self {
            min_separation_rad: min_separation_deg.to_radians(),
        }
    }

    pub fn min_separation_deg(&self) -> f64 {
        self.min_separation_rad.to_degrees()
    }
}

impl fmt::Display for EarthLimbConstraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "earth limb constraint ({:.1} deg)",
            self.min_separation_deg()
        )
    }
}

impl VisibilityConstraint for EarthLimbConstraint {
    fn evaluate(
        &self,
        epoch: Epoch,
        observer_km: &Vector3<f64>,
        directions: &[Vector3<f64>],
    ) -> Result<ConstraintEval, ConstraintError> {
        let distance = observer_km.norm();
        // An observer at or below the surface has no limb to clear
        ensure!(
            distance.is_finite() && distance > EARTH_EQUATORIAL_RADIUS_KM,
            DegenerateObserverSnafu {
                epoch,
                norm: distance
            }
        );
        let apparent_radius = (EARTH_EQUATORIAL_RADIUS_KM / distance).asin();
        let nadir = -observer_km / distance;
        let cutoff = apparent_radius + self.min_separation_rad;
        Ok(ConstraintEval::PerDirection(
            directions
                .iter()
                .map(|dir| angular_separation(dir, &nadir) >= cutoff)
                .collect(),
        ))
    }
}
