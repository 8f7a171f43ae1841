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

/*! # asteria

Asteria computes the _field of regard_ of a satellite observatory: for each
instant of a survey, the set of sky directions that may be observed without
violating any visibility constraint (Earth limb avoidance, Sun and Moon
separation, trapped particle flux, geographic exclusion zones, orbit night).

The output is a boolean observability matrix (time step × sky cell) intended
for a downstream tiling/scheduling optimizer. Orbit propagation runs on
two-line element sets through SGP4, the sky is partitioned on an equal-area
hierarchical grid, and time steps are evaluated in parallel.
*/

/// Two-line element orbit propagation and geodetic sub-points.
pub mod orbit;

/// Equal-area hierarchical partitioning of the sphere, and spherical polygons.
pub mod grid;

/// Analytic Sun/Moon ephemerides and Earth rotation angles.
pub mod ephem;

/// The visibility constraint suite.
pub mod constraints;

/// Instrument field of view footprints.
pub mod fov;

/// The survey model: configuration, cadence, and the field of regard sweep.
pub mod survey;

/// Utility functions shared by different modules.
pub mod utils;

mod errors;
/// Asteria will (almost) never panic and functions which may fail will return an error.
pub use self::errors::AsteriaError;

#[macro_use]
extern crate log;
extern crate hifitime;
extern crate nalgebra as na;

/// Re-export of hifitime
pub mod time {
    pub use hifitime::*;
}

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
}

/// Re-export some useful things
pub use self::orbit::Orbit;
pub use self::survey::{ObservabilityMatrix, SurveyConfig, SurveyModel};
