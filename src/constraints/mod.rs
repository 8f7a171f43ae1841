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

/*! The visibility constraint suite.

Each constraint is an independent predicate over (epoch, observer position,
candidate sky directions). Constraints that depend on the sky direction
return one flag per candidate; constraints that gate on the spacecraft
position alone return a single whole-field flag — the distinction is carried
in [`ConstraintEval`] so the aggregator broadcasts explicitly instead of
relying on implicit shape rules.

All evaluators are pure: immutable after construction, no interior state,
and any non-finite intermediate value surfaces as a typed error rather than
leaking into the output as a silent `false`.
*/

use snafu::prelude::*;

use crate::linalg::Vector3;
use crate::time::Epoch;
use std::fmt;

mod exclusion;
mod limb;
mod night;
mod radiation;
mod separation;

pub use exclusion::EarthPolygonConstraint;
pub use limb::EarthLimbConstraint;
pub use night::OrbitNightConstraint;
pub use radiation::{
    DipoleCoordinates, ParticleSpecies, SolarActivity, TrappedParticleFluxConstraint,
};
pub use separation::{MoonSeparationConstraint, SunSeparationConstraint};

#[derive(Debug, Snafu)]
pub enum ConstraintError {
    #[snafu(display("{constraint} hit non finite geometry at {epoch}"))]
    NonFiniteGeometry { constraint: String, epoch: Epoch },
    #[snafu(display("observer position is degenerate at {epoch} (norm {norm} km)"))]
    DegenerateObserver { epoch: Epoch, norm: f64 },
}

/// Outcome of one constraint at one instant.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstraintEval {
    /// The constraint gates on the observer position (or time) only: one flag
    /// for the entire field of candidate directions.
    WholeField(bool),
    /// One flag per candidate direction, in the order the candidates were
    /// provided. The length must equal the candidate count; the aggregator
    /// rejects anything else.
    PerDirection(Vec<bool>),
}

/// Capability shared by every visibility constraint.
pub trait VisibilityConstraint: fmt::Display + Send + Sync {
    /// Evaluates this constraint at `epoch` for an observer at the provided
    /// geocentric TEME position (km), against the candidate directions
    /// (unit vectors in the same frame). `true` means the constraint is
    /// satisfied, i.e. the direction may be observed.
    fn evaluate(
        &self,
        epoch: Epoch,
        observer_km: &Vector3<f64>,
        directions: &[Vector3<f64>],
    ) -> Result<ConstraintEval, ConstraintError>;
}

/// The default visibility constraint stack for a wide-field UV survey in low
/// Earth orbit, modeled after Fermi's operating constraints: trapped proton
/// flux at most 1 cm⁻²s⁻¹ above 20 MeV at solar maximum, 28° from the
/// Earth's limb, 46° from the Sun and 23° from the Moon.
pub fn default_visibility_constraints() -> Vec<Box<dyn VisibilityConstraint>> {
    vec![
        Box::new(TrappedParticleFluxConstraint::new(
            ParticleSpecies::Proton,
            20.0,
            1.0,
            SolarActivity::Maximum,
        )),
        Box::new(EarthLimbConstraint::new(28.0)),
        Box::new(SunSeparationConstraint::new(46.0)),
        Box::new(MoonSeparationConstraint::new(23.0)),
    ]
}

/// Checks that every component of every provided vector is finite.
pub(crate) fn all_finite(vectors: &[&Vector3<f64>]) -> bool {
    vectors.iter().all(|v| v.iter().all(|x| x.is_finite()))
}
