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

/*! Trapped particle flux in the radiation belts.

The flux model is parametric in eccentric tilted-dipole magnetic
coordinates: Gaussian belt profiles in the McIlwain L shell, an exponential
integral energy spectrum, a solar-activity scale factor, and an atmospheric
loss suppression keyed on the local field strength (weak field at low
altitude is the South Atlantic Anomaly signature). Inputs are geographic,
outputs are omnidirectional integral fluxes in cm⁻²s⁻¹.
*/

use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;

use super::{ConstraintError, ConstraintEval, NonFiniteGeometrySnafu, VisibilityConstraint};
use crate::ephem::{self, EARTH_MEAN_RADIUS_KM};
use crate::linalg::Vector3;
use crate::time::Epoch;
use std::fmt;

/// Trapped particle species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleSpecies {
    Proton,
    Electron,
}

impl fmt::Display for ParticleSpecies {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Proton => write!(f, "p"),
            Self::Electron => write!(f, "e"),
        }
    }
}

/// Solar activity state selecting between the min/max model epochs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolarActivity {
    Minimum,
    Maximum,
}

impl fmt::Display for SolarActivity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Minimum => write!(f, "solar min"),
            Self::Maximum => write!(f, "solar max"),
        }
    }
}

// Eccentric dipole for the modern-epoch geomagnetic field: center offset
// from the Earth's center (km, ECEF) and unit vector toward the north
// geomagnetic pole.
const DIPOLE_OFFSET_KM: [f64; 3] = [-398.0, 258.0, 179.0];
const DIPOLE_AXIS: [f64; 3] = [0.048_0, -0.154_3, 0.986_9];
/// Equatorial surface field strength of the dipole, in gauss.
const DIPOLE_B0_GAUSS: f64 = 0.301;

// Atmospheric loss suppression: trapped flux collapses where the local
// field exceeds the knee (mirror points dip into the atmosphere)
const LOSS_KNEE_GAUSS: f64 = 0.21;
const LOSS_SCALE_GAUSS: f64 = 0.005;

// Belt shells: (peak L, width in L, relative strength)
const PROTON_BELTS: [(f64, f64, f64); 1] = [(1.55, 0.25, 1.0)];
const ELECTRON_BELTS: [(f64, f64, f64); 2] = [(1.45, 0.18, 0.3), (4.60, 0.70, 1.0)];

// Integral spectrum normalization (cm⁻²s⁻¹) and folding energy (MeV)
const PROTON_REFERENCE_FLUX: f64 = 2.0e5;
const PROTON_FOLDING_MEV: f64 = 30.0;
const ELECTRON_REFERENCE_FLUX: f64 = 1.0e7;
const ELECTRON_FOLDING_MEV: f64 = 0.6;

// No stable trapping below the atmosphere-limited shell or beyond the
// outer-belt boundary
const L_INNER_CUTOFF: f64 = 1.14;
const L_OUTER_CUTOFF: f64 = 8.0;

/// Magnetic coordinates of a point in the eccentric tilted-dipole field.
#[derive(Clone, Copy, Debug)]
pub struct DipoleCoordinates {
    /// McIlwain-style shell parameter, in Earth radii.
    pub l_shell: f64,
    /// Magnetic latitude, in radians.
    pub magnetic_latitude_rad: f64,
    /// Local dipole field strength, in gauss.
    pub field_gauss: f64,
}

impl DipoleCoordinates {
    /// Magnetic coordinates of an Earth fixed position in km.
    pub fn from_ecef(position_km: &Vector3<f64>) -> Self {
        let offset = Vector3::from(DIPOLE_OFFSET_KM);
        let axis = Vector3::from(DIPOLE_AXIS);
        let rho = position_km - offset;
        let r = rho.norm() / EARTH_MEAN_RADIUS_KM;
        let sin_lat = (rho.dot(&axis) / rho.norm()).clamp(-1.0, 1.0);
        let cos2_lat = (1.0 - sin_lat * sin_lat).max(1e-12);
        let l_shell = r / cos2_lat;
        let field_gauss =
            DIPOLE_B0_GAUSS / (r * r * r) * (1.0 + 3.0 * sin_lat * sin_lat).sqrt();
        Self {
            l_shell,
            magnetic_latitude_rad: sin_lat.asin(),
            field_gauss,
        }
    }
}

/// Satisfied while the modeled trapped particle flux stays at or below the
/// configured threshold. Gates on the spacecraft position only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrappedParticleFluxConstraint {
    particle: ParticleSpecies,
    energy_mev: f64,
    flux_limit_per_cm2_s: f64,
    solar: SolarActivity,
}

impl TrappedParticleFluxConstraint {
    /// A flux constraint for particles of the provided species with energies
    /// at or above `energy_mev`, violated when the modeled integral flux
    /// exceeds `flux_limit_per_cm2_s`.
    pub fn new(
        particle: ParticleSpecies,
        energy_mev: f64,
        flux_limit_per_cm2_s: f64,
        solar: SolarActivity,
    ) -> Self {
        Self {
            particle,
            energy_mev,
            flux_limit_per_cm2_s,
            solar,
        }
    }

    /// Modeled omnidirectional integral flux at an Earth fixed position.
    pub fn flux_at(&self, position_ecef_km: &Vector3<f64>) -> f64 {
        let coords = DipoleCoordinates::from_ecef(position_ecef_km);
        if !(L_INNER_CUTOFF..L_OUTER_CUTOFF).contains(&coords.l_shell) {
            return 0.0;
        }

        let (belts, reference, folding): (&[(f64, f64, f64)], f64, f64) = match self.particle {
            ParticleSpecies::Proton => (&PROTON_BELTS, PROTON_REFERENCE_FLUX, PROTON_FOLDING_MEV),
            ParticleSpecies::Electron => {
                (&ELECTRON_BELTS, ELECTRON_REFERENCE_FLUX, ELECTRON_FOLDING_MEV)
            }
        };

        // Protons are depleted at solar max by the expanded atmosphere;
        // the outer electron belt is enhanced instead
        let solar_scale = match (self.particle, self.solar) {
            (ParticleSpecies::Proton, SolarActivity::Maximum) => 0.7,
            (ParticleSpecies::Proton, SolarActivity::Minimum) => 1.0,
            (ParticleSpecies::Electron, SolarActivity::Maximum) => 1.0,
            (ParticleSpecies::Electron, SolarActivity::Minimum) => 0.6,
        };

        let shell: f64 = belts
            .iter()
            .map(|(peak, width, strength)| {
                let x = (coords.l_shell - peak) / width;
                strength * (-0.5 * x * x).exp()
            })
            .sum();

        let loss = if coords.field_gauss <= LOSS_KNEE_GAUSS {
            1.0
        } else {
            (-(coords.field_gauss - LOSS_KNEE_GAUSS) / LOSS_SCALE_GAUSS).exp()
        };

        reference * solar_scale * (-self.energy_mev / folding).exp() * shell * loss
    }
}

impl fmt::Display for TrappedParticleFluxConstraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "trapped {} flux constraint (>= {} MeV at most {} /cm2/s, {})",
            self.particle, self.energy_mev, self.flux_limit_per_cm2_s, self.solar
        )
    }
}

impl VisibilityConstraint for TrappedParticleFluxConstraint {
    fn evaluate(
        &self,
        epoch: Epoch,
        observer_km: &Vector3<f64>,
        _directions: &[Vector3<f64>],
    ) -> Result<ConstraintEval, ConstraintError> {
        let ecef = ephem::teme_to_ecef(epoch, observer_km);
        let flux = self.flux_at(&ecef);
        ensure!(
            flux.is_finite(),
            NonFiniteGeometrySnafu {
                constraint: self.to_string(),
                epoch
            }
        );
        Ok(ConstraintEval::WholeField(
            flux <= self.flux_limit_per_cm2_s,
        ))
    }
}
