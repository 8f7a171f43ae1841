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

/*! Geographic exclusion zones.

A boundary polygon on the Earth's surface is simplified, validated and
rasterized once onto a terrestrial equal-area grid; afterwards every query is
a single cell lookup on the precomputed mask. The expensive work happens at
construction so the per-time-step hot path stays allocation free.
*/

use snafu::prelude::*;

use super::{ConstraintError, ConstraintEval, NonFiniteGeometrySnafu, VisibilityConstraint};
use crate::ephem;
use crate::grid::{GridError, SkyGrid, SphericalPolygon};
use crate::linalg::Vector3;
use crate::time::Epoch;
use std::fmt;

/// Boundary of the South Atlantic Anomaly as flown by Fermi (digitized
/// geomagnetic survey data, latitude/longitude degrees). The raw table is
/// carried here because polygon file loading belongs to an external
/// collaborator.
pub const FERMI_SAA_BOUNDARY: [(f64, f64); 12] = [
    (-30.000, 33.900),
    (-19.867, 12.398),
    (-9.733, -9.103),
    (0.400, -30.605),
    (2.000, -38.400),
    (2.000, -45.000),
    (-1.000, -65.000),
    (-6.155, -84.000),
    (-8.880, -89.200),
    (-14.220, -94.300),
    (-18.404, -94.300),
    (-30.000, -86.100),
];

// Simplification tolerance applied to raw survey boundaries
const BOUNDARY_TOLERANCE_DEG: f64 = 0.5;

/// Satisfied while the spacecraft sub-point stays outside a polygonal region
/// of the Earth's surface. Gates on the spacecraft position only.
pub struct EarthPolygonConstraint {
    grid: SkyGrid,
    /// One flag per terrestrial cell; `true` means the cell is permitted.
    mask: Vec<bool>,
    label: String,
}

impl EarthPolygonConstraint {
    /// Rasterizes an already validated boundary onto a terrestrial grid of
    /// the provided resolution.
    pub fn new(
        nside: u64,
        boundary: &SphericalPolygon,
        label: impl Into<String>,
    ) -> Result<Self, GridError> {
        let grid = SkyGrid::new(nside)?;
        let mut mask = vec![true; grid.npix()];
        let mut excluded = 0_usize;
        for cell in grid.polygon_cells(boundary) {
            mask[cell] = false;
            excluded += 1;
        }
        let label = label.into();
        info!(
            "{label}: {excluded} of {} terrestrial cells excluded at nside {nside}",
            grid.npix()
        );
        Ok(Self { grid, mask, label })
    }

    /// Builds the constraint from raw geodetic boundary points: project to
    /// the unit sphere, simplify within the angular tolerance, validate, and
    /// rasterize. A boundary that does not survive as a valid closed polygon
    /// is rejected here, never half-built.
    pub fn from_geodetic_boundary(
        nside: u64,
        points: &[(f64, f64)],
        label: impl Into<String>,
    ) -> Result<Self, GridError> {
        let boundary = SphericalPolygon::from_geodetic(points)?.simplify(BOUNDARY_TOLERANCE_DEG)?;
        Self::new(nside, &boundary, label)
    }

    /// The South Atlantic Anomaly exclusion, from the built-in Fermi table.
    pub fn south_atlantic_anomaly(nside: u64) -> Result<Self, GridError> {
        Self::from_geodetic_boundary(nside, &FERMI_SAA_BOUNDARY, "south atlantic anomaly")
    }

    /// The precomputed permission mask, one flag per terrestrial cell.
    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// Whether an Earth fixed direction (or position) falls in a permitted cell.
    pub fn permits_ecef(&self, direction: &Vector3<f64>) -> bool {
        self.mask[self.grid.cell_of(direction)]
    }
}

impl fmt::Display for EarthPolygonConstraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} exclusion constraint", self.label)
    }
}

impl VisibilityConstraint for EarthPolygonConstraint {
    fn evaluate(
        &self,
        epoch: Epoch,
        observer_km: &Vector3<f64>,
        _directions: &[Vector3<f64>],
    ) -> Result<ConstraintEval, ConstraintError> {
        let ecef = ephem::teme_to_ecef(epoch, observer_km);
        ensure!(
            ecef.iter().all(|x| x.is_finite()) && ecef.norm() > 0.0,
            NonFiniteGeometrySnafu {
                constraint: self.to_string(),
                epoch
            }
        );
        Ok(ConstraintEval::WholeField(self.permits_ecef(&ecef)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbit::Geodetic;

    fn ecef_at(lat_deg: f64, lon_deg: f64) -> Vector3<f64> {
        Geodetic {
            latitude_deg: lat_deg,
            longitude_deg: lon_deg,
            altitude_km: 550.0,
        }
        .to_ecef()
    }

    #[test]
    fn saa_mask_length_matches_grid() {
        let saa = EarthPolygonConstraint::south_atlantic_anomaly(64).unwrap();
        assert_eq!(saa.mask().len(), 12 * 64 * 64);
        // Something was excluded, but far from everything
        let excluded = saa.mask().iter().filter(|ok| !**ok).count();
        assert!(excluded > 0 && excluded < saa.mask().len() / 10);
    }

    #[test]
    fn saa_interior_excluded_antipode_permitted() {
        let saa = EarthPolygonConstraint::south_atlantic_anomaly(64).unwrap();
        assert!(!saa.permits_ecef(&ecef_at(-15.0, -50.0)));
        assert!(saa.permits_ecef(&ecef_at(20.0, 180.0)));
        assert!(saa.permits_ecef(&ecef_at(50.0, 10.0)));
    }

    #[test]
    fn rejects_degenerate_boundary() {
        let r = EarthPolygonConstraint::from_geodetic_boundary(
            64,
            &[(0.0, 0.0), (0.0, 1.0)],
            "broken",
        );
        assert!(matches!(r, Err(GridError::DegenerateBoundary { .. })));
    }
}
