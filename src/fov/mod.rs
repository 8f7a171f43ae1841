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

/*! Instrument field of view footprints.

A footprint is stored as vertices around the +Z boresight and rotated onto a
pointing center at a roll angle on demand. Mapping a footprint to the set of
covered sky cells is the celestial twin of the terrestrial exclusion-zone
rasterization: the same polygon-to-cells query on the same grid structure.
*/

use crate::grid::{GridError, SkyGrid, SphericalPolygon};
use crate::linalg::Vector3;

/// A polygonal field of view around the instrument boresight.
#[derive(Clone, Debug)]
pub struct FieldOfView {
    /// Unit vectors in the boresight frame (+Z toward the target).
    vertices: Vec<Vector3<f64>>,
}

impl FieldOfView {
    /// A square field of view of the provided full width.
    pub fn from_rectangle(width_deg: f64) -> Self {
        let half = (width_deg / 2.0).to_radians().tan();
        let corners = [(half, half), (-half, half), (-half, -half), (half, -half)];
        Self {
            vertices: corners
                .iter()
                .map(|(x, y)| Vector3::new(*x, *y, 1.0).normalize())
                .collect(),
        }
    }

    pub fn vertices(&self) -> &[Vector3<f64>] {
        &self.vertices
    }

    /// The footprint polygon for a pointing at `center` with the provided
    /// roll about the boresight.
    pub fn footprint(
        &self,
        center: &Vector3<f64>,
        roll_deg: f64,
    ) -> Result<SphericalPolygon, GridError> {
        let boresight = center.normalize();
        // Local east/north basis; fall back to X when pointing at a pole
        let mut east = Vector3::z().cross(&boresight);
        if east.norm() < 1e-9 {
            east = Vector3::x();
        }
        let east = east.normalize();
        let north = boresight.cross(&east);

        let (sr, cr) = roll_deg.to_radians().sin_cos();
        let x_axis = cr * east + sr * north;
        let y_axis = -sr * east + cr * north;

        SphericalPolygon::new(
            self.vertices
                .iter()
                .map(|v| v[0] * x_axis + v[1] * y_axis + v[2] * boresight)
                .collect(),
        )
    }

    /// Sky cells covered by the footprint at the provided pointing and roll.
    pub fn footprint_cells(
        &self,
        grid: &SkyGrid,
        center: &Vector3<f64>,
        roll_deg: f64,
    ) -> Result<Vec<usize>, GridError> {
        Ok(grid.polygon_cells(&self.footprint(center, roll_deg)?))
    }
}
