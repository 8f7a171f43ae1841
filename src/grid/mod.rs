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

/*! Equal-area hierarchical partitioning of the sphere.

This is the HEALPix tessellation in the NESTED ordering: twelve base faces,
each subdivided into `nside`² equal-area cells, `nside` a power of two. The
same structure partitions the celestial sphere and, with directions read as
Earth fixed unit vectors, the terrestrial surface.

Cell assignment and center recovery follow the reference HEALPix geometry
(Górski et al. 2005); boundary ties resolve by the floor-based face and
in-face coordinate assignment of that scheme, so a direction exactly on a
cell edge deterministically maps to the cell on the non-negative side of the
edge in face coordinates.
*/

use snafu::prelude::*;

use crate::linalg::Vector3;
use crate::utils::between_0_360;
use std::f64::consts::FRAC_PI_2;

mod polygon;
pub use polygon::SphericalPolygon;

#[derive(Debug, Snafu)]
pub enum GridError {
    #[snafu(display("nside must be a nonzero power of two, got {nside}"))]
    InvalidResolution { nside: u64 },
    #[snafu(display("polygon boundary needs at least 3 distinct vertices, got {count}"))]
    DegenerateBoundary { count: usize },
    #[snafu(display("polygon vertex {index} is not a finite direction"))]
    NonFiniteVertex { index: usize },
    #[snafu(display("polygon edge from vertex {first} to vertex {second} is degenerate"))]
    DegenerateEdge { first: usize, second: usize },
    #[snafu(display("polygon boundary self-intersects (edges {first} and {second})"))]
    SelfIntersecting { first: usize, second: usize },
}

// Northernmost ring and azimuthal offset of each base face
const JRLL: [i64; 12] = [2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4];
const JPLL: [i64; 12] = [1, 3, 5, 7, 0, 2, 4, 6, 1, 3, 5, 7];

fn spread_bits(v: u64) -> u64 {
    let mut v = v & 0x0000_0000_ffff_ffff;
    v = (v | (v << 16)) & 0x0000_ffff_0000_ffff;
    v = (v | (v << 8)) & 0x00ff_00ff_00ff_00ff;
    v = (v | (v << 4)) & 0x0f0f_0f0f_0f0f_0f0f;
    v = (v | (v << 2)) & 0x3333_3333_3333_3333;
    (v | (v << 1)) & 0x5555_5555_5555_5555
}

fn compress_bits(v: u64) -> u64 {
    let mut v = v & 0x5555_5555_5555_5555;
    v = (v | (v >> 1)) & 0x3333_3333_3333_3333;
    v = (v | (v >> 2)) & 0x0f0f_0f0f_0f0f_0f0f;
    v = (v | (v >> 4)) & 0x00ff_00ff_00ff_00ff;
    v = (v | (v >> 8)) & 0x0000_ffff_0000_ffff;
    (v | (v >> 16)) & 0x0000_0000_ffff_ffff
}

/// An immutable equal-area partition of the unit sphere at a fixed resolution.
#[derive(Clone, Debug)]
pub struct SkyGrid {
    nside: u64,
    order: u32,
    npix: usize,
}

impl SkyGrid {
    /// Builds the partition for the provided resolution parameter.
    pub fn new(nside: u64) -> Result<Self, GridError> {
        ensure!(
            nside > 0 && nside.is_power_of_two(),
            InvalidResolutionSnafu { nside }
        );
        Ok(Self {
            nside,
            order: nside.trailing_zeros(),
            npix: (12 * nside * nside) as usize,
        })
    }

    pub fn nside(&self) -> u64 {
        self.nside
    }

    /// Number of cells in the partition (12 nside²).
    pub fn npix(&self) -> usize {
        self.npix
    }

    /// Index of the cell containing the provided direction.
    ///
    /// The direction needs not be normalized but must be non-zero and finite.
    pub fn cell_of(&self, direction: &Vector3<f64>) -> usize {
        let r = direction.norm();
        debug_assert!(r > 0.0 && r.is_finite(), "degenerate direction");
        let z = direction[2] / r;
        let tt = between_0_360(direction[1].atan2(direction[0]).to_degrees()) / 90.0;
        let nside = self.nside as i64;

        let (face, ix, iy) = if z.abs() <= 2.0 / 3.0 {
            // Equatorial zone: indices along the ascending and descending edges
            let temp1 = self.nside as f64 * (0.5 + tt);
            let temp2 = self.nside as f64 * (z * 0.75);
            let jp = (temp1 - temp2) as i64;
            let jm = (temp1 + temp2) as i64;
            let ifp = jp >> self.order;
            let ifm = jm >> self.order;
            let face = if ifp == ifm {
                (ifp & 3) + 4
            } else if ifp < ifm {
                ifp & 3
            } else {
                (ifm & 3) + 8
            };
            (face, jm & (nside - 1), nside - (jp & (nside - 1)) - 1)
        } else {
            // Polar caps
            let ntt = (tt as i64).min(3);
            let tp = tt - ntt as f64;
            let tmp = self.nside as f64 * (3.0 * (1.0 - z.abs())).sqrt();
            let jp = ((tp * tmp) as i64).min(nside - 1);
            let jm = (((1.0 - tp) * tmp) as i64).min(nside - 1);
            if z >= 0.0 {
                (ntt, nside - jm - 1, nside - jp - 1)
            } else {
                (ntt + 8, jp, jm)
            }
        };

        (face as u64 * self.nside * self.nside
            + (spread_bits(ix as u64) | (spread_bits(iy as u64) << 1))) as usize
    }

    /// Representative (center) direction of the provided cell, as a unit vector.
    ///
    /// Panics if the cell index is out of range.
    pub fn direction_of(&self, cell: usize) -> Vector3<f64> {
        assert!(cell < self.npix, "cell {cell} out of range for {} cells", self.npix);
        let nside = self.nside as i64;
        let per_face = self.nside * self.nside;
        let face = (cell as u64 / per_face) as usize;
        let within = cell as u64 % per_face;
        let ix = compress_bits(within) as i64;
        let iy = compress_bits(within >> 1) as i64;

        let jr = JRLL[face] * nside - ix - iy - 1;
        let (z, nr, kshift) = if jr < nside {
            let nr = jr;
            (
                1.0 - (nr * nr) as f64 / (3.0 * (nside * nside) as f64),
                nr,
                0,
            )
        } else if jr > 3 * nside {
            let nr = 4 * nside - jr;
            (
                (nr * nr) as f64 / (3.0 * (nside * nside) as f64) - 1.0,
                nr,
                0,
            )
        } else {
            (
                (2 * nside - jr) as f64 * 2.0 / (3.0 * nside as f64),
                nside,
                (jr - nside) & 1,
            )
        };

        let mut jp = (JPLL[face] * nr + ix - iy + 1 + kshift) / 2;
        if jp > 4 * nr {
            jp -= 4 * nr;
        }
        if jp < 1 {
            jp += 4 * nr;
        }
        let phi = (jp as f64 - (kshift as f64 + 1.0) * 0.5) * (FRAC_PI_2 / nr as f64);
        let st = (1.0 - z * z).max(0.0).sqrt();
        Vector3::new(st * phi.cos(), st * phi.sin(), z)
    }

    /// Center directions of every cell, in canonical cell order.
    pub fn centers(&self) -> Vec<Vector3<f64>> {
        (0..self.npix).map(|cell| self.direction_of(cell)).collect()
    }

    /// Every cell whose center direction lies inside the provided polygon.
    ///
    /// Containment is evaluated on each cell's representative direction, so
    /// boundary cells are kept or dropped by where their center falls. Build
    /// cost is O(cells × vertices); intended for one-time mask construction.
    pub fn polygon_cells(&self, polygon: &SphericalPolygon) -> Vec<usize> {
        (0..self.npix)
            .filter(|cell| polygon.contains(&self.direction_of(*cell)))
            .collect()
    }
}
