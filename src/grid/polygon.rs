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
    DegenerateBoundarySnafu, DegenerateEdgeSnafu, GridError, NonFiniteVertexSnafu,
    SelfIntersectingSnafu,
};
use crate::linalg::Vector3;
use crate::utils::{angular_separation, radec_to_direction};
use std::f64::consts::PI;

// Vertices closer than this are collapsed into one
const DUPLICATE_TOL_RAD: f64 = 1e-9;

/// A closed, simple polygon on the unit sphere, with great-circle edges.
///
/// Construction validates the boundary: at least three distinct vertices, no
/// degenerate (antipodal) edge, no self-intersection. All vertices are stored
/// normalized. Working in Cartesian directions means polygons may wrap the
/// poles or cross the longitude seam without special handling.
#[derive(Clone, Debug)]
pub struct SphericalPolygon {
    vertices: Vec<Vector3<f64>>,
}

impl SphericalPolygon {
    pub fn new(vertices: Vec<Vector3<f64>>) -> Result<Self, GridError> {
        let mut cleaned: Vec<Vector3<f64>> = Vec::with_capacity(vertices.len());
        for (index, v) in vertices.iter().enumerate() {
            ensure!(
                v.iter().all(|x| x.is_finite()) && v.norm() > 0.0,
                NonFiniteVertexSnafu { index }
            );
            let u = v.normalize();
            if let Some(prev) = cleaned.last() {
                if angular_separation(prev, &u) < DUPLICATE_TOL_RAD {
                    continue;
                }
            }
            cleaned.push(u);
        }
        // An explicitly closed boundary repeats the first vertex: drop the repeat
        if cleaned.len() > 1
            && angular_separation(&cleaned[0], cleaned.last().unwrap()) < DUPLICATE_TOL_RAD
        {
            cleaned.pop();
        }
        ensure!(
            cleaned.len() >= 3,
            DegenerateBoundarySnafu {
                count: cleaned.len()
            }
        );

        let n = cleaned.len();
        for i in 0..n {
            let j = (i + 1) % n;
            ensure!(
                cleaned[i].cross(&cleaned[j]).norm() >= 1e-9,
                DegenerateEdgeSnafu { first: i, second: j }
            );
        }
        for i in 0..n {
            for j in (i + 1)..n {
                // Adjacent edges share a vertex, not an interior crossing
                if j == i + 1 || (i == 0 && j == n - 1) {
                    continue;
                }
                ensure!(
                    !arcs_cross(
                        &cleaned[i],
                        &cleaned[(i + 1) % n],
                        &cleaned[j],
                        &cleaned[(j + 1) % n]
                    ),
                    SelfIntersectingSnafu { first: i, second: j }
                );
            }
        }

        Ok(Self { vertices: cleaned })
    }

    /// Boundary from geodetic (latitude, longitude) pairs in degrees, as
    /// handed over by an external polygon loader.
    pub fn from_geodetic(points: &[(f64, f64)]) -> Result<Self, GridError> {
        Self::new(
            points
                .iter()
                .map(|(lat, lon)| radec_to_direction(lon.to_radians(), lat.to_radians()))
                .collect(),
        )
    }

    pub fn vertices(&self) -> &[Vector3<f64>] {
        &self.vertices
    }

    /// Whether the provided direction lies inside the boundary.
    ///
    /// Winding number test: the signed azimuthal angles swept by the boundary
    /// as seen from the direction sum to ±2π inside and 0 outside. Directions
    /// exactly on the boundary sum to ±π and count as inside.
    pub fn contains(&self, direction: &Vector3<f64>) -> bool {
        let p = direction.normalize();
        let mut winding = 0.0;
        let n = self.vertices.len();
        for i in 0..n {
            let a = &self.vertices[i];
            let b = &self.vertices[(i + 1) % n];
            let det = p.dot(&a.cross(b));
            let dot = a.dot(b) - p.dot(a) * p.dot(b);
            winding += det.atan2(dot);
        }
        winding.abs() > PI
    }

    /// Reduces the vertex count so that no removed vertex is farther than
    /// `tolerance_deg` from the simplified boundary (spherical
    /// Ramer-Douglas-Peucker). The result is re-validated: a boundary that
    /// collapses under the tolerance is rejected rather than returned broken.
    pub fn simplify(&self, tolerance_deg: f64) -> Result<Self, GridError> {
        let tol = tolerance_deg.to_radians();
        let n = self.vertices.len();
        // Anchor the closed ring at vertex 0 and at the vertex farthest from it
        let far = (1..n)
            .max_by(|i, j| {
                angular_separation(&self.vertices[0], &self.vertices[*i])
                    .partial_cmp(&angular_separation(&self.vertices[0], &self.vertices[*j]))
                    .unwrap()
            })
            .unwrap();

        let mut kept = vec![self.vertices[0]];
        simplify_chain(&self.vertices[0..=far], tol, &mut kept);
        let mut ring: Vec<Vector3<f64>> = self.vertices[far..].to_vec();
        ring.push(self.vertices[0]);
        simplify_chain(&ring, tol, &mut kept);
        // The closing anchor was pushed again
        kept.pop();

        debug!(
            "polygon simplification: {} vertices down to {} at {tolerance_deg} deg",
            n,
            kept.len()
        );
        Self::new(kept)
    }
}

/// Douglas-Peucker over an open chain: pushes every surviving vertex after
/// `chain[0]`, including the final one.
fn simplify_chain(chain: &[Vector3<f64>], tol_rad: f64, out: &mut Vec<Vector3<f64>>) {
    if chain.len() < 2 {
        return;
    }
    if chain.len() == 2 {
        out.push(chain[1]);
        return;
    }
    let first = chain[0];
    let last = chain[chain.len() - 1];
    let mut worst = 0;
    let mut dmax = 0.0;
    for (i, p) in chain[1..chain.len() - 1].iter().enumerate() {
        let d = arc_distance(p, &first, &last);
        if d > dmax {
            dmax = d;
            worst = i + 1;
        }
    }
    if dmax > tol_rad {
        simplify_chain(&chain[..=worst], tol_rad, out);
        simplify_chain(&chain[worst..], tol_rad, out);
    } else {
        out.push(last);
    }
}

/// Angular distance from a direction to the minor great-circle arc (a, b).
fn arc_distance(p: &Vector3<f64>, a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let endpoints = angular_separation(p, a).min(angular_separation(p, b));
    let n = a.cross(b);
    let nn = n.norm();
    if nn < 1e-12 {
        return endpoints;
    }
    let n = n / nn;
    let off_plane = n.dot(p);
    let foot = p - n * off_plane;
    if foot.norm() < 1e-12 {
        return endpoints;
    }
    let t = foot.normalize();
    if n.dot(&a.cross(&t)) >= 0.0 && n.dot(&t.cross(b)) >= 0.0 {
        off_plane.abs().asin()
    } else {
        endpoints
    }
}

fn on_minor_arc(a: &Vector3<f64>, b: &Vector3<f64>, n: &Vector3<f64>, t: &Vector3<f64>) -> bool {
    n.dot(&a.cross(t)) > 1e-12 && n.dot(&t.cross(b)) > 1e-12
}

/// Whether the interiors of minor arcs (a, b) and (c, d) cross.
fn arcs_cross(a: &Vector3<f64>, b: &Vector3<f64>, c: &Vector3<f64>, d: &Vector3<f64>) -> bool {
    let n1 = a.cross(b);
    let n2 = c.cross(d);
    let t = n1.cross(&n2);
    if t.norm() < 1e-12 {
        // Co-circular edges: no transversal crossing to report
        return false;
    }
    let t = t.normalize();
    (on_minor_arc(a, b, &n1, &t) && on_minor_arc(c, d, &n2, &t))
        || (on_minor_arc(a, b, &n1, &(-t)) && on_minor_arc(c, d, &n2, &(-t)))
}
