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

/*! The survey model and the field of regard sweep.

A [`SurveyModel`] binds an orbit, a constraint stack and the survey cadence
into one immutable configuration, and computes the boolean observability
matrix (time step × sky cell) in parallel across time steps. Rows are
independent by construction, so the sweep distributes over a worker pool
with read-only shared state and reassembles in input order.
*/

use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use snafu::prelude::*;
use typed_builder::TypedBuilder;

use crate::constraints::{
    ConstraintError, ConstraintEval, OrbitNightConstraint, VisibilityConstraint,
};
use crate::fov::FieldOfView;
use crate::grid::{GridError, SkyGrid};
use crate::linalg::Vector3;
use crate::orbit::{Orbit, PropagationError};
use crate::time::{Duration, Epoch, TimeSeries, Unit};
use std::fmt;

#[derive(Debug, Snafu)]
pub enum SurveyError {
    #[snafu(display("sky grid construction failed: {source}"))]
    GridSetup { source: GridError },
    #[snafu(display("survey has no candidate directions"))]
    NoCandidates,
    #[snafu(display("exposure time {exposure} does not fit in the orbital period {period}"))]
    ExposureLongerThanOrbit { exposure: Duration, period: Duration },
    #[snafu(display("survey cadence is degenerate: {details}"))]
    DegenerateCadence { details: String },
    #[snafu(display("orbit propagation failed at {epoch}: {source}"))]
    PropagationFailed {
        epoch: Epoch,
        source: PropagationError,
    },
    #[snafu(display("constraint evaluation failed at {epoch}: {source}"))]
    ConstraintFailed {
        epoch: Epoch,
        source: ConstraintError,
    },
    #[snafu(display(
        "{constraint} returned {found} flags for {expected} directions at {epoch}"
    ))]
    ShapeMismatch {
        constraint: String,
        epoch: Epoch,
        found: usize,
        expected: usize,
    },
    #[snafu(display("worker pool could not be built: {source}"))]
    WorkerPool { source: rayon::ThreadPoolBuildError },
}

/// Survey cadence and geometry configuration. All derived quantities are
/// computed once by [`SurveyModel::new`] and never rederived.
#[derive(TypedBuilder)]
pub struct SurveyConfig {
    /// Duration of one exposure.
    #[builder(default = 10.0 * Unit::Minute)]
    pub exposure_time: Duration,
    /// Constraint evaluation steps per exposure.
    #[builder(default = 10)]
    pub time_steps_per_exposure: u32,
    /// Number of orbital periods the survey spans.
    #[builder(default = 1)]
    pub number_of_orbits: u32,
    /// Full width of the square field of view, in degrees.
    #[builder(default = 7.1)]
    pub field_of_view_deg: f64,
    /// Sky grid resolution parameter.
    #[builder(default = 32)]
    pub nside: u64,
    /// Explicit candidate pointing centers; defaults to every cell center of
    /// the sky grid.
    #[builder(default, setter(strip_option))]
    pub centers: Option<Vec<Vector3<f64>>>,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// The boolean observability matrix: one row per time step, one column per
/// candidate direction, `true` where every constraint is satisfied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObservabilityMatrix {
    n_directions: usize,
    data: Vec<bool>,
}

impl ObservabilityMatrix {
    fn from_rows(rows: Vec<Vec<bool>>, n_directions: usize) -> Self {
        let mut data = Vec::with_capacity(rows.len() * n_directions);
        for row in rows {
            debug_assert_eq!(row.len(), n_directions);
            data.extend_from_slice(&row);
        }
        Self { n_directions, data }
    }

    pub fn n_times(&self) -> usize {
        if self.n_directions == 0 {
            0
        } else {
            self.data.len() / self.n_directions
        }
    }

    pub fn n_directions(&self) -> usize {
        self.n_directions
    }

    /// The observability row of the i-th time step.
    pub fn row(&self, step: usize) -> &[bool] {
        &self.data[step * self.n_directions..(step + 1) * self.n_directions]
    }

    pub fn at(&self, step: usize, direction: usize) -> bool {
        self.data[step * self.n_directions + direction]
    }

    /// Fraction of (time, direction) pairs that are observable.
    pub fn observable_fraction(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().filter(|x| **x).count() as f64 / self.data.len() as f64
    }
}

/// An immutable survey model: orbit, constraint stack, sky grid and cadence.
pub struct SurveyModel {
    orbit: Orbit,
    constraints: Vec<Box<dyn VisibilityConstraint>>,
    grid: SkyGrid,
    centers: Vec<Vector3<f64>>,
    rolls_deg: Vec<f64>,
    fov: FieldOfView,
    exposure_time: Duration,
    time_step_duration: Duration,
    exposures_per_orbit: u32,
    time_steps: usize,
}

impl SurveyModel {
    /// Builds the survey model and derives the cadence: the time step
    /// duration, the exposures fitting in one orbit, and the total step
    /// count over the configured number of orbits.
    pub fn new(
        orbit: Orbit,
        constraints: Vec<Box<dyn VisibilityConstraint>>,
        config: SurveyConfig,
    ) -> Result<Self, SurveyError> {
        ensure!(
            config.time_steps_per_exposure > 0 && config.number_of_orbits > 0,
            DegenerateCadenceSnafu {
                details: format!(
                    "{} steps per exposure over {} orbits",
                    config.time_steps_per_exposure, config.number_of_orbits
                )
            }
        );
        ensure!(
            config.exposure_time > Duration::ZERO,
            DegenerateCadenceSnafu {
                details: format!("exposure time {}", config.exposure_time)
            }
        );

        let grid = SkyGrid::new(config.nside).context(GridSetupSnafu)?;
        let centers = match config.centers {
            Some(centers) => centers,
            None => grid.centers(),
        };
        ensure!(!centers.is_empty(), NoCandidatesSnafu);

        let period = orbit.period();
        let exposures_per_orbit =
            (period.to_seconds() / config.exposure_time.to_seconds()).floor() as u32;
        ensure!(
            exposures_per_orbit > 0,
            ExposureLongerThanOrbitSnafu {
                exposure: config.exposure_time,
                period
            }
        );
        let time_step_duration = config.exposure_time / config.time_steps_per_exposure as f64;
        let time_steps = (config.number_of_orbits as f64 * period.to_seconds()
            / time_step_duration.to_seconds())
        .floor() as usize;

        info!(
            "survey model: {} candidate directions at nside {}, {} exposures per orbit, {} time steps of {}",
            centers.len(),
            config.nside,
            exposures_per_orbit,
            time_steps,
            time_step_duration
        );

        Ok(Self {
            orbit,
            constraints,
            grid,
            centers,
            rolls_deg: (0..9).map(|i| f64::from(i) * 10.0).collect(),
            fov: FieldOfView::from_rectangle(config.field_of_view_deg),
            exposure_time: config.exposure_time,
            time_step_duration,
            exposures_per_orbit,
            time_steps,
        })
    }

    pub fn orbit(&self) -> &Orbit {
        &self.orbit
    }

    pub fn grid(&self) -> &SkyGrid {
        &self.grid
    }

    pub fn centers(&self) -> &[Vector3<f64>] {
        &self.centers
    }

    /// Roll angle grid for the tiling optimizer, in degrees.
    pub fn rolls_deg(&self) -> &[f64] {
        &self.rolls_deg
    }

    pub fn fov(&self) -> &FieldOfView {
        &self.fov
    }

    pub fn exposure_time(&self) -> Duration {
        self.exposure_time
    }

    pub fn time_step_duration(&self) -> Duration {
        self.time_step_duration
    }

    /// Whole exposures fitting in one orbital period.
    pub fn exposures_per_orbit(&self) -> u32 {
        self.exposures_per_orbit
    }

    /// Total number of time steps over the configured number of orbits.
    pub fn time_steps(&self) -> usize {
        self.time_steps
    }

    /// The survey time grid starting at the provided epoch.
    pub fn times(&self, start: Epoch) -> Vec<Epoch> {
        TimeSeries::exclusive(
            start,
            start + self.time_step_duration * self.time_steps as f64,
            self.time_step_duration,
        )
        .collect()
    }

    /// Whether the spacecraft is in orbit night at the provided epoch.
    pub fn is_night(&self, epoch: Epoch) -> Result<bool, SurveyError> {
        let position = self
            .orbit
            .position(epoch)
            .context(PropagationFailedSnafu { epoch })?;
        OrbitNightConstraint::new()
            .in_night(epoch, &position)
            .context(ConstraintFailedSnafu { epoch })
    }

    /// One row of the observability matrix: the conjunction of every
    /// constraint at one epoch. Whole-field outcomes broadcast across the
    /// row; per-direction outcomes must match the candidate count exactly.
    fn observable_row(&self, epoch: Epoch) -> Result<Vec<bool>, SurveyError> {
        let observer = self
            .orbit
            .position(epoch)
            .context(PropagationFailedSnafu { epoch })?;
        let mut row = vec![true; self.centers.len()];
        for constraint in &self.constraints {
            match constraint
                .evaluate(epoch, &observer, &self.centers)
                .context(ConstraintFailedSnafu { epoch })?
            {
                ConstraintEval::WholeField(ok) => {
                    if !ok {
                        row.iter_mut().for_each(|flag| *flag = false);
                    }
                }
                ConstraintEval::PerDirection(flags) => {
                    ensure!(
                        flags.len() == row.len(),
                        ShapeMismatchSnafu {
                            constraint: constraint.to_string(),
                            epoch,
                            found: flags.len(),
                            expected: row.len(),
                        }
                    );
                    row.iter_mut().zip(flags).for_each(|(flag, ok)| *flag &= ok);
                }
            }
        }
        Ok(row)
    }

    /// Computes the field of regard over the provided time steps.
    ///
    /// Time steps are independent and evaluated in parallel; rows come back
    /// in input order regardless of completion order. Any failing step fails
    /// the whole computation: no partial matrix is ever returned. `workers`
    /// overrides the pool size; `None` uses the global pool.
    pub fn field_of_regard(
        &self,
        times: &[Epoch],
        workers: Option<usize>,
    ) -> Result<ObservabilityMatrix, SurveyError> {
        let sweep = || {
            let progress = ProgressBar::new(times.len() as u64);
            progress.set_style(
                ProgressStyle::with_template(
                    "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}",
                )
                .unwrap()
                .progress_chars("##-"),
            );
            progress.set_message("field of regard");
            times
                .par_iter()
                .progress_with(progress)
                .map(|epoch| self.observable_row(*epoch))
                .collect::<Result<Vec<_>, SurveyError>>()
        };
        let rows = match workers {
            Some(workers) => ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .context(WorkerPoolSnafu)?
                .install(sweep),
            None => sweep(),
        }?;
        Ok(ObservabilityMatrix::from_rows(rows, self.centers.len()))
    }
}

impl fmt::Display for SurveyModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "survey of {} directions with {} constraints, {} steps over {} min orbits",
            self.centers.len(),
            self.constraints.len(),
            self.time_steps,
            self.orbit.period().to_unit(Unit::Minute).round()
        )
    }
}
