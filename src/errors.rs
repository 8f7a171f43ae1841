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

use crate::constraints::ConstraintError;
use crate::grid::GridError;
use crate::orbit::PropagationError;
use crate::survey::SurveyError;

/// Top level error type, aggregating the module specific errors.
#[derive(Debug, Snafu)]
pub enum AsteriaError {
    #[snafu(display("orbit propagation error: {source}"), context(false))]
    Propagation { source: PropagationError },
    #[snafu(display("sky grid error: {source}"), context(false))]
    Grid { source: GridError },
    #[snafu(display("constraint evaluation error: {source}"), context(false))]
    Constraint { source: ConstraintError },
    #[snafu(display("survey error: {source}"), context(false))]
    Survey { source: SurveyError },
}
