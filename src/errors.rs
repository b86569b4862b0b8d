/*
    Argus, vigilant airspace surveillance
    Copyright (C) 2018-onwards Christopher Rabotin <christopher.rabotin@gmail.com>

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

/// Raised only by constructors whose invariants would otherwise be violated.
/// Analysis functions never raise: they degrade to soft results with a
/// reasoning string and reduced confidence.
#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConstructionError {
    #[snafu(display("{kind} probability must be in [0, 1], got {value}"))]
    ProbabilityOutOfRange { kind: &'static str, value: f64 },
    #[snafu(display("probabilities must sum to at most {max}, got {sum}"))]
    ProbabilitySumExceeded { sum: f64, max: f64 },
    #[snafu(display("{kind} must be in [0, 1], got {value}"))]
    UnitIntervalViolation { kind: &'static str, value: f64 },
    #[snafu(display("factor weights must sum to 1.0 within 0.01, got {sum}"))]
    WeightsDoNotSumToOne { sum: f64 },
}
