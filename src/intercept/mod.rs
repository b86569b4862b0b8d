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

//! Kinematic interception feasibility: relative geometry, closest approach,
//! risk envelope penetration, and an aggregated feasibility level. Strictly
//! mathematical: no interceptor modeling, no control laws, no execution
//! timelines, and no action recommendations.

use crate::kinematics::{Coordinates, Velocity};
use hifitime::Epoch;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

pub mod envelope;
pub mod feasibility;
pub mod geometry;

/// Ordered kinematic feasibility tags. Informational only.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FeasibilityLevel {
    NotFeasible,
    MarginallyFeasible,
    Feasible,
    HighlyFeasible,
}

impl fmt::Display for FeasibilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NotFeasible => write!(f, "NOT_FEASIBLE"),
            Self::MarginallyFeasible => write!(f, "MARGINALLY_FEASIBLE"),
            Self::Feasible => write!(f, "FEASIBLE"),
            Self::HighlyFeasible => write!(f, "HIGHLY_FEASIBLE"),
        }
    }
}

/// Risk envelope tags, from the penetration probability buckets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    WithinEnvelope,
    HighRisk,
    MediumRisk,
    LowRisk,
    MinimalRisk,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::WithinEnvelope => write!(f, "WITHIN_ENVELOPE"),
            Self::HighRisk => write!(f, "HIGH_RISK"),
            Self::MediumRisk => write!(f, "MEDIUM_RISK"),
            Self::LowRisk => write!(f, "LOW_RISK"),
            Self::MinimalRisk => write!(f, "MINIMAL_RISK"),
        }
    }
}

/// Relative motion and geometry between a defender and a target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeometryAnalysisResult {
    pub relative_position: Coordinates,
    pub relative_velocity: Velocity,
    /// Velocity component along the line of sight, positive when closing,
    /// in m/s.
    pub closing_velocity_mps: f64,
    /// Rate of change of the range, negative while the target closes. The
    /// negation of the closing velocity.
    pub range_rate_mps: f64,
    pub bearing_deg: f64,
    pub elevation_deg: f64,
    /// Unit vector from the defender to the target.
    pub line_of_sight: Coordinates,
    pub relative_speed_mps: f64,
    pub range_m: f64,
    pub horizontal_range_m: f64,
    pub vertical_separation_m: f64,
}

/// Closest approach along straight-line relative motion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClosestApproachResult {
    /// Clipped to zero: a closest approach in the past reports as now.
    pub time_to_closest_approach_s: f64,
    pub closest_approach_distance_m: f64,
    /// Target position at closest approach, in the world frame.
    pub closest_approach_position: Coordinates,
    pub relative_velocity_at_approach: Velocity,
    pub confidence: f64,
    pub uncertainty: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskEnvelopeResult {
    pub envelope_radius_m: f64,
    pub current_distance_m: f64,
    pub is_within_envelope: bool,
    /// None when the straight-line motion never reaches the envelope.
    pub time_to_envelope_s: Option<f64>,
    pub penetration_probability: f64,
    pub risk_level: RiskLevel,
    pub confidence: f64,
}

/// Aggregate feasibility assessment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InterceptionFeasibilityResult {
    pub epoch: Epoch,
    pub feasibility_level: FeasibilityLevel,
    pub feasibility_probability: f64,
    pub geometry: GeometryAnalysisResult,
    pub closest_approach: ClosestApproachResult,
    pub risk_envelope: RiskEnvelopeResult,
    pub confidence: f64,
    pub uncertainty: f64,
    pub reasoning: String,
    /// Configured statement of what this assessment is not.
    pub constraint_statement: String,
}
