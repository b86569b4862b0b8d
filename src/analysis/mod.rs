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

//! Stateless advisory analytics over tracks: trajectory prediction, physics
//! validation, anomaly detection, zone proximity, threat scoring, and intent
//! inference. Every function here is pure in its inputs and degrades to a
//! soft result with a reasoning string when data is missing.

pub mod anomaly;
pub mod intent;
pub mod physics;
pub mod predictor;
pub mod proximity;
pub mod threat;

pub use anomaly::{AnomalyDetectionResult, AnomalyDetector, AnomalyType};
pub use intent::{IntentIndicators, IntentInferenceEngine, IntentProbabilityResult};
pub use physics::{PhysicsValidationResult, PhysicsValidator, PhysicsViolationType};
pub use predictor::{MotionModel, TrajectoryPrediction, TrajectoryPredictor};
pub use proximity::{ProximityCalculator, ProximityEstimate};
pub use threat::{RiskFactor, RiskScore, ThreatAssessmentEngine, ThreatAssessmentResult, ThreatLevel};
