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

//! # Argus
//!
//! Argus is an advisory-only air surveillance decision-support core. It
//! ingests noisy sensor detections of aerial objects, maintains persistent
//! tracks with Kalman state estimates, classifies objects probabilistically,
//! predicts short-horizon trajectories, validates motion against physical
//! limits, detects motion anomalies, computes time-to-proximity for
//! concentric protected zones, estimates interception feasibility from pure
//! kinematics, and scores multi-factor threat and intent probabilities.
//!
//! Every output is advisory: no actuation, no autonomy, no binary decisions,
//! and no recommended actions. All coordinates are local Cartesian metres.
//!
//! The whole pipeline is deterministic under a seeded simulation: given the
//! same seed, sensor list, entity list, and tick sequence, two runs produce
//! bit-identical detections, tracks, and advisory records.

#[macro_use]
extern crate log;

/// Provides all of the analysis utilities: trajectory prediction, physics
/// validation, anomaly detection, proximity, threat, and intent assessment.
pub mod analysis;
/// Provides the single immutable configuration record every threshold in the
/// crate is read from.
pub mod cfg;
/// Provides the crate-wide construction error types.
pub mod errors;
/// Provides the interception feasibility geometry and risk envelope analysis.
pub mod intercept;
/// Provides YAML (de)serialization of configuration structures.
pub mod io;
/// Provides the Coordinates and Velocity value types.
pub mod kinematics;
/// Re-exports the linear algebra types in use throughout the crate.
pub mod linalg;
/// Provides the Detection measurement record shared by the simulator and the
/// tracker.
pub mod msr;
/// Provides the deterministic sensor simulation: noise models, simulated
/// entities, radar sensors, the simulation engine, and preprocessing.
pub mod sim;
/// Provides the multi-target tracker, its Kalman filter, and the
/// probabilistic classifier.
pub mod tracking;

/// The default number of detections kept per track.
pub const TRACK_HISTORY_CAP: usize = 10;

pub mod prelude {
    pub use crate::analysis::anomaly::AnomalyDetector;
    pub use crate::analysis::intent::IntentInferenceEngine;
    pub use crate::analysis::physics::PhysicsValidator;
    pub use crate::analysis::predictor::TrajectoryPredictor;
    pub use crate::analysis::proximity::ProximityCalculator;
    pub use crate::analysis::threat::ThreatAssessmentEngine;
    pub use crate::analysis::{
        AnomalyDetectionResult, AnomalyType, IntentProbabilityResult, MotionModel,
        PhysicsValidationResult, PhysicsViolationType, ProximityEstimate, ThreatAssessmentResult,
        ThreatLevel, TrajectoryPrediction,
    };
    pub use crate::cfg::SurveillanceConfig;
    pub use crate::intercept::feasibility::FeasibilityAnalyzer;
    pub use crate::intercept::geometry::GeometryAnalyzer;
    pub use crate::intercept::envelope::RiskEnvelopeEvaluator;
    pub use crate::intercept::{
        ClosestApproachResult, FeasibilityLevel, GeometryAnalysisResult,
        InterceptionFeasibilityResult, RiskEnvelopeResult, RiskLevel,
    };
    pub use crate::io::ConfigRepr;
    pub use crate::kinematics::{Coordinates, Velocity};
    pub use crate::msr::{Detection, SensorKind};
    pub use crate::sim::entity::{
        EntityCharacteristics, EntityKind, SimulatedEntity, SizeClass, TrajectoryKind,
        TrajectoryParameters,
    };
    pub use crate::sim::noise::{NoiseModel, NoiseParameters};
    pub use crate::sim::preprocess::{Preprocessor, SmoothingMethod};
    pub use crate::sim::radar::RadarSensor;
    pub use crate::sim::{DetectionBundle, EntitySpec, SimConfig, SimulationEngine};
    pub use crate::tracking::kalman::{KalmanFilter, KalmanState};
    pub use crate::tracking::classifier::Classifier;
    pub use crate::tracking::tracker::MultiTargetTracker;
    pub use crate::tracking::{ClassificationResult, ObjectType, Track, TrackState};
    pub use hifitime::{Duration, Epoch, TimeSeries, TimeUnits, Unit};
}
