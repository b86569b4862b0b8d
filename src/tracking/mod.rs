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

use crate::errors::ConstructionError;
use crate::kinematics::{Coordinates, Velocity};
use crate::msr::Detection;
use crate::TRACK_HISTORY_CAP;
use hifitime::Epoch;
use indexmap::IndexMap;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

pub mod classifier;
pub mod kalman;
pub mod tracker;

use kalman::KalmanState;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    AerialDrone,
    Aircraft,
    UnknownObject,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::AerialDrone => write!(f, "AERIAL_DRONE"),
            Self::Aircraft => write!(f, "AIRCRAFT"),
            Self::UnknownObject => write!(f, "UNKNOWN_OBJECT"),
        }
    }
}

/// Track lifecycle. A track is born INITIALIZING, promoted to ACTIVE after
/// enough updates, demoted to COASTING when updates stop arriving, and
/// TERMINATED once it exceeds the maximum age without one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackState {
    Initializing,
    Active,
    Coasting,
    Terminated,
}

impl fmt::Display for TrackState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Initializing => write!(f, "INITIALIZING"),
            Self::Active => write!(f, "ACTIVE"),
            Self::Coasting => write!(f, "COASTING"),
            Self::Terminated => write!(f, "TERMINATED"),
        }
    }
}

/// A probabilistic classification over the three object types. The
/// probability map sums to one within 1e-6, and the selected type is the
/// argmax unless the maximum fell below the unknown threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub object_type: ObjectType,
    pub probability: f64,
    /// Shannon entropy of the probability map, normalized to [0, 1].
    pub uncertainty: f64,
    pub probabilities: IndexMap<ObjectType, f64>,
    pub reasoning: String,
}

impl ClassificationResult {
    /// Sum tolerance of the probability map.
    pub const SUM_TOLERANCE: f64 = 1e-6;

    pub fn new(
        object_type: ObjectType,
        probability: f64,
        uncertainty: f64,
        probabilities: IndexMap<ObjectType, f64>,
        reasoning: String,
    ) -> Result<Self, ConstructionError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(ConstructionError::ProbabilityOutOfRange {
                kind: "classification",
                value: probability,
            });
        }
        if !(0.0..=1.0).contains(&uncertainty) {
            return Err(ConstructionError::UnitIntervalViolation {
                kind: "classification uncertainty",
                value: uncertainty,
            });
        }
        for (_, p) in &probabilities {
            if !(0.0..=1.0).contains(p) {
                return Err(ConstructionError::ProbabilityOutOfRange {
                    kind: "classification",
                    value: *p,
                });
            }
        }
        let sum: f64 = probabilities.values().sum();
        if (sum - 1.0).abs() > Self::SUM_TOLERANCE {
            return Err(ConstructionError::ProbabilitySumExceeded {
                sum,
                max: 1.0 + Self::SUM_TOLERANCE,
            });
        }

        Ok(Self {
            object_type,
            probability,
            uncertainty,
            probabilities,
            reasoning,
        })
    }
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} (p = {:.2}, uncertainty = {:.2})",
            self.object_type, self.probability, self.uncertainty
        )
    }
}

/// A persistent hypothesis about one object: identity, lifecycle state,
/// Kalman state estimate, classification, and a bounded detection history.
/// The Kalman state is held by value, so track ownership is acyclic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub created: Epoch,
    pub last_updated: Epoch,
    pub update_count: u32,
    pub state: TrackState,
    pub position: Coordinates,
    pub velocity: Option<Velocity>,
    pub classification: ClassificationResult,
    /// Track-level confidence in [0, 1], from the latest detection.
    pub confidence: f64,
    pub kalman: KalmanState,
    /// Latest detections, most recent last. Hard capped.
    pub history: Vec<Detection>,
}

impl Track {
    pub fn time_since_update_s(&self, now: Epoch) -> f64 {
        (now - self.last_updated).to_seconds()
    }

    pub fn age_s(&self, now: Epoch) -> f64 {
        (now - self.created).to_seconds()
    }

    /// Appends a detection, dropping the oldest entries beyond the cap.
    pub fn push_history(&mut self, detection: Detection) {
        self.history.push(detection);
        if self.history.len() > TRACK_HISTORY_CAP {
            let excess = self.history.len() - TRACK_HISTORY_CAP;
            self.history.drain(..excess);
        }
    }

}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} [{}] at {} ({}, {} updates)",
            self.id, self.state, self.position, self.classification, self.update_count
        )
    }
}
