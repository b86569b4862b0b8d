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

//! Rule-based intent probability inference. Explainable indicators feed
//! weighted sums per category; the hostile channel is deliberately
//! conservative. Fail-safe: with no usable track data the engine returns
//! None and the caller must treat that as monitoring-only.

use crate::analysis::predictor::TrajectoryPrediction;
use crate::analysis::proximity::ProximityEstimate;
use crate::cfg::IntentConfig;
use crate::errors::ConstructionError;
use crate::kinematics::{Coordinates, Velocity};
use crate::tracking::{ObjectType, Track};
use hifitime::Epoch;
use indexmap::IndexMap;
use serde_derive::{Deserialize, Serialize};

/// The eight indicator channels, each in [0, 1].
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentIndicators {
    pub loitering: f64,
    pub transit: f64,
    pub surveillance: f64,
    pub hostile: f64,
    pub maneuver_stability: f64,
    pub proximity_risk: f64,
    pub altitude_stability: f64,
    pub speed_characteristics: f64,
}

impl IntentIndicators {
    fn clamp_all(&mut self) {
        self.loitering = self.loitering.clamp(0.0, 1.0);
        self.transit = self.transit.clamp(0.0, 1.0);
        self.surveillance = self.surveillance.clamp(0.0, 1.0);
        self.hostile = self.hostile.clamp(0.0, 1.0);
        self.maneuver_stability = self.maneuver_stability.clamp(0.0, 1.0);
        self.proximity_risk = self.proximity_risk.clamp(0.0, 1.0);
        self.altitude_stability = self.altitude_stability.clamp(0.0, 1.0);
        self.speed_characteristics = self.speed_characteristics.clamp(0.0, 1.0);
    }
}

/// Intent probabilities for one track. Construction enforces that each
/// probability is in [0, 1] and that the three sum to at most one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntentProbabilityResult {
    pub epoch: Epoch,
    pub track_id: String,
    pub transit_probability: f64,
    pub surveillance_probability: f64,
    pub hostile_probability: f64,
    pub intent_confidence: f64,
    pub reasoning: Vec<String>,
    pub indicators: IntentIndicators,
    pub metadata: IndexMap<String, String>,
    pub advisory_statement: String,
}

impl IntentProbabilityResult {
    /// Sum tolerance of the three probabilities.
    pub const SUM_TOLERANCE: f64 = 1e-6;

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        epoch: Epoch,
        track_id: String,
        transit_probability: f64,
        surveillance_probability: f64,
        hostile_probability: f64,
        intent_confidence: f64,
        reasoning: Vec<String>,
        indicators: IntentIndicators,
        metadata: IndexMap<String, String>,
        advisory_statement: String,
    ) -> Result<Self, ConstructionError> {
        for (kind, value) in [
            ("transit", transit_probability),
            ("surveillance", surveillance_probability),
            ("hostile", hostile_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConstructionError::ProbabilityOutOfRange { kind, value });
            }
        }

        let sum = transit_probability + surveillance_probability + hostile_probability;
        if sum > 1.0 + Self::SUM_TOLERANCE {
            return Err(ConstructionError::ProbabilitySumExceeded {
                sum,
                max: 1.0 + Self::SUM_TOLERANCE,
            });
        }

        if !(0.0..=1.0).contains(&intent_confidence) {
            return Err(ConstructionError::UnitIntervalViolation {
                kind: "intent confidence",
                value: intent_confidence,
            });
        }

        Ok(Self {
            epoch,
            track_id,
            transit_probability,
            surveillance_probability,
            hostile_probability,
            intent_confidence,
            reasoning,
            indicators,
            metadata,
            advisory_statement,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IntentInferenceEngine {
    cfg: IntentConfig,
}

impl IntentInferenceEngine {
    pub fn new(cfg: IntentConfig) -> Self {
        Self { cfg }
    }

    /// Infers intent probabilities for a track. Optional inputs sharpen the
    /// indicators; their absence only lowers confidence. Returns None when
    /// the track pose is unusable, which the caller must read as
    /// monitoring-only.
    pub fn infer(
        &self,
        track: &Track,
        prediction: Option<&TrajectoryPrediction>,
        proximity: Option<&ProximityEstimate>,
        epoch: Epoch,
    ) -> Option<IntentProbabilityResult> {
        if !track.position.is_finite() {
            return None;
        }

        let indicators = self.indicators(track, prediction, proximity);
        let (transit, surveillance, hostile) = self.probabilities(&indicators);
        let confidence = self.confidence(&indicators, track);
        let reasoning = self.reasoning(&indicators, track);

        let mut metadata = IndexMap::new();
        metadata.insert("object_type".to_string(), track.classification.object_type.to_string());
        metadata.insert("track_confidence".to_string(), format!("{:.3}", track.confidence));

        // Probabilities are scaled and clamped above, so this cannot fail.
        Some(
            IntentProbabilityResult::new(
                epoch,
                track.id.clone(),
                transit,
                surveillance,
                hostile,
                confidence,
                reasoning,
                indicators,
                metadata,
                self.cfg.advisory_statement.clone(),
            )
            .unwrap(),
        )
    }

    fn indicators(
        &self,
        track: &Track,
        prediction: Option<&TrajectoryPrediction>,
        proximity: Option<&ProximityEstimate>,
    ) -> IntentIndicators {
        let mut ind = IntentIndicators::default();

        match track.classification.object_type {
            ObjectType::AerialDrone => ind.surveillance += 0.2,
            ObjectType::Aircraft => ind.transit += 0.2,
            ObjectType::UnknownObject => {
                ind.surveillance += 0.1;
                ind.hostile += 0.1;
            }
        }

        if let Some(velocity) = &track.velocity {
            let speed = velocity.speed();
            if (self.cfg.transit_speed_min_mps..=self.cfg.transit_speed_max_mps).contains(&speed) {
                ind.transit += 0.3;
                ind.speed_characteristics = 0.7;
            }
            if speed < self.cfg.transit_speed_min_mps {
                ind.loitering += 0.3;
                ind.surveillance += 0.2;
            }
        }

        // Position and velocity histories come from the track's bounded
        // detection history.
        if track.history.len() > 1 {
            let positions: Vec<Coordinates> = track.history.iter().map(|d| d.position).collect();
            ind.loitering += self.loitering_indicator(&positions);

            let velocities: Vec<Velocity> = track.history.iter().map(|d| d.velocity).collect();
            ind.maneuver_stability = self.maneuver_stability(&velocities);
        }

        if let Some(prediction) = prediction {
            if prediction.predicted_positions.len() > 5 {
                ind.loitering += self.loitering_indicator(&prediction.predicted_positions) * 0.3;
            }
        }

        if let Some(proximity) = proximity {
            if proximity.is_approaching && proximity.current_distance_m < self.cfg.probing_distance_m {
                ind.proximity_risk = 0.6;
                ind.surveillance += 0.2;
                ind.hostile += 0.1;
            }
        }

        ind.clamp_all();
        ind
    }

    /// Loitering from the dispersion of positions around their centroid:
    /// full score at zero dispersion, zero beyond the loitering radius.
    fn loitering_indicator(&self, positions: &[Coordinates]) -> f64 {
        if positions.len() < 3 {
            return 0.0;
        }

        let n = positions.len() as f64;
        let centroid = Coordinates::new(
            positions.iter().map(|p| p.x).sum::<f64>() / n,
            positions.iter().map(|p| p.y).sum::<f64>() / n,
            positions.iter().map(|p| p.z).sum::<f64>() / n,
        );

        let mean_distance = positions.iter().map(|p| p.distance_to(&centroid)).sum::<f64>() / n;

        if mean_distance < self.cfg.loitering_radius_m {
            1.0 - mean_distance / self.cfg.loitering_radius_m
        } else {
            0.0
        }
    }

    /// Stability from the mean velocity change, normalized by the first
    /// sample's speed. One is rock steady, zero is erratic.
    fn maneuver_stability(&self, velocities: &[Velocity]) -> f64 {
        if velocities.len() < 2 {
            return 0.5;
        }

        let changes: Vec<f64> = velocities
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).speed())
            .collect();
        let mean_change = changes.iter().sum::<f64>() / changes.len() as f64;

        let typical_speed = velocities[0].speed().max(f64::EPSILON);
        let stability =
            1.0 - (mean_change / (typical_speed * self.cfg.maneuver_stability_threshold)).min(1.0);

        stability.clamp(0.0, 1.0)
    }

    /// Weighted sums per category, scaled down together when they exceed
    /// one. The hostile channel only rises on explicit hostile indicators,
    /// proximity risk, and maneuver instability.
    fn probabilities(&self, ind: &IntentIndicators) -> (f64, f64, f64) {
        let mut transit = ind.transit * 0.4
            + ind.speed_characteristics * 0.3
            + (1.0 - ind.loitering) * 0.2
            + ind.maneuver_stability * 0.1;

        let mut surveillance = ind.surveillance * 0.4
            + ind.loitering * 0.3
            + ind.altitude_stability * 0.2
            + ind.proximity_risk * 0.1;

        let mut hostile =
            ind.hostile * 0.5 + ind.proximity_risk * 0.15 + (1.0 - ind.maneuver_stability) * 0.05;

        let total = transit + surveillance + hostile;
        if total > 1.0 {
            let scale = 1.0 / total;
            transit *= scale;
            surveillance *= scale;
            hostile *= scale;
        }

        (
            transit.clamp(0.0, 1.0),
            surveillance.clamp(0.0, 1.0),
            hostile.clamp(0.0, 1.0),
        )
    }

    fn confidence(&self, ind: &IntentIndicators, track: &Track) -> f64 {
        let mut confidence = track.confidence;

        if track.velocity.is_some() {
            confidence += 0.1;
        }
        if track.classification.probability > 0.7 {
            confidence += 0.1;
        }
        if ind.maneuver_stability == 0.0 {
            confidence *= 0.8;
        }

        confidence.clamp(0.0, 1.0)
    }

    fn reasoning(&self, ind: &IntentIndicators, track: &Track) -> Vec<String> {
        let mut reasoning = Vec::new();

        reasoning.push(format!(
            "Object classified as: {}",
            track.classification.object_type
        ));

        if let Some(velocity) = &track.velocity {
            reasoning.push(format!("Current speed: {:.1} km/h", velocity.speed() * 3.6));
        }

        if ind.loitering > 0.5 {
            reasoning.push("Sustained loitering pattern detected".to_string());
        }
        if ind.transit > 0.5 {
            reasoning.push("Transit-like speed and trajectory characteristics".to_string());
        }
        if ind.surveillance > 0.5 {
            reasoning.push("Surveillance-like behavior patterns observed".to_string());
        }
        if ind.proximity_risk > 0.5 {
            reasoning.push("Approaching or near protected airspace boundary".to_string());
        }
        if ind.maneuver_stability > 0.7 {
            reasoning.push("Stable maneuver patterns observed".to_string());
        } else if ind.maneuver_stability < 0.3 {
            reasoning.push("Variable maneuver patterns observed".to_string());
        }

        if reasoning.is_empty() {
            reasoning.push("Insufficient data for detailed intent assessment".to_string());
        }

        reasoning
    }
}
