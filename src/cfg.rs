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
use crate::io::ConfigRepr;
use crate::kinematics::Coordinates;
use serde_derive::{Deserialize, Serialize};

/// The single immutable configuration record for the whole surveillance
/// core. Every threshold in the crate is read from here; changing a field
/// never requires a code change elsewhere.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveillanceConfig {
    pub zones: ZoneConfig,
    pub sensor: SensorDefaults,
    pub tracker: TrackerConfig,
    pub predictor: PredictorConfig,
    pub physics: PhysicsLimits,
    pub anomaly: AnomalyThresholds,
    pub feasibility: FeasibilityConfig,
    pub threat: ThreatConfig,
    pub intent: IntentConfig,
    /// Seed applied to every PRNG in the pipeline when deterministic mode is
    /// enabled. None seeds from entropy.
    pub seed: Option<u64>,
}

impl ConfigRepr for SurveillanceConfig {}

/// Three concentric protected zones centered on the system origin.
/// Invariant: critical < protected < extended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    pub critical_radius_m: f64,
    pub protected_radius_m: f64,
    pub extended_radius_m: f64,
    pub origin: Coordinates,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            critical_radius_m: 10_000.0,
            protected_radius_m: 25_000.0,
            extended_radius_m: 50_000.0,
            origin: Coordinates::ZERO,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorDefaults {
    pub detection_range_m: f64,
    pub update_rate_hz: f64,
    pub position_noise_std_m: f64,
    pub velocity_noise_std_mps: f64,
    pub signal_noise_std: f64,
    /// Detections strictly below this confidence are never emitted.
    pub min_detection_confidence: f64,
}

impl Default for SensorDefaults {
    fn default() -> Self {
        Self {
            detection_range_m: 200_000.0,
            update_rate_hz: 1.0,
            position_noise_std_m: 10.0,
            velocity_noise_std_mps: 1.0,
            signal_noise_std: 0.1,
            min_detection_confidence: 0.1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub association_threshold_m: f64,
    pub max_track_age_s: f64,
    pub min_updates_for_active: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            association_threshold_m: 5_000.0,
            max_track_age_s: 60.0,
            min_updates_for_active: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    pub horizon_s: f64,
    pub step_s: f64,
    pub max_horizon_s: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            horizon_s: 60.0,
            step_s: 1.0,
            max_horizon_s: 300.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsLimits {
    pub max_acceleration_mps2: f64,
    pub max_speed_mps: f64,
    pub max_velocity_change_mps: f64,
}

impl Default for PhysicsLimits {
    fn default() -> Self {
        Self {
            max_acceleration_mps2: 100.0,
            max_speed_mps: 1_000.0,
            max_velocity_change_mps: 200.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyThresholds {
    pub direction_change_deg: f64,
    /// Relative speed change ratio, e.g. 0.5 for a 50% jump.
    pub speed_change_ratio: f64,
    pub acceleration_mps2: f64,
}

impl Default for AnomalyThresholds {
    fn default() -> Self {
        Self {
            direction_change_deg: 45.0,
            speed_change_ratio: 0.5,
            acceleration_mps2: 50.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeasibilityConfig {
    pub min_range_m: f64,
    pub max_range_m: f64,
    pub max_relative_speed_mps: f64,
    pub envelope_radius_m: f64,
    pub constraint_statement: String,
}

impl Default for FeasibilityConfig {
    fn default() -> Self {
        Self {
            min_range_m: 1_000.0,
            max_range_m: 200_000.0,
            max_relative_speed_mps: 1_000.0,
            envelope_radius_m: 50_000.0,
            constraint_statement:
                "Kinematic feasibility assessment only: no interceptor modeling, no control \
                 laws, no execution timelines, no action recommendations."
                    .to_string(),
        }
    }
}

/// Weights and thresholds of the threat assessment engine. The six factor
/// weights must sum to 1.0 within 0.01, checked by [ThreatConfig::validate].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreatConfig {
    pub classification_weight: f64,
    pub proximity_weight: f64,
    pub behavior_weight: f64,
    pub speed_weight: f64,
    pub trajectory_weight: f64,
    pub confidence_weight: f64,
    pub hostile_speed_mps: f64,
    pub civilian_speed_mps: f64,
    pub critical_threshold: f64,
    pub high_threshold: f64,
    pub medium_threshold: f64,
    pub advisory_statement: String,
}

impl ThreatConfig {
    pub fn weight_sum(&self) -> f64 {
        self.classification_weight
            + self.proximity_weight
            + self.behavior_weight
            + self.speed_weight
            + self.trajectory_weight
            + self.confidence_weight
    }

    pub fn validate(&self) -> Result<(), ConstructionError> {
        let sum = self.weight_sum();
        if (sum - 1.0).abs() > 0.01 {
            return Err(ConstructionError::WeightsDoNotSumToOne { sum });
        }
        Ok(())
    }
}

impl Default for ThreatConfig {
    fn default() -> Self {
        Self {
            classification_weight: 0.25,
            proximity_weight: 0.25,
            behavior_weight: 0.20,
            speed_weight: 0.15,
            trajectory_weight: 0.10,
            confidence_weight: 0.05,
            hostile_speed_mps: 250.0,
            civilian_speed_mps: 100.0,
            critical_threshold: 0.8,
            high_threshold: 0.6,
            medium_threshold: 0.4,
            advisory_statement:
                "Advisory assessment only: no action recommendations, and the threat level \
                 does not map to any action."
                    .to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentConfig {
    pub loitering_radius_m: f64,
    pub probing_distance_m: f64,
    pub transit_speed_min_mps: f64,
    pub transit_speed_max_mps: f64,
    pub maneuver_stability_threshold: f64,
    pub advisory_statement: String,
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            loitering_radius_m: 5_000.0,
            probing_distance_m: 10_000.0,
            transit_speed_min_mps: 50.0,
            transit_speed_max_mps: 300.0,
            maneuver_stability_threshold: 0.1,
            advisory_statement:
                "Advisory assessment only: intent probabilities do not map to any action."
                    .to_string(),
        }
    }
}
