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

//! Detection of unusual motion patterns. An anomaly is a statistical
//! statement about motion, nothing more: the fixed note on every result
//! states that anomalies do not imply hostile intent.

use crate::analysis::physics::PhysicsValidator;
use crate::cfg::AnomalyThresholds;
use crate::kinematics::{Coordinates, Velocity};
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write;

/// Fixed note carried on every anomaly result.
pub const ANOMALY_NOTE: &str =
    "Anomalies do not imply hostile intent. They indicate unusual motion patterns that may \
     require investigation.";

/// Vertex angle above which a position triple flags an unusual trajectory.
const TRAJECTORY_ANGLE_THRESHOLD_RAD: f64 = std::f64::consts::FRAC_PI_3;
/// Score above which motion is anomalous even without a discrete flag.
const ANOMALOUS_SCORE_THRESHOLD: f64 = 0.3;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnomalyType {
    SuddenDirectionChange,
    SuddenSpeedChange,
    UnusualAcceleration,
    UnusualTrajectory,
    PhysicsViolation,
}

impl fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::SuddenDirectionChange => write!(f, "SUDDEN_DIRECTION_CHANGE"),
            Self::SuddenSpeedChange => write!(f, "SUDDEN_SPEED_CHANGE"),
            Self::UnusualAcceleration => write!(f, "UNUSUAL_ACCELERATION"),
            Self::UnusualTrajectory => write!(f, "UNUSUAL_TRAJECTORY"),
            Self::PhysicsViolation => write!(f, "PHYSICS_VIOLATION"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnomalyDetectionResult {
    pub is_anomalous: bool,
    /// Unique anomaly kinds, in first-seen order.
    pub anomaly_types: Vec<AnomalyType>,
    pub anomaly_score: f64,
    pub reasoning: String,
    pub note: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnomalyDetector {
    pub direction_change_threshold_rad: f64,
    pub speed_change_ratio: f64,
    pub acceleration_threshold_mps2: f64,
    physics: PhysicsValidator,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(&AnomalyThresholds::default(), PhysicsValidator::default())
    }
}

impl AnomalyDetector {
    pub fn new(thresholds: &AnomalyThresholds, physics: PhysicsValidator) -> Self {
        Self {
            direction_change_threshold_rad: thresholds.direction_change_deg.to_radians(),
            speed_change_ratio: thresholds.speed_change_ratio,
            acceleration_threshold_mps2: thresholds.acceleration_mps2,
            physics,
        }
    }

    /// Scans a motion sequence for anomalies. Fewer than three samples is a
    /// soft non-anomalous result, never an error.
    pub fn detect_anomalies(
        &self,
        positions: &[Coordinates],
        velocities: &[Velocity],
        timestamps_s: Option<&[f64]>,
    ) -> AnomalyDetectionResult {
        if positions.len() < 3 || velocities.len() < 3 {
            return AnomalyDetectionResult {
                is_anomalous: false,
                anomaly_types: Vec::new(),
                anomaly_score: 0.0,
                reasoning: "Insufficient data for anomaly detection".to_string(),
                note: ANOMALY_NOTE.to_string(),
            };
        }

        let default_times: Vec<f64>;
        let times: &[f64] = match timestamps_s {
            Some(times) => times,
            None => {
                default_times = (0..positions.len()).map(|i| i as f64).collect();
                &default_times
            }
        };

        let mut anomalies = Vec::new();
        let mut score: f64 = 0.0;

        let physics_result = self.physics.validate_motion(positions, velocities, Some(times));
        if !physics_result.is_valid {
            anomalies.push(AnomalyType::PhysicsViolation);
            score += 0.5;
        }

        if self.scan_direction_changes(velocities) {
            anomalies.push(AnomalyType::SuddenDirectionChange);
            score += 0.3;
        }

        if self.scan_speed_changes(velocities) {
            anomalies.push(AnomalyType::SuddenSpeedChange);
            score += 0.2;
        }

        if self.scan_accelerations(velocities, times) {
            anomalies.push(AnomalyType::UnusualAcceleration);
            score += 0.2;
        }

        if self.scan_trajectory(positions) {
            anomalies.push(AnomalyType::UnusualTrajectory);
            score += 0.1;
        }

        let score = score.min(1.0);
        let is_anomalous = !anomalies.is_empty() || score > ANOMALOUS_SCORE_THRESHOLD;
        let reasoning = reasoning(&anomalies, score);

        AnomalyDetectionResult {
            is_anomalous,
            anomaly_types: anomalies,
            anomaly_score: score,
            reasoning,
            note: ANOMALY_NOTE.to_string(),
        }
    }

    fn scan_direction_changes(&self, velocities: &[Velocity]) -> bool {
        velocities.windows(2).any(|pair| {
            let (prev, curr) = (&pair[0], &pair[1]);
            if prev.speed() == 0.0 || curr.speed() == 0.0 {
                return false;
            }
            prev.angle_to(curr) > self.direction_change_threshold_rad
        })
    }

    fn scan_speed_changes(&self, velocities: &[Velocity]) -> bool {
        velocities.windows(2).any(|pair| {
            let prev_speed = pair[0].speed();
            if prev_speed == 0.0 {
                return false;
            }
            (pair[1].speed() - prev_speed).abs() / prev_speed > self.speed_change_ratio
        })
    }

    fn scan_accelerations(&self, velocities: &[Velocity], times: &[f64]) -> bool {
        (1..velocities.len()).any(|i| {
            let velocity_change = (velocities[i] - velocities[i - 1]).speed();
            let mut dt = times[i] - times[i - 1];
            if dt <= 0.0 {
                dt = 1.0;
            }
            velocity_change / dt > self.acceleration_threshold_mps2
        })
    }

    /// A sharp vertex anywhere in the position sequence flags an unusual
    /// trajectory, once.
    fn scan_trajectory(&self, positions: &[Coordinates]) -> bool {
        positions.windows(3).any(|triple| {
            let leg_in = triple[1] - triple[0];
            let leg_out = triple[2] - triple[1];
            let (norm_in, norm_out) = (leg_in.norm(), leg_out.norm());
            if norm_in == 0.0 || norm_out == 0.0 {
                return false;
            }
            let cos_angle = (leg_in.dot(&leg_out) / (norm_in * norm_out)).clamp(-1.0, 1.0);
            cos_angle.acos() > TRAJECTORY_ANGLE_THRESHOLD_RAD
        })
    }
}

fn reasoning(anomalies: &[AnomalyType], score: f64) -> String {
    let mut out = String::new();
    if anomalies.is_empty() {
        let _ = writeln!(out, "No anomalies detected. Motion appears normal.");
    } else {
        let _ = writeln!(out, "Anomalies detected: {}", anomalies.len());
        for anomaly in anomalies {
            let _ = writeln!(out, "  - {anomaly}");
        }
        let _ = writeln!(out, "Anomaly score: {score:.2}");
    }
    out
}
