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

//! Multi-factor weighted threat scoring with uncertainty bounds. Every
//! result is advisory: the threat level is informational and never maps to
//! an action.

use crate::cfg::{SurveillanceConfig, ThreatConfig, ZoneConfig};
use crate::errors::ConstructionError;
use crate::kinematics::{Coordinates, Velocity};
use crate::tracking::{ObjectType, Track};
use hifitime::Epoch;
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write;

/// Distance at which the proximity factor's range scaling bottoms out.
const PROXIMITY_RANGE_SCALE_M: f64 = 200_000.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// One factor of the weighted risk score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub name: String,
    /// Raw factor value in [0, 1] before weighting.
    pub value: f64,
    pub weight: f64,
    pub contribution: f64,
    pub reasoning: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    pub total: f64,
    pub uncertainty: f64,
    pub confidence: f64,
    pub factors: Vec<RiskFactor>,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThreatAssessmentResult {
    pub epoch: Epoch,
    pub track_id: String,
    pub threat_level: ThreatLevel,
    pub risk_score: RiskScore,
    pub threat_likelihood: f64,
    pub reasoning: String,
    pub advisory_statement: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ThreatAssessmentEngine {
    cfg: ThreatConfig,
    zones: ZoneConfig,
}

impl ThreatAssessmentEngine {
    /// Fails when the configured factor weights do not sum to one.
    pub fn new(cfg: &SurveillanceConfig) -> Result<Self, ConstructionError> {
        cfg.threat.validate()?;
        Ok(Self {
            cfg: cfg.threat.clone(),
            zones: cfg.zones.clone(),
        })
    }

    /// Scores one track across the six weighted factors. Advisory only.
    pub fn assess_track(&self, track: &Track, epoch: Epoch) -> ThreatAssessmentResult {
        let factors = vec![
            self.classification_factor(track),
            self.proximity_factor(track),
            self.behavior_factor(track),
            self.speed_factor(track),
            self.trajectory_factor(track),
            self.confidence_factor(track),
        ];

        let total: f64 = factors.iter().map(|f| f.contribution).sum::<f64>().clamp(0.0, 1.0);
        let uncertainty = self.uncertainty(&factors, track);
        let confidence = self.confidence(&factors, track);
        let threat_likelihood = (total + uncertainty * 0.2).clamp(0.0, 1.0);
        let threat_level = self.threat_level(total);

        let spread = uncertainty * total;
        let lower_bound = (total - spread).max(0.0);
        let upper_bound = (total + spread).min(1.0);

        let reasoning = self.reasoning(
            &factors,
            total,
            threat_level,
            threat_likelihood,
            confidence,
            uncertainty,
            lower_bound,
            upper_bound,
        );

        ThreatAssessmentResult {
            epoch,
            track_id: track.id.clone(),
            threat_level,
            risk_score: RiskScore {
                total,
                uncertainty,
                confidence,
                factors,
                lower_bound,
                upper_bound,
            },
            threat_likelihood,
            reasoning,
            advisory_statement: self.cfg.advisory_statement.clone(),
        }
    }

    fn classification_factor(&self, track: &Track) -> RiskFactor {
        let classification = &track.classification;
        let base_risk = match classification.object_type {
            ObjectType::UnknownObject => 0.6,
            ObjectType::Aircraft => 0.3,
            ObjectType::AerialDrone => 0.5,
        };

        let adjusted = base_risk * (1.0 - classification.uncertainty * 0.3);
        let value = adjusted * classification.probability;

        let weight = self.cfg.classification_weight;
        RiskFactor {
            name: "Entity Classification".to_string(),
            value,
            weight,
            contribution: value * weight,
            reasoning: format!(
                "Entity type: {} (probability {:.1}%, uncertainty {:.1}%)",
                classification.object_type,
                classification.probability * 100.0,
                classification.uncertainty * 100.0
            ),
        }
    }

    fn proximity_factor(&self, track: &Track) -> RiskFactor {
        let distance = track.position.distance_to(&self.zones.origin);

        let (base_risk, zone_name) = if distance < self.zones.critical_radius_m {
            (0.9, "critical zone")
        } else if distance < self.zones.protected_radius_m {
            (0.7, "protected zone")
        } else if distance < self.zones.extended_radius_m {
            (0.4, "extended zone")
        } else {
            (0.1, "outside all zones")
        };

        let value = if distance > 0.0 {
            let distance_factor = 1.0 - (distance / PROXIMITY_RANGE_SCALE_M).min(1.0);
            base_risk * (0.5 + 0.5 * distance_factor)
        } else {
            base_risk
        };

        let weight = self.cfg.proximity_weight;
        RiskFactor {
            name: "Proximity".to_string(),
            value,
            weight,
            contribution: value * weight,
            reasoning: format!("Distance {:.2} km, {zone_name}", distance / 1e3),
        }
    }

    fn behavior_factor(&self, track: &Track) -> RiskFactor {
        let mut risk: f64 = 0.3;
        let mut reasoning = "Behavioral pattern analysis".to_string();

        if let Some(velocity) = &track.velocity {
            let heading_off = heading_to_origin_deg(track.position, velocity);
            if heading_off < 30.0 {
                risk += 0.4;
            } else if heading_off < 60.0 {
                risk += 0.2;
            }

            let speed = velocity.speed();
            if speed > self.cfg.hostile_speed_mps {
                risk += 0.2;
            }
            let _ = write!(reasoning, " (speed {speed:.1} m/s)");
        }

        let value = risk.min(1.0);
        let weight = self.cfg.behavior_weight;
        RiskFactor {
            name: "Behavior".to_string(),
            value,
            weight,
            contribution: value * weight,
            reasoning,
        }
    }

    fn speed_factor(&self, track: &Track) -> RiskFactor {
        let weight = self.cfg.speed_weight;
        let velocity = match &track.velocity {
            Some(velocity) => velocity,
            None => {
                return RiskFactor {
                    name: "Speed".to_string(),
                    value: 0.0,
                    weight,
                    contribution: 0.0,
                    reasoning: "No velocity data available".to_string(),
                }
            }
        };

        let speed = velocity.speed();
        let value = if speed > self.cfg.hostile_speed_mps {
            0.8
        } else if speed > 200.0 {
            0.5
        } else if speed > self.cfg.civilian_speed_mps {
            0.3
        } else {
            0.1
        };

        RiskFactor {
            name: "Speed".to_string(),
            value,
            weight,
            contribution: value * weight,
            reasoning: format!("Speed {speed:.1} m/s ({:.1} km/h)", speed * 3.6),
        }
    }

    fn trajectory_factor(&self, track: &Track) -> RiskFactor {
        let value = match &track.velocity {
            Some(velocity) => {
                let heading_off = heading_to_origin_deg(track.position, velocity);
                if heading_off < 45.0 {
                    0.7
                } else if heading_off < 90.0 {
                    0.5
                } else {
                    0.3
                }
            }
            None => 0.3,
        };

        let weight = self.cfg.trajectory_weight;
        RiskFactor {
            name: "Trajectory".to_string(),
            value,
            weight,
            contribution: value * weight,
            reasoning: "Trajectory alignment with the protected origin".to_string(),
        }
    }

    fn confidence_factor(&self, track: &Track) -> RiskFactor {
        let value = (1.0 - track.confidence) * 0.5;
        let weight = self.cfg.confidence_weight;
        RiskFactor {
            name: "Confidence".to_string(),
            value,
            weight,
            contribution: value * weight,
            reasoning: format!("Track confidence {:.1}%", track.confidence * 100.0),
        }
    }

    fn uncertainty(&self, factors: &[RiskFactor], track: &Track) -> f64 {
        let classification_uncertainty = track.classification.uncertainty;
        let confidence_uncertainty = 1.0 - track.confidence;

        let values: Vec<f64> = factors.iter().map(|f| f.value).collect();
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        let factor_uncertainty = (variance * 4.0).min(1.0);

        (classification_uncertainty * 0.4 + confidence_uncertainty * 0.3 + factor_uncertainty * 0.3)
            .clamp(0.0, 1.0)
    }

    fn confidence(&self, factors: &[RiskFactor], track: &Track) -> f64 {
        let classification_confidence = 1.0 - track.classification.uncertainty;
        let populated = factors.iter().filter(|f| f.value > 0.0).count() as f64;
        let data_quality = (populated / factors.len() as f64).min(1.0);

        (track.confidence * 0.5 + classification_confidence * 0.3 + data_quality * 0.2)
            .clamp(0.0, 1.0)
    }

    fn threat_level(&self, total: f64) -> ThreatLevel {
        if total >= self.cfg.critical_threshold {
            ThreatLevel::Critical
        } else if total >= self.cfg.high_threshold {
            ThreatLevel::High
        } else if total >= self.cfg.medium_threshold {
            ThreatLevel::Medium
        } else {
            ThreatLevel::Low
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn reasoning(
        &self,
        factors: &[RiskFactor],
        total: f64,
        threat_level: ThreatLevel,
        threat_likelihood: f64,
        confidence: f64,
        uncertainty: f64,
        lower_bound: f64,
        upper_bound: f64,
    ) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Threat level: {threat_level} (informational only)");
        let _ = writeln!(out, "Risk score: {total:.3}");
        let _ = writeln!(out, "Threat likelihood: {:.1}%", threat_likelihood * 100.0);
        let _ = writeln!(out, "Confidence: {:.1}%", confidence * 100.0);
        let _ = writeln!(out, "Uncertainty: {:.1}%", uncertainty * 100.0);
        let _ = writeln!(out, "Score breakdown:");
        for factor in factors {
            let _ = writeln!(
                out,
                "  - {}: value {:.3}, weight {:.2}, contribution {:.3} ({})",
                factor.name, factor.value, factor.weight, factor.contribution, factor.reasoning
            );
        }
        let _ = writeln!(out, "Bounds: [{lower_bound:.3}, {upper_bound:.3}]");
        out
    }
}

/// Angle in degrees between the horizontal velocity and the direction from
/// the position to the origin. 90 when either vector is degenerate.
fn heading_to_origin_deg(position: Coordinates, velocity: &Velocity) -> f64 {
    let to_origin = (-position.x, -position.y);
    let magnitude_origin = (to_origin.0 * to_origin.0 + to_origin.1 * to_origin.1).sqrt();
    let magnitude_velocity = velocity.horizontal_speed();

    if magnitude_origin == 0.0 || magnitude_velocity == 0.0 {
        return 90.0;
    }

    let dot = to_origin.0 * velocity.vx + to_origin.1 * velocity.vy;
    let cos_angle = (dot / (magnitude_origin * magnitude_velocity)).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}
