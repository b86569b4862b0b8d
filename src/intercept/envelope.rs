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

use crate::intercept::geometry::GeometryAnalyzer;
use crate::intercept::{RiskEnvelopeResult, RiskLevel};
use crate::kinematics::{Coordinates, Velocity};

/// Relative speed at which the penetration probability's speed factor
/// saturates.
const PENETRATION_SPEED_SCALE_MPS: f64 = 500.0;
/// Distance at which the envelope confidence from range alone reaches zero.
const CONFIDENCE_RANGE_SCALE_M: f64 = 200_000.0;
/// Relative speed at which the envelope confidence from speed reaches zero.
const CONFIDENCE_SPEED_SCALE_MPS: f64 = 1_000.0;

/// Evaluates whether and when straight-line relative motion penetrates a
/// sphere around the defender.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RiskEnvelopeEvaluator {
    geometry: GeometryAnalyzer,
}

impl RiskEnvelopeEvaluator {
    pub fn new() -> Self {
        Self {
            geometry: GeometryAnalyzer::new(),
        }
    }

    pub fn evaluate_envelope(
        &self,
        defender_position: Coordinates,
        defender_velocity: Velocity,
        target_position: Coordinates,
        target_velocity: Velocity,
        envelope_radius_m: f64,
    ) -> RiskEnvelopeResult {
        let geometry = self.geometry.analyze_relative_motion(
            defender_position,
            defender_velocity,
            target_position,
            target_velocity,
        );

        let current_distance = geometry.range_m;
        let is_within_envelope = current_distance <= envelope_radius_m;

        let time_to_envelope = self.time_to_envelope(
            geometry.relative_position,
            geometry.relative_velocity,
            envelope_radius_m,
        );

        let penetration_probability = self.penetration_probability(
            current_distance,
            envelope_radius_m,
            geometry.closing_velocity_mps,
            geometry.relative_speed_mps,
        );

        let risk_level = risk_level(current_distance, envelope_radius_m, penetration_probability);

        let confidence = self.confidence(
            current_distance,
            envelope_radius_m,
            geometry.relative_speed_mps,
        );

        RiskEnvelopeResult {
            envelope_radius_m,
            current_distance_m: current_distance,
            is_within_envelope,
            time_to_envelope_s: time_to_envelope,
            penetration_probability,
            risk_level,
            confidence,
        }
    }

    /// Solves |r + v t| = R for t: a quadratic with a = v.v, b = 2 r.v,
    /// c = r.r - R^2. Returns the earliest non-negative crossing, zero when
    /// already inside, or None when the motion never reaches the envelope.
    fn time_to_envelope(
        &self,
        relative_position: Coordinates,
        relative_velocity: Velocity,
        envelope_radius_m: f64,
    ) -> Option<f64> {
        let r_dot_r = relative_position.dot(&relative_position);
        let v_dot_v = relative_velocity.dot(&relative_velocity);
        let r_dot_v = relative_position.x * relative_velocity.vx
            + relative_position.y * relative_velocity.vy
            + relative_position.z * relative_velocity.vz;

        if v_dot_v == 0.0 {
            if r_dot_r <= envelope_radius_m * envelope_radius_m {
                return Some(0.0);
            }
            return None;
        }

        let a = v_dot_v;
        let b = 2.0 * r_dot_v;
        let c = r_dot_r - envelope_radius_m * envelope_radius_m;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_discriminant = discriminant.sqrt();
        let t1 = (-b - sqrt_discriminant) / (2.0 * a);
        let t2 = (-b + sqrt_discriminant) / (2.0 * a);

        if t1 > 0.0 && t2 > 0.0 {
            Some(t1.min(t2))
        } else if t1 > 0.0 {
            Some(t1)
        } else if t2 > 0.0 {
            // Already inside the envelope: crossing out, not in.
            Some(0.0)
        } else {
            None
        }
    }

    /// One inside the envelope; zero when not closing; otherwise a mixture
    /// of bucketed time-to-boundary and normalized relative speed.
    fn penetration_probability(
        &self,
        current_distance_m: f64,
        envelope_radius_m: f64,
        closing_velocity_mps: f64,
        relative_speed_mps: f64,
    ) -> f64 {
        if current_distance_m <= envelope_radius_m {
            return 1.0;
        }
        if closing_velocity_mps <= 0.0 {
            return 0.0;
        }

        let time_to_boundary = (current_distance_m - envelope_radius_m) / closing_velocity_mps;
        let time_factor = if time_to_boundary < 60.0 {
            0.9
        } else if time_to_boundary < 300.0 {
            0.7
        } else if time_to_boundary < 1_800.0 {
            0.5
        } else {
            0.3
        };

        let speed_factor = (relative_speed_mps / PENETRATION_SPEED_SCALE_MPS).min(1.0);

        (time_factor * 0.7 + speed_factor * 0.3).clamp(0.0, 1.0)
    }

    /// Distance, speed, and boundary-proximity mixture.
    fn confidence(
        &self,
        current_distance_m: f64,
        envelope_radius_m: f64,
        relative_speed_mps: f64,
    ) -> f64 {
        let distance_factor = 1.0 - (current_distance_m / CONFIDENCE_RANGE_SCALE_M).min(1.0);
        let speed_factor = 1.0 - (relative_speed_mps / CONFIDENCE_SPEED_SCALE_MPS).min(1.0);
        let proximity_factor =
            if (current_distance_m - envelope_radius_m).abs() < envelope_radius_m * 0.1 {
                0.9
            } else {
                0.5
            };

        (distance_factor * 0.4 + speed_factor * 0.3 + proximity_factor * 0.3).clamp(0.0, 1.0)
    }
}

fn risk_level(
    current_distance_m: f64,
    envelope_radius_m: f64,
    penetration_probability: f64,
) -> RiskLevel {
    if current_distance_m <= envelope_radius_m {
        RiskLevel::WithinEnvelope
    } else if penetration_probability > 0.8 {
        RiskLevel::HighRisk
    } else if penetration_probability > 0.5 {
        RiskLevel::MediumRisk
    } else if penetration_probability > 0.2 {
        RiskLevel::LowRisk
    } else {
        RiskLevel::MinimalRisk
    }
}
