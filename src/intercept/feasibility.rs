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

use crate::cfg::FeasibilityConfig;
use crate::intercept::envelope::RiskEnvelopeEvaluator;
use crate::intercept::geometry::GeometryAnalyzer;
use crate::intercept::{
    ClosestApproachResult, FeasibilityLevel, GeometryAnalysisResult, InterceptionFeasibilityResult,
};
use crate::kinematics::{Coordinates, Velocity};
use hifitime::Epoch;
use std::fmt::Write;

/// Time scale over which the closest-approach confidence decays, one hour.
const TIME_CONFIDENCE_SCALE_S: f64 = 3_600.0;
/// Closing velocity at which the closing factor saturates.
const CLOSING_SPEED_SCALE_MPS: f64 = 100.0;

/// Aggregates geometry, closest approach, and risk envelope analysis into a
/// kinematic feasibility level with a probability. Purely advisory.
#[derive(Clone, Debug, PartialEq)]
pub struct FeasibilityAnalyzer {
    pub cfg: FeasibilityConfig,
    geometry: GeometryAnalyzer,
    envelope: RiskEnvelopeEvaluator,
}

impl FeasibilityAnalyzer {
    pub fn new(cfg: FeasibilityConfig) -> Self {
        Self {
            cfg,
            geometry: GeometryAnalyzer::new(),
            envelope: RiskEnvelopeEvaluator::new(),
        }
    }

    pub fn assess_feasibility(
        &self,
        defender_position: Coordinates,
        defender_velocity: Velocity,
        target_position: Coordinates,
        target_velocity: Velocity,
        epoch: Epoch,
    ) -> InterceptionFeasibilityResult {
        let geometry = self.geometry.analyze_relative_motion(
            defender_position,
            defender_velocity,
            target_position,
            target_velocity,
        );

        let time_to_ca = self
            .geometry
            .time_to_closest_approach(geometry.relative_position, geometry.relative_velocity);
        let ca_distance = self.geometry.closest_approach_distance(
            geometry.relative_position,
            geometry.relative_velocity,
            time_to_ca,
        );
        let ca_position = self.geometry.closest_approach_position(
            defender_position,
            geometry.relative_position,
            geometry.relative_velocity,
            time_to_ca,
        );

        let closest_approach = ClosestApproachResult {
            time_to_closest_approach_s: time_to_ca.max(0.0),
            closest_approach_distance_m: ca_distance,
            closest_approach_position: ca_position,
            // Constant velocity model: unchanged at closest approach.
            relative_velocity_at_approach: geometry.relative_velocity,
            confidence: self.confidence(&geometry, time_to_ca),
            uncertainty: self.uncertainty(&geometry, time_to_ca),
        };

        let risk_envelope = self.envelope.evaluate_envelope(
            defender_position,
            defender_velocity,
            target_position,
            target_velocity,
            self.cfg.envelope_radius_m,
        );

        let (feasibility_level, feasibility_probability) =
            self.feasibility_level(&geometry, &closest_approach);

        let confidence = (closest_approach.confidence + (1.0 - closest_approach.uncertainty)) / 2.0;
        let uncertainty = closest_approach.uncertainty;

        let reasoning = self.reasoning(
            &geometry,
            &closest_approach,
            feasibility_level,
            feasibility_probability,
        );

        InterceptionFeasibilityResult {
            epoch,
            feasibility_level,
            feasibility_probability,
            geometry,
            closest_approach,
            risk_envelope,
            confidence,
            uncertainty,
            reasoning,
            constraint_statement: self.cfg.constraint_statement.clone(),
        }
    }

    /// Weighted mixture: 0.3 range, 0.4 closest approach, 0.2 relative
    /// speed, 0.1 closing velocity, clamped; then bucketed into a level.
    fn feasibility_level(
        &self,
        geometry: &GeometryAnalysisResult,
        closest_approach: &ClosestApproachResult,
    ) -> (FeasibilityLevel, f64) {
        let mut score: f64 = 0.0;

        let range = geometry.range_m;
        if (self.cfg.min_range_m..=self.cfg.max_range_m).contains(&range) {
            let mid_range = (self.cfg.min_range_m + self.cfg.max_range_m) / 2.0;
            let range_factor =
                (1.0 - (range - mid_range).abs() / self.cfg.max_range_m).clamp(0.0, 1.0);
            score += range_factor * 0.3;
        }

        let ca = closest_approach.closest_approach_distance_m;
        let ca_factor = if ca < self.cfg.min_range_m {
            0.9
        } else if ca < self.cfg.max_range_m {
            0.5 + 0.4 * (1.0 - ca / self.cfg.max_range_m)
        } else {
            0.1
        };
        score += ca_factor * 0.4;

        if geometry.relative_speed_mps <= self.cfg.max_relative_speed_mps {
            let speed_factor =
                1.0 - (geometry.relative_speed_mps / self.cfg.max_relative_speed_mps) * 0.5;
            score += speed_factor * 0.2;
        }

        if geometry.closing_velocity_mps > 0.0 {
            let closing_factor = (geometry.closing_velocity_mps / CLOSING_SPEED_SCALE_MPS).min(1.0);
            score += closing_factor * 0.1;
        }

        let score = score.clamp(0.0, 1.0);

        let level = if score >= 0.8 {
            FeasibilityLevel::HighlyFeasible
        } else if score >= 0.6 {
            FeasibilityLevel::Feasible
        } else if score >= 0.4 {
            FeasibilityLevel::MarginallyFeasible
        } else {
            FeasibilityLevel::NotFeasible
        };

        (level, score)
    }

    fn confidence(&self, geometry: &GeometryAnalysisResult, time_to_ca: f64) -> f64 {
        let distance_factor = 1.0 - (geometry.range_m / self.cfg.max_range_m).min(1.0);
        let time_factor = 1.0 / (1.0 + time_to_ca.abs() / TIME_CONFIDENCE_SCALE_S);
        let speed_factor =
            1.0 - (geometry.relative_speed_mps / self.cfg.max_relative_speed_mps).min(1.0);

        (distance_factor * 0.5 + time_factor * 0.3 + speed_factor * 0.2).clamp(0.0, 1.0)
    }

    fn uncertainty(&self, geometry: &GeometryAnalysisResult, time_to_ca: f64) -> f64 {
        let distance_uncertainty = (geometry.range_m / self.cfg.max_range_m).min(1.0);
        let time_uncertainty = (time_to_ca.abs() / TIME_CONFIDENCE_SCALE_S).min(1.0);
        let speed_uncertainty =
            (geometry.relative_speed_mps / self.cfg.max_relative_speed_mps).min(1.0);

        (distance_uncertainty * 0.4 + time_uncertainty * 0.4 + speed_uncertainty * 0.2)
            .clamp(0.0, 1.0)
    }

    fn reasoning(
        &self,
        geometry: &GeometryAnalysisResult,
        closest_approach: &ClosestApproachResult,
        level: FeasibilityLevel,
        probability: f64,
    ) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Feasibility level: {level}");
        let _ = writeln!(out, "Feasibility probability: {:.1}%", probability * 100.0);
        let _ = writeln!(out, "Geometry:");
        let _ = writeln!(out, "  - Range: {:.2} km", geometry.range_m / 1e3);
        let _ = writeln!(out, "  - Relative speed: {:.1} m/s", geometry.relative_speed_mps);
        let _ = writeln!(out, "  - Closing velocity: {:.1} m/s", geometry.closing_velocity_mps);
        let _ = writeln!(out, "  - Bearing: {:.1} deg", geometry.bearing_deg);
        let _ = writeln!(out, "  - Elevation: {:.1} deg", geometry.elevation_deg);
        let _ = writeln!(out, "Closest approach:");
        let _ = writeln!(
            out,
            "  - Time to closest approach: {:.1} s",
            closest_approach.time_to_closest_approach_s
        );
        let _ = writeln!(
            out,
            "  - Distance at closest approach: {:.2} km",
            closest_approach.closest_approach_distance_m / 1e3
        );
        out
    }
}

#[cfg(test)]
mod feasibility_ut {
    use super::*;

    fn epoch() -> Epoch {
        Epoch::from_gregorian_utc_at_midnight(2024, 3, 1)
    }

    fn analyzer() -> FeasibilityAnalyzer {
        FeasibilityAnalyzer::new(FeasibilityConfig::default())
    }

    #[test]
    fn direct_inbound_target_is_feasible() {
        let result = analyzer().assess_feasibility(
            Coordinates::ZERO,
            Velocity::ZERO,
            Coordinates::new(30_000.0, 0.0, 8_000.0),
            Velocity::new(-300.0, 0.0, 0.0),
            epoch(),
        );
        assert!(result.feasibility_level >= FeasibilityLevel::Feasible);
        assert!(result.geometry.closing_velocity_mps > 0.0);
        assert!(result.feasibility_probability >= 0.6);
        assert!(!result.constraint_statement.is_empty());
    }

    #[test]
    fn distant_receding_target_is_not_feasible() {
        // Out of range, opening the range, and its closest approach was far
        // abeam: every factor bottoms out.
        let result = analyzer().assess_feasibility(
            Coordinates::ZERO,
            Velocity::ZERO,
            Coordinates::new(300_000.0, 200_000.0, 10_000.0),
            Velocity::new(500.0, 0.0, 0.0),
            epoch(),
        );
        assert_eq!(result.feasibility_level, FeasibilityLevel::NotFeasible);
        assert!(result.geometry.closing_velocity_mps < 0.0);
        assert_eq!(result.closest_approach.time_to_closest_approach_s, 0.0);
    }

    #[test]
    fn past_closest_approach_clips_to_zero() {
        let result = analyzer().assess_feasibility(
            Coordinates::ZERO,
            Velocity::ZERO,
            Coordinates::new(10_000.0, 0.0, 0.0),
            Velocity::new(200.0, 0.0, 0.0),
            epoch(),
        );
        assert_eq!(result.closest_approach.time_to_closest_approach_s, 0.0);
    }

    #[test]
    fn matched_velocities_freeze_the_geometry() {
        let velocity = Velocity::new(100.0, 0.0, 0.0);
        let result = analyzer().assess_feasibility(
            Coordinates::ZERO,
            velocity,
            Coordinates::new(20_000.0, 0.0, 0.0),
            velocity,
            epoch(),
        );
        assert_eq!(result.closest_approach.time_to_closest_approach_s, 0.0);
        assert_eq!(
            result.closest_approach.closest_approach_distance_m,
            result.geometry.range_m
        );
    }

    #[test]
    fn confidence_and_uncertainty_are_complementary_in_spirit() {
        let near = analyzer().assess_feasibility(
            Coordinates::ZERO,
            Velocity::ZERO,
            Coordinates::new(20_000.0, 0.0, 5_000.0),
            Velocity::new(-200.0, 0.0, 0.0),
            epoch(),
        );
        let far = analyzer().assess_feasibility(
            Coordinates::ZERO,
            Velocity::ZERO,
            Coordinates::new(190_000.0, 0.0, 5_000.0),
            Velocity::new(-200.0, 0.0, 0.0),
            epoch(),
        );
        assert!(near.confidence > far.confidence);
        assert!(near.uncertainty < far.uncertainty);
    }
}
