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

//! Short-horizon trajectory forecasting from classical mechanics: constant
//! velocity and constant acceleration models over a bounded, materialized
//! sequence of future positions.

use crate::cfg::PredictorConfig;
use crate::kinematics::{Coordinates, Velocity};
use hifitime::Epoch;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionModel {
    ConstantVelocity,
    ConstantAcceleration,
}

impl fmt::Display for MotionModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConstantVelocity => write!(f, "CONSTANT_VELOCITY"),
            Self::ConstantAcceleration => write!(f, "CONSTANT_ACCELERATION"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPrediction {
    pub current_position: Coordinates,
    pub current_velocity: Velocity,
    /// Forecast positions, one per entry of `time_offsets_s`.
    pub predicted_positions: Vec<Coordinates>,
    pub time_offsets_s: Vec<f64>,
    pub motion_model: MotionModel,
    pub confidence: f64,
    pub uncertainty: f64,
    pub epoch: Epoch,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPredictor {
    pub horizon_s: f64,
    pub step_s: f64,
    pub max_horizon_s: f64,
}

impl From<&PredictorConfig> for TrajectoryPredictor {
    fn from(cfg: &PredictorConfig) -> Self {
        Self::new(cfg.horizon_s, cfg.step_s, cfg.max_horizon_s)
    }
}

impl TrajectoryPredictor {
    /// The horizon is clamped to the maximum at construction.
    pub fn new(horizon_s: f64, step_s: f64, max_horizon_s: f64) -> Self {
        Self {
            horizon_s: horizon_s.min(max_horizon_s),
            step_s,
            max_horizon_s,
        }
    }

    /// Constant velocity forecast: p(t) = p + v t.
    pub fn predict_constant_velocity(
        &self,
        position: Coordinates,
        velocity: Velocity,
        epoch: Epoch,
    ) -> TrajectoryPrediction {
        let (positions, offsets) = self.sample(|t| {
            Coordinates::new(
                position.x + velocity.vx * t,
                position.y + velocity.vy * t,
                position.z + velocity.vz * t,
            )
        });

        let confidence = 1.0 - (self.horizon_s / self.max_horizon_s) * 0.5;
        let uncertainty = ((self.horizon_s / 100.0) * (velocity.speed() / 500.0)).min(1.0);

        TrajectoryPrediction {
            current_position: position,
            current_velocity: velocity,
            predicted_positions: positions,
            time_offsets_s: offsets,
            motion_model: MotionModel::ConstantVelocity,
            confidence,
            uncertainty,
            epoch,
        }
    }

    /// Constant acceleration forecast: p(t) = p + v t + a t^2 / 2.
    pub fn predict_constant_acceleration(
        &self,
        position: Coordinates,
        velocity: Velocity,
        acceleration: Velocity,
        epoch: Epoch,
    ) -> TrajectoryPrediction {
        let (positions, offsets) = self.sample(|t| {
            let half_t2 = 0.5 * t * t;
            Coordinates::new(
                position.x + velocity.vx * t + acceleration.vx * half_t2,
                position.y + velocity.vy * t + acceleration.vy * half_t2,
                position.z + velocity.vz * t + acceleration.vz * half_t2,
            )
        });

        let confidence = (1.0 - (self.horizon_s / self.max_horizon_s) * 0.5) * 0.8;
        let uncertainty = ((self.horizon_s / 100.0) * (velocity.speed() / 500.0)
            + acceleration.speed() / 50.0)
            .min(1.0);

        TrajectoryPrediction {
            current_position: position,
            current_velocity: velocity,
            predicted_positions: positions,
            time_offsets_s: offsets,
            motion_model: MotionModel::ConstantAcceleration,
            confidence,
            uncertainty,
            epoch,
        }
    }

    /// Dispatches on the requested motion model. A constant acceleration
    /// request without an acceleration estimate degrades to zero
    /// acceleration.
    pub fn predict(
        &self,
        position: Coordinates,
        velocity: Velocity,
        acceleration: Option<Velocity>,
        motion_model: MotionModel,
        epoch: Epoch,
    ) -> TrajectoryPrediction {
        match motion_model {
            MotionModel::ConstantVelocity => self.predict_constant_velocity(position, velocity, epoch),
            MotionModel::ConstantAcceleration => self.predict_constant_acceleration(
                position,
                velocity,
                acceleration.unwrap_or(Velocity::ZERO),
                epoch,
            ),
        }
    }

    /// Componentwise a = (v1 - v0) / dt. Zero when dt is not positive.
    pub fn estimate_acceleration(
        &self,
        previous_velocity: Velocity,
        current_velocity: Velocity,
        dt: f64,
    ) -> Velocity {
        if dt <= 0.0 {
            return Velocity::ZERO;
        }
        Velocity::new(
            (current_velocity.vx - previous_velocity.vx) / dt,
            (current_velocity.vy - previous_velocity.vy) / dt,
            (current_velocity.vz - previous_velocity.vz) / dt,
        )
    }

    fn sample(&self, position_at: impl Fn(f64) -> Coordinates) -> (Vec<Coordinates>, Vec<f64>) {
        let mut positions = Vec::new();
        let mut offsets = Vec::new();
        let mut t = 0.0;
        while t <= self.horizon_s {
            positions.push(position_at(t));
            offsets.push(t);
            t += self.step_s;
        }
        (positions, offsets)
    }
}

#[cfg(test)]
mod predictor_ut {
    use super::*;

    fn epoch() -> Epoch {
        Epoch::from_gregorian_utc_at_midnight(2024, 3, 1)
    }

    fn predictor() -> TrajectoryPredictor {
        TrajectoryPredictor::new(60.0, 1.0, 300.0)
    }

    #[test]
    fn cv_extrapolates_linearly() {
        let prediction = predictor().predict_constant_velocity(
            Coordinates::new(1_000.0, 0.0, 500.0),
            Velocity::new(-10.0, 5.0, 0.0),
            epoch(),
        );
        assert_eq!(prediction.predicted_positions.len(), 61);
        assert_eq!(prediction.time_offsets_s[0], 0.0);
        assert_eq!(prediction.predicted_positions[0], Coordinates::new(1_000.0, 0.0, 500.0));
        assert_eq!(
            *prediction.predicted_positions.last().unwrap(),
            Coordinates::new(400.0, 300.0, 500.0)
        );
    }

    #[test]
    fn cv_with_zero_velocity_is_stationary() {
        let here = Coordinates::new(123.0, 456.0, 789.0);
        let prediction = predictor().predict_constant_velocity(here, Velocity::ZERO, epoch());
        assert!(prediction.predicted_positions.iter().all(|p| *p == here));
    }

    #[test]
    fn ca_adds_quadratic_term() {
        let prediction = predictor().predict_constant_acceleration(
            Coordinates::ZERO,
            Velocity::new(10.0, 0.0, 0.0),
            Velocity::new(2.0, 0.0, 0.0),
            epoch(),
        );
        // At t = 10: x = 10*10 + 0.5*2*100 = 200.
        assert_eq!(prediction.predicted_positions[10].x, 200.0);
        // CA confidence is 80% of the CV confidence.
        let cv = predictor().predict_constant_velocity(Coordinates::ZERO, Velocity::new(10.0, 0.0, 0.0), epoch());
        assert!((prediction.confidence - cv.confidence * 0.8).abs() < 1e-12);
    }

    #[test]
    fn horizon_clamps_to_max() {
        let p = TrajectoryPredictor::new(4_000.0, 1.0, 300.0);
        assert_eq!(p.horizon_s, 300.0);
    }

    #[test]
    fn acceleration_estimate_is_componentwise() {
        let p = predictor();
        let accel = p.estimate_acceleration(
            Velocity::new(10.0, 0.0, 0.0),
            Velocity::new(20.0, -5.0, 2.0),
            5.0,
        );
        assert_eq!(accel, Velocity::new(2.0, -1.0, 0.4));
        assert_eq!(
            p.estimate_acceleration(Velocity::ZERO, Velocity::new(1.0, 1.0, 1.0), 0.0),
            Velocity::ZERO
        );
    }
}
