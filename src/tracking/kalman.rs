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

//! Classical Kalman filter over the six-state constant velocity model
//! [x, y, z, vx, vy, vz], measuring position only.

use crate::kinematics::{Coordinates, Velocity};
use crate::linalg::{Matrix3, Matrix3x6, Matrix6, Vector3, Vector6};
use hifitime::{Duration, Epoch};
use serde_derive::{Deserialize, Serialize};

/// Determinant floor below which the innovation covariance is treated as
/// singular and the update is skipped.
const SINGULARITY_FLOOR: f64 = 1e-12;

/// Filter state: estimated pose with its 6x6 covariance at an epoch.
/// Invariant: the covariance is kept symmetric by averaging with its
/// transpose after every measurement update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KalmanState {
    pub position: Coordinates,
    pub velocity: Velocity,
    pub covariance: Matrix6<f64>,
    pub epoch: Epoch,
}

impl KalmanState {
    fn to_vector(&self) -> Vector6<f64> {
        Vector6::new(
            self.position.x,
            self.position.y,
            self.position.z,
            self.velocity.vx,
            self.velocity.vy,
            self.velocity.vz,
        )
    }

    fn from_vector(x: Vector6<f64>, covariance: Matrix6<f64>, epoch: Epoch) -> Self {
        Self {
            position: Coordinates::new(x[0], x[1], x[2]),
            velocity: Velocity::new(x[3], x[4], x[5]),
            covariance,
            epoch,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KalmanFilter {
    /// Process noise spectral density, on the diagonal of Q.
    pub process_noise: f64,
    /// Default measurement noise, on the diagonal of R when no per-update
    /// value is given.
    pub measurement_noise: f64,
    /// Diagonal of the initial covariance.
    pub initial_uncertainty: f64,
}

impl Default for KalmanFilter {
    fn default() -> Self {
        Self {
            process_noise: 1.0,
            measurement_noise: 10.0,
            initial_uncertainty: 100.0,
        }
    }
}

impl KalmanFilter {
    fn measurement_matrix() -> Matrix3x6<f64> {
        let mut h = Matrix3x6::zeros();
        h[(0, 0)] = 1.0;
        h[(1, 1)] = 1.0;
        h[(2, 2)] = 1.0;
        h
    }

    fn transition_matrix(dt: f64) -> Matrix6<f64> {
        let mut f = Matrix6::identity();
        f[(0, 3)] = dt;
        f[(1, 4)] = dt;
        f[(2, 5)] = dt;
        f
    }

    /// Initializes a state from a first detection. Missing velocity seeds
    /// the velocity states at zero under a large covariance.
    pub fn initialize(
        &self,
        position: Coordinates,
        velocity: Option<Velocity>,
        epoch: Epoch,
    ) -> KalmanState {
        KalmanState {
            position,
            velocity: velocity.unwrap_or(Velocity::ZERO),
            covariance: Matrix6::identity() * self.initial_uncertainty,
            epoch,
        }
    }

    /// Prediction step: x' = F x, P' = F P Ft + Q.
    pub fn predict(&self, state: &KalmanState, dt: f64) -> KalmanState {
        let f = Self::transition_matrix(dt);
        let q = Matrix6::identity() * self.process_noise;

        let x = f * state.to_vector();
        let p = f * state.covariance * f.transpose() + q;

        KalmanState::from_vector(x, p, state.epoch + Duration::from_seconds(dt))
    }

    /// Measurement update. A singular innovation covariance skips the update
    /// and returns the state unchanged, mirroring a zero Kalman gain.
    pub fn update(
        &self,
        state: &KalmanState,
        measurement: Coordinates,
        measurement_noise: Option<f64>,
    ) -> KalmanState {
        let h = Self::measurement_matrix();
        let r = Matrix3::identity() * measurement_noise.unwrap_or(self.measurement_noise);

        let x = state.to_vector();
        let z = Vector3::new(measurement.x, measurement.y, measurement.z);

        let innovation = z - h * x;
        let s = h * state.covariance * h.transpose() + r;

        if s.determinant().abs() < SINGULARITY_FLOOR {
            debug!("singular innovation covariance at {}, update skipped", state.epoch);
            return state.clone();
        }
        let s_inv = match s.try_inverse() {
            Some(inv) => inv,
            None => {
                debug!("innovation covariance inversion failed at {}, update skipped", state.epoch);
                return state.clone();
            }
        };

        let gain = state.covariance * h.transpose() * s_inv;

        let x_updated = x + gain * innovation;
        let p_updated = (Matrix6::identity() - gain * h) * state.covariance;
        let p_symmetric = (p_updated + p_updated.transpose()) * 0.5;

        KalmanState::from_vector(x_updated, p_symmetric, state.epoch)
    }

    /// Prediction then measurement update.
    pub fn predict_and_update(
        &self,
        state: &KalmanState,
        measurement: Coordinates,
        dt: f64,
        measurement_noise: Option<f64>,
    ) -> KalmanState {
        let predicted = self.predict(state, dt);
        self.update(&predicted, measurement, measurement_noise)
    }

    /// Mean position standard deviation from the covariance diagonal, in
    /// meters.
    pub fn position_uncertainty(&self, state: &KalmanState) -> f64 {
        let trace = state.covariance[(0, 0)] + state.covariance[(1, 1)] + state.covariance[(2, 2)];
        (trace / 3.0).sqrt()
    }

    /// Mean velocity standard deviation from the covariance diagonal, in
    /// m/s.
    pub fn velocity_uncertainty(&self, state: &KalmanState) -> f64 {
        let trace = state.covariance[(3, 3)] + state.covariance[(4, 4)] + state.covariance[(5, 5)];
        (trace / 3.0).sqrt()
    }
}

#[cfg(test)]
mod kalman_ut {
    use super::*;

    fn epoch() -> Epoch {
        Epoch::from_gregorian_utc_at_midnight(2024, 3, 1)
    }

    #[test]
    fn predict_advances_position_by_velocity() {
        let kf = KalmanFilter::default();
        let state = kf.initialize(
            Coordinates::new(100.0, 0.0, 50.0),
            Some(Velocity::new(5.0, -2.0, 0.0)),
            epoch(),
        );
        let predicted = kf.predict(&state, 2.0);
        assert_eq!(predicted.position, Coordinates::new(110.0, -4.0, 50.0));
        assert_eq!(predicted.velocity, state.velocity);
        // Covariance grows under prediction.
        assert!(predicted.covariance[(0, 0)] > state.covariance[(0, 0)]);
    }

    #[test]
    fn update_pulls_towards_measurement() {
        let kf = KalmanFilter::default();
        let state = kf.initialize(Coordinates::new(0.0, 0.0, 0.0), None, epoch());
        let updated = kf.update(&state, Coordinates::new(10.0, 0.0, 0.0), None);
        assert!(updated.position.x > 0.0);
        assert!(updated.position.x <= 10.0);
        // Covariance shrinks under a measurement.
        assert!(updated.covariance[(0, 0)] < state.covariance[(0, 0)]);
    }

    #[test]
    fn covariance_stays_symmetric() {
        let kf = KalmanFilter::default();
        let mut state = kf.initialize(
            Coordinates::new(0.0, 0.0, 0.0),
            Some(Velocity::new(10.0, 5.0, 1.0)),
            epoch(),
        );
        for step in 1..=50 {
            state = kf.predict_and_update(
                &state,
                Coordinates::new(10.0 * step as f64, 5.0 * step as f64, step as f64),
                1.0,
                Some(25.0),
            );
            let asymmetry = (state.covariance - state.covariance.transpose()).abs().max();
            assert!(asymmetry <= 1e-9, "asymmetry {asymmetry} at step {step}");
        }
    }

    #[test]
    fn singular_innovation_skips_update() {
        let kf = KalmanFilter::default();
        let mut state = kf.initialize(Coordinates::new(0.0, 0.0, 0.0), None, epoch());
        // Degenerate covariance and zero measurement noise make S singular.
        state.covariance = Matrix6::zeros();
        let updated = kf.update(&state, Coordinates::new(100.0, 0.0, 0.0), Some(0.0));
        assert_eq!(updated, state);
    }

    #[test]
    fn converges_on_a_constant_velocity_target() {
        let kf = KalmanFilter::default();
        let mut state = kf.initialize(Coordinates::new(0.0, 0.0, 1000.0), None, epoch());
        // Truth moves at 100 m/s along +x; measurements are noiseless.
        for step in 1..=20 {
            state = kf.predict_and_update(
                &state,
                Coordinates::new(100.0 * step as f64, 0.0, 1000.0),
                1.0,
                Some(1.0),
            );
        }
        assert!((state.position.x - 2000.0).abs() < 20.0);
        assert!((state.velocity.vx - 100.0).abs() < 5.0);
    }
}
