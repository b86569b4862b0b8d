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

use crate::cfg::SensorDefaults;
use crate::kinematics::{Coordinates, Velocity};
use rand::{Rng, SeedableRng};
use rand_distr::Normal;
use rand_pcg::Pcg64Mcg;
use serde_derive::{Deserialize, Serialize};

/// Distance over which the position noise standard deviation doubles.
const POSITION_NOISE_RANGE_SCALE_M: f64 = 100_000.0;
/// Distance over which the velocity noise standard deviation doubles.
const VELOCITY_NOISE_RANGE_SCALE_M: f64 = 200_000.0;
/// Inverse-square signal attenuation scale.
const SIGNAL_RANGE_SCALE_M: f64 = 10_000.0;
/// Distance at which measurement uncertainty saturates.
const UNCERTAINTY_RANGE_SCALE_M: f64 = 200_000.0;
/// Standard deviation of the confidence jitter.
const CONFIDENCE_NOISE_STD: f64 = 0.05;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseParameters {
    pub position_noise_std_m: f64,
    pub velocity_noise_std_mps: f64,
    pub signal_noise_std: f64,
}

impl From<&SensorDefaults> for NoiseParameters {
    fn from(defaults: &SensorDefaults) -> Self {
        Self {
            position_noise_std_m: defaults.position_noise_std_m,
            velocity_noise_std_mps: defaults.velocity_noise_std_mps,
            signal_noise_std: defaults.signal_noise_std,
        }
    }
}

/// Gaussian measurement noise model. Owns its PRNG: given the same seed and
/// the same call sequence, every sample is reproducible bit for bit. Pcg64Mcg
/// does not drift across platforms or library versions.
#[derive(Clone, Debug)]
pub struct NoiseModel {
    pub parameters: NoiseParameters,
    rng: Pcg64Mcg,
}

impl NoiseModel {
    pub fn with_rng(parameters: NoiseParameters, rng: Pcg64Mcg) -> Self {
        Self { parameters, rng }
    }

    pub fn with_seed(parameters: NoiseParameters, seed: u64) -> Self {
        Self::with_rng(parameters, Pcg64Mcg::seed_from_u64(seed))
    }

    pub fn new(parameters: NoiseParameters) -> Self {
        Self::with_rng(parameters, Pcg64Mcg::from_entropy())
    }

    fn gauss(&mut self, std: f64) -> f64 {
        if std > 0.0 {
            self.rng.sample(Normal::new(0.0, std).unwrap())
        } else {
            0.0
        }
    }

    /// Adds zero-mean Gaussian noise to a true position. The standard
    /// deviation grows linearly with range; the altitude channel carries half
    /// the horizontal noise.
    pub fn position_noise(&mut self, true_position: Coordinates, range_m: f64) -> Coordinates {
        let distance_factor = 1.0 + range_m / POSITION_NOISE_RANGE_SCALE_M;
        let std = self.parameters.position_noise_std_m * distance_factor;

        Coordinates::new(
            true_position.x + self.gauss(std),
            true_position.y + self.gauss(std),
            true_position.z + self.gauss(std * 0.5),
        )
    }

    /// Adds zero-mean Gaussian noise to a true velocity. Velocity noise grows
    /// with range at half the rate of position noise.
    pub fn velocity_noise(&mut self, true_velocity: Velocity, range_m: f64) -> Velocity {
        let distance_factor = 1.0 + range_m / VELOCITY_NOISE_RANGE_SCALE_M;
        let std = self.parameters.velocity_noise_std_mps * distance_factor;

        Velocity::new(
            true_velocity.vx + self.gauss(std),
            true_velocity.vy + self.gauss(std),
            true_velocity.vz + self.gauss(std * 0.5),
        )
    }

    /// Received signal strength in [0, 1] from the inverse square law applied
    /// to the radar cross section, with additive Gaussian jitter.
    pub fn signal_strength(&mut self, range_m: f64, radar_cross_section: f64, base: f64) -> f64 {
        if range_m <= 0.0 {
            return base * radar_cross_section;
        }

        let attenuation = 1.0 / (1.0 + (range_m / SIGNAL_RANGE_SCALE_M).powi(2));
        let signal = base * radar_cross_section * attenuation + self.gauss(self.parameters.signal_noise_std);

        signal.clamp(0.0, 1.0)
    }

    /// Detection confidence in [0, 1]: 60% range margin, 40% signal strength,
    /// plus a small Gaussian jitter.
    pub fn detection_confidence(&mut self, range_m: f64, signal: f64, max_range_m: f64) -> f64 {
        let distance_factor = (1.0 - range_m / max_range_m).max(0.0);
        let confidence = distance_factor * 0.6 + signal * 0.4 + self.gauss(CONFIDENCE_NOISE_STD);

        confidence.clamp(0.0, 1.0)
    }

    /// Measurement uncertainty in [0, 1]: 70% range saturation, 30% signal
    /// loss. Deterministic, no draw.
    pub fn measurement_uncertainty(&self, range_m: f64, signal: f64) -> f64 {
        let distance_uncertainty = (range_m / UNCERTAINTY_RANGE_SCALE_M).min(1.0);
        let signal_uncertainty = 1.0 - signal;

        (distance_uncertainty * 0.7 + signal_uncertainty * 0.3).clamp(0.0, 1.0)
    }
}
