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
use crate::kinematics::Coordinates;
use crate::msr::{Detection, SensorKind};
use crate::sim::entity::SimulatedEntity;
use crate::sim::noise::{NoiseModel, NoiseParameters};
use hifitime::Epoch;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// A range-gated radar sensor simulator. Emits one [Detection] per in-range
/// entity per update tick, with noise, signal strength, confidence, and
/// uncertainty from its own seeded noise model.
#[derive(Clone, Debug)]
pub struct RadarSensor {
    pub sensor_id: String,
    pub position: Coordinates,
    pub detection_range_m: f64,
    pub update_rate_hz: f64,
    pub min_detection_confidence: f64,
    noise: NoiseModel,
    last_update: Option<Epoch>,
}

/// Static sensor description for the dashboard read model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorInfo {
    pub sensor_id: String,
    pub sensor_kind: SensorKind,
    pub position: Coordinates,
    pub detection_range_m: f64,
    pub update_rate_hz: f64,
}

impl RadarSensor {
    pub fn new(
        sensor_id: String,
        position: Coordinates,
        defaults: &SensorDefaults,
        seed: Option<u64>,
    ) -> Self {
        let parameters = NoiseParameters::from(defaults);
        let noise = match seed {
            Some(seed) => NoiseModel::with_seed(parameters, seed),
            None => NoiseModel::new(parameters),
        };

        Self {
            sensor_id,
            position,
            detection_range_m: defaults.detection_range_m,
            update_rate_hz: defaults.update_rate_hz,
            min_detection_confidence: defaults.min_detection_confidence,
            noise,
            last_update: None,
        }
    }

    /// Simulates one radar sweep. Returns an empty batch without consuming
    /// the tick when called faster than the update rate. Entities beyond the
    /// detection range, and detections whose confidence falls strictly below
    /// the minimum, are dropped.
    pub fn detect_entities(&mut self, epoch: Epoch, entities: &[SimulatedEntity]) -> Vec<Detection> {
        if let Some(last) = self.last_update {
            let elapsed = (epoch - last).to_seconds();
            if elapsed < 1.0 / self.update_rate_hz {
                return Vec::new();
            }
        }
        self.last_update = Some(epoch);

        let mut detections = Vec::new();

        for entity in entities {
            let true_position = entity.position_at(epoch);
            let true_velocity = entity.velocity_at(epoch);
            let range_m = self.position.distance_to(&true_position);

            if range_m > self.detection_range_m {
                continue;
            }

            let signal_strength =
                self.noise
                    .signal_strength(range_m, entity.characteristics.radar_cross_section, 1.0);
            let confidence =
                self.noise
                    .detection_confidence(range_m, signal_strength, self.detection_range_m);

            if confidence < self.min_detection_confidence {
                trace!(
                    "{} dropped {} at {range_m:.0} m: confidence {confidence:.3} below threshold",
                    self.sensor_id, entity.id
                );
                continue;
            }

            let position = self.noise.position_noise(true_position, range_m);
            let velocity = self.noise.velocity_noise(true_velocity, range_m);
            let uncertainty = self.noise.measurement_uncertainty(range_m, signal_strength);

            detections.push(Detection {
                sensor_id: self.sensor_id.clone(),
                sensor_kind: SensorKind::Radar,
                epoch,
                entity_id: entity.id.clone(),
                position,
                velocity,
                signal_strength,
                confidence,
                uncertainty,
                distance_from_sensor_m: range_m,
                entity_kind: entity.characteristics.kind,
                radar_cross_section: entity.characteristics.radar_cross_section,
                size: entity.characteristics.size,
            });
        }

        detections
    }

    pub fn info(&self) -> SensorInfo {
        SensorInfo {
            sensor_id: self.sensor_id.clone(),
            sensor_kind: SensorKind::Radar,
            position: self.position,
            detection_range_m: self.detection_range_m,
            update_rate_hz: self.update_rate_hz,
        }
    }
}

impl fmt::Display for RadarSensor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} at {} (range {:.0} km, {:.1} Hz)",
            SensorKind::Radar,
            self.sensor_id,
            self.position,
            self.detection_range_m / 1e3,
            self.update_rate_hz
        )
    }
}
