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

use crate::cfg::SurveillanceConfig;
use crate::kinematics::{Coordinates, Velocity};
use crate::msr::Detection;
use hifitime::{Duration, Epoch, TimeSeries};
use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use uuid::Builder;

pub mod entity;
pub mod noise;
pub mod preprocess;
pub mod radar;

use entity::{
    EntityCharacteristics, SimulatedEntity, TrajectoryKind, TrajectoryParameters,
};
use radar::{RadarSensor, SensorInfo};

/// Simulation-level settings: the seed policy and the start epoch.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub seed: Option<u64>,
    pub deterministic: bool,
    pub start: Epoch,
}

impl SimConfig {
    pub fn seeded(seed: u64, start: Epoch) -> Self {
        Self {
            seed: Some(seed),
            deterministic: true,
            start,
        }
    }
}

/// All detections across all sensors for one simulation tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionBundle {
    pub epoch: Epoch,
    pub sensor_count: usize,
    pub entity_count: usize,
    pub detections: Vec<Detection>,
    /// Seconds elapsed since the simulation start.
    pub elapsed_s: f64,
}

/// Static simulation description for the dashboard read model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationInfo {
    pub start: Epoch,
    pub deterministic: bool,
    pub seed: Option<u64>,
    pub sensors: Vec<SensorInfo>,
    pub entities: Vec<(String, String, String)>,
}

/// Everything an entity may specify when joining the simulation. Unset
/// fields fall back to deterministic defaults drawn from the engine.
#[derive(Clone, Debug, Default)]
pub struct EntitySpec {
    pub id: Option<String>,
    pub characteristics: Option<EntityCharacteristics>,
    pub initial_position: Option<Coordinates>,
    pub initial_velocity: Option<Velocity>,
    pub trajectory: TrajectoryKind,
    pub parameters: TrajectoryParameters,
    pub created: Option<Epoch>,
}

/// Coordinates several radar sensors observing several concurrent entities.
/// With deterministic mode enabled and a seed set, every emitted bit is a
/// pure function of the seed and the tick sequence.
#[derive(Clone, Debug)]
pub struct SimulationEngine {
    pub cfg: SurveillanceConfig,
    sim: SimConfig,
    sensors: Vec<RadarSensor>,
    entities: Vec<SimulatedEntity>,
    rng: Pcg64Mcg,
}

impl SimulationEngine {
    pub fn new(cfg: SurveillanceConfig, sim: SimConfig) -> Self {
        let rng = match (sim.deterministic, sim.seed.or(cfg.seed)) {
            (true, Some(seed)) => Pcg64Mcg::seed_from_u64(seed),
            _ => Pcg64Mcg::from_entropy(),
        };

        info!(
            "simulation engine start {} (deterministic: {}, seed: {:?})",
            sim.start, sim.deterministic, sim.seed
        );

        Self {
            cfg,
            sim,
            sensors: Vec::new(),
            entities: Vec::new(),
            rng,
        }
    }

    /// Adds a radar sensor. The sensor inherits the engine seed unless it is
    /// given one of its own, so each sensor owns an independent, replayable
    /// noise stream.
    pub fn add_sensor(
        &mut self,
        sensor_id: &str,
        position: Coordinates,
        detection_range_m: Option<f64>,
        update_rate_hz: Option<f64>,
        seed: Option<u64>,
    ) {
        let mut defaults = self.cfg.sensor.clone();
        if let Some(range) = detection_range_m {
            defaults.detection_range_m = range;
        }
        if let Some(rate) = update_rate_hz {
            defaults.update_rate_hz = rate;
        }
        let sensor_seed = seed.or(self.sim.seed).or(self.cfg.seed);

        let sensor = RadarSensor::new(sensor_id.to_string(), position, &defaults, sensor_seed);
        info!("added {sensor}");
        self.sensors.push(sensor);
    }

    /// Adds a simulated entity, filling any unset field from deterministic
    /// defaults: an id minted from the engine PRNG, commercial aircraft
    /// characteristics, a pose within 10 to 100 km of the origin at the
    /// archetype altitude, and a 45 degree heading at the typical speed.
    pub fn add_entity(&mut self, spec: EntitySpec) -> String {
        let characteristics = spec
            .characteristics
            .unwrap_or_else(EntityCharacteristics::commercial_aircraft);

        let id = spec.id.unwrap_or_else(|| {
            let mut bytes = [0u8; 16];
            self.rng.fill_bytes(&mut bytes);
            let uuid = Builder::from_random_bytes(bytes).into_uuid();
            format!("entity_{}", &uuid.simple().to_string()[..8])
        });

        let initial_position = spec.initial_position.unwrap_or_else(|| {
            let angle = self.rng.gen_range(0.0..std::f64::consts::TAU);
            let distance = self.rng.gen_range(10_000.0..100_000.0);
            Coordinates::new(
                distance * angle.cos(),
                distance * angle.sin(),
                characteristics.typical_altitude_m,
            )
        });

        let initial_velocity = spec.initial_velocity.unwrap_or_else(|| {
            let speed = characteristics.typical_speed_mps;
            Velocity::new(speed * 0.707, speed * 0.707, 0.0)
        });

        let entity = SimulatedEntity {
            id: id.clone(),
            characteristics,
            initial_position,
            initial_velocity,
            trajectory: spec.trajectory,
            parameters: spec.parameters,
            created: spec.created.unwrap_or(self.sim.start),
        };
        info!("added {entity}");
        self.entities.push(entity);

        id
    }

    /// Runs one simulation tick: every sensor observes every entity, and the
    /// surviving detections are bundled in sensor insertion order.
    pub fn simulate_step(&mut self, epoch: Epoch) -> DetectionBundle {
        let mut detections = Vec::new();
        for sensor in self.sensors.iter_mut() {
            detections.extend(sensor.detect_entities(epoch, &self.entities));
        }

        DetectionBundle {
            epoch,
            sensor_count: self.sensors.len(),
            entity_count: self.entities.len(),
            detections,
            elapsed_s: (epoch - self.sim.start).to_seconds(),
        }
    }

    /// Runs [simulate_step] over an inclusive time span at a fixed step.
    pub fn simulate_range(&mut self, start: Epoch, end: Epoch, step: Duration) -> Vec<DetectionBundle> {
        TimeSeries::inclusive(start, end, step)
            .map(|epoch| self.simulate_step(epoch))
            .collect()
    }

    pub fn sensors(&self) -> &[RadarSensor] {
        &self.sensors
    }

    pub fn entities(&self) -> &[SimulatedEntity] {
        &self.entities
    }

    pub fn clear_sensors(&mut self) {
        self.sensors.clear();
    }

    pub fn clear_entities(&mut self) {
        self.entities.clear();
    }

    pub fn info(&self) -> SimulationInfo {
        SimulationInfo {
            start: self.sim.start,
            deterministic: self.sim.deterministic,
            seed: self.sim.seed,
            sensors: self.sensors.iter().map(|s| s.info()).collect(),
            entities: self
                .entities
                .iter()
                .map(|e| {
                    (
                        e.id.clone(),
                        e.characteristics.kind.to_string(),
                        e.trajectory.to_string(),
                    )
                })
                .collect(),
        }
    }
}

impl fmt::Display for SimulationEngine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Simulation with {} sensors and {} entities from {}",
            self.sensors.len(),
            self.entities.len(),
            self.sim.start
        )
    }
}
