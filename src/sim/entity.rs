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

use crate::kinematics::{Coordinates, Velocity};
use hifitime::Epoch;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Time step of the finite-difference velocity estimate for trajectories
/// without a closed-form velocity.
const VELOCITY_FINITE_DIFF_S: f64 = 0.1;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    CommercialAircraft,
    MilitaryAircraft,
    Drone,
    Helicopter,
    #[default]
    Unknown,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::CommercialAircraft => write!(f, "COMMERCIAL_AIRCRAFT"),
            Self::MilitaryAircraft => write!(f, "MILITARY_AIRCRAFT"),
            Self::Drone => write!(f, "DRONE"),
            Self::Helicopter => write!(f, "HELICOPTER"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeClass {
    Small,
    #[default]
    Medium,
    Large,
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Small => write!(f, "SMALL"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::Large => write!(f, "LARGE"),
        }
    }
}

/// Physical and behavioral characteristics of a simulated entity, used to
/// shape its radar signature.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityCharacteristics {
    pub kind: EntityKind,
    pub typical_speed_mps: f64,
    pub typical_altitude_m: f64,
    /// Normalized radar cross section in [0, 1].
    pub radar_cross_section: f64,
    /// Ability to change direction, in [0, 1].
    pub maneuverability: f64,
    pub size: SizeClass,
}

impl EntityCharacteristics {
    pub fn commercial_aircraft() -> Self {
        Self {
            kind: EntityKind::CommercialAircraft,
            typical_speed_mps: 250.0,
            typical_altitude_m: 10_000.0,
            radar_cross_section: 0.8,
            maneuverability: 0.2,
            size: SizeClass::Large,
        }
    }

    pub fn military_aircraft() -> Self {
        Self {
            kind: EntityKind::MilitaryAircraft,
            typical_speed_mps: 400.0,
            typical_altitude_m: 8_000.0,
            radar_cross_section: 0.6,
            maneuverability: 0.8,
            size: SizeClass::Medium,
        }
    }

    pub fn drone() -> Self {
        Self {
            kind: EntityKind::Drone,
            typical_speed_mps: 50.0,
            typical_altitude_m: 500.0,
            radar_cross_section: 0.1,
            maneuverability: 0.9,
            size: SizeClass::Small,
        }
    }

    pub fn helicopter() -> Self {
        Self {
            kind: EntityKind::Helicopter,
            typical_speed_mps: 80.0,
            typical_altitude_m: 2_000.0,
            radar_cross_section: 0.4,
            maneuverability: 0.7,
            size: SizeClass::Medium,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrajectoryKind {
    #[default]
    Linear,
    Circular,
    Approaching,
    Departing,
    Patrol,
    Hover,
}

impl fmt::Display for TrajectoryKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "LINEAR"),
            Self::Circular => write!(f, "CIRCULAR"),
            Self::Approaching => write!(f, "APPROACHING"),
            Self::Departing => write!(f, "DEPARTING"),
            Self::Patrol => write!(f, "PATROL"),
            Self::Hover => write!(f, "HOVER"),
        }
    }
}

/// Typed trajectory parameters. Each kind reads only the fields it needs.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectoryParameters {
    /// Circular: orbit radius in meters.
    pub radius_m: f64,
    /// Circular: angular velocity in rad/s.
    pub angular_velocity_rad_s: f64,
    /// Circular: orbit center. None centers the orbit on the XY origin at
    /// the initial altitude.
    pub center: Option<Coordinates>,
    /// Patrol: half-leg length in meters.
    pub patrol_length_m: f64,
    /// Patrol: traversal speed in m/s.
    pub patrol_speed_mps: f64,
    /// Patrol: horizontal direction of the leg, normalized internally.
    pub patrol_direction: (f64, f64),
}

impl Default for TrajectoryParameters {
    fn default() -> Self {
        Self {
            radius_m: 10_000.0,
            angular_velocity_rad_s: 0.001,
            center: None,
            patrol_length_m: 20_000.0,
            patrol_speed_mps: 100.0,
            patrol_direction: (1.0, 0.0),
        }
    }
}

/// A simulated aerial entity. Its pose is a pure function of the elapsed
/// time since creation, so the simulation is replayable from any epoch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulatedEntity {
    pub id: String,
    pub characteristics: EntityCharacteristics,
    pub initial_position: Coordinates,
    pub initial_velocity: Velocity,
    pub trajectory: TrajectoryKind,
    pub parameters: TrajectoryParameters,
    pub created: Epoch,
}

impl SimulatedEntity {
    /// True position at the requested epoch.
    pub fn position_at(&self, epoch: Epoch) -> Coordinates {
        let dt = (epoch - self.created).to_seconds();

        match self.trajectory {
            TrajectoryKind::Linear => self.linear_position(dt),
            TrajectoryKind::Circular => self.circular_position(dt),
            TrajectoryKind::Approaching => self.radial_position(dt, true),
            TrajectoryKind::Departing => self.radial_position(dt, false),
            TrajectoryKind::Patrol => self.patrol_position(dt),
            TrajectoryKind::Hover => self.initial_position,
        }
    }

    /// True velocity at the requested epoch. Linear and hover trajectories
    /// have closed forms; the rest are differentiated numerically.
    pub fn velocity_at(&self, epoch: Epoch) -> Velocity {
        match self.trajectory {
            TrajectoryKind::Linear => self.initial_velocity,
            TrajectoryKind::Hover => Velocity::ZERO,
            _ => {
                let here = self.position_at(epoch);
                let there = self.position_at(epoch + hifitime::Duration::from_seconds(VELOCITY_FINITE_DIFF_S));
                Velocity::new(
                    (there.x - here.x) / VELOCITY_FINITE_DIFF_S,
                    (there.y - here.y) / VELOCITY_FINITE_DIFF_S,
                    (there.z - here.z) / VELOCITY_FINITE_DIFF_S,
                )
            }
        }
    }

    fn linear_position(&self, dt: f64) -> Coordinates {
        Coordinates::new(
            self.initial_position.x + self.initial_velocity.vx * dt,
            self.initial_position.y + self.initial_velocity.vy * dt,
            self.initial_position.z + self.initial_velocity.vz * dt,
        )
    }

    fn circular_position(&self, dt: f64) -> Coordinates {
        let center = self.parameters.center.unwrap_or(Coordinates::new(
            0.0,
            0.0,
            self.initial_position.z,
        ));
        let angle = self.parameters.angular_velocity_rad_s * dt;

        Coordinates::new(
            center.x + self.parameters.radius_m * angle.cos(),
            center.y + self.parameters.radius_m * angle.sin(),
            center.z,
        )
    }

    /// Approaching moves along the unit vector from the initial position to
    /// the XY origin at the initial horizontal speed; departing mirrors it.
    /// The vertical rate is preserved in both cases.
    fn radial_position(&self, dt: f64, towards_origin: bool) -> Coordinates {
        let mut dx = self.initial_position.x;
        let mut dy = self.initial_position.y;
        if towards_origin {
            dx = -dx;
            dy = -dy;
        }
        let distance = (dx * dx + dy * dy).sqrt();
        let speed = self.initial_velocity.horizontal_speed();

        let (dir_x, dir_y) = if distance > 0.0 {
            (dx / distance, dy / distance)
        } else if towards_origin {
            return self.initial_position;
        } else if speed > 0.0 {
            // Departing from the origin itself: fall back to the initial
            // velocity direction.
            (self.initial_velocity.vx / speed, self.initial_velocity.vy / speed)
        } else {
            (1.0, 0.0)
        };

        Coordinates::new(
            self.initial_position.x + dir_x * speed * dt,
            self.initial_position.y + dir_y * speed * dt,
            self.initial_position.z + self.initial_velocity.vz * dt,
        )
    }

    fn patrol_position(&self, dt: f64) -> Coordinates {
        let (raw_x, raw_y) = self.parameters.patrol_direction;
        let magnitude = (raw_x * raw_x + raw_y * raw_y).sqrt();
        let (dir_x, dir_y) = if magnitude > 0.0 {
            (raw_x / magnitude, raw_y / magnitude)
        } else {
            (1.0, 0.0)
        };

        // Sawtooth traversal of the leg, wrapping from +L back to -L.
        let leg = self.parameters.patrol_length_m;
        let traveled = self.parameters.patrol_speed_mps * dt;
        let along = traveled.rem_euclid(2.0 * leg) - leg;

        Coordinates::new(
            self.initial_position.x + dir_x * along,
            self.initial_position.y + dir_y * along,
            self.initial_position.z,
        )
    }
}

impl fmt::Display for SimulatedEntity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} ({}, {} trajectory) from {}",
            self.id, self.characteristics.kind, self.trajectory, self.initial_position
        )
    }
}
