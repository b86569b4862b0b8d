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
use crate::sim::entity::{EntityKind, SizeClass};
use hifitime::Epoch;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    Radar,
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Radar => write!(f, "RADAR"),
        }
    }
}

/// One sensor return at a given instant. The entity identifier and
/// characteristics are simulation ground truth carried for validation; a
/// live feed would leave them at their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub sensor_id: String,
    pub sensor_kind: SensorKind,
    pub epoch: Epoch,
    pub entity_id: String,
    pub position: Coordinates,
    pub velocity: Velocity,
    /// Received signal strength in [0, 1].
    pub signal_strength: f64,
    /// Detection confidence in [0, 1]. Always at or above the configured
    /// minimum detection confidence: the sensor never emits below it.
    pub confidence: f64,
    /// Measurement uncertainty in [0, 1], higher is worse.
    pub uncertainty: f64,
    pub distance_from_sensor_m: f64,
    pub entity_kind: EntityKind,
    pub radar_cross_section: f64,
    pub size: SizeClass,
}

impl Detection {
    /// True when every unit-interval field is within [0, 1] and the pose is
    /// finite. The preprocessing layer rejects anything else.
    pub fn is_well_formed(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.distance_from_sensor_m.is_finite()
            && (0.0..=1.0).contains(&self.signal_strength)
            && (0.0..=1.0).contains(&self.confidence)
            && (0.0..=1.0).contains(&self.uncertainty)
    }
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} @ {}: {} (conf {:.2}, sig {:.2})",
            self.sensor_kind, self.sensor_id, self.epoch, self.position, self.confidence,
            self.signal_strength
        )
    }
}
