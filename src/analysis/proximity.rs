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

//! Time-to-proximity estimation for the concentric protected zones, from the
//! constant velocity model.

use crate::cfg::ZoneConfig;
use crate::kinematics::{Coordinates, Velocity};
use hifitime::Epoch;
use serde_derive::{Deserialize, Serialize};

/// Distance at which the proximity confidence from range alone reaches zero.
const CONFIDENCE_RANGE_SCALE_M: f64 = 200_000.0;
/// Approach speed at which the velocity part of the confidence saturates.
const CONFIDENCE_SPEED_SCALE_MPS: f64 = 100.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProximityEstimate {
    pub zone_name: String,
    pub zone_radius_m: f64,
    pub current_distance_m: f64,
    /// None when the object is not closing on the zone. Zero when already
    /// inside it.
    pub time_to_proximity_s: Option<f64>,
    pub is_approaching: bool,
    /// Magnitude of the velocity component along the line to the zone
    /// center, in m/s.
    pub approach_velocity_mps: f64,
    pub confidence: f64,
    pub epoch: Epoch,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProximityCalculator {
    pub zones: ZoneConfig,
}

impl ProximityCalculator {
    pub fn new(zones: ZoneConfig) -> Self {
        Self { zones }
    }

    /// Time to reach one zone boundary under constant velocity. Inside the
    /// zone, the time is zero and the object counts as approaching.
    pub fn time_to_zone(
        &self,
        position: Coordinates,
        velocity: Velocity,
        zone_center: Coordinates,
        zone_radius_m: f64,
        zone_name: &str,
        epoch: Epoch,
    ) -> ProximityEstimate {
        let offset = position - zone_center;
        let current_distance = offset.norm();

        if current_distance <= zone_radius_m {
            return ProximityEstimate {
                zone_name: zone_name.to_string(),
                zone_radius_m,
                current_distance_m: current_distance,
                time_to_proximity_s: Some(0.0),
                is_approaching: true,
                approach_velocity_mps: velocity.speed(),
                confidence: 1.0,
                epoch,
            };
        }

        // Velocity component towards the zone center.
        let approach_velocity = if current_distance > 0.0 {
            -(velocity.vx * offset.x + velocity.vy * offset.y + velocity.vz * offset.z)
                / current_distance
        } else {
            0.0
        };

        let is_approaching = approach_velocity > 0.0;
        let time_to_proximity = if is_approaching {
            Some(((current_distance - zone_radius_m) / approach_velocity).max(0.0))
        } else {
            None
        };

        let distance_factor = 1.0 - (current_distance / CONFIDENCE_RANGE_SCALE_M).min(1.0);
        let velocity_factor = if approach_velocity != 0.0 {
            (approach_velocity.abs() / CONFIDENCE_SPEED_SCALE_MPS).min(1.0)
        } else {
            0.0
        };
        let confidence = distance_factor * 0.6 + velocity_factor * 0.4;

        ProximityEstimate {
            zone_name: zone_name.to_string(),
            zone_radius_m,
            current_distance_m: current_distance,
            time_to_proximity_s: time_to_proximity,
            is_approaching,
            approach_velocity_mps: approach_velocity.abs(),
            confidence,
            epoch,
        }
    }

    /// Estimates for the three configured zones, innermost first.
    pub fn calculate_all_zones(
        &self,
        position: Coordinates,
        velocity: Velocity,
        epoch: Epoch,
    ) -> Vec<ProximityEstimate> {
        let center = self.zones.origin;
        vec![
            self.time_to_zone(position, velocity, center, self.zones.critical_radius_m, "CRITICAL_ZONE", epoch),
            self.time_to_zone(position, velocity, center, self.zones.protected_radius_m, "PROTECTED_ZONE", epoch),
            self.time_to_zone(position, velocity, center, self.zones.extended_radius_m, "EXTENDED_ZONE", epoch),
        ]
    }
}
