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

use crate::intercept::GeometryAnalysisResult;
use crate::kinematics::{Coordinates, Velocity};

/// Pure relative motion analysis between two kinematic states.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GeometryAnalyzer;

impl GeometryAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Relative position, velocity, range, line of sight, closing velocity,
    /// and the bearing and elevation angles from defender to target.
    pub fn analyze_relative_motion(
        &self,
        defender_position: Coordinates,
        defender_velocity: Velocity,
        target_position: Coordinates,
        target_velocity: Velocity,
    ) -> GeometryAnalysisResult {
        let relative_position = target_position - defender_position;
        let relative_velocity = target_velocity - defender_velocity;

        let range_m = relative_position.norm();
        let line_of_sight = if range_m > 0.0 {
            Coordinates::new(
                relative_position.x / range_m,
                relative_position.y / range_m,
                relative_position.z / range_m,
            )
        } else {
            Coordinates::ZERO
        };

        // Range rate is the radial speed along the line of sight, negative
        // when the target closes; the closing velocity is its negation.
        let range_rate = relative_velocity.vx * line_of_sight.x
            + relative_velocity.vy * line_of_sight.y
            + relative_velocity.vz * line_of_sight.z;

        let horizontal_range = (relative_position.x * relative_position.x
            + relative_position.y * relative_position.y)
            .sqrt();

        let bearing_deg = if range_m > 0.0 && horizontal_range > 0.0 {
            let bearing = relative_position.y.atan2(relative_position.x).to_degrees();
            if bearing < 0.0 {
                bearing + 360.0
            } else {
                bearing
            }
        } else {
            0.0
        };

        let elevation_deg = if range_m > 0.0 {
            if horizontal_range > 0.0 {
                relative_position.z.atan2(horizontal_range).to_degrees()
            } else if relative_position.z > 0.0 {
                90.0
            } else {
                -90.0
            }
        } else {
            0.0
        };

        GeometryAnalysisResult {
            relative_position,
            relative_velocity,
            closing_velocity_mps: -range_rate,
            range_rate_mps: range_rate,
            bearing_deg,
            elevation_deg,
            line_of_sight,
            relative_speed_mps: relative_velocity.speed(),
            range_m,
            horizontal_range_m: horizontal_range,
            vertical_separation_m: relative_position.z,
        }
    }

    /// Time of closest approach under straight-line relative motion:
    /// t = -(r . v) / |v|^2. Zero when there is no relative motion; negative
    /// when the closest approach is in the past.
    pub fn time_to_closest_approach(
        &self,
        relative_position: Coordinates,
        relative_velocity: Velocity,
    ) -> f64 {
        let v_squared = relative_velocity.dot(&relative_velocity);
        if v_squared == 0.0 {
            return 0.0;
        }

        let r_dot_v = relative_position.x * relative_velocity.vx
            + relative_position.y * relative_velocity.vy
            + relative_position.z * relative_velocity.vz;

        -r_dot_v / v_squared
    }

    /// Distance at the closest approach: |r + v t|.
    pub fn closest_approach_distance(
        &self,
        relative_position: Coordinates,
        relative_velocity: Velocity,
        time_to_closest_approach_s: f64,
    ) -> f64 {
        let t = time_to_closest_approach_s;
        Coordinates::new(
            relative_position.x + relative_velocity.vx * t,
            relative_position.y + relative_velocity.vy * t,
            relative_position.z + relative_velocity.vz * t,
        )
        .norm()
    }

    /// Target position at the closest approach, back in the world frame.
    pub fn closest_approach_position(
        &self,
        defender_position: Coordinates,
        relative_position: Coordinates,
        relative_velocity: Velocity,
        time_to_closest_approach_s: f64,
    ) -> Coordinates {
        let t = time_to_closest_approach_s;
        Coordinates::new(
            defender_position.x + relative_position.x + relative_velocity.vx * t,
            defender_position.y + relative_position.y + relative_velocity.vy * t,
            defender_position.z + relative_position.z + relative_velocity.vz * t,
        )
    }
}
