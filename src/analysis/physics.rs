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

//! Validation of observed motion against classical physics limits.

use crate::cfg::PhysicsLimits;
use crate::kinematics::{Coordinates, Velocity};
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhysicsViolationType {
    ExcessiveAcceleration,
    ExcessiveSpeed,
    ImpossibleVelocityChange,
    ImpossiblePositionChange,
}

impl fmt::Display for PhysicsViolationType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ExcessiveAcceleration => write!(f, "EXCESSIVE_ACCELERATION"),
            Self::ExcessiveSpeed => write!(f, "EXCESSIVE_SPEED"),
            Self::ImpossibleVelocityChange => write!(f, "IMPOSSIBLE_VELOCITY_CHANGE"),
            Self::ImpossiblePositionChange => write!(f, "IMPOSSIBLE_POSITION_CHANGE"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsValidationResult {
    pub is_valid: bool,
    /// Unique violation kinds, in first-seen order.
    pub violations: Vec<PhysicsViolationType>,
    pub max_acceleration_mps2: f64,
    pub max_speed_mps: f64,
    pub average_acceleration_mps2: f64,
    pub reasoning: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsValidator {
    pub max_acceleration_mps2: f64,
    pub max_speed_mps: f64,
    pub max_velocity_change_mps: f64,
}

impl Default for PhysicsValidator {
    fn default() -> Self {
        Self::from(&PhysicsLimits::default())
    }
}

impl From<&PhysicsLimits> for PhysicsValidator {
    fn from(limits: &PhysicsLimits) -> Self {
        Self {
            max_acceleration_mps2: limits.max_acceleration_mps2,
            max_speed_mps: limits.max_speed_mps,
            max_velocity_change_mps: limits.max_velocity_change_mps,
        }
    }
}

impl PhysicsValidator {
    /// Validates a motion sequence. Missing timestamps assume one second
    /// spacing. Fewer than two samples is a soft pass with a note, never an
    /// error.
    pub fn validate_motion(
        &self,
        positions: &[Coordinates],
        velocities: &[Velocity],
        timestamps_s: Option<&[f64]>,
    ) -> PhysicsValidationResult {
        if positions.len() < 2 || velocities.len() < 2 {
            return PhysicsValidationResult {
                is_valid: true,
                violations: Vec::new(),
                max_acceleration_mps2: 0.0,
                max_speed_mps: 0.0,
                average_acceleration_mps2: 0.0,
                reasoning: "Insufficient data for validation".to_string(),
            };
        }

        let default_times: Vec<f64>;
        let times: &[f64] = match timestamps_s {
            Some(times) => times,
            None => {
                default_times = (0..positions.len()).map(|i| i as f64).collect();
                &default_times
            }
        };

        let mut violations = Vec::new();
        let mut accelerations = Vec::new();
        let mut speeds = Vec::new();

        for velocity in velocities {
            let speed = velocity.speed();
            speeds.push(speed);
            if speed > self.max_speed_mps {
                push_unique(&mut violations, PhysicsViolationType::ExcessiveSpeed);
            }
        }

        for i in 1..velocities.len() {
            let delta = velocities[i] - velocities[i - 1];
            let velocity_change = delta.speed();
            let dt = step_duration(times, i);

            let acceleration = velocity_change / dt;
            accelerations.push(acceleration);

            if acceleration > self.max_acceleration_mps2 {
                push_unique(&mut violations, PhysicsViolationType::ExcessiveAcceleration);
            }
            if velocity_change > self.max_velocity_change_mps {
                push_unique(&mut violations, PhysicsViolationType::ImpossibleVelocityChange);
            }
        }

        for i in 1..positions.len() {
            let distance = positions[i].distance_to(&positions[i - 1]);
            let dt = step_duration(times, i);
            if distance / dt > self.max_speed_mps {
                push_unique(&mut violations, PhysicsViolationType::ImpossiblePositionChange);
            }
        }

        let max_acceleration = accelerations.iter().cloned().fold(0.0, f64::max);
        let max_speed = speeds.iter().cloned().fold(0.0, f64::max);
        let average_acceleration = if accelerations.is_empty() {
            0.0
        } else {
            accelerations.iter().sum::<f64>() / accelerations.len() as f64
        };

        let is_valid = violations.is_empty();
        let reasoning = self.reasoning(&violations, max_acceleration, max_speed, average_acceleration);

        PhysicsValidationResult {
            is_valid,
            violations,
            max_acceleration_mps2: max_acceleration,
            max_speed_mps: max_speed,
            average_acceleration_mps2: average_acceleration,
            reasoning,
        }
    }

    /// Validates one motion step between two samples.
    pub fn validate_single_step(
        &self,
        previous_position: Coordinates,
        current_position: Coordinates,
        previous_velocity: Velocity,
        current_velocity: Velocity,
        dt: f64,
    ) -> PhysicsValidationResult {
        self.validate_motion(
            &[previous_position, current_position],
            &[previous_velocity, current_velocity],
            Some(&[0.0, dt]),
        )
    }

    fn reasoning(
        &self,
        violations: &[PhysicsViolationType],
        max_acceleration: f64,
        max_speed: f64,
        average_acceleration: f64,
    ) -> String {
        let mut out = String::new();
        if violations.is_empty() {
            let _ = writeln!(out, "Motion is physically valid.");
        } else {
            let _ = writeln!(out, "Motion violations detected: {}", violations.len());
            for violation in violations {
                let _ = writeln!(out, "  - {violation}");
            }
        }
        let _ = writeln!(out, "Statistics:");
        let _ = writeln!(out, "  - Maximum acceleration: {max_acceleration:.2} m/s^2");
        let _ = writeln!(out, "  - Maximum speed: {max_speed:.2} m/s");
        let _ = writeln!(out, "  - Average acceleration: {average_acceleration:.2} m/s^2");
        let _ = writeln!(out, "Limits:");
        let _ = writeln!(out, "  - Maximum acceleration: {} m/s^2", self.max_acceleration_mps2);
        let _ = writeln!(out, "  - Maximum speed: {} m/s", self.max_speed_mps);
        out
    }
}

fn step_duration(times: &[f64], i: usize) -> f64 {
    let dt = times[i] - times[i - 1];
    if dt <= 0.0 {
        1.0
    } else {
        dt
    }
}

fn push_unique(violations: &mut Vec<PhysicsViolationType>, violation: PhysicsViolationType) {
    if !violations.contains(&violation) {
        violations.push(violation);
    }
}
