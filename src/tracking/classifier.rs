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

//! Probabilistic object classification from classical feature scoring. Every
//! result carries its full probability map, an entropy-based uncertainty, and
//! a human-readable reasoning block.

use crate::msr::Detection;
use crate::sim::entity::SizeClass;
use crate::tracking::{ClassificationResult, ObjectType};
use indexmap::IndexMap;
use serde_derive::{Deserialize, Serialize};
use std::fmt::Write;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationFeatures {
    pub speed_mps: f64,
    pub altitude_m: f64,
    pub radar_cross_section: f64,
    /// In [0, 1]; defaults to 0.5 until the history holds two samples.
    pub maneuverability: f64,
    pub size: SizeClass,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Classifier {
    /// Below this maximum probability, the object is forced to
    /// UNKNOWN_OBJECT.
    pub unknown_threshold: f64,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            unknown_threshold: 0.4,
        }
    }
}

impl Classifier {
    pub fn new(unknown_threshold: f64) -> Self {
        Self { unknown_threshold }
    }

    /// Classifies a detection in the context of its track history. The
    /// history is expected to already contain the detection as its last
    /// entry; maneuverability is derived from the last two entries.
    pub fn classify(&self, detection: &Detection, history: &[Detection]) -> ClassificationResult {
        let features = self.extract_features(detection, history);

        let drone = self.drone_score(&features);
        let aircraft = self.aircraft_score(&features);
        let unknown = self.unknown_score(drone, aircraft);

        let total = drone + aircraft + unknown;
        let mut probabilities = IndexMap::new();
        if total > 0.0 {
            probabilities.insert(ObjectType::AerialDrone, drone / total);
            probabilities.insert(ObjectType::Aircraft, aircraft / total);
            probabilities.insert(ObjectType::UnknownObject, unknown / total);
        } else {
            probabilities.insert(ObjectType::AerialDrone, 0.0);
            probabilities.insert(ObjectType::Aircraft, 0.0);
            probabilities.insert(ObjectType::UnknownObject, 1.0);
        }

        // Argmax in map order, first maximum wins.
        let (mut best_type, mut best_p) = (ObjectType::AerialDrone, probabilities[&ObjectType::AerialDrone]);
        for (kind, p) in &probabilities {
            if *p > best_p {
                best_type = *kind;
                best_p = *p;
            }
        }

        let (object_type, probability) = if best_p < self.unknown_threshold {
            (ObjectType::UnknownObject, probabilities[&ObjectType::UnknownObject])
        } else {
            (best_type, best_p)
        };

        let uncertainty = entropy_uncertainty(&probabilities);
        let reasoning = self.reasoning(&features, &probabilities, object_type, probability, uncertainty);

        // The map is normalized above, so construction cannot fail.
        ClassificationResult::new(object_type, probability, uncertainty, probabilities, reasoning)
            .unwrap()
    }

    fn extract_features(&self, detection: &Detection, history: &[Detection]) -> ClassificationFeatures {
        let maneuverability = if history.len() >= 2 {
            let previous = &history[history.len() - 2];
            maneuverability_score(previous, detection)
        } else {
            0.5
        };

        ClassificationFeatures {
            speed_mps: detection.velocity.speed(),
            altitude_m: detection.position.z,
            radar_cross_section: detection.radar_cross_section,
            maneuverability,
            size: detection.size,
        }
    }

    /// Drones: small, low, slow to moderate, agile, faint.
    fn drone_score(&self, features: &ClassificationFeatures) -> f64 {
        let mut score: f64 = 0.0;

        match features.size {
            SizeClass::Small => score += 0.3,
            SizeClass::Medium => score += 0.1,
            SizeClass::Large => {}
        }

        if features.altitude_m < 1_000.0 {
            score += 0.3 * (1.0 - features.altitude_m / 1_000.0);
        } else if features.altitude_m < 2_000.0 {
            score += 0.1 * (1.0 - (features.altitude_m - 1_000.0) / 1_000.0);
        }

        if (20.0..=100.0).contains(&features.speed_mps) {
            let speed_factor = 1.0 - (features.speed_mps - 60.0).abs() / 40.0;
            score += 0.2 * speed_factor.max(0.0);
        } else if features.speed_mps < 20.0 {
            score += 0.1;
        }

        score += 0.2 * features.maneuverability;

        if features.radar_cross_section < 0.3 {
            score += 0.1;
        }

        score.min(1.0)
    }

    /// Aircraft: medium to large, high, fast, steady, bright.
    fn aircraft_score(&self, features: &ClassificationFeatures) -> f64 {
        let mut score: f64 = 0.0;

        match features.size {
            SizeClass::Large => score += 0.3,
            SizeClass::Medium => score += 0.2,
            SizeClass::Small => {}
        }

        if features.altitude_m > 5_000.0 {
            score += 0.3 * ((features.altitude_m - 5_000.0) / 10_000.0).min(1.0);
        } else if features.altitude_m > 2_000.0 {
            score += 0.1 * ((features.altitude_m - 2_000.0) / 3_000.0);
        }

        if (200.0..=400.0).contains(&features.speed_mps) {
            let speed_factor = 1.0 - (features.speed_mps - 300.0).abs() / 100.0;
            score += 0.3 * speed_factor.max(0.0);
        } else if features.speed_mps > 400.0 {
            score += 0.1;
        }

        score += 0.1 * (1.0 - features.maneuverability);

        if features.radar_cross_section > 0.5 {
            score += 0.1;
        }

        score.min(1.0)
    }

    /// Unknown is the complement of the best known match, boosted when the
    /// two known scores are too close to call.
    fn unknown_score(&self, drone: f64, aircraft: f64) -> f64 {
        let mut score = 1.0 - drone.max(aircraft);
        if (drone - aircraft).abs() < 0.2 {
            score += 0.2;
        }
        score.min(1.0)
    }

    fn reasoning(
        &self,
        features: &ClassificationFeatures,
        probabilities: &IndexMap<ObjectType, f64>,
        object_type: ObjectType,
        probability: f64,
        uncertainty: f64,
    ) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Classification: {object_type}");
        let _ = writeln!(out, "Probability: {:.1}%", probability * 100.0);
        let _ = writeln!(out, "Uncertainty: {:.1}%", uncertainty * 100.0);
        let _ = writeln!(out, "Feature analysis:");
        let _ = writeln!(out, "  - Speed: {:.1} m/s", features.speed_mps);
        let _ = writeln!(out, "  - Altitude: {:.1} m", features.altitude_m);
        let _ = writeln!(out, "  - RCS: {:.2}", features.radar_cross_section);
        let _ = writeln!(out, "  - Size: {}", features.size);
        let _ = writeln!(out, "  - Maneuverability: {:.2}", features.maneuverability);
        let _ = writeln!(out, "Probabilities:");
        for (kind, p) in probabilities {
            let _ = writeln!(out, "  - {kind}: {:.1}%", p * 100.0);
        }
        out
    }
}

/// Maneuverability from the speed change and the velocity vector angle
/// change between two consecutive detections.
fn maneuverability_score(previous: &Detection, current: &Detection) -> f64 {
    let speed_change = (current.velocity.speed() - previous.velocity.speed()).abs();
    let angle_change = current.velocity.angle_to(&previous.velocity);

    (speed_change / 50.0 + angle_change / std::f64::consts::PI).min(1.0)
}

/// Shannon entropy of the probability map, normalized by log2 of the class
/// count so a uniform map scores exactly one.
fn entropy_uncertainty(probabilities: &IndexMap<ObjectType, f64>) -> f64 {
    let mut entropy = 0.0;
    for p in probabilities.values() {
        if *p > 0.0 {
            entropy -= p * p.log2();
        }
    }
    let max_entropy = (probabilities.len() as f64).log2();
    if max_entropy > 0.0 {
        (entropy / max_entropy).clamp(0.0, 1.0)
    } else {
        0.0
    }
}
