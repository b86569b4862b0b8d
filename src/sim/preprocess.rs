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

//! Optional detection cleaning stages, run in order: validation, outlier
//! rejection, noise reduction, and normalization. Fail-safe throughout: a
//! record that cannot be cleaned is dropped, never repaired in place.

use crate::msr::Detection;
use serde_derive::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmoothingMethod {
    #[default]
    MovingAverage,
    Median,
    Exponential,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preprocessor {
    pub method: SmoothingMethod,
    pub moving_average_window: usize,
    pub median_window: usize,
    pub exponential_alpha: f64,
    /// A position component farther than this many scaled median absolute
    /// deviations from the window median is rejected as an outlier.
    pub outlier_sigma: f64,
    /// Unit-interval fields that drifted out of range by at most this much
    /// are re-clamped; beyond it, the record is dropped.
    pub normalize_tolerance: f64,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self {
            method: SmoothingMethod::MovingAverage,
            moving_average_window: 5,
            median_window: 5,
            exponential_alpha: 0.3,
            outlier_sigma: 3.0,
            normalize_tolerance: 0.05,
        }
    }
}

/// Consistency factor mapping a median absolute deviation to a Gaussian
/// standard deviation.
const MAD_TO_SIGMA: f64 = 1.4826;

impl Preprocessor {
    /// Rejects malformed records: non-finite poses or unit-interval fields
    /// out of range.
    pub fn validate(&self, batch: &[Detection]) -> Vec<Detection> {
        batch
            .iter()
            .filter(|d| {
                let ok = d.is_well_formed();
                if !ok {
                    debug!("dropping malformed detection from {}", d.sensor_id);
                }
                ok
            })
            .cloned()
            .collect()
    }

    /// Rejects records whose position deviates from its neighborhood by more
    /// than `outlier_sigma` robust standard deviations in any component.
    /// Rejection only: surviving records are byte-identical to their inputs.
    pub fn reject_outliers(&self, batch: &[Detection]) -> Vec<Detection> {
        if batch.len() < self.median_window {
            return batch.to_vec();
        }

        let mut kept = Vec::with_capacity(batch.len());
        'records: for (idx, detection) in batch.iter().enumerate() {
            for component in [component_x, component_y, component_z] {
                let window = window_values(batch, idx, self.median_window, component);
                let center = median(&window);
                let deviations: Vec<f64> = window.iter().map(|v| (v - center).abs()).collect();
                let mad = median(&deviations) * MAD_TO_SIGMA;
                if mad > 0.0 && (component(detection) - center).abs() > self.outlier_sigma * mad {
                    debug!(
                        "dropping outlier detection from {} at {}",
                        detection.sensor_id, detection.epoch
                    );
                    continue 'records;
                }
            }
            kept.push(detection.clone());
        }

        kept
    }

    /// Smooths the three position components of a batch with the configured
    /// method. Produces new records; the inputs are untouched.
    pub fn smooth_positions(&self, batch: &[Detection]) -> Vec<Detection> {
        let mut out = batch.to_vec();
        for (extract, apply) in [
            (component_x as fn(&Detection) -> f64, set_x as fn(&mut Detection, f64)),
            (component_y, set_y),
            (component_z, set_z),
        ] {
            let values: Vec<f64> = batch.iter().map(extract).collect();
            for (detection, value) in out.iter_mut().zip(self.smooth_series(&values)) {
                apply(detection, value);
            }
        }
        out
    }

    /// Smooths the three velocity components of a batch with the configured
    /// method.
    pub fn smooth_velocities(&self, batch: &[Detection]) -> Vec<Detection> {
        let mut out = batch.to_vec();
        for (extract, apply) in [
            (component_vx as fn(&Detection) -> f64, set_vx as fn(&mut Detection, f64)),
            (component_vy, set_vy),
            (component_vz, set_vz),
        ] {
            let values: Vec<f64> = batch.iter().map(extract).collect();
            for (detection, value) in out.iter_mut().zip(self.smooth_series(&values)) {
                apply(detection, value);
            }
        }
        out
    }

    /// Re-clamps unit-interval fields within tolerance of their range; drops
    /// any record farther out than that.
    pub fn normalize(&self, batch: &[Detection]) -> Vec<Detection> {
        let lo = -self.normalize_tolerance;
        let hi = 1.0 + self.normalize_tolerance;

        batch
            .iter()
            .filter_map(|d| {
                let fields = [d.signal_strength, d.confidence, d.uncertainty];
                if fields.iter().any(|v| !(lo..=hi).contains(v)) {
                    debug!("dropping unnormalizable detection from {}", d.sensor_id);
                    return None;
                }
                let mut clean = d.clone();
                clean.signal_strength = clean.signal_strength.clamp(0.0, 1.0);
                clean.confidence = clean.confidence.clamp(0.0, 1.0);
                clean.uncertainty = clean.uncertainty.clamp(0.0, 1.0);
                Some(clean)
            })
            .collect()
    }

    /// Runs all stages in order on a single-track batch.
    pub fn run(&self, batch: &[Detection]) -> Vec<Detection> {
        let validated = self.validate(batch);
        let inliers = self.reject_outliers(&validated);
        let positions = self.smooth_positions(&inliers);
        let velocities = self.smooth_velocities(&positions);
        self.normalize(&velocities)
    }

    fn smooth_series(&self, values: &[f64]) -> Vec<f64> {
        match self.method {
            SmoothingMethod::MovingAverage => {
                if values.len() < self.moving_average_window {
                    return values.to_vec();
                }
                (0..values.len())
                    .map(|i| {
                        let window = centered_window(values, i, self.moving_average_window);
                        window.iter().sum::<f64>() / window.len() as f64
                    })
                    .collect()
            }
            SmoothingMethod::Median => {
                if values.len() < self.median_window {
                    return values.to_vec();
                }
                (0..values.len())
                    .map(|i| median(centered_window(values, i, self.median_window)))
                    .collect()
            }
            SmoothingMethod::Exponential => {
                let mut smoothed = Vec::with_capacity(values.len());
                let mut prev: Option<f64> = None;
                for &value in values {
                    let next = match prev {
                        None => value,
                        Some(prev) => self.exponential_alpha * value + (1.0 - self.exponential_alpha) * prev,
                    };
                    smoothed.push(next);
                    prev = Some(next);
                }
                smoothed
            }
        }
    }
}

fn centered_window(values: &[f64], index: usize, window: usize) -> &[f64] {
    let start = index.saturating_sub(window / 2);
    let end = (index + window / 2 + 1).min(values.len());
    &values[start..end]
}

fn window_values(
    batch: &[Detection],
    index: usize,
    window: usize,
    component: fn(&Detection) -> f64,
) -> Vec<f64> {
    let start = index.saturating_sub(window / 2);
    let end = (index + window / 2 + 1).min(batch.len());
    batch[start..end].iter().map(component).collect()
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn component_x(d: &Detection) -> f64 {
    d.position.x
}
fn component_y(d: &Detection) -> f64 {
    d.position.y
}
fn component_z(d: &Detection) -> f64 {
    d.position.z
}
fn component_vx(d: &Detection) -> f64 {
    d.velocity.vx
}
fn component_vy(d: &Detection) -> f64 {
    d.velocity.vy
}
fn component_vz(d: &Detection) -> f64 {
    d.velocity.vz
}
fn set_x(d: &mut Detection, v: f64) {
    d.position.x = v;
}
fn set_y(d: &mut Detection, v: f64) {
    d.position.y = v;
}
fn set_z(d: &mut Detection, v: f64) {
    d.position.z = v;
}
fn set_vx(d: &mut Detection, v: f64) {
    d.velocity.vx = v;
}
fn set_vy(d: &mut Detection, v: f64) {
    d.velocity.vy = v;
}
fn set_vz(d: &mut Detection, v: f64) {
    d.velocity.vz = v;
}

#[cfg(test)]
mod preprocess_ut {
    use super::*;
    use crate::kinematics::{Coordinates, Velocity};
    use crate::msr::SensorKind;
    use crate::sim::entity::{EntityKind, SizeClass};
    use hifitime::{Epoch, TimeUnits};

    fn detection(step: usize, x: f64) -> Detection {
        Detection {
            sensor_id: "radar_main".to_string(),
            sensor_kind: SensorKind::Radar,
            epoch: Epoch::from_gregorian_utc_at_midnight(2024, 3, 1) + (step as f64).seconds(),
            entity_id: "entity_cafe0000".to_string(),
            position: Coordinates::new(x, 0.0, 1_000.0),
            velocity: Velocity::new(10.0, 0.0, 0.0),
            signal_strength: 0.8,
            confidence: 0.9,
            uncertainty: 0.2,
            distance_from_sensor_m: x,
            entity_kind: EntityKind::Drone,
            radar_cross_section: 0.1,
            size: SizeClass::Small,
        }
    }

    #[test]
    fn validation_rejects_non_finite() {
        let pre = Preprocessor::default();
        let mut bad = detection(0, 100.0);
        bad.position.x = f64::NAN;
        let batch = vec![detection(0, 100.0), bad];
        assert_eq!(pre.validate(&batch).len(), 1);
    }

    #[test]
    fn outliers_are_rejected_not_repaired() {
        let pre = Preprocessor::default();
        let mut batch: Vec<Detection> = (0..9).map(|i| detection(i, 100.0 + i as f64 * 10.0)).collect();
        // One wild jump in the middle.
        batch[4].position.x = 50_000.0;
        let kept = pre.reject_outliers(&batch);
        assert_eq!(kept.len(), 8);
        // Survivors are untouched.
        assert_eq!(kept[0], batch[0]);
        assert!(kept.iter().all(|d| d.position.x < 1_000.0));
    }

    #[test]
    fn moving_average_smooths_constant_series_exactly() {
        let pre = Preprocessor::default();
        let batch: Vec<Detection> = (0..6).map(|i| detection(i, 500.0)).collect();
        let smoothed = pre.smooth_positions(&batch);
        for d in &smoothed {
            assert_eq!(d.position.x, 500.0);
        }
    }

    #[test]
    fn short_batches_pass_through() {
        let pre = Preprocessor::default();
        let batch: Vec<Detection> = (0..3).map(|i| detection(i, 100.0 * i as f64)).collect();
        assert_eq!(pre.smooth_positions(&batch), batch);
        assert_eq!(pre.reject_outliers(&batch), batch);
    }

    #[test]
    fn exponential_smoothing_tracks_with_lag() {
        let pre = Preprocessor {
            method: SmoothingMethod::Exponential,
            ..Default::default()
        };
        let batch: Vec<Detection> = vec![detection(0, 0.0), detection(1, 100.0)];
        let smoothed = pre.smooth_positions(&batch);
        assert_eq!(smoothed[0].position.x, 0.0);
        assert!((smoothed[1].position.x - 30.0).abs() < 1e-12);
    }

    #[test]
    fn normalize_drops_far_out_of_range() {
        let pre = Preprocessor::default();
        let mut drifted = detection(0, 100.0);
        drifted.confidence = 1.02;
        let mut broken = detection(1, 100.0);
        broken.confidence = 1.5;
        let cleaned = pre.normalize(&[drifted, broken]);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].confidence, 1.0);
    }
}
