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

//! Multi-target tracker: greedy nearest-neighbour association under a
//! distance gate, Kalman state estimation per track, probabilistic
//! re-classification against the track history, and lifecycle management.

use crate::cfg::TrackerConfig;
use crate::msr::Detection;
use crate::tracking::classifier::Classifier;
use crate::tracking::kalman::KalmanFilter;
use crate::tracking::{Track, TrackState};
use hifitime::Epoch;
use indexmap::IndexMap;
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;
use std::collections::HashSet;
use uuid::Builder;

/// Scale from normalized measurement uncertainty to the measurement noise
/// variance handed to the Kalman update, in meters squared.
const UNCERTAINTY_TO_NOISE_M2: f64 = 100.0;

#[derive(Clone, Debug)]
pub struct MultiTargetTracker {
    pub cfg: TrackerConfig,
    kalman: KalmanFilter,
    classifier: Classifier,
    /// Insertion-ordered, so iteration and state dumps are deterministic.
    tracks: IndexMap<String, Track>,
    rng: Pcg64Mcg,
}

impl MultiTargetTracker {
    pub fn with_seed(cfg: TrackerConfig, seed: u64) -> Self {
        Self::with_rng(cfg, Pcg64Mcg::seed_from_u64(seed))
    }

    pub fn with_rng(cfg: TrackerConfig, rng: Pcg64Mcg) -> Self {
        Self {
            cfg,
            kalman: KalmanFilter::default(),
            classifier: Classifier::default(),
            tracks: IndexMap::new(),
            rng,
        }
    }

    pub fn new(cfg: TrackerConfig) -> Self {
        Self::with_rng(cfg, Pcg64Mcg::from_entropy())
    }

    /// Ingests one tick of detections, in their emission order, and returns
    /// the ACTIVE tracks. Association is greedy nearest-neighbour: each
    /// detection claims the closest non-terminated track within the gate,
    /// and a claimed track cannot take a second detection in the same tick.
    pub fn update(&mut self, detections: &[Detection], now: Epoch) -> Vec<Track> {
        let mut claimed: HashSet<String> = HashSet::new();

        for detection in detections {
            if !detection.position.is_finite() {
                continue;
            }

            let mut best: Option<(String, f64)> = None;
            for (track_id, track) in &self.tracks {
                if track.state == TrackState::Terminated || claimed.contains(track_id) {
                    continue;
                }
                let distance = detection.position.distance_to(&track.position);
                if distance < self.cfg.association_threshold_m
                    && best.as_ref().map_or(true, |(_, d)| distance < *d)
                {
                    best = Some((track_id.clone(), distance));
                }
            }

            match best {
                Some((track_id, _)) => {
                    self.update_track(&track_id, detection, now);
                    claimed.insert(track_id);
                }
                None => {
                    let track_id = self.create_track(detection, now);
                    claimed.insert(track_id);
                }
            }
        }

        self.age_tracks(now);
        self.purge_tracks(now);

        self.tracks
            .values()
            .filter(|t| t.state == TrackState::Active)
            .cloned()
            .collect()
    }

    fn update_track(&mut self, track_id: &str, detection: &Detection, now: Epoch) {
        let track = match self.tracks.get_mut(track_id) {
            Some(track) => track,
            None => return,
        };

        let mut dt = (now - track.kalman.epoch).to_seconds();
        if dt <= 0.0 {
            dt = 1.0;
        }

        let measurement_noise = detection.uncertainty * UNCERTAINTY_TO_NOISE_M2;
        track.kalman = self.kalman.predict_and_update(
            &track.kalman,
            detection.position,
            dt,
            Some(measurement_noise),
        );

        track.push_history(detection.clone());
        track.classification = self.classifier.classify(detection, &track.history);

        track.position = track.kalman.position;
        track.velocity = Some(track.kalman.velocity);
        track.confidence = detection.confidence;
        track.last_updated = now;
        track.update_count += 1;

        // Promotion, and recovery from coasting, are both gated on the
        // update count alone.
        if track.update_count >= self.cfg.min_updates_for_active
            && track.state != TrackState::Active
        {
            info!("{} ACTIVE after {} updates", track.id, track.update_count);
            track.state = TrackState::Active;
        }
    }

    fn create_track(&mut self, detection: &Detection, now: Epoch) -> String {
        let mut bytes = [0u8; 16];
        self.rng.fill_bytes(&mut bytes);
        let uuid = Builder::from_random_bytes(bytes).into_uuid();
        let track_id = format!("track_{}", &uuid.simple().to_string()[..8]);

        let kalman = self
            .kalman
            .initialize(detection.position, Some(detection.velocity), now);
        let history = vec![detection.clone()];
        let classification = self.classifier.classify(detection, &history);

        info!("new track {track_id} from {} at {}", detection.sensor_id, detection.position);

        let track = Track {
            id: track_id.clone(),
            created: now,
            last_updated: now,
            update_count: 1,
            state: TrackState::Initializing,
            position: detection.position,
            velocity: Some(detection.velocity),
            classification,
            confidence: detection.confidence,
            kalman,
            history,
        };
        self.tracks.insert(track_id.clone(), track);

        track_id
    }

    /// Lifecycle transitions at the end of the tick: exactly at half the max
    /// age a track is COASTING, exactly at the max age it is TERMINATED.
    fn age_tracks(&mut self, now: Epoch) {
        for track in self.tracks.values_mut() {
            if track.state == TrackState::Terminated {
                continue;
            }
            let idle = track.time_since_update_s(now);
            if idle >= self.cfg.max_track_age_s {
                info!("{} terminated after {idle:.1} s without an update", track.id);
                track.state = TrackState::Terminated;
            } else if idle >= self.cfg.max_track_age_s / 2.0 {
                if track.state != TrackState::Coasting {
                    debug!("{} coasting after {idle:.1} s without an update", track.id);
                }
                track.state = TrackState::Coasting;
            }
        }
    }

    /// Drops terminated tracks, and their histories with them, once they
    /// have been idle for twice the maximum age.
    fn purge_tracks(&mut self, now: Epoch) {
        let horizon = 2.0 * self.cfg.max_track_age_s;
        self.tracks.retain(|track_id, track| {
            let keep =
                track.state != TrackState::Terminated || track.time_since_update_s(now) <= horizon;
            if !keep {
                debug!("purged {track_id}");
            }
            keep
        });
    }

    /// Tracks in creation order, optionally filtered by state.
    pub fn get_tracks(&self, state: Option<TrackState>) -> Vec<&Track> {
        self.tracks
            .values()
            .filter(|t| state.map_or(true, |s| t.state == s))
            .collect()
    }

    pub fn get_track(&self, track_id: &str) -> Option<&Track> {
        self.tracks.get(track_id)
    }

    pub fn clear_tracks(&mut self) {
        self.tracks.clear();
    }
}
