use approx::assert_relative_eq;
use argus::prelude::*;
use rstest::*;

#[fixture]
fn start() -> Epoch {
    Epoch::from_gregorian_utc_at_midnight(2024, 3, 1)
}

fn pipeline(seed: u64, start: Epoch) -> (SimulationEngine, MultiTargetTracker) {
    let cfg = SurveillanceConfig::default();
    let mut engine = SimulationEngine::new(cfg.clone(), SimConfig::seeded(seed, start));
    engine.add_sensor("radar_main", Coordinates::ZERO, None, None, None);
    let tracker = MultiTargetTracker::with_seed(cfg.tracker, seed);
    (engine, tracker)
}

#[rstest]
fn one_entity_yields_one_persistent_track(start: Epoch) {
    let _ = pretty_env_logger::try_init();

    let (mut engine, mut tracker) = pipeline(5, start);
    engine.add_entity(EntitySpec {
        characteristics: Some(EntityCharacteristics::commercial_aircraft()),
        initial_position: Some(Coordinates::new(60_000.0, 10_000.0, 9_000.0)),
        initial_velocity: Some(Velocity::new(-220.0, 0.0, 0.0)),
        trajectory: TrajectoryKind::Linear,
        ..Default::default()
    });

    let mut first_id = None;
    for step in 0..30 {
        let bundle = engine.simulate_step(start + (step as f64).seconds());
        tracker.update(&bundle.detections, bundle.epoch);

        let tracks = tracker.get_tracks(None);
        assert_eq!(tracks.len(), 1, "spurious track at step {step}");
        match &first_id {
            None => first_id = Some(tracks[0].id.clone()),
            Some(id) => assert_eq!(&tracks[0].id, id, "track identity changed at step {step}"),
        }
    }

    let track = tracker.get_track(first_id.as_ref().unwrap()).unwrap();
    assert_eq!(track.state, TrackState::Active);
    assert_eq!(track.update_count, 30);
    assert_eq!(track.history.len(), argus::TRACK_HISTORY_CAP);
}

#[rstest]
fn track_ids_are_well_formed(start: Epoch) {
    let (mut engine, mut tracker) = pipeline(5, start);
    engine.add_entity(EntitySpec {
        initial_position: Some(Coordinates::new(40_000.0, 0.0, 10_000.0)),
        trajectory: TrajectoryKind::Hover,
        ..Default::default()
    });

    let bundle = engine.simulate_step(start);
    tracker.update(&bundle.detections, start);
    let tracks = tracker.get_tracks(None);
    assert_eq!(tracks.len(), 1);

    let id = &tracks[0].id;
    assert_eq!(id.len(), "track_".len() + 8);
    assert!(id.starts_with("track_"));
    assert!(id["track_".len()..].chars().all(|c| c.is_ascii_hexdigit()));
}

#[rstest]
fn covariance_stays_symmetric_throughout_a_run(start: Epoch) {
    let (mut engine, mut tracker) = pipeline(17, start);
    engine.add_entity(EntitySpec {
        characteristics: Some(EntityCharacteristics::drone()),
        initial_position: Some(Coordinates::new(4_000.0, 2_000.0, 400.0)),
        initial_velocity: Some(Velocity::new(25.0, -10.0, 0.0)),
        trajectory: TrajectoryKind::Linear,
        ..Default::default()
    });

    for step in 0..40 {
        let bundle = engine.simulate_step(start + (step as f64).seconds());
        tracker.update(&bundle.detections, bundle.epoch);

        for track in tracker.get_tracks(None) {
            let p = &track.kalman.covariance;
            let asymmetry = (p - p.transpose()).abs().max();
            assert!(asymmetry <= 1e-9, "asymmetry {asymmetry} at step {step}");
            // Track invariants hold on every tick.
            assert!((0.0..=1.0).contains(&track.confidence));
            assert!(track.history.len() <= argus::TRACK_HISTORY_CAP);
        }
    }
}

#[rstest]
fn estimates_converge_to_the_true_trajectory(start: Epoch) {
    let (mut engine, mut tracker) = pipeline(23, start);
    engine.add_entity(EntitySpec {
        id: Some("entity_truth001".to_string()),
        characteristics: Some(EntityCharacteristics::commercial_aircraft()),
        initial_position: Some(Coordinates::new(50_000.0, 0.0, 10_000.0)),
        initial_velocity: Some(Velocity::new(-200.0, 0.0, 0.0)),
        trajectory: TrajectoryKind::Linear,
        ..Default::default()
    });

    for step in 0..=30 {
        let bundle = engine.simulate_step(start + (step as f64).seconds());
        tracker.update(&bundle.detections, bundle.epoch);
    }

    let truth = Coordinates::new(50_000.0 - 200.0 * 30.0, 0.0, 10_000.0);
    let track = &tracker.get_tracks(Some(TrackState::Active))[0];
    assert!(track.position.distance_to(&truth) < 100.0);
    let velocity = track.velocity.unwrap();
    assert_relative_eq!(velocity.vx, -200.0, epsilon = 10.0);
    assert_relative_eq!(velocity.vy, 0.0, epsilon = 10.0);
}

#[rstest]
fn clear_tracks_resets_the_tracker(start: Epoch) {
    let (mut engine, mut tracker) = pipeline(29, start);
    engine.add_entity(EntitySpec::default());
    let bundle = engine.simulate_step(start);
    tracker.update(&bundle.detections, start);
    assert!(!tracker.get_tracks(None).is_empty());

    tracker.clear_tracks();
    assert!(tracker.get_tracks(None).is_empty());
}
