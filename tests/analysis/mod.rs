use argus::prelude::*;
use rstest::*;

#[fixture]
fn start() -> Epoch {
    Epoch::from_gregorian_utc_at_midnight(2024, 3, 1)
}

/// Runs the transit aircraft of the linear scenarios through the tracker and
/// returns the surviving track.
fn tracked_transit(start: Epoch) -> Track {
    let cfg = SurveillanceConfig::default();
    let mut engine = SimulationEngine::new(cfg.clone(), SimConfig::seeded(31, start));
    engine.add_sensor("radar_main", Coordinates::ZERO, None, None, None);
    engine.add_entity(EntitySpec {
        characteristics: Some(EntityCharacteristics::commercial_aircraft()),
        initial_position: Some(Coordinates::new(70_000.0, 0.0, 10_000.0)),
        initial_velocity: Some(Velocity::new(-200.0, 0.0, 0.0)),
        trajectory: TrajectoryKind::Linear,
        ..Default::default()
    });
    let mut tracker = MultiTargetTracker::with_seed(cfg.tracker, 31);

    for step in 0..=20 {
        let bundle = engine.simulate_step(start + (step as f64).seconds());
        tracker.update(&bundle.detections, bundle.epoch);
    }

    tracker.get_tracks(Some(TrackState::Active))[0].clone()
}

fn history_series(track: &Track, start: Epoch) -> (Vec<Coordinates>, Vec<Velocity>, Vec<f64>) {
    let positions = track.history.iter().map(|d| d.position).collect();
    let velocities = track.history.iter().map(|d| d.velocity).collect();
    let times = track
        .history
        .iter()
        .map(|d| (d.epoch - start).to_seconds())
        .collect();
    (positions, velocities, times)
}

#[rstest]
fn predictor_tracks_the_estimated_state(start: Epoch) {
    let track = tracked_transit(start);
    let predictor = TrajectoryPredictor::from(&SurveillanceConfig::default().predictor);

    let prediction = predictor.predict_constant_velocity(
        track.position,
        track.velocity.unwrap(),
        track.last_updated,
    );

    assert_eq!(prediction.motion_model, MotionModel::ConstantVelocity);
    assert_eq!(prediction.predicted_positions.len(), 61);
    // 60 s of roughly -200 m/s along x.
    let end = prediction.predicted_positions.last().unwrap();
    let expected_x = track.position.x - 200.0 * 60.0;
    assert!((end.x - expected_x).abs() < 1_000.0);
    assert!((0.0..=1.0).contains(&prediction.confidence));
    assert!((0.0..=1.0).contains(&prediction.uncertainty));
}

#[rstest]
fn clean_flight_passes_physics_and_anomaly_checks(start: Epoch) {
    let track = tracked_transit(start);
    let (positions, velocities, times) = history_series(&track, start);

    let validator = PhysicsValidator::default();
    let physics = validator.validate_motion(&positions, &velocities, Some(&times));
    assert!(physics.is_valid, "{}", physics.reasoning);

    let detector = AnomalyDetector::default();
    let anomalies = detector.detect_anomalies(&positions, &velocities, Some(&times));
    assert!(!anomalies.is_anomalous, "{}", anomalies.reasoning);
    assert!(anomalies.note.contains("do not imply hostile intent"));
}

#[rstest]
fn injected_jump_is_a_physics_violation_but_keeps_the_track(start: Epoch) {
    let cfg = SurveillanceConfig::default();
    let mut tracker = MultiTargetTracker::with_seed(cfg.tracker.clone(), 37);

    // Seed a real track, then inject a 4.5 km teleport one second later:
    // well inside the association gate, far outside physical limits.
    let mut engine = SimulationEngine::new(cfg.clone(), SimConfig::seeded(37, start));
    engine.add_sensor("radar_main", Coordinates::ZERO, None, None, None);
    engine.add_entity(EntitySpec {
        characteristics: Some(EntityCharacteristics::drone()),
        initial_position: Some(Coordinates::new(3_000.0, 0.0, 400.0)),
        initial_velocity: Some(Velocity::new(30.0, 0.0, 0.0)),
        trajectory: TrajectoryKind::Linear,
        ..Default::default()
    });

    let bundle = engine.simulate_step(start);
    tracker.update(&bundle.detections, start);

    let later = start + 1.seconds();
    let mut jumped = bundle.detections[0].clone();
    jumped.epoch = later;
    jumped.position.y += 4_500.0;
    tracker.update(&[jumped], later);

    let tracks = tracker.get_tracks(None);
    assert_eq!(tracks.len(), 1, "the jump must update, not fork or delete, the track");
    let track = tracks[0];
    assert_eq!(track.update_count, 2);

    let (positions, velocities, times) = history_series(track, start);
    let validator = PhysicsValidator::default();
    let physics = validator.validate_motion(&positions, &velocities, Some(&times));
    assert!(!physics.is_valid);
    assert!(physics
        .violations
        .contains(&PhysicsViolationType::ImpossiblePositionChange));

    // With a third sample the anomaly detector sees the violation too.
    let mut positions = positions;
    let mut velocities = velocities;
    let mut times = times;
    positions.push(Coordinates::new(
        positions[1].x + 30.0,
        positions[1].y,
        positions[1].z,
    ));
    velocities.push(velocities[1]);
    times.push(times[1] + 1.0);

    let detector = AnomalyDetector::default();
    let anomalies = detector.detect_anomalies(&positions, &velocities, Some(&times));
    assert!(anomalies.is_anomalous);
    assert!(anomalies.anomaly_types.contains(&AnomalyType::PhysicsViolation));
}

#[rstest]
fn proximity_sweep_from_a_live_track(start: Epoch) {
    let track = tracked_transit(start);
    let calculator = ProximityCalculator::new(SurveillanceConfig::default().zones);

    let estimates =
        calculator.calculate_all_zones(track.position, track.velocity.unwrap(), track.last_updated);

    assert_eq!(estimates.len(), 3);
    for estimate in &estimates {
        assert!(estimate.is_approaching, "{} not approaching", estimate.zone_name);
        assert!(estimate.time_to_proximity_s.is_some());
        assert!((0.0..=1.0).contains(&estimate.confidence));
    }
    // The extended boundary comes first on an inbound flight.
    assert!(
        estimates[2].time_to_proximity_s.unwrap() < estimates[0].time_to_proximity_s.unwrap()
    );
}

#[rstest]
fn threat_and_intent_engines_agree_on_advisory_outputs(start: Epoch) {
    let cfg = SurveillanceConfig::default();
    let track = tracked_transit(start);

    let threat_engine = ThreatAssessmentEngine::new(&cfg).unwrap();
    let threat = threat_engine.assess_track(&track, track.last_updated);
    assert!((0.0..=1.0).contains(&threat.risk_score.total));
    assert!(threat.risk_score.lower_bound <= threat.risk_score.total);
    assert!(threat.risk_score.total <= threat.risk_score.upper_bound);
    assert_eq!(threat.risk_score.factors.len(), 6);
    let weight_sum: f64 = threat.risk_score.factors.iter().map(|f| f.weight).sum();
    assert!((weight_sum - 1.0).abs() <= 0.01);
    assert!(!threat.advisory_statement.is_empty());

    let intent_engine = IntentInferenceEngine::new(cfg.intent.clone());
    let intent = intent_engine.infer(&track, None, None, track.last_updated).unwrap();
    let sum = intent.transit_probability + intent.surveillance_probability + intent.hostile_probability;
    assert!(sum <= 1.0 + 1e-6);
    assert!((0.0..=1.0).contains(&intent.intent_confidence));
    assert!(intent.transit_probability > intent.hostile_probability);
    assert!(!intent.reasoning.is_empty());
}
