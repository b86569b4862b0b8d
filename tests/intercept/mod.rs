use argus::prelude::*;
use rstest::*;

#[fixture]
fn start() -> Epoch {
    Epoch::from_gregorian_utc_at_midnight(2024, 3, 1)
}

#[fixture]
fn analyzer() -> FeasibilityAnalyzer {
    FeasibilityAnalyzer::new(SurveillanceConfig::default().feasibility)
}

#[rstest]
fn inbound_aircraft_is_at_least_feasible(start: Epoch, analyzer: FeasibilityAnalyzer) {
    let result = analyzer.assess_feasibility(
        Coordinates::ZERO,
        Velocity::ZERO,
        Coordinates::new(30_000.0, 0.0, 8_000.0),
        Velocity::new(-300.0, 0.0, 0.0),
        start,
    );

    assert!(result.feasibility_level >= FeasibilityLevel::Feasible);
    assert!(result.geometry.closing_velocity_mps > 0.0);
    assert!(result.geometry.range_rate_mps < 0.0);
    assert!((0.0..=1.0).contains(&result.feasibility_probability));
    assert!(result.closest_approach.time_to_closest_approach_s > 0.0);
    assert!(!result.constraint_statement.is_empty());
}

#[rstest]
fn in_band_inbound_ranges_are_all_feasible(start: Epoch, analyzer: FeasibilityAnalyzer) {
    let at_range = |x_m: f64| {
        analyzer.assess_feasibility(
            Coordinates::ZERO,
            Velocity::ZERO,
            Coordinates::new(x_m, 0.0, 8_000.0),
            Velocity::new(-300.0, 0.0, 0.0),
            start,
        )
    };

    for x_km in [150.0, 100.0, 60.0, 30.0] {
        let result = at_range(x_km * 1e3);
        assert!(
            result.feasibility_level >= FeasibilityLevel::Feasible,
            "unexpected level at {x_km} km"
        );
    }

    // Beyond the feasible range band, the range factor drops out entirely.
    let beyond = at_range(300_000.0);
    let mid_band = at_range(100_000.0);
    assert!(beyond.feasibility_probability < mid_band.feasibility_probability);
}

#[rstest]
fn risk_envelope_report_is_consistent_with_geometry(start: Epoch, analyzer: FeasibilityAnalyzer) {
    let result = analyzer.assess_feasibility(
        Coordinates::ZERO,
        Velocity::ZERO,
        Coordinates::new(100_000.0, 0.0, 5_000.0),
        Velocity::new(-400.0, 0.0, 0.0),
        start,
    );

    let envelope = &result.risk_envelope;
    assert_eq!(envelope.envelope_radius_m, 50_000.0);
    assert!(!envelope.is_within_envelope);
    // Closing at 400 m/s from 100 km: the 50 km envelope is reached in
    // roughly two minutes.
    let eta = envelope.time_to_envelope_s.unwrap();
    assert!((100.0..200.0).contains(&eta), "eta {eta}");
    assert!(envelope.penetration_probability > 0.5);
    assert_ne!(envelope.risk_level, RiskLevel::MinimalRisk);
}

#[rstest]
fn tracked_target_feeds_the_feasibility_analyzer(start: Epoch, analyzer: FeasibilityAnalyzer) {
    let cfg = SurveillanceConfig::default();
    let mut engine = SimulationEngine::new(cfg.clone(), SimConfig::seeded(41, start));
    engine.add_sensor("radar_main", Coordinates::ZERO, None, None, None);
    engine.add_entity(EntitySpec {
        characteristics: Some(EntityCharacteristics::military_aircraft()),
        initial_position: Some(Coordinates::new(45_000.0, 5_000.0, 8_000.0)),
        initial_velocity: Some(Velocity::new(-350.0, -30.0, 0.0)),
        trajectory: TrajectoryKind::Approaching,
        ..Default::default()
    });
    let mut tracker = MultiTargetTracker::with_seed(cfg.tracker, 41);

    let mut tracks = Vec::new();
    for step in 0..=15 {
        let bundle = engine.simulate_step(start + (step as f64).seconds());
        tracks = tracker.update(&bundle.detections, bundle.epoch);
    }
    assert_eq!(tracks.len(), 1);
    let track = &tracks[0];

    let result = analyzer.assess_feasibility(
        cfg.zones.origin,
        Velocity::ZERO,
        track.position,
        track.velocity.unwrap(),
        track.last_updated,
    );

    assert!(result.geometry.closing_velocity_mps > 0.0);
    assert!(result.feasibility_level > FeasibilityLevel::NotFeasible);
    assert!(result.risk_envelope.penetration_probability > 0.0);
}
