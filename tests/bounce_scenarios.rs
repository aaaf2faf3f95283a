//! End-to-end scenarios through the public API

use std::f64::consts::TAU;

use curve_bounce::SimConfig;
use curve_bounce::consts::SIM_DT;
use curve_bounce::sim::{
    Ball, ContactPhase, Curve, DetectionMode, NewtonParams, ParametricFunction, Scene, SimEvent,
    SimulationState, find_zero, tick,
};
use glam::DVec2;

fn floor_at(y: f64) -> Vec<Curve> {
    vec![Curve::new(ParametricFunction::horizontal_line(y), 0.0, 200.0, 1.0, false).unwrap()]
}

fn count_began(events: &[SimEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, SimEvent::ContactBegan { .. }))
        .count()
}

#[test]
fn test_flat_line_bounce_reverses_y() {
    for mode in [DetectionMode::default(), DetectionMode::Newton(NewtonParams::default())] {
        let curves = floor_at(105.0);
        let mut ball = Ball::new(1, DVec2::new(100.0, 100.0), 10.0);
        let mut state = SimulationState::new(DVec2::ZERO, DVec2::new(0.0, 5.0));

        let outcome = tick(&mut state, &mut ball, &curves, &mode, SIM_DT);
        assert!(outcome.hit, "{mode:?} should report a hit");
        assert!(state.velocity.y < 0.0, "{mode:?} should send the ball back up");
        assert!((state.velocity.y + 5.0).abs() < 1e-6);
        assert!(state.velocity.x.abs() < 1e-6);
    }
}

#[test]
fn test_far_ball_gets_gravity_only() {
    let curves = floor_at(105.0);
    let mut ball = Ball::new(1, DVec2::new(100.0, -500.0), 10.0);
    let mut state = SimulationState::new(DVec2::new(0.0, 0.5), DVec2::new(1.0, 0.0));

    let outcome = tick(&mut state, &mut ball, &curves, &DetectionMode::default(), SIM_DT);
    assert!(!outcome.hit);
    assert!(outcome.events.is_empty());
    assert_eq!(state.velocity, DVec2::new(1.0, 0.5));
    assert_eq!(ball.center, DVec2::new(101.0, -499.5));
    assert_eq!(state.phase, ContactPhase::Free);
}

#[test]
fn test_resting_contact_debounces() {
    let curves = floor_at(105.0);
    let mut ball = Ball::new(1, DVec2::new(100.0, 100.0), 10.0);
    let mut state = SimulationState::new(DVec2::new(0.0, 0.5), DVec2::ZERO);
    let mode = DetectionMode::default();

    let mut events = Vec::new();
    for _ in 0..5 {
        let outcome = tick(&mut state, &mut ball, &curves, &mode, SIM_DT);
        assert!(outcome.hit);
        events.extend(outcome.events);
    }
    assert_eq!(count_began(&events), 1);
    assert_eq!(state.phase, ContactPhase::Contact);

    // Host lifts the ball clear of the floor
    ball.center.y = 0.0;
    let outcome = tick(&mut state, &mut ball, &curves, &mode, SIM_DT);
    assert!(outcome.contact_changed);
    assert_eq!(state.phase, ContactPhase::Free);
}

#[test]
fn test_closed_unit_circle_sampling() {
    let curve = Curve::new(ParametricFunction::circle(DVec2::ZERO, 1.0), 0.0, TAU, 0.01, true).unwrap();
    let points: Vec<DVec2> = curve.sample().collect();
    let first = points[0];
    let last = points[points.len() - 1];
    assert!((first - last).length() < 0.02);

    let bounds = curve.bounds();
    assert!((bounds.min - DVec2::splat(-1.0)).abs().max_element() < 1e-3);
    assert!((bounds.max - DVec2::splat(1.0)).abs().max_element() < 1e-3);

    assert_eq!(points, curve.sample().collect::<Vec<_>>());
}

#[test]
fn test_newton_and_derivative_properties() {
    let (root, _) = find_zero(1.0, |x| x * x - 2.0, 0.005, 8);
    assert!((root - 2f64.sqrt()).abs() < 1e-4);

    let circle = ParametricFunction::circle(DVec2::ZERO, 1.0);
    let derivative = circle.derivative(0.005);
    for t in [0.0, 0.7, 2.0, 4.5] {
        assert!((derivative.eval(t) - DVec2::new(-t.sin(), t.cos())).length() < 1e-4);
    }
}

#[test]
fn test_config_driven_bowl_run() {
    let config = SimConfig::default();
    let mut scene: Scene = config.build_scene().unwrap();

    let mut events = Vec::new();
    for _ in 0..240 {
        events.extend(scene.step(SIM_DT));
    }
    assert!(count_began(&events) >= 1, "ball should reach the bowl");
    for ball in scene.balls() {
        assert!(ball.center.is_finite());
        assert!(ball.velocity.is_finite());
    }
}

#[test]
fn test_config_json_spawns_graded_balls() {
    let mut config = SimConfig::default();
    config.ball.count = 4;
    config.ball.jitter = 0.5;
    let json = config.to_json().unwrap();

    let scene = SimConfig::from_json(&json).unwrap().build_scene().unwrap();
    let ids: Vec<u32> = scene.balls().map(|b| b.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    for body in &scene.bodies {
        assert_eq!(body.state.velocity, body.ball.velocity);
        assert_eq!(body.state.gravity, config.gravity);
    }
}
