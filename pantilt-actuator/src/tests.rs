//! Integration tests for pantilt-actuator

use std::sync::Arc;

use crate::*;
use crate::types::{ANGLE_MARGIN, MAX_ANGLE, MIN_ANGLE, STEP_WAIT};
use pantilt_core::timing::RecordingSleeper;
use pantilt_core::traits::{Actuator, ActuatorStatus};

fn percent_of(event: &PwmEvent) -> f64 {
    match event {
        PwmEvent::DutyCycle { duty_percent, .. } => *duty_percent,
        other => panic!("expected duty command, got {:?}", other),
    }
}

fn ppm_of(event: &PwmEvent) -> u32 {
    match event {
        PwmEvent::HardwarePwm { duty_ppm, .. } => *duty_ppm,
        other => panic!("expected hardware PWM command, got {:?}", other),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CLAMP E CONVERSÃO
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_out_of_range_duty_matches_safe_bound() {
    let sim = SimulatedPwm::new();
    let mut servo = AngleActuator::hardware(ServoConfig::new(18), sim.clone()).unwrap();

    servo.move_to(MIN_ANGLE - 100.0).unwrap();
    servo.move_to(MIN_ANGLE + ANGLE_MARGIN).unwrap();
    servo.move_to(MAX_ANGLE + 100.0).unwrap();
    servo.move_to(MAX_ANGLE - ANGLE_MARGIN).unwrap();

    let cmds = sim.duty_commands(18);
    assert_eq!(cmds.len(), 4);
    assert_eq!(cmds[0], cmds[1]);
    assert_eq!(cmds[2], cmds[3]);
}

#[test]
fn test_backends_are_substitutable() {
    let soft = SimulatedPwm::new();
    let hard = SimulatedPwm::new();
    let mut servos = vec![
        AngleActuator::timed(ServoConfig::new(18), soft.clone()).unwrap(),
        AngleActuator::hardware(ServoConfig::new(19), hard.clone()).unwrap(),
    ];

    for servo in servos.iter_mut() {
        servo.send(0.0).unwrap();
        assert_eq!(servo.status(), ActuatorStatus::Ready);
    }

    assert_eq!(percent_of(&soft.duty_commands(18)[0]), 7.5);
    assert_eq!(ppm_of(&hard.duty_commands(19)[0]), 75_000);
}

#[test]
fn test_percent_has_two_decimals() {
    let sim = SimulatedPwm::new();
    let mut servo = AngleActuator::timed(ServoConfig::new(18), sim.clone()).unwrap();
    servo.move_to(33.3).unwrap();
    let pct = percent_of(&sim.duty_commands(18)[0]);
    assert!(((pct * 100.0).round() - pct * 100.0).abs() < 1e-9);
    assert!((pct - servo.angle_to_duty(33.3) * 100.0).abs() <= 0.005 + 1e-12);
}

#[test]
fn test_ppm_truncates() {
    let sim = SimulatedPwm::new();
    let mut servo = AngleActuator::hardware(ServoConfig::new(18), sim.clone()).unwrap();
    servo.move_to(-85.0).unwrap();
    // 0.05 + 0.05 * 5 / 180 = 0.0513888...
    assert_eq!(ppm_of(&sim.duty_commands(18)[0]), 51_388);
}

// ═══════════════════════════════════════════════════════════════════════════
// TRAJETÓRIAS E TEMPO
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_rotate_duty_sequence_is_monotonic() {
    let sim = SimulatedPwm::new();
    let sleeper = RecordingSleeper::new();
    let mut servo = AngleActuator::with_sleeper(
        ServoConfig::new(18),
        Box::new(HardwarePwm::new(sim.clone())),
        Arc::new(sleeper.clone()),
    )
    .unwrap();

    servo.rotate(-90.0, 90.0, Direction::Forward).unwrap();

    let ppm: Vec<u32> = sim.duty_commands(18).iter().map(ppm_of).collect();
    assert_eq!(ppm.len(), 601);
    assert!(ppm.windows(2).all(|w| w[1] >= w[0]));
    // Extremos presos na faixa segura
    assert_eq!(ppm[0], ppm[10]);
    assert_eq!(sleeper.count_of(STEP_WAIT), 601);
}

#[test]
fn test_lifecycle() {
    let sim = SimulatedPwm::new();
    let mut servo = AngleActuator::timed(ServoConfig::named("tilt", 19), sim.clone()).unwrap();
    assert!(servo.is_acquired());

    servo.move_to(45.0).unwrap();
    servo.move_to(-45.0).unwrap();
    assert_eq!(servo.movement_count(), 2);

    servo.release().unwrap();
    assert!(!servo.is_acquired());
    assert_eq!(servo.send(0.0), Err(ActuatorError::Released));
    assert!(servo.release().is_ok());

    let cleanups = sim
        .events()
        .iter()
        .filter(|e| matches!(e, PwmEvent::Cleanup { .. }))
        .count();
    assert_eq!(cleanups, 1);
}

#[test]
fn test_two_servos_share_backend_driver() {
    let sim = SimulatedPwm::new();
    let mut pan = AngleActuator::hardware(ServoConfig::new(18), sim.clone()).unwrap();
    let mut tilt = AngleActuator::hardware(ServoConfig::new(19), sim.clone()).unwrap();
    pan.move_to(10.0).unwrap();
    tilt.move_to(-10.0).unwrap();
    assert_eq!(sim.duty_commands(18).len(), 1);
    assert_eq!(sim.duty_commands(19).len(), 1);
}
