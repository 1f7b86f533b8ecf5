//! Benchmarks de conversão e trajetória

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pantilt_actuator::{AngleActuator, Direction, ServoConfig, SimulatedPwm, Trajectory, duty_ratio_for};

fn bench_duty_conversion(c: &mut Criterion) {
    c.bench_function("duty_ratio_for", |b| {
        b.iter(|| duty_ratio_for(black_box(42.5)))
    });

    let servo = AngleActuator::hardware(ServoConfig::new(18), SimulatedPwm::new())
        .expect("simulated servo");
    c.bench_function("angle_to_duty_clamped", |b| {
        b.iter(|| servo.angle_to_duty(black_box(-120.0)))
    });
}

fn bench_trajectory(c: &mut Criterion) {
    let trajectory = Trajectory::new(0.3).expect("valid resolution");

    c.bench_function("trajectory_full_range_601_steps", |b| {
        b.iter(|| {
            trajectory
                .steps(black_box(-90.0), black_box(90.0), Direction::Forward)
                .sum::<f64>()
        })
    });

    c.bench_function("trajectory_reverse_599_steps", |b| {
        b.iter(|| {
            trajectory
                .steps(black_box(90.0), black_box(-90.0), Direction::Reverse)
                .count()
        })
    });
}

criterion_group!(benches, bench_duty_conversion, bench_trajectory);
criterion_main!(benches);
