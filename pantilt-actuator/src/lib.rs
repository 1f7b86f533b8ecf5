//! # 🦾 pantilt-actuator — Servos do suporte pan/tilt
//!
//! Converte um ângulo lógico em comando PWM e o emite por um backend
//! plugável.
//!
//! ## Arquitetura
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              AngleActuator                  │
//! │   clamp (±5°) → duty ratio → backend.set()  │
//! └─────────────────────────────────────────────┘
//!                      ↓
//! ┌──────────────────────┐  ┌───────────────────────┐
//! │      TimedPwm        │  │     HardwarePwm       │
//! │  duty % (2 casas)    │  │  duty em ppm (int)    │
//! └──────────────────────┘  └───────────────────────┘
//!            ↓                          ↓
//!     SoftPwmDriver             HardwarePwmDriver
//!   (rppal / simulado)        (rppal / simulado)
//! ```
//!
//! ## Lei de conversão
//!
//! ```text
//! duty = MIN_DUTY + (MAX_DUTY - MIN_DUTY) * (ângulo - (-90)) / 180
//! MIN_DUTY = 1 ms / 20 ms = 0.05     MAX_DUTY = 2 ms / 20 ms = 0.10
//! ```
//!
//! Sempre normalizada contra os limites absolutos do servo (−90°/+90°),
//! mesmo quando a instância usa uma faixa lógica mais estreita.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use pantilt_actuator::{AngleActuator, Direction, ServoConfig, SimulatedPwm};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut servo = AngleActuator::timed(ServoConfig::named("pan", 18), SimulatedPwm::new())?;
//! servo.move_to(30.0)?;
//! servo.rotate(30.0, 31.0, Direction::Forward)?;
//! servo.cleanup()?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod types;
pub mod pwm;
pub mod sim;
pub mod servo;
pub mod trajectory;

#[cfg(feature = "rpi")]
pub mod rpi;

pub use error::{ActuatorError, ActuatorResult};
pub use types::{Direction, DutyRatio, PwmKind, duty_ratio_for};
pub use pwm::{HardwarePwm, HardwarePwmDriver, PwmBackend, PwmHandle, SoftPwmDriver, TimedPwm};
pub use sim::{PwmEvent, SimulatedPwm};
pub use servo::{AngleActuator, ServoConfig, ServoState};
pub use trajectory::{Segment, Steps, SweepPattern, Trajectory, circle_path};

#[cfg(feature = "rpi")]
pub use rpi::{RppalHardwarePwm, RppalSoftPwm};

#[cfg(test)]
mod tests;
