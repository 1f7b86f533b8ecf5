//! Servo de ângulo (SG90) sobre um backend PWM plugável

use std::sync::Arc;

use pantilt_core::timing::{thread_sleeper, Sleeper};
use pantilt_core::traits::{Actuator, ActuatorStatus, MountComponent};
use serde::{Deserialize, Serialize};

use crate::error::{ActuatorError, ActuatorResult};
use crate::pwm::{HardwarePwm, HardwarePwmDriver, PwmBackend, PwmHandle, SoftPwmDriver, TimedPwm};
use crate::trajectory::{SweepPattern, Trajectory};
use crate::types::{
    ANGLE_MARGIN, DEFAULT_STEP_RESOLUTION, Direction, DutyRatio, FREQUENCY_HZ, PwmKind, STEP_WAIT,
    SWING_INTERVAL, duty_ratio_for,
};

/// Configuração do servo. Imutável depois da construção do ator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServoConfig {
    /// Nome do servo (para logs)
    pub name: String,
    /// Pino GPIO (numeração BCM)
    pub gpio_pin: u8,
    /// Limite lógico inferior (graus)
    pub min_angle: i32,
    /// Limite lógico superior (graus)
    pub max_angle: i32,
    /// Graus por passo nas trajetórias
    pub step_resolution: f64,
}

impl ServoConfig {
    pub fn new(gpio_pin: u8) -> Self {
        Self {
            name: format!("servo-{}", gpio_pin),
            gpio_pin,
            ..Default::default()
        }
    }

    pub fn named(name: &str, gpio_pin: u8) -> Self {
        Self {
            name: name.to_string(),
            ..Self::new(gpio_pin)
        }
    }

    /// Centro lógico: `(min + max)` dividido por 2 com arredondamento para
    /// baixo. Só corresponde ao meio real em faixas simétricas.
    pub fn center_angle(&self) -> i32 {
        (self.min_angle + self.max_angle).div_euclid(2)
    }

    pub fn validate(&self) -> ActuatorResult<()> {
        if self.min_angle >= self.max_angle {
            return Err(ActuatorError::InvalidConfig(
                "min_angle must be less than max_angle".into(),
            ));
        }
        Trajectory::new(self.step_resolution)?;
        Ok(())
    }
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            name: "servo".to_string(),
            gpio_pin: 18,
            min_angle: -90,
            max_angle: 90,
            step_resolution: DEFAULT_STEP_RESOLUTION,
        }
    }
}

/// Telemetria do servo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServoState {
    /// Último ângulo comandado (depois do clamp)
    pub last_angle: Option<f64>,
    /// Último duty ratio emitido
    pub last_duty: Option<f64>,
    /// Total de comandos emitidos
    pub movements: u64,
    pub status: ActuatorStatus,
}

impl ServoState {
    fn new() -> Self {
        Self {
            last_angle: None,
            last_duty: None,
            movements: 0,
            status: ActuatorStatus::Ready,
        }
    }
}

/// Servo que converte ângulo lógico em duty PWM.
///
/// ```
/// use pantilt_actuator::{AngleActuator, ServoConfig, SimulatedPwm};
///
/// let sim = SimulatedPwm::new();
/// let mut servo = AngleActuator::hardware(ServoConfig::new(18), sim.clone())?;
/// servo.move_to(200.0)?; // clamp em +85°
/// assert_eq!(servo.state().last_angle, Some(85.0));
/// # Ok::<(), pantilt_actuator::ActuatorError>(())
/// ```
#[derive(Debug)]
pub struct AngleActuator {
    config: ServoConfig,
    backend: Box<dyn PwmBackend>,
    handle: Option<PwmHandle>,
    sleeper: Arc<dyn Sleeper>,
    trajectory: Trajectory,
    state: ServoState,
}

impl AngleActuator {
    /// Cria o ator e adquire o pino. Em falha, nada fica adquirido.
    pub fn new(config: ServoConfig, backend: Box<dyn PwmBackend>) -> ActuatorResult<Self> {
        Self::with_sleeper(config, backend, thread_sleeper())
    }

    pub fn with_sleeper(
        config: ServoConfig,
        mut backend: Box<dyn PwmBackend>,
        sleeper: Arc<dyn Sleeper>,
    ) -> ActuatorResult<Self> {
        config.validate()?;
        let trajectory = Trajectory::new(config.step_resolution)?;

        let handle = match backend.acquire(config.gpio_pin) {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(servo = %config.name, pin = config.gpio_pin, error = %e, "servo setup failed");
                return Err(match e {
                    ActuatorError::AcquisitionFailed { .. } | ActuatorError::PinInUse(_) => e,
                    other => ActuatorError::acquisition(config.gpio_pin, other.to_string()),
                });
            }
        };

        tracing::debug!(servo = %config.name, pin = config.gpio_pin, backend = backend.kind().as_str(), "servo ready");

        Ok(Self {
            config,
            backend,
            handle: Some(handle),
            sleeper,
            trajectory,
            state: ServoState::new(),
        })
    }

    /// Servo sobre PWM por software
    pub fn timed<D: SoftPwmDriver + 'static>(config: ServoConfig, driver: D) -> ActuatorResult<Self> {
        Self::new(config, Box::new(TimedPwm::new(driver)))
    }

    /// Servo sobre PWM de hardware
    pub fn hardware<D: HardwarePwmDriver + 'static>(config: ServoConfig, driver: D) -> ActuatorResult<Self> {
        Self::new(config, Box::new(HardwarePwm::new(driver)))
    }

    pub fn config(&self) -> &ServoConfig {
        &self.config
    }

    pub fn backend_kind(&self) -> PwmKind {
        self.backend.kind()
    }

    pub fn min_angle(&self) -> f64 {
        self.config.min_angle as f64
    }

    pub fn max_angle(&self) -> f64 {
        self.config.max_angle as f64
    }

    pub fn center_angle(&self) -> f64 {
        self.config.center_angle() as f64
    }

    pub fn resolution(&self) -> f64 {
        self.config.step_resolution
    }

    pub fn trajectory(&self) -> Trajectory {
        self.trajectory
    }

    pub fn state(&self) -> &ServoState {
        &self.state
    }

    pub fn movement_count(&self) -> u64 {
        self.state.movements
    }

    pub fn is_acquired(&self) -> bool {
        self.handle.is_some()
    }

    /// Faixa segura `[min + margem, max - margem]`
    pub fn safe_range(&self) -> (f64, f64) {
        (self.min_angle() + ANGLE_MARGIN, self.max_angle() - ANGLE_MARGIN)
    }

    /// Aplica o clamp de segurança
    pub fn clamp_angle(&self, angle: f64) -> f64 {
        let (low, high) = self.safe_range();
        if angle < low {
            low
        } else if angle > high {
            high
        } else {
            angle
        }
    }

    /// Duty ratio para um ângulo, depois do clamp
    pub fn angle_to_duty(&self, angle: f64) -> f64 {
        duty_ratio_for(self.clamp_angle(angle))
    }

    /// Move para `angle`. Exatamente uma chamada ao backend.
    pub fn move_to(&mut self, angle: f64) -> ActuatorResult<()> {
        let handle = self.handle.as_ref().ok_or(ActuatorError::Released)?;
        if !angle.is_finite() {
            return Err(ActuatorError::InvalidAngle(format!("{} is not a finite angle", angle)));
        }

        let clamped = self.clamp_angle(angle);
        let duty = duty_ratio_for(clamped);

        if let Err(e) = self.backend.set(handle, FREQUENCY_HZ, DutyRatio::new(duty)) {
            self.state.status = ActuatorStatus::Fault;
            return Err(e);
        }

        self.state.last_angle = Some(clamped);
        self.state.last_duty = Some(duty);
        self.state.movements += 1;
        self.state.status = ActuatorStatus::Ready;
        Ok(())
    }

    /// Move ao centro e espera o settle
    pub fn center(&mut self) -> ActuatorResult<()> {
        self.move_to(self.center_angle())?;
        self.sleeper.sleep(STEP_WAIT);
        Ok(())
    }

    /// Rotação em passos de `src` até `dst`, com espera após cada passo
    pub fn rotate(&mut self, src: f64, dst: f64, direction: Direction) -> ActuatorResult<()> {
        for angle in self.trajectory.steps(src, dst, direction) {
            self.move_to(angle)?;
            self.sleeper.sleep(STEP_WAIT);
        }
        Ok(())
    }

    /// Varredura completa deste servo: centro → máx → mín → centro
    pub fn swing(&mut self) -> ActuatorResult<()> {
        let segments = self.trajectory.sweep(
            self.center_angle(),
            self.min_angle(),
            self.max_angle(),
            SweepPattern::MaxFirst,
        );
        for segment in segments {
            self.sleeper.sleep(SWING_INTERVAL);
            self.rotate(segment.src, segment.dst, segment.direction)?;
        }
        self.sleeper.sleep(SWING_INTERVAL);
        Ok(())
    }

    /// Libera o pino. Idempotente.
    pub fn cleanup(&mut self) -> ActuatorResult<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        self.state.status = ActuatorStatus::Released;
        tracing::debug!(servo = %self.config.name, pin = self.config.gpio_pin, "servo released");
        self.backend.release(handle)
    }
}

impl Drop for AngleActuator {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            tracing::warn!(servo = %self.config.name, error = %e, "servo cleanup on drop failed");
        }
    }
}

impl MountComponent for AngleActuator {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn is_ready(&self) -> bool {
        self.handle.is_some() && self.state.status == ActuatorStatus::Ready
    }
}

impl Actuator for AngleActuator {
    type Command = f64;
    type Error = ActuatorError;

    fn send(&mut self, angle: f64) -> ActuatorResult<()> {
        self.move_to(angle)
    }

    fn status(&self) -> ActuatorStatus {
        self.state.status
    }

    fn release(&mut self) -> ActuatorResult<()> {
        self.cleanup()
    }
}
