//! Backends PWM
//!
//! ```text
//! AngleActuator ──► dyn PwmBackend ──┬──► TimedPwm<D: SoftPwmDriver>      (duty em %)
//!                                    └──► HardwarePwm<D: HardwarePwmDriver> (duty em ppm)
//! ```
//!
//! O ator nunca conhece a variante concreta: qualquer backend novo entra
//! implementando [`PwmBackend`].

use std::collections::HashSet;
use std::fmt::Debug;

use crate::error::{ActuatorError, ActuatorResult};
use crate::types::{DutyRatio, FREQUENCY_HZ, PwmKind};

/// Recurso PWM ligado 1:1 a um pino.
///
/// Não é `Clone`: `release` consome o handle, então ele só pode ser
/// liberado uma vez.
#[derive(Debug, PartialEq, Eq)]
pub struct PwmHandle {
    pin: u8,
    kind: PwmKind,
}

impl PwmHandle {
    pub fn new(pin: u8, kind: PwmKind) -> Self {
        Self { pin, kind }
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn kind(&self) -> PwmKind {
        self.kind
    }
}

/// Capacidade PWM usada pelo [`AngleActuator`](crate::AngleActuator).
pub trait PwmBackend: Send + Debug {
    /// Variante do backend
    fn kind(&self) -> PwmKind;

    /// Prepara o pino. Em falha parcial, desfaz o que já foi feito antes de
    /// propagar o erro.
    fn acquire(&mut self, pin: u8) -> ActuatorResult<PwmHandle>;

    /// Emite um comando de frequência/duty
    fn set(&mut self, handle: &PwmHandle, frequency_hz: u32, duty: DutyRatio) -> ActuatorResult<()>;

    /// Devolve o pino a um estado seguro (entrada)
    fn release(&mut self, handle: PwmHandle) -> ActuatorResult<()>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// DRIVERS DE PINO (colaboradores externos)
// ═══════════════════════════════════════════════════════════════════════════════

/// Driver de PWM por software (estilo RPi.GPIO)
pub trait SoftPwmDriver: Send + Debug {
    /// Configura o pino como saída
    fn setup_output(&mut self, pin: u8) -> ActuatorResult<()>;
    /// Inicia o PWM com duty em porcentagem
    fn start(&mut self, pin: u8, frequency_hz: u32, duty_percent: f64) -> ActuatorResult<()>;
    fn change_duty_cycle(&mut self, pin: u8, duty_percent: f64) -> ActuatorResult<()>;
    fn change_frequency(&mut self, pin: u8, frequency_hz: u32) -> ActuatorResult<()>;
    /// Para o PWM e devolve o pino como entrada
    fn cleanup(&mut self, pin: u8) -> ActuatorResult<()>;
}

/// Driver de PWM de hardware (estilo pigpio)
pub trait HardwarePwmDriver: Send + Debug {
    fn set_output(&mut self, pin: u8) -> ActuatorResult<()>;
    /// Emite PWM com duty em partes por milhão
    fn hardware_pwm(&mut self, pin: u8, frequency_hz: u32, duty_ppm: u32) -> ActuatorResult<()>;
    fn set_input(&mut self, pin: u8) -> ActuatorResult<()>;
    /// Encerra a conexão com o driver
    fn stop(&mut self) -> ActuatorResult<()>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// TIMED PWM
// ═══════════════════════════════════════════════════════════════════════════════

/// Backend de PWM por software: duty em porcentagem (0-100, duas casas)
#[derive(Debug)]
pub struct TimedPwm<D: SoftPwmDriver> {
    driver: D,
    active: HashSet<u8>,
    frequency_hz: u32,
}

impl<D: SoftPwmDriver> TimedPwm<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            active: HashSet::new(),
            frequency_hz: FREQUENCY_HZ,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    fn rollback(&mut self, pin: u8) {
        if let Err(e) = self.driver.cleanup(pin) {
            tracing::warn!(pin, error = %e, "timed PWM rollback failed");
        }
    }
}

impl<D: SoftPwmDriver> PwmBackend for TimedPwm<D> {
    fn kind(&self) -> PwmKind {
        PwmKind::Timed
    }

    fn acquire(&mut self, pin: u8) -> ActuatorResult<PwmHandle> {
        if self.active.contains(&pin) {
            return Err(ActuatorError::PinInUse(pin));
        }

        let setup = self
            .driver
            .setup_output(pin)
            .and_then(|_| self.driver.start(pin, self.frequency_hz, 0.0));

        if let Err(e) = setup {
            self.rollback(pin);
            return Err(ActuatorError::acquisition(pin, e.to_string()));
        }

        self.active.insert(pin);
        tracing::debug!(pin, frequency_hz = self.frequency_hz, "timed PWM acquired");
        Ok(PwmHandle::new(pin, PwmKind::Timed))
    }

    fn set(&mut self, handle: &PwmHandle, frequency_hz: u32, duty: DutyRatio) -> ActuatorResult<()> {
        if !self.active.contains(&handle.pin) {
            return Err(ActuatorError::Released);
        }
        if frequency_hz != self.frequency_hz {
            self.driver.change_frequency(handle.pin, frequency_hz)?;
            self.frequency_hz = frequency_hz;
        }
        self.driver.change_duty_cycle(handle.pin, duty.as_percent())
    }

    fn release(&mut self, handle: PwmHandle) -> ActuatorResult<()> {
        if !self.active.remove(&handle.pin) {
            return Ok(());
        }
        tracing::debug!(pin = handle.pin, "timed PWM released");
        self.driver.cleanup(handle.pin)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HARDWARE PWM
// ═══════════════════════════════════════════════════════════════════════════════

/// Backend de PWM de hardware: duty inteiro em ppm
#[derive(Debug)]
pub struct HardwarePwm<D: HardwarePwmDriver> {
    driver: D,
    active: HashSet<u8>,
}

impl<D: HardwarePwmDriver> HardwarePwm<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            active: HashSet::new(),
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    fn teardown(&mut self, pin: u8) -> ActuatorResult<()> {
        let input = self.driver.set_input(pin);
        let stop = self.driver.stop();
        input.and(stop)
    }
}

impl<D: HardwarePwmDriver> PwmBackend for HardwarePwm<D> {
    fn kind(&self) -> PwmKind {
        PwmKind::Hardware
    }

    fn acquire(&mut self, pin: u8) -> ActuatorResult<PwmHandle> {
        if self.active.contains(&pin) {
            return Err(ActuatorError::PinInUse(pin));
        }

        if let Err(e) = self.driver.set_output(pin) {
            if let Err(rollback) = self.teardown(pin) {
                tracing::warn!(pin, error = %rollback, "hardware PWM rollback failed");
            }
            return Err(ActuatorError::acquisition(pin, e.to_string()));
        }

        self.active.insert(pin);
        tracing::debug!(pin, "hardware PWM acquired");
        Ok(PwmHandle::new(pin, PwmKind::Hardware))
    }

    fn set(&mut self, handle: &PwmHandle, frequency_hz: u32, duty: DutyRatio) -> ActuatorResult<()> {
        if !self.active.contains(&handle.pin) {
            return Err(ActuatorError::Released);
        }
        self.driver.hardware_pwm(handle.pin, frequency_hz, duty.as_ppm())
    }

    fn release(&mut self, handle: PwmHandle) -> ActuatorResult<()> {
        if !self.active.remove(&handle.pin) {
            return Ok(());
        }
        tracing::debug!(pin = handle.pin, "hardware PWM released");
        self.teardown(handle.pin)
    }
}
