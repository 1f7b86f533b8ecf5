//! Drivers de pino simulados
//!
//! Registram cada chamada como [`PwmEvent`] para testes e execução sem
//! hardware. Clones compartilham o mesmo estado, então um driver movido para
//! dentro de um backend continua observável.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{ActuatorError, ActuatorResult};
use crate::pwm::{HardwarePwmDriver, SoftPwmDriver};

/// Chamada registrada no driver simulado
#[derive(Debug, Clone, PartialEq)]
pub enum PwmEvent {
    SetupOutput { pin: u8 },
    Start { pin: u8, frequency_hz: u32, duty_percent: f64 },
    DutyCycle { pin: u8, duty_percent: f64 },
    Frequency { pin: u8, frequency_hz: u32 },
    Cleanup { pin: u8 },
    SetOutput { pin: u8 },
    HardwarePwm { pin: u8, frequency_hz: u32, duty_ppm: u32 },
    SetInput { pin: u8 },
    Stop,
}

impl PwmEvent {
    /// É um comando de duty (o que move o servo)?
    pub fn is_duty_command(&self) -> bool {
        matches!(self, PwmEvent::DutyCycle { .. } | PwmEvent::HardwarePwm { .. })
    }

    pub fn pin(&self) -> Option<u8> {
        match self {
            PwmEvent::SetupOutput { pin }
            | PwmEvent::Start { pin, .. }
            | PwmEvent::DutyCycle { pin, .. }
            | PwmEvent::Frequency { pin, .. }
            | PwmEvent::Cleanup { pin }
            | PwmEvent::SetOutput { pin }
            | PwmEvent::HardwarePwm { pin, .. }
            | PwmEvent::SetInput { pin } => Some(*pin),
            PwmEvent::Stop => None,
        }
    }
}

#[derive(Debug, Default)]
struct SimState {
    events: Vec<PwmEvent>,
    fail_setup: HashSet<u8>,
    commands_left: Option<usize>,
}

/// Driver simulado: implementa [`SoftPwmDriver`] e [`HardwarePwmDriver`]
#[derive(Debug, Clone, Default)]
pub struct SimulatedPwm {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedPwm {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        // Um teste que entrou em pânico segurando o lock não invalida o registro
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Faz o setup do pino falhar
    pub fn fail_setup_on(&self, pin: u8) {
        self.lock().fail_setup.insert(pin);
    }

    /// Aceita mais `n` comandos de duty, depois falha
    pub fn fail_commands_after(&self, n: usize) {
        self.lock().commands_left = Some(n);
    }

    pub fn events(&self) -> Vec<PwmEvent> {
        self.lock().events.clone()
    }

    pub fn last_event(&self) -> Option<PwmEvent> {
        self.lock().events.last().cloned()
    }

    /// Comandos de duty emitidos para `pin`
    pub fn duty_commands(&self, pin: u8) -> Vec<PwmEvent> {
        self.lock()
            .events
            .iter()
            .filter(|e| e.is_duty_command() && e.pin() == Some(pin))
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.lock().events.clear();
    }

    fn record(&self, event: PwmEvent) {
        self.lock().events.push(event);
    }

    fn setup(&self, event: PwmEvent, pin: u8) -> ActuatorResult<()> {
        let mut state = self.lock();
        state.events.push(event);
        if state.fail_setup.contains(&pin) {
            return Err(ActuatorError::CommandFailed(format!("simulated setup failure on GPIO {}", pin)));
        }
        Ok(())
    }

    fn command(&self, event: PwmEvent) -> ActuatorResult<()> {
        let mut state = self.lock();
        if let Some(left) = state.commands_left.as_mut() {
            if *left == 0 {
                return Err(ActuatorError::CommandFailed("simulated command failure".into()));
            }
            *left -= 1;
        }
        state.events.push(event);
        Ok(())
    }
}

impl SoftPwmDriver for SimulatedPwm {
    fn setup_output(&mut self, pin: u8) -> ActuatorResult<()> {
        self.setup(PwmEvent::SetupOutput { pin }, pin)
    }

    fn start(&mut self, pin: u8, frequency_hz: u32, duty_percent: f64) -> ActuatorResult<()> {
        self.record(PwmEvent::Start { pin, frequency_hz, duty_percent });
        Ok(())
    }

    fn change_duty_cycle(&mut self, pin: u8, duty_percent: f64) -> ActuatorResult<()> {
        self.command(PwmEvent::DutyCycle { pin, duty_percent })
    }

    fn change_frequency(&mut self, pin: u8, frequency_hz: u32) -> ActuatorResult<()> {
        self.record(PwmEvent::Frequency { pin, frequency_hz });
        Ok(())
    }

    fn cleanup(&mut self, pin: u8) -> ActuatorResult<()> {
        self.record(PwmEvent::Cleanup { pin });
        Ok(())
    }
}

impl HardwarePwmDriver for SimulatedPwm {
    fn set_output(&mut self, pin: u8) -> ActuatorResult<()> {
        self.setup(PwmEvent::SetOutput { pin }, pin)
    }

    fn hardware_pwm(&mut self, pin: u8, frequency_hz: u32, duty_ppm: u32) -> ActuatorResult<()> {
        self.command(PwmEvent::HardwarePwm { pin, frequency_hz, duty_ppm })
    }

    fn set_input(&mut self, pin: u8) -> ActuatorResult<()> {
        self.record(PwmEvent::SetInput { pin });
        Ok(())
    }

    fn stop(&mut self) -> ActuatorResult<()> {
        self.record(PwmEvent::Stop);
        Ok(())
    }
}
