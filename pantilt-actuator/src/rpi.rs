//! Drivers de pino reais via `rppal` (feature `rpi`)

use std::collections::HashMap;

use rppal::gpio::{Gpio, OutputPin};
use rppal::pwm::{Channel, Polarity, Pwm};

use crate::error::{ActuatorError, ActuatorResult};
use crate::pwm::{HardwarePwmDriver, SoftPwmDriver};

fn driver_err(e: impl std::fmt::Display) -> ActuatorError {
    ActuatorError::CommandFailed(e.to_string())
}

/// PWM por software sobre `rppal::gpio`
#[derive(Debug, Default)]
pub struct RppalSoftPwm {
    pins: HashMap<u8, (OutputPin, f64, f64)>,
}

impl RppalSoftPwm {
    pub fn new() -> Self {
        Self::default()
    }

    fn pin_mut(&mut self, pin: u8) -> ActuatorResult<&mut (OutputPin, f64, f64)> {
        self.pins
            .get_mut(&pin)
            .ok_or_else(|| ActuatorError::CommandFailed(format!("GPIO {} not set up", pin)))
    }
}

impl SoftPwmDriver for RppalSoftPwm {
    fn setup_output(&mut self, pin: u8) -> ActuatorResult<()> {
        let output = Gpio::new().map_err(driver_err)?.get(pin).map_err(driver_err)?.into_output();
        self.pins.insert(pin, (output, 0.0, 0.0));
        Ok(())
    }

    fn start(&mut self, pin: u8, frequency_hz: u32, duty_percent: f64) -> ActuatorResult<()> {
        let (output, freq, duty) = self.pin_mut(pin)?;
        *freq = frequency_hz as f64;
        *duty = duty_percent / 100.0;
        output.set_pwm_frequency(*freq, *duty).map_err(driver_err)
    }

    fn change_duty_cycle(&mut self, pin: u8, duty_percent: f64) -> ActuatorResult<()> {
        let (output, freq, duty) = self.pin_mut(pin)?;
        *duty = duty_percent / 100.0;
        output.set_pwm_frequency(*freq, *duty).map_err(driver_err)
    }

    fn change_frequency(&mut self, pin: u8, frequency_hz: u32) -> ActuatorResult<()> {
        let (output, freq, duty) = self.pin_mut(pin)?;
        *freq = frequency_hz as f64;
        output.set_pwm_frequency(*freq, *duty).map_err(driver_err)
    }

    fn cleanup(&mut self, pin: u8) -> ActuatorResult<()> {
        // OutputPin volta ao modo original ao ser descartado
        if let Some((mut output, _, _)) = self.pins.remove(&pin) {
            output.clear_pwm().map_err(driver_err)?;
        }
        Ok(())
    }
}

/// PWM de hardware sobre `rppal::pwm` (GPIO 18 → canal 0, GPIO 19 → canal 1)
#[derive(Debug, Default)]
pub struct RppalHardwarePwm {
    channels: HashMap<u8, Option<Pwm>>,
}

impl RppalHardwarePwm {
    pub fn new() -> Self {
        Self::default()
    }

    fn channel_for(pin: u8) -> ActuatorResult<Channel> {
        match pin {
            12 | 18 => Ok(Channel::Pwm0),
            13 | 19 => Ok(Channel::Pwm1),
            other => Err(ActuatorError::InvalidConfig(format!(
                "GPIO {} has no hardware PWM channel",
                other
            ))),
        }
    }
}

impl HardwarePwmDriver for RppalHardwarePwm {
    fn set_output(&mut self, pin: u8) -> ActuatorResult<()> {
        Self::channel_for(pin)?;
        self.channels.insert(pin, None);
        Ok(())
    }

    fn hardware_pwm(&mut self, pin: u8, frequency_hz: u32, duty_ppm: u32) -> ActuatorResult<()> {
        let duty = duty_ppm as f64 / 1_000_000.0;
        let frequency = frequency_hz as f64;
        let slot = self
            .channels
            .get_mut(&pin)
            .ok_or_else(|| ActuatorError::CommandFailed(format!("GPIO {} not set up", pin)))?;

        match slot {
            Some(pwm) => pwm.set_frequency(frequency, duty).map_err(driver_err),
            None => {
                let pwm = Pwm::with_frequency(Self::channel_for(pin)?, frequency, duty, Polarity::Normal, true)
                    .map_err(driver_err)?;
                *slot = Some(pwm);
                Ok(())
            }
        }
    }

    fn set_input(&mut self, pin: u8) -> ActuatorResult<()> {
        if let Some(Some(pwm)) = self.channels.remove(&pin) {
            pwm.disable().map_err(driver_err)?;
        }
        Ok(())
    }

    fn stop(&mut self) -> ActuatorResult<()> {
        Ok(())
    }
}
