//! Tipos e constantes do servo
//!
//! Especificação do servo (SG90):
//!
//! ```text
//! Período PWM : 20 ms (50 Hz)
//! Pulso       : 1 - 2 ms (5.0% - 10.0%) (-90° - +90°)
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Frequência PWM (Hz)
pub const FREQUENCY_HZ: u32 = 50;
/// Margem de segurança nos limites mecânicos (°)
pub const ANGLE_MARGIN: f64 = 5.0;
/// Pulso mínimo (ms)
pub const MIN_PULSE_MS: f64 = 1.0;
/// Pulso máximo (ms)
pub const MAX_PULSE_MS: f64 = 2.0;
/// Limite absoluto inferior do servo (°)
pub const MIN_ANGLE: f64 = -90.0;
/// Limite absoluto superior do servo (°)
pub const MAX_ANGLE: f64 = 90.0;

/// Período PWM (ms)
pub const PWM_PERIOD_MS: f64 = 1000.0 / FREQUENCY_HZ as f64;
pub const MIN_DUTY_RATIO: f64 = MIN_PULSE_MS / PWM_PERIOD_MS;
pub const MAX_DUTY_RATIO: f64 = MAX_PULSE_MS / PWM_PERIOD_MS;

/// Resolução padrão das trajetórias (°/passo)
pub const DEFAULT_STEP_RESOLUTION: f64 = 0.3;
/// Menor resolução aceita (°/passo)
pub const MIN_STEP_RESOLUTION: f64 = 0.001;

/// Espera após cada passo e após `center()`
pub const STEP_WAIT: Duration = Duration::from_millis(5);
/// Pausa antes e depois de cada segmento de varredura
pub const SWING_INTERVAL: Duration = Duration::from_millis(500);

const PERCENT: f64 = 100.0;
const MEGA: f64 = 1_000_000.0;

/// Lei de conversão ângulo → duty ratio, normalizada contra os limites
/// absolutos do servo (não os limites configurados da instância).
///
/// Não aplica clamp; ver [`AngleActuator::angle_to_duty`](crate::AngleActuator::angle_to_duty).
pub fn duty_ratio_for(angle: f64) -> f64 {
    MIN_DUTY_RATIO + (MAX_DUTY_RATIO - MIN_DUTY_RATIO) * (angle - MIN_ANGLE) / (MAX_ANGLE - MIN_ANGLE)
}

/// Fração do período PWM com o sinal em nível alto
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct DutyRatio(pub f64);

impl DutyRatio {
    pub fn new(ratio: f64) -> Self {
        Self(ratio.clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Porcentagem (0-100) com duas casas decimais, para o backend timed
    pub fn as_percent(&self) -> f64 {
        (self.0 * PERCENT * 100.0).round() / 100.0
    }

    /// Partes por milhão (truncado), para o backend de hardware
    pub fn as_ppm(&self) -> u32 {
        (self.0 * MEGA) as u32
    }

    /// Largura de pulso equivalente a uma frequência
    pub fn pulse_width(&self, frequency_hz: u32) -> Duration {
        if frequency_hz == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.0 / frequency_hz as f64)
    }
}

/// Variante de backend PWM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PwmKind {
    /// PWM por software (timer), duty em porcentagem
    Timed,
    /// PWM dedicado de hardware, duty em ppm
    #[default]
    Hardware,
}

impl PwmKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PwmKind::Timed => "timed",
            PwmKind::Hardware => "hardware",
        }
    }
}

impl std::str::FromStr for PwmKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "timed" | "software" | "soft" => Ok(PwmKind::Timed),
            "hardware" | "hw" => Ok(PwmKind::Hardware),
            other => Err(format!("unknown PWM backend '{}'", other)),
        }
    }
}

/// Sentido de iteração de uma trajetória
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    /// Incremento de índice por passo
    pub fn step(&self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }
}
