//! Configuração do suporte
//!
//! Lida de TOML (`pantilt.toml`) e sobreposta por variáveis de ambiente
//! (`PANTILT_*`, com `.env` carregado uma vez).

use std::env;
use std::path::Path;
use std::str::FromStr;

use once_cell::sync::Lazy;
use pantilt_actuator::types::{DEFAULT_STEP_RESOLUTION, MAX_ANGLE, MIN_ANGLE};
use pantilt_actuator::{PwmKind, ServoConfig, Trajectory};
use serde::{Deserialize, Serialize};

use crate::error::{MountError, MountResult};

/// Carrega `.env` uma única vez
static DOTENV_INIT: Lazy<()> = Lazy::new(|| {
    let _ = dotenv::dotenv();
});

/// Pino padrão do pan
pub const DEFAULT_PAN_PIN: u8 = 18;
/// Pino padrão do tilt
pub const DEFAULT_TILT_PIN: u8 = 19;

fn default_min_angle() -> i32 {
    MIN_ANGLE as i32
}

fn default_max_angle() -> i32 {
    MAX_ANGLE as i32
}

fn default_step_resolution() -> f64 {
    DEFAULT_STEP_RESOLUTION
}

fn default_flip() -> bool {
    true
}

/// Um eixo (pan ou tilt)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    /// Pino GPIO (BCM)
    pub pin: u8,
    /// Variante de PWM
    #[serde(default)]
    pub backend: PwmKind,
    #[serde(default = "default_min_angle")]
    pub min_angle: i32,
    #[serde(default = "default_max_angle")]
    pub max_angle: i32,
    /// Graus por passo
    #[serde(default = "default_step_resolution")]
    pub step_resolution: f64,
}

impl AxisConfig {
    pub fn new(pin: u8) -> Self {
        Self {
            pin,
            backend: PwmKind::default(),
            min_angle: default_min_angle(),
            max_angle: default_max_angle(),
            step_resolution: default_step_resolution(),
        }
    }

    pub fn with_backend(mut self, backend: PwmKind) -> Self {
        self.backend = backend;
        self
    }

    /// Configuração do servo deste eixo
    pub fn servo_config(&self, name: &str) -> ServoConfig {
        ServoConfig {
            name: name.to_string(),
            gpio_pin: self.pin,
            min_angle: self.min_angle,
            max_angle: self.max_angle,
            step_resolution: self.step_resolution,
        }
    }

    fn validate(&self, axis: &str) -> MountResult<()> {
        if self.min_angle >= self.max_angle {
            return Err(MountError::Config(format!(
                "{}: min_angle ({}) must be less than max_angle ({})",
                axis, self.min_angle, self.max_angle
            )));
        }
        Trajectory::new(self.step_resolution)
            .map_err(|e| MountError::Config(format!("{}: {}", axis, e)))?;
        Ok(())
    }
}

/// Orientação da câmera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_flip")]
    pub hflip: bool,
    #[serde(default = "default_flip")]
    pub vflip: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            hflip: true,
            vflip: true,
        }
    }
}

/// Configuração completa do suporte
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    pub pan: AxisConfig,
    pub tilt: AxisConfig,
    pub camera: CameraConfig,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            pan: AxisConfig::new(DEFAULT_PAN_PIN),
            tilt: AxisConfig::new(DEFAULT_TILT_PIN),
            camera: CameraConfig::default(),
        }
    }
}

impl MountConfig {
    /// Parse de TOML
    pub fn from_str(content: &str) -> MountResult<Self> {
        toml::from_str(content).map_err(|e| MountError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Lê de arquivo
    pub fn from_file(path: &Path) -> MountResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MountError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_str(&content)
    }

    /// Serializa para TOML
    pub fn to_string(&self) -> MountResult<String> {
        toml::to_string_pretty(self).map_err(|e| MountError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Aplica `PANTILT_PAN_PIN`, `PANTILT_TILT_PIN`, `PANTILT_PAN_BACKEND`,
    /// `PANTILT_TILT_BACKEND` e `PANTILT_STEP_RESOLUTION`
    pub fn with_env_overrides(self) -> MountResult<Self> {
        Lazy::force(&DOTENV_INIT);
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Aplica sobreposições a partir de uma fonte chave → valor
    pub fn with_overrides<F>(mut self, lookup: F) -> MountResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(pin) = parse_var::<u8, _>(&lookup, "PANTILT_PAN_PIN")? {
            self.pan.pin = pin;
        }
        if let Some(pin) = parse_var::<u8, _>(&lookup, "PANTILT_TILT_PIN")? {
            self.tilt.pin = pin;
        }
        if let Some(kind) = parse_var::<PwmKind, _>(&lookup, "PANTILT_PAN_BACKEND")? {
            self.pan.backend = kind;
        }
        if let Some(kind) = parse_var::<PwmKind, _>(&lookup, "PANTILT_TILT_BACKEND")? {
            self.tilt.backend = kind;
        }
        if let Some(resolution) = parse_var::<f64, _>(&lookup, "PANTILT_STEP_RESOLUTION")? {
            self.pan.step_resolution = resolution;
            self.tilt.step_resolution = resolution;
        }
        Ok(self)
    }

    pub fn validate(&self) -> MountResult<()> {
        self.pan.validate("pan")?;
        self.tilt.validate("tilt")?;
        if self.pan.pin == self.tilt.pin {
            return Err(MountError::Config(format!(
                "pan and tilt cannot share GPIO {}",
                self.pan.pin
            )));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> MountResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| MountError::Config(format!("{}='{}': {}", key, raw, e))),
        None => Ok(None),
    }
}
