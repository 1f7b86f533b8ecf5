//! Erros do controlador do suporte

use pantilt_actuator::ActuatorError;
use pantilt_photonic::PhotonicError;
use thiserror::Error;

pub type MountResult<T> = Result<T, MountError>;

/// Erros do suporte
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MountError {
    /// Falha na montagem; tudo que já tinha sido adquirido foi liberado
    #[error("{component} unavailable: {reason}")]
    Unavailable { component: String, reason: String },

    /// Operação depois do cleanup
    #[error("Mount already released")]
    Released,

    #[error("Actuator error: {0}")]
    Actuator(#[from] ActuatorError),

    #[error("Camera error: {0}")]
    Photonic(#[from] PhotonicError),

    /// Configuração inválida
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl MountError {
    pub fn unavailable(component: &str, reason: impl std::fmt::Display) -> Self {
        MountError::Unavailable {
            component: component.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<std::io::Error> for MountError {
    fn from(err: std::io::Error) -> Self {
        MountError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MountError::unavailable("tilt", "GPIO 19 busy");
        assert_eq!(err.to_string(), "tilt unavailable: GPIO 19 busy");
    }

    #[test]
    fn test_component_error_conversion() {
        let err: MountError = ActuatorError::Released.into();
        assert!(err.to_string().contains("Actuator error"));
        let err: MountError = PhotonicError::Closed.into();
        assert_eq!(err, MountError::Photonic(PhotonicError::Closed));
    }
}
