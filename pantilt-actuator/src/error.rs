//! Erros da camada de atuador

use thiserror::Error;

pub type ActuatorResult<T> = Result<T, ActuatorError>;

/// Erros de atuador
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActuatorError {
    /// Setup do backend falhou (já revertido)
    #[error("PWM acquisition failed on GPIO {pin}: {reason}")]
    AcquisitionFailed { pin: u8, reason: String },

    /// Operação depois do cleanup
    #[error("Actuator already released")]
    Released,

    /// Comando `set` do backend falhou
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// Pino já adquirido por outro handle
    #[error("GPIO {0} already in use")]
    PinInUse(u8),

    /// Configuração inválida
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Ângulo não finito (NaN, ±inf)
    #[error("Invalid angle: {0}")]
    InvalidAngle(String),
}

impl ActuatorError {
    pub fn acquisition(pin: u8, reason: impl Into<String>) -> Self {
        ActuatorError::AcquisitionFailed {
            pin,
            reason: reason.into(),
        }
    }

    /// Erro de aquisição?
    pub fn is_acquisition(&self) -> bool {
        matches!(self, ActuatorError::AcquisitionFailed { .. } | ActuatorError::PinInUse(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ActuatorError::CommandFailed("test".into());
        assert!(err.to_string().contains("Command failed"));
    }

    #[test]
    fn test_error_released() {
        assert_eq!(ActuatorError::Released.to_string(), "Actuator already released");
    }

    #[test]
    fn test_acquisition_error() {
        let err = ActuatorError::acquisition(18, "no daemon");
        assert!(err.is_acquisition());
        assert!(err.to_string().contains("GPIO 18"));
        assert!(err.to_string().contains("no daemon"));
        assert!(ActuatorError::PinInUse(19).is_acquisition());
        assert!(!ActuatorError::Released.is_acquisition());
    }
}
