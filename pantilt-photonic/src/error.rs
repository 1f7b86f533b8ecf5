//! Erros específicos do módulo fotônico

use thiserror::Error;

pub type PhotonicResult<T> = Result<T, PhotonicError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PhotonicError {
    #[error("Camera initialization failed: {0}")]
    AcquisitionFailed(String),

    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    /// Câmera em uso por outra sessão (gravação ou streaming)
    #[error("Camera busy: {0}")]
    Busy(String),

    /// Operação depois do close
    #[error("Camera closed")]
    Closed,

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Stream producer panicked")]
    StreamPanicked,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(PhotonicError::Closed.to_string(), "Camera closed");
        assert!(PhotonicError::Busy("recording".into()).to_string().contains("recording"));
        assert!(PhotonicError::InvalidFrame("short".into()).to_string().contains("Invalid frame"));
    }
}
