//! # Traits — Abstrações fundamentais do suporte
//!
//! Os traits aqui são abstrações puras. As implementações concretas vivem nos
//! crates específicos (`pantilt-actuator`, `pantilt-photonic`, ...).

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

// ═══════════════════════════════════════════════════════════════════════════════
// TRAIT BASE
// ═══════════════════════════════════════════════════════════════════════════════

/// Trait base para qualquer componente do suporte (servo, câmera, controlador).
///
/// # Exemplo
///
/// ```
/// use pantilt_core::traits::MountComponent;
///
/// #[derive(Debug)]
/// struct Led;
///
/// impl MountComponent for Led {
///     fn name(&self) -> &str { "status-led" }
/// }
///
/// assert!(Led.is_ready());
/// ```
pub trait MountComponent: Send + Debug {
    /// Nome do componente (para logs e debug)
    fn name(&self) -> &str;

    /// Versão do componente
    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    /// Componente está pronto para uso?
    fn is_ready(&self) -> bool {
        true
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ATUADORES
// ═══════════════════════════════════════════════════════════════════════════════

/// Status de um atuador
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActuatorStatus {
    /// Pronto para receber comandos
    Ready,
    /// Último comando falhou no backend
    Fault,
    /// Recursos de hardware liberados
    Released,
}

impl ActuatorStatus {
    /// Nome curto para logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ActuatorStatus::Ready => "ready",
            ActuatorStatus::Fault => "fault",
            ActuatorStatus::Released => "released",
        }
    }
}

/// Trait para atuadores que executam ações físicas.
pub trait Actuator: MountComponent {
    /// Tipo de comando aceito
    type Command;

    /// Tipo de erro do atuador
    type Error;

    /// Envia comando para o atuador
    fn send(&mut self, cmd: Self::Command) -> Result<(), Self::Error>;

    /// Status atual do atuador
    fn status(&self) -> ActuatorStatus;

    /// Libera os recursos de hardware. Deve ser idempotente.
    fn release(&mut self) -> Result<(), Self::Error>;
}
