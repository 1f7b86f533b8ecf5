//! # 🎥 pantilt-orchestration — Controlador do suporte
//!
//! Monta a câmera e os dois servos (pan, tilt) a partir de uma
//! [`MountConfig`] e de um [`Rig`], e orquestra as varreduras durante a
//! gravação.
//!
//! ## Arquitetura
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    MountController                       │
//! │   ┌──────────┐     ┌───────────────┐  ┌───────────────┐  │
//! │   │  Camera  │     │ AngleActuator │  │ AngleActuator │  │
//! │   │          │     │     (pan)     │  │    (tilt)     │  │
//! │   └────┬─────┘     └───────┬───────┘  └───────┬───────┘  │
//! └────────┼───────────────────┼──────────────────┼──────────┘
//!          │                   │   Rig::backend   │
//!   CaptureDevice          PwmBackend         PwmBackend
//! ```
//!
//! ## Exemplo
//!
//! ```
//! use pantilt_orchestration::{Axis, MountController, SimulatedRig};
//! use pantilt_core::timing::RecordingSleeper;
//! use std::sync::Arc;
//!
//! let mut rig = SimulatedRig::with_sleeper(Arc::new(RecordingSleeper::new()));
//! let mut mount = MountController::new(&mut rig)?;
//! mount.center()?;
//! mount.sweep(Axis::Pan)?;
//! mount.cleanup();
//! # Ok::<(), pantilt_orchestration::MountError>(())
//! ```

pub mod config;
pub mod error;
pub mod mount;
pub mod rig;

pub use config::{AxisConfig, CameraConfig, DEFAULT_PAN_PIN, DEFAULT_TILT_PIN, MountConfig};
pub use error::{MountError, MountResult};
pub use mount::{Axis, MountController, MountState};
pub use rig::{Rig, SimulatedRig};

#[cfg(feature = "rpi")]
pub use rig::HardwareRig;

// Re-exporta traits do core
pub use pantilt_core::prelude::*;
