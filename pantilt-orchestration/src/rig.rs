//! Fábricas de hardware do suporte
//!
//! Um [`Rig`] entrega os backends PWM e a câmera que o
//! [`MountController`](crate::MountController) monta. O rig simulado é o
//! padrão; o do Raspberry Pi fica atrás da feature `rpi`.

use std::fmt::Debug;
use std::sync::Arc;

use pantilt_actuator::{HardwarePwm, PwmBackend, PwmKind, SimulatedPwm, TimedPwm};
use pantilt_core::timing::{thread_sleeper, Sleeper};
use pantilt_photonic::{Camera, SyntheticCamera};

use crate::error::{MountError, MountResult};

/// Origem dos recursos de hardware
pub trait Rig: Debug {
    /// Backend PWM da variante pedida
    fn backend(&mut self, kind: PwmKind) -> MountResult<Box<dyn PwmBackend>>;

    /// Abre a câmera
    fn open_camera(&mut self) -> MountResult<Camera>;

    /// Relógio usado por todas as esperas fixas
    fn sleeper(&self) -> Arc<dyn Sleeper>;
}

/// Rig totalmente simulado. Os handles expostos compartilham estado com o
/// que foi entregue ao controlador.
#[derive(Debug, Clone)]
pub struct SimulatedRig {
    pwm: SimulatedPwm,
    camera: SyntheticCamera,
    sleeper: Arc<dyn Sleeper>,
    camera_unavailable: bool,
}

impl Default for SimulatedRig {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedRig {
    pub fn new() -> Self {
        Self::with_sleeper(thread_sleeper())
    }

    pub fn with_sleeper(sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            pwm: SimulatedPwm::new(),
            camera: SyntheticCamera::new(),
            sleeper,
            camera_unavailable: false,
        }
    }

    pub fn with_camera(mut self, camera: SyntheticCamera) -> Self {
        self.camera = camera;
        self
    }

    /// Faz `open_camera` falhar
    pub fn fail_camera(&mut self) {
        self.camera_unavailable = true;
    }

    /// Driver PWM simulado (compartilhado)
    pub fn pwm(&self) -> &SimulatedPwm {
        &self.pwm
    }

    /// Câmera sintética (compartilhada)
    pub fn camera(&self) -> &SyntheticCamera {
        &self.camera
    }
}

impl Rig for SimulatedRig {
    fn backend(&mut self, kind: PwmKind) -> MountResult<Box<dyn PwmBackend>> {
        Ok(match kind {
            PwmKind::Timed => Box::new(TimedPwm::new(self.pwm.clone())),
            PwmKind::Hardware => Box::new(HardwarePwm::new(self.pwm.clone())),
        })
    }

    fn open_camera(&mut self) -> MountResult<Camera> {
        if self.camera_unavailable {
            return Err(MountError::unavailable("camera", "simulated camera failure"));
        }
        Ok(Camera::with_sleeper(
            Box::new(self.camera.clone()),
            Arc::clone(&self.sleeper),
        ))
    }

    fn sleeper(&self) -> Arc<dyn Sleeper> {
        Arc::clone(&self.sleeper)
    }
}

/// Rig do Raspberry Pi: PWM real via `rppal`. O driver de câmera é externo;
/// até um ser ligado, a câmera é a sintética.
#[cfg(feature = "rpi")]
#[derive(Debug, Default)]
pub struct HardwareRig {
    camera: SyntheticCamera,
}

#[cfg(feature = "rpi")]
impl HardwareRig {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "rpi")]
impl Rig for HardwareRig {
    fn backend(&mut self, kind: PwmKind) -> MountResult<Box<dyn PwmBackend>> {
        use pantilt_actuator::{RppalHardwarePwm, RppalSoftPwm};

        Ok(match kind {
            PwmKind::Timed => Box::new(TimedPwm::new(RppalSoftPwm::new())),
            PwmKind::Hardware => Box::new(HardwarePwm::new(RppalHardwarePwm::new())),
        })
    }

    fn open_camera(&mut self) -> MountResult<Camera> {
        Ok(Camera::new(self.camera.clone()))
    }

    fn sleeper(&self) -> Arc<dyn Sleeper> {
        thread_sleeper()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantilt_core::timing::RecordingSleeper;

    #[test]
    fn test_backend_variants() {
        let mut rig = SimulatedRig::new();
        assert_eq!(rig.backend(PwmKind::Timed).unwrap().kind(), PwmKind::Timed);
        assert_eq!(rig.backend(PwmKind::Hardware).unwrap().kind(), PwmKind::Hardware);
    }

    #[test]
    fn test_backends_share_driver() {
        let mut rig = SimulatedRig::new();
        let mut backend = rig.backend(PwmKind::Hardware).unwrap();
        let handle = backend.acquire(18).unwrap();
        assert!(!rig.pwm().events().is_empty());
        backend.release(handle).unwrap();
    }

    #[test]
    fn test_camera_failure() {
        let mut rig = SimulatedRig::with_sleeper(Arc::new(RecordingSleeper::new()));
        assert!(rig.open_camera().is_ok());
        rig.fail_camera();
        assert!(matches!(rig.open_camera(), Err(MountError::Unavailable { .. })));
    }
}
