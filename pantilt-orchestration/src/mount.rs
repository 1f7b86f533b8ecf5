//! Controlador do suporte pan/tilt
//!
//! Compõe a câmera e dois servos e orquestra "segura um eixo, varre o outro"
//! durante uma gravação.
//!
//! ```text
//! Idle → Centered → Recording → Sweeping(Pan|Tilt) → Recording → Centered → Idle
//! ```

use std::path::Path;
use std::sync::Arc;

use pantilt_actuator::types::{STEP_WAIT, SWING_INTERVAL};
use pantilt_actuator::{ActuatorError, AngleActuator, SweepPattern};
use pantilt_core::timing::Sleeper;
use pantilt_core::traits::MountComponent;
use pantilt_photonic::Camera;
use serde::{Deserialize, Serialize};

use crate::config::{AxisConfig, MountConfig};
use crate::error::{MountError, MountResult};
use crate::rig::Rig;

/// Eixo do suporte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Pan,
    Tilt,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Pan => "pan",
            Axis::Tilt => "tilt",
        }
    }

    /// Padrão de varredura das gravações: o pan vai primeiro ao máximo, o
    /// tilt primeiro ao mínimo
    pub fn recording_pattern(&self) -> SweepPattern {
        match self {
            Axis::Pan => SweepPattern::MaxFirst,
            Axis::Tilt => SweepPattern::MinFirst,
        }
    }
}

/// Estado da sessão
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountState {
    Idle,
    Centered,
    Recording,
    Sweeping(Axis),
}

/// Suporte com câmera, servo de pan e servo de tilt
#[derive(Debug)]
pub struct MountController {
    camera: Option<Camera>,
    pan: Option<AngleActuator>,
    tilt: Option<AngleActuator>,
    sleeper: Arc<dyn Sleeper>,
    state: MountState,
    /// Estado ao qual `stop_capture` retorna
    before_capture: MountState,
}

impl MountController {
    /// Monta o suporte com a configuração padrão
    pub fn new(rig: &mut dyn Rig) -> MountResult<Self> {
        Self::open(&MountConfig::default(), rig)
    }

    /// Monta câmera, pan e tilt, nessa ordem. Se qualquer parte falhar, o que
    /// já foi adquirido é liberado e o erro sai como `Unavailable`.
    pub fn open(config: &MountConfig, rig: &mut dyn Rig) -> MountResult<Self> {
        config.validate()?;

        let mut mount = Self {
            camera: None,
            pan: None,
            tilt: None,
            sleeper: rig.sleeper(),
            state: MountState::Idle,
            before_capture: MountState::Idle,
        };

        match rig.open_camera() {
            Ok(camera) => {
                mount.camera = Some(camera.with_flip(config.camera.hflip, config.camera.vflip));
            }
            Err(e) => return Err(mount.abort("camera", e)),
        }

        match Self::build_axis(&config.pan, Axis::Pan, rig, &mount.sleeper) {
            Ok(servo) => mount.pan = Some(servo),
            Err(e) => return Err(mount.abort("pan", e)),
        }

        match Self::build_axis(&config.tilt, Axis::Tilt, rig, &mount.sleeper) {
            Ok(servo) => mount.tilt = Some(servo),
            Err(e) => return Err(mount.abort("tilt", e)),
        }

        tracing::info!(
            pan_pin = config.pan.pin,
            pan_backend = config.pan.backend.as_str(),
            tilt_pin = config.tilt.pin,
            tilt_backend = config.tilt.backend.as_str(),
            "mount ready"
        );
        Ok(mount)
    }

    fn build_axis(
        config: &AxisConfig,
        axis: Axis,
        rig: &mut dyn Rig,
        sleeper: &Arc<dyn Sleeper>,
    ) -> MountResult<AngleActuator> {
        let backend = rig.backend(config.backend)?;
        let servo = AngleActuator::with_sleeper(config.servo_config(axis.as_str()), backend, Arc::clone(sleeper))?;
        Ok(servo)
    }

    /// Libera o que foi adquirido e converte a falha de montagem
    fn abort(&mut self, component: &str, cause: MountError) -> MountError {
        tracing::warn!(component, error = %cause, "mount setup failed");
        self.cleanup();
        match cause {
            MountError::Unavailable { .. } => cause,
            MountError::Actuator(e) => MountError::unavailable(component, e),
            MountError::Photonic(e) => MountError::unavailable(component, e),
            other => MountError::unavailable(component, other),
        }
    }

    pub fn state(&self) -> MountState {
        self.state
    }

    /// Foi liberado?
    pub fn is_released(&self) -> bool {
        self.camera.is_none() && self.pan.is_none() && self.tilt.is_none()
    }

    pub fn pan(&self) -> Option<&AngleActuator> {
        self.pan.as_ref()
    }

    pub fn tilt(&self) -> Option<&AngleActuator> {
        self.tilt.as_ref()
    }

    /// Servo de um eixo
    pub fn axis(&self, axis: Axis) -> MountResult<&AngleActuator> {
        match axis {
            Axis::Pan => self.pan.as_ref(),
            Axis::Tilt => self.tilt.as_ref(),
        }
        .ok_or(MountError::Released)
    }

    /// Handle compartilhado da câmera (para um `FrameStreamer`, por exemplo)
    pub fn camera(&self) -> MountResult<&Camera> {
        self.camera.as_ref().ok_or(MountError::Released)
    }

    /// (servo que se move, servo segurado)
    fn axes_mut(&mut self, moving: Axis) -> MountResult<(&mut AngleActuator, &mut AngleActuator)> {
        let (Some(pan), Some(tilt)) = (self.pan.as_mut(), self.tilt.as_mut()) else {
            return Err(MountError::Released);
        };
        Ok(match moving {
            Axis::Pan => (pan, tilt),
            Axis::Tilt => (tilt, pan),
        })
    }

    /// Centraliza pan e depois tilt
    pub fn center(&mut self) -> MountResult<()> {
        let (pan, tilt) = self.axes_mut(Axis::Pan)?;
        pan.center()?;
        tilt.center()?;
        self.state = MountState::Centered;
        tracing::debug!("mount centered");
        Ok(())
    }

    /// Inicia a gravação de vídeo
    pub fn start_capture(&mut self, width: u32, height: u32, target: &Path) -> MountResult<()> {
        self.camera()?.start_video(width, height, target)?;
        self.before_capture = self.state;
        self.state = MountState::Recording;
        Ok(())
    }

    /// Para a gravação de vídeo
    pub fn stop_capture(&mut self) -> MountResult<()> {
        self.camera()?.stop_video()?;
        self.state = self.before_capture;
        Ok(())
    }

    /// Foto única
    pub fn capture_photo(&mut self, width: u32, height: u32, path: &Path) -> MountResult<()> {
        self.camera()?.capture_photo(width, height, path)?;
        Ok(())
    }

    /// Varre `axis` centro → máx → mín → centro segurando o outro eixo
    pub fn sweep(&mut self, axis: Axis) -> MountResult<()> {
        self.sweep_with(axis, SweepPattern::MaxFirst)
    }

    /// Varre `axis` no padrão dado. O eixo segurado recebe o comando de centro
    /// a cada passo do eixo em movimento. Uma pausa antes de cada segmento e
    /// outra depois do último. Não pode ser interrompida.
    pub fn sweep_with(&mut self, axis: Axis, pattern: SweepPattern) -> MountResult<()> {
        let previous = self.state;
        self.axes_mut(axis)?;

        self.state = MountState::Sweeping(axis);
        let swept = self.drive_sweep(axis, pattern);
        self.state = previous;
        swept?;

        tracing::info!(axis = axis.as_str(), ?pattern, "sweep finished");
        Ok(())
    }

    fn drive_sweep(&mut self, axis: Axis, pattern: SweepPattern) -> MountResult<()> {
        let sleeper = Arc::clone(&self.sleeper);
        let (moving, held) = self.axes_mut(axis)?;

        let trajectory = moving.trajectory();
        let segments = trajectory.sweep(moving.center_angle(), moving.min_angle(), moving.max_angle(), pattern);
        let hold = held.center_angle();

        for segment in segments {
            sleeper.sleep(SWING_INTERVAL);
            for angle in trajectory.segment_steps(segment) {
                moving.move_to(angle)?;
                held.move_to(hold)?;
                sleeper.sleep(STEP_WAIT);
            }
        }
        sleeper.sleep(SWING_INTERVAL);
        Ok(())
    }

    /// Pose direta: pan recebe `-x`, tilt recebe `-y`. Sem quantização e sem
    /// espera; o chamador controla o ritmo.
    pub fn position(&mut self, x: f64, y: f64) -> MountResult<()> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ActuatorError::InvalidAngle(format!("position ({}, {})", x, y)).into());
        }
        let (pan, tilt) = self.axes_mut(Axis::Pan)?;
        pan.move_to(-x)?;
        tilt.move_to(-y)?;
        Ok(())
    }

    /// Grava um vídeo varrendo `axis`: centraliza, grava, varre no padrão de
    /// gravação do eixo e para a gravação
    pub fn record_sweep(&mut self, axis: Axis, width: u32, height: u32, path: &Path) -> MountResult<()> {
        self.center()?;
        self.start_capture(width, height, path)?;

        let swept = self.sweep_with(axis, axis.recording_pattern());
        let stopped = self.stop_capture();
        swept?;
        stopped
    }

    /// Libera câmera, pan e tilt. Idempotente; falhas viram warnings.
    pub fn cleanup(&mut self) {
        if let Some(camera) = self.camera.take() {
            if let Err(e) = camera.close() {
                tracing::warn!(error = %e, "camera cleanup failed");
            }
        }
        if let Some(mut pan) = self.pan.take() {
            if let Err(e) = pan.cleanup() {
                tracing::warn!(error = %e, "pan cleanup failed");
            }
        }
        if let Some(mut tilt) = self.tilt.take() {
            if let Err(e) = tilt.cleanup() {
                tracing::warn!(error = %e, "tilt cleanup failed");
            }
        }
        self.state = MountState::Idle;
        self.before_capture = MountState::Idle;
    }
}

impl Drop for MountController {
    fn drop(&mut self) {
        self.cleanup();
    }
}

impl MountComponent for MountController {
    fn name(&self) -> &str {
        "MountController"
    }

    fn is_ready(&self) -> bool {
        self.camera.as_ref().is_some_and(Camera::is_open)
            && self.pan.as_ref().is_some_and(AngleActuator::is_acquired)
            && self.tilt.as_ref().is_some_and(AngleActuator::is_acquired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::SimulatedRig;
    use pantilt_core::timing::RecordingSleeper;

    fn mount() -> (MountController, SimulatedRig, RecordingSleeper) {
        let sleeper = RecordingSleeper::new();
        let mut rig = SimulatedRig::with_sleeper(Arc::new(sleeper.clone()));
        let mount = MountController::new(&mut rig).unwrap();
        (mount, rig, sleeper)
    }

    #[test]
    fn test_recording_patterns() {
        assert_eq!(Axis::Pan.recording_pattern(), SweepPattern::MaxFirst);
        assert_eq!(Axis::Tilt.recording_pattern(), SweepPattern::MinFirst);
    }

    #[test]
    fn test_center_moves_both() {
        let (mut mount, rig, sleeper) = mount();
        mount.center().unwrap();
        assert_eq!(mount.state(), MountState::Centered);
        assert_eq!(rig.pwm().duty_commands(18).len(), 1);
        assert_eq!(rig.pwm().duty_commands(19).len(), 1);
        assert_eq!(sleeper.count_of(STEP_WAIT), 2);
    }

    #[test]
    fn test_position_inverts_signs() {
        let (mut mount, _, sleeper) = mount();
        mount.position(10.25, -20.5).unwrap();
        assert_eq!(mount.pan().unwrap().state().last_angle, Some(-10.25));
        assert_eq!(mount.tilt().unwrap().state().last_angle, Some(20.5));
        assert!(sleeper.recorded().is_empty());
    }

    #[test]
    fn test_position_is_clamped() {
        let (mut mount, _, _) = mount();
        mount.position(-120.0, 120.0).unwrap();
        assert_eq!(mount.pan().unwrap().state().last_angle, Some(85.0));
        assert_eq!(mount.tilt().unwrap().state().last_angle, Some(-85.0));
    }

    #[test]
    fn test_cleanup_idempotent() {
        let (mut mount, rig, _) = mount();
        mount.cleanup();
        let events = rig.pwm().events().len();
        mount.cleanup();
        assert_eq!(rig.pwm().events().len(), events);
        assert!(mount.is_released());
        assert!(!mount.is_ready());
    }

    #[test]
    fn test_calls_after_cleanup_fail() {
        let (mut mount, _, _) = mount();
        mount.cleanup();
        assert_eq!(mount.center(), Err(MountError::Released));
        assert_eq!(mount.sweep(Axis::Pan), Err(MountError::Released));
        assert_eq!(mount.position(0.0, 0.0), Err(MountError::Released));
        assert_eq!(
            mount.start_capture(10, 10, Path::new("v.h264")),
            Err(MountError::Released)
        );
    }
}
