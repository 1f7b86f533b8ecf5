//! Câmera compartilhada com uso exclusivo
//!
//! O driver real (codificação H.264/JPEG, I/O de arquivo) é externo e entra
//! pelo trait [`CaptureDevice`]. [`Camera`] é o handle clonável que o
//! controlador do suporte e o streamer compartilham; ele garante que gravação
//! e streaming nunca usam o dispositivo ao mesmo tempo.
//!
//! ```text
//!          ┌──────── start_video ────────┐
//!          │                             ▼
//!   Idle ◄─┴─ stop_video ────────── Recording
//!    │  ▲
//!    │  └──── FeedLease::close / drop ── Streaming
//!    └──────── open_feed ──────────────────▲
//!   (qualquer) ── close ──► Closed
//! ```
//!
//! Durante a espera de estabilização a câmera fica em `Settling` com o lock
//! liberado: `mode()` responde e outras sessões recebem `Busy`.

use std::fmt::Debug;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use pantilt_core::timing::{thread_sleeper, Sleeper};

use crate::error::{PhotonicError, PhotonicResult};
use crate::types::CaptureSettings;

/// Espera de estabilização do sensor antes de capturar/gravar e antes de
/// parar uma gravação
pub const CAPTURE_SETTLE: Duration = Duration::from_secs(1);

/// Driver de câmera (colaborador externo)
pub trait CaptureDevice: Send + Debug {
    /// Aplica resolução e flips
    fn configure(&mut self, settings: CaptureSettings) -> PhotonicResult<()>;
    /// Captura uma foto (JPEG) em `path`
    fn capture(&mut self, path: &Path) -> PhotonicResult<()>;
    /// Inicia gravação (H.264 bruto) em `path`
    fn start_recording(&mut self, path: &Path) -> PhotonicResult<()>;
    fn stop_recording(&mut self) -> PhotonicResult<()>;
    /// Abre um feed contínuo de buffers BGR
    fn start_continuous_feed(&mut self, settings: CaptureSettings) -> PhotonicResult<Box<dyn FrameSource>>;
    /// Libera o dispositivo
    fn close(&mut self) -> PhotonicResult<()>;
}

/// Sequência contínua de buffers brutos
pub trait FrameSource: Send + Debug {
    /// Próximo buffer BGR (bloqueia até haver um)
    fn next_buffer(&mut self) -> PhotonicResult<Vec<u8>>;
    /// Fecha o feed e o buffer de apoio
    fn close(&mut self) -> PhotonicResult<()>;
}

/// Sessão ativa na câmera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    Idle,
    /// Esperando o sensor estabilizar; o dispositivo continua reservado
    Settling,
    Recording,
    Streaming,
    Closed,
}

#[derive(Debug)]
struct CameraInner {
    device: Option<Box<dyn CaptureDevice>>,
    mode: CameraMode,
    hflip: bool,
    vflip: bool,
}

impl CameraInner {
    fn settings(&self, width: u32, height: u32) -> CaptureSettings {
        CaptureSettings {
            width,
            height,
            hflip: self.hflip,
            vflip: self.vflip,
        }
    }

    /// Dispositivo disponível para uma nova sessão
    fn idle_device(&mut self, purpose: &str) -> PhotonicResult<&mut Box<dyn CaptureDevice>> {
        match self.mode {
            CameraMode::Idle => {}
            CameraMode::Closed => return Err(PhotonicError::Closed),
            CameraMode::Settling => {
                return Err(PhotonicError::Busy(format!("cannot {} while settling", purpose)));
            }
            CameraMode::Recording => {
                return Err(PhotonicError::Busy(format!("cannot {} while recording", purpose)));
            }
            CameraMode::Streaming => {
                return Err(PhotonicError::Busy(format!("cannot {} while streaming", purpose)));
            }
        }
        self.device.as_mut().ok_or(PhotonicError::Closed)
    }
}

fn lock_inner(inner: &Mutex<CameraInner>) -> MutexGuard<'_, CameraInner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Handle compartilhado para um dispositivo de captura
#[derive(Debug, Clone)]
pub struct Camera {
    inner: Arc<Mutex<CameraInner>>,
    sleeper: Arc<dyn Sleeper>,
}

impl Camera {
    pub fn new<D: CaptureDevice + 'static>(device: D) -> Self {
        Self::with_sleeper(Box::new(device), thread_sleeper())
    }

    pub fn with_sleeper(device: Box<dyn CaptureDevice>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CameraInner {
                device: Some(device),
                mode: CameraMode::Idle,
                hflip: true,
                vflip: true,
            })),
            sleeper,
        }
    }

    /// Define os flips aplicados em toda configuração
    pub fn with_flip(self, hflip: bool, vflip: bool) -> Self {
        {
            let mut inner = lock_inner(&self.inner);
            inner.hflip = hflip;
            inner.vflip = vflip;
        }
        self
    }

    pub fn mode(&self) -> CameraMode {
        lock_inner(&self.inner).mode
    }

    pub fn is_open(&self) -> bool {
        self.mode() != CameraMode::Closed
    }

    /// Foto única: configura, espera o sensor e captura
    pub fn capture_photo(&self, width: u32, height: u32, path: &Path) -> PhotonicResult<()> {
        self.configure_and_settle(width, height, "capture a photo")?;

        let mut inner = lock_inner(&self.inner);
        let captured = match inner.device.as_mut() {
            Some(device) => device.capture(path),
            None => Err(PhotonicError::Closed),
        };
        inner.mode = CameraMode::Idle;
        captured?;

        tracing::info!(width, height, path = %path.display(), "photo captured");
        Ok(())
    }

    /// Inicia gravação de vídeo
    pub fn start_video(&self, width: u32, height: u32, path: &Path) -> PhotonicResult<()> {
        self.configure_and_settle(width, height, "start recording")?;

        let mut inner = lock_inner(&self.inner);
        let started = match inner.device.as_mut() {
            Some(device) => device.start_recording(path),
            None => Err(PhotonicError::Closed),
        };
        if let Err(e) = started {
            inner.mode = CameraMode::Idle;
            return Err(e);
        }

        inner.mode = CameraMode::Recording;
        tracing::info!(width, height, path = %path.display(), "recording started");
        Ok(())
    }

    /// Para a gravação em andamento
    pub fn stop_video(&self) -> PhotonicResult<()> {
        {
            let mut inner = lock_inner(&self.inner);
            match inner.mode {
                CameraMode::Recording => {}
                CameraMode::Closed => return Err(PhotonicError::Closed),
                _ => return Err(PhotonicError::CaptureFailed("camera is not recording".into())),
            }
            inner.mode = CameraMode::Settling;
        }

        self.sleeper.sleep(CAPTURE_SETTLE);

        let mut inner = lock_inner(&self.inner);
        let stopped = match inner.device.as_mut() {
            Some(device) => device.stop_recording(),
            None => Err(PhotonicError::Closed),
        };
        inner.mode = CameraMode::Idle;
        stopped?;

        tracing::info!("recording stopped");
        Ok(())
    }

    /// Configura o dispositivo e espera o sensor com o lock liberado.
    /// A câmera fica em `Settling` até o chamador concluir a operação.
    fn configure_and_settle(&self, width: u32, height: u32, purpose: &str) -> PhotonicResult<()> {
        {
            let mut inner = lock_inner(&self.inner);
            let settings = inner.settings(width, height);
            settings.validate()?;
            inner.idle_device(purpose)?.configure(settings)?;
            inner.mode = CameraMode::Settling;
        }

        self.sleeper.sleep(CAPTURE_SETTLE);
        Ok(())
    }

    /// Abre o feed contínuo. A câmera fica em `Streaming` até o
    /// [`FeedLease`] ser fechado ou descartado.
    pub fn open_feed(&self, width: u32, height: u32) -> PhotonicResult<FeedLease> {
        let mut inner = lock_inner(&self.inner);
        let settings = inner.settings(width, height);
        settings.validate()?;
        let device = inner.idle_device("open a continuous feed")?;

        device.configure(settings)?;
        let source = device.start_continuous_feed(settings)?;

        inner.mode = CameraMode::Streaming;
        Ok(FeedLease {
            source: Some(source),
            camera: Arc::clone(&self.inner),
            settings,
        })
    }

    /// Libera o dispositivo. Idempotente.
    ///
    /// Falha com `Busy` enquanto um feed estiver aberto: o produtor precisa
    /// ter terminado antes.
    pub fn close(&self) -> PhotonicResult<()> {
        let mut inner = lock_inner(&self.inner);
        match inner.mode {
            CameraMode::Closed => return Ok(()),
            CameraMode::Streaming => {
                return Err(PhotonicError::Busy("continuous feed still open".into()));
            }
            CameraMode::Settling => {
                return Err(PhotonicError::Busy("camera is settling".into()));
            }
            CameraMode::Recording => {
                if let Some(device) = inner.device.as_mut() {
                    if let Err(e) = device.stop_recording() {
                        tracing::warn!(error = %e, "stop recording on close failed");
                    }
                }
            }
            CameraMode::Idle => {}
        }

        inner.mode = CameraMode::Closed;
        match inner.device.take() {
            Some(mut device) => {
                tracing::info!("camera closed");
                device.close()
            }
            None => Ok(()),
        }
    }
}

/// Feed contínuo aberto. Mantém a câmera em `Streaming`.
#[derive(Debug)]
pub struct FeedLease {
    source: Option<Box<dyn FrameSource>>,
    camera: Arc<Mutex<CameraInner>>,
    settings: CaptureSettings,
}

impl FeedLease {
    pub fn settings(&self) -> CaptureSettings {
        self.settings
    }

    pub fn next_buffer(&mut self) -> PhotonicResult<Vec<u8>> {
        self.source
            .as_mut()
            .ok_or(PhotonicError::Closed)?
            .next_buffer()
    }

    /// Fecha o feed e devolve a câmera a `Idle`
    pub fn close(mut self) -> PhotonicResult<()> {
        self.finish()
    }

    fn finish(&mut self) -> PhotonicResult<()> {
        let Some(mut source) = self.source.take() else {
            return Ok(());
        };
        let closed = source.close();
        drop(source);

        let mut inner = lock_inner(&self.camera);
        if inner.mode == CameraMode::Streaming {
            inner.mode = CameraMode::Idle;
        }
        closed
    }
}

impl Drop for FeedLease {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            tracing::warn!(error = %e, "closing continuous feed failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{CameraEvent, SyntheticCamera};
    use pantilt_core::timing::RecordingSleeper;
    use std::path::PathBuf;

    fn camera() -> (Camera, SyntheticCamera, RecordingSleeper) {
        let device = SyntheticCamera::new();
        let sleeper = RecordingSleeper::new();
        let camera = Camera::with_sleeper(Box::new(device.clone()), Arc::new(sleeper.clone()));
        (camera, device, sleeper)
    }

    #[test]
    fn test_video_roundtrip_settles() {
        let (camera, device, sleeper) = camera();
        camera.start_video(240, 320, Path::new("pan.h264")).unwrap();
        assert_eq!(camera.mode(), CameraMode::Recording);
        camera.stop_video().unwrap();
        assert_eq!(camera.mode(), CameraMode::Idle);
        assert_eq!(sleeper.recorded(), vec![CAPTURE_SETTLE, CAPTURE_SETTLE]);
        assert_eq!(
            device.events(),
            vec![
                CameraEvent::Configure(CaptureSettings::new(240, 320)),
                CameraEvent::StartRecording(PathBuf::from("pan.h264")),
                CameraEvent::StopRecording,
            ]
        );
    }

    #[test]
    fn test_flip_is_forwarded() {
        let (camera, device, _) = camera();
        let camera = camera.with_flip(false, true);
        camera.capture_photo(720, 960, Path::new("photo.jpg")).unwrap();
        match &device.events()[0] {
            CameraEvent::Configure(s) => assert!(!s.hflip && s.vflip),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_stop_without_recording() {
        let (camera, _, _) = camera();
        assert!(matches!(camera.stop_video(), Err(PhotonicError::CaptureFailed(_))));
    }

    #[test]
    fn test_feed_blocks_recording() {
        let (camera, _, _) = camera();
        let lease = camera.open_feed(64, 48).unwrap();
        assert!(matches!(
            camera.start_video(64, 48, Path::new("x.h264")),
            Err(PhotonicError::Busy(_))
        ));
        assert!(matches!(camera.close(), Err(PhotonicError::Busy(_))));
        lease.close().unwrap();
        assert_eq!(camera.mode(), CameraMode::Idle);
        assert!(camera.start_video(64, 48, Path::new("x.h264")).is_ok());
    }

    #[test]
    fn test_recording_blocks_feed() {
        let (camera, _, _) = camera();
        camera.start_video(64, 48, Path::new("x.h264")).unwrap();
        assert!(matches!(camera.open_feed(64, 48), Err(PhotonicError::Busy(_))));
    }

    #[test]
    fn test_dropped_lease_resets_mode() {
        let (camera, device, _) = camera();
        {
            let _lease = camera.open_feed(8, 8).unwrap();
            assert_eq!(camera.mode(), CameraMode::Streaming);
        }
        assert_eq!(camera.mode(), CameraMode::Idle);
        assert_eq!(device.events().last(), Some(&CameraEvent::FeedClosed));
    }

    #[test]
    fn test_close_is_idempotent() {
        let (camera, device, _) = camera();
        camera.close().unwrap();
        camera.close().unwrap();
        let closes = device.events().iter().filter(|e| **e == CameraEvent::Closed).count();
        assert_eq!(closes, 1);
        assert_eq!(
            camera.capture_photo(10, 10, Path::new("p.jpg")),
            Err(PhotonicError::Closed)
        );
    }

    #[test]
    fn test_close_stops_recording() {
        let (camera, device, _) = camera();
        camera.start_video(64, 48, Path::new("x.h264")).unwrap();
        camera.close().unwrap();
        let events = device.events();
        assert_eq!(&events[events.len() - 2..], &[CameraEvent::StopRecording, CameraEvent::Closed]);
    }

    #[test]
    fn test_start_failure_keeps_idle() {
        let (camera, device, _) = camera();
        device.fail_configure(true);
        assert!(camera.start_video(64, 48, Path::new("x.h264")).is_err());
        assert_eq!(camera.mode(), CameraMode::Idle);
    }

    /// Consulta a câmera de dentro da espera de estabilização
    #[derive(Debug, Default)]
    struct SettleObserver {
        camera: Mutex<Option<Camera>>,
        seen: Mutex<Vec<(CameraMode, bool)>>,
    }

    impl Sleeper for SettleObserver {
        fn sleep(&self, _duration: Duration) {
            let camera = self.camera.lock().unwrap().clone();
            if let Some(camera) = camera {
                let feed_busy = matches!(camera.open_feed(8, 8), Err(PhotonicError::Busy(_)));
                let close_busy = matches!(camera.close(), Err(PhotonicError::Busy(_)));
                self.seen.lock().unwrap().push((camera.mode(), feed_busy && close_busy));
            }
        }
    }

    #[test]
    fn test_settle_releases_lock() {
        let device = SyntheticCamera::new();
        let observer = Arc::new(SettleObserver::default());
        let camera = Camera::with_sleeper(Box::new(device.clone()), observer.clone());
        *observer.camera.lock().unwrap() = Some(camera.clone());

        camera.capture_photo(64, 48, Path::new("p.jpg")).unwrap();
        assert_eq!(camera.mode(), CameraMode::Idle);
        camera.start_video(64, 48, Path::new("x.h264")).unwrap();
        assert_eq!(camera.mode(), CameraMode::Recording);
        camera.stop_video().unwrap();
        assert_eq!(camera.mode(), CameraMode::Idle);

        observer.camera.lock().unwrap().take();
        assert_eq!(*observer.seen.lock().unwrap(), vec![(CameraMode::Settling, true); 3]);
        assert!(!device.events().contains(&CameraEvent::Closed));
    }

    #[test]
    fn test_failed_capture_returns_to_idle() {
        let (camera, device, _) = camera();
        device.fail_capture(true);
        assert!(camera.capture_photo(64, 48, Path::new("p.jpg")).is_err());
        assert_eq!(camera.mode(), CameraMode::Idle);
        device.fail_capture(false);
        assert!(camera.capture_photo(64, 48, Path::new("p.jpg")).is_ok());
    }

    #[test]
    fn test_invalid_resolution() {
        let (camera, _, _) = camera();
        assert!(matches!(
            camera.start_video(0, 48, Path::new("x.h264")),
            Err(PhotonicError::InvalidConfig(_))
        ));
    }
}
