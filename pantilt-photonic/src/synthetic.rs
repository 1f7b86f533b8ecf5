//! Câmera sintética
//!
//! Gera frames BGR com gradiente e um marcador por frame, registrando cada
//! chamada como [`CameraEvent`]. Usada em testes e quando nenhum driver real
//! está ligado.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::camera::{CaptureDevice, FrameSource};
use crate::error::{PhotonicError, PhotonicResult};
use crate::types::{CHANNELS, CaptureSettings};

/// Chamada registrada no dispositivo sintético
#[derive(Debug, Clone, PartialEq)]
pub enum CameraEvent {
    Configure(CaptureSettings),
    Capture(PathBuf),
    StartRecording(PathBuf),
    StopRecording,
    FeedOpened,
    FeedClosed,
    Closed,
}

#[derive(Debug, Default)]
struct SyntheticState {
    events: Vec<CameraEvent>,
    fail_configure: bool,
    fail_capture: bool,
    fail_feed_after: Option<u64>,
}

/// Dispositivo de captura sintético. Clones compartilham o registro.
#[derive(Debug, Clone)]
pub struct SyntheticCamera {
    state: Arc<Mutex<SyntheticState>>,
    frame_interval: Duration,
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticCamera {
    /// Câmera sintética a ~30 fps
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SyntheticState::default())),
            frame_interval: Duration::from_millis(33),
        }
    }

    /// Intervalo entre frames do feed (zero = o mais rápido possível)
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    fn lock(&self) -> MutexGuard<'_, SyntheticState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn fail_configure(&self, fail: bool) {
        self.lock().fail_configure = fail;
    }

    /// Captura de foto e início de gravação falham
    pub fn fail_capture(&self, fail: bool) {
        self.lock().fail_capture = fail;
    }

    /// O feed falha depois de entregar `frames` buffers
    pub fn fail_feed_after(&self, frames: u64) {
        self.lock().fail_feed_after = Some(frames);
    }

    pub fn events(&self) -> Vec<CameraEvent> {
        self.lock().events.clone()
    }

    fn record(&self, event: CameraEvent) {
        self.lock().events.push(event);
    }
}

impl CaptureDevice for SyntheticCamera {
    fn configure(&mut self, settings: CaptureSettings) -> PhotonicResult<()> {
        let mut state = self.lock();
        if state.fail_configure {
            return Err(PhotonicError::AcquisitionFailed("synthetic camera unavailable".into()));
        }
        state.events.push(CameraEvent::Configure(settings));
        Ok(())
    }

    fn capture(&mut self, path: &Path) -> PhotonicResult<()> {
        let mut state = self.lock();
        if state.fail_capture {
            return Err(PhotonicError::CaptureFailed("synthetic capture failed".into()));
        }
        state.events.push(CameraEvent::Capture(path.to_path_buf()));
        Ok(())
    }

    fn start_recording(&mut self, path: &Path) -> PhotonicResult<()> {
        let mut state = self.lock();
        if state.fail_capture {
            return Err(PhotonicError::CaptureFailed("synthetic recording failed".into()));
        }
        state.events.push(CameraEvent::StartRecording(path.to_path_buf()));
        Ok(())
    }

    fn stop_recording(&mut self) -> PhotonicResult<()> {
        self.record(CameraEvent::StopRecording);
        Ok(())
    }

    fn start_continuous_feed(&mut self, settings: CaptureSettings) -> PhotonicResult<Box<dyn FrameSource>> {
        self.record(CameraEvent::FeedOpened);
        Ok(Box::new(SyntheticFeed {
            camera: self.clone(),
            settings,
            counter: 0,
        }))
    }

    fn close(&mut self) -> PhotonicResult<()> {
        self.record(CameraEvent::Closed);
        Ok(())
    }
}

/// Feed contínuo da câmera sintética
#[derive(Debug)]
pub struct SyntheticFeed {
    camera: SyntheticCamera,
    settings: CaptureSettings,
    counter: u64,
}

impl SyntheticFeed {
    /// Gradiente horizontal de intensidade com variação de cor por linha.
    /// Os primeiros bytes carregam o número do frame.
    fn render(&self) -> Vec<u8> {
        let (width, height) = (self.settings.width, self.settings.height);
        let mut data = Vec::with_capacity(width as usize * height as usize * CHANNELS);

        for y in 0..height {
            let hue_shift = (y * 255 / height) as u8;
            for x in 0..width {
                let intensity = ((x as f32 / width as f32) * 255.0) as u8;
                data.push(intensity.saturating_add(hue_shift / 3));
                data.push(intensity.saturating_sub(hue_shift / 3));
                data.push(intensity);
            }
        }

        let marker = self.counter.to_le_bytes();
        let n = marker.len().min(data.len());
        data[..n].copy_from_slice(&marker[..n]);
        data
    }
}

impl FrameSource for SyntheticFeed {
    fn next_buffer(&mut self) -> PhotonicResult<Vec<u8>> {
        if let Some(limit) = self.camera.lock().fail_feed_after {
            if self.counter >= limit {
                return Err(PhotonicError::CaptureFailed("synthetic feed ended".into()));
            }
        }
        if !self.camera.frame_interval.is_zero() {
            std::thread::sleep(self.camera.frame_interval);
        }
        let data = self.render();
        self.counter += 1;
        Ok(data)
    }

    fn close(&mut self) -> PhotonicResult<()> {
        self.camera.record(CameraEvent::FeedClosed);
        Ok(())
    }
}

/// Número do frame gravado por [`SyntheticFeed`] nos primeiros bytes
pub fn frame_marker(bytes: &[u8]) -> u64 {
    let mut marker = [0u8; 8];
    let n = bytes.len().min(8);
    marker[..n].copy_from_slice(&bytes[..n]);
    u64::from_le_bytes(marker)
}
