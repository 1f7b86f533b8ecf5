//! Streaming contínuo de frames
//!
//! Uma thread produtora puxa buffers do feed contínuo e publica o frame mais
//! recente num [`FrameSlot`]. Consumidores fazem polling; frames não lidos são
//! substituídos (o último vence), nunca enfileirados.
//!
//! ```text
//! Idle ──start──► Running ──stop──► Stopping ──(feed fechado)──► Idle
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use pantilt_core::timing::{thread_sleeper, Sleeper};

use crate::camera::{Camera, FeedLease};
use crate::error::{PhotonicError, PhotonicResult};
use crate::types::Frame;

/// Espera após `start` para garantir o primeiro frame
pub const STREAM_WARMUP: Duration = Duration::from_secs(1);

/// Estado do streamer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Running,
    Stopping,
}

/// Slot do frame mais recente.
///
/// O frame é construído por inteiro antes de entrar no slot e a troca é de
/// um `Arc`, então um leitor vê o frame anterior ou o atual, nunca um frame
/// pela metade. Clones compartilham o mesmo slot.
#[derive(Debug, Clone, Default)]
pub struct FrameSlot {
    latest: Arc<Mutex<Option<Arc<Frame>>>>,
    published: Arc<AtomicU64>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<Frame>>> {
        self.latest.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Substitui o frame publicado
    pub fn publish(&self, frame: Frame) {
        let frame = Arc::new(frame);
        let previous = self.lock().replace(frame);
        // o frame anterior é liberado fora do lock
        drop(previous);
        self.published.fetch_add(1, Ordering::Release);
    }

    /// Frame mais recente (não bloqueia o produtor além da troca do `Arc`)
    pub fn latest(&self) -> Option<Arc<Frame>> {
        self.lock().clone()
    }

    /// Total de frames publicados
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Acquire)
    }

    pub fn clear(&self) {
        self.lock().take();
    }
}

/// Streamer com uma thread produtora dedicada
#[derive(Debug)]
pub struct FrameStreamer {
    camera: Camera,
    slot: FrameSlot,
    stop: Arc<AtomicBool>,
    state: Arc<Mutex<StreamState>>,
    worker: Option<JoinHandle<PhotonicResult<u64>>>,
    sleeper: Arc<dyn Sleeper>,
}

fn lock_state(state: &Mutex<StreamState>) -> MutexGuard<'_, StreamState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FrameStreamer {
    pub fn new(camera: Camera) -> Self {
        Self::with_sleeper(camera, thread_sleeper())
    }

    pub fn with_sleeper(camera: Camera, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            camera,
            slot: FrameSlot::new(),
            stop: Arc::new(AtomicBool::new(false)),
            state: Arc::new(Mutex::new(StreamState::Idle)),
            worker: None,
            sleeper,
        }
    }

    pub fn state(&self) -> StreamState {
        *lock_state(&self.state)
    }

    /// Handle para consumidores em outras threads
    pub fn slot(&self) -> FrameSlot {
        self.slot.clone()
    }

    pub fn latest_frame(&self) -> Option<Arc<Frame>> {
        self.slot.latest()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Abre o feed, inicia a produtora e espera o warm-up
    pub fn start(&mut self, width: u32, height: u32) -> PhotonicResult<()> {
        if self.state() != StreamState::Idle {
            return Err(PhotonicError::Busy("stream already running".into()));
        }
        // Produtora anterior já terminou mas ainda não foi reunida
        if self.worker.is_some() {
            if let Err(e) = self.join() {
                tracing::warn!(error = %e, "previous stream ended with error");
            }
        }

        let lease = self.camera.open_feed(width, height)?;

        self.stop.store(false, Ordering::SeqCst);
        *lock_state(&self.state) = StreamState::Running;

        let slot = self.slot.clone();
        let stop = Arc::clone(&self.stop);
        let state = Arc::clone(&self.state);

        let spawned = thread::Builder::new()
            .name("frame-streamer".to_string())
            .spawn(move || produce(lease, slot, stop, state));

        match spawned {
            Ok(handle) => self.worker = Some(handle),
            Err(e) => {
                *lock_state(&self.state) = StreamState::Idle;
                return Err(PhotonicError::CaptureFailed(format!(
                    "failed to spawn stream thread: {}",
                    e
                )));
            }
        }

        tracing::info!(width, height, "stream started");
        self.sleeper.sleep(STREAM_WARMUP);
        Ok(())
    }

    /// Pede a parada da produtora. Não bloqueia.
    pub fn stop(&self) {
        {
            let mut state = lock_state(&self.state);
            if *state == StreamState::Running {
                *state = StreamState::Stopping;
            }
        }
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Espera a produtora terminar. Retorna quantos frames ela publicou.
    pub fn join(&mut self) -> PhotonicResult<u64> {
        let Some(handle) = self.worker.take() else {
            return Ok(0);
        };
        match handle.join() {
            Ok(result) => result,
            Err(_) => {
                *lock_state(&self.state) = StreamState::Idle;
                Err(PhotonicError::StreamPanicked)
            }
        }
    }

    /// Para, reúne a produtora e só então fecha a câmera. Idempotente.
    pub fn cleanup(&mut self) -> PhotonicResult<()> {
        self.stop();
        let joined = self.join();
        if let Err(e) = &joined {
            tracing::warn!(error = %e, "stream producer ended with error");
        }
        self.camera.close()?;
        joined.map(|_| ())
    }
}

impl Drop for FrameStreamer {
    fn drop(&mut self) {
        self.stop();
        if let Err(e) = self.join() {
            tracing::warn!(error = %e, "stream producer ended with error");
        }
    }
}

/// Laço da produtora
fn produce(
    mut lease: FeedLease,
    slot: FrameSlot,
    stop: Arc<AtomicBool>,
    state: Arc<Mutex<StreamState>>,
) -> PhotonicResult<u64> {
    let settings = lease.settings();
    let mut produced = 0u64;

    let outcome = loop {
        match lease.next_buffer() {
            Ok(buffer) => match Frame::from_bgr(settings.width, settings.height, buffer) {
                Ok(frame) => {
                    slot.publish(frame);
                    produced += 1;
                }
                Err(e) => tracing::warn!(error = %e, "dropping malformed frame"),
            },
            Err(e) => break Err(e),
        }
        if stop.load(Ordering::SeqCst) {
            break Ok(produced);
        }
    };

    let closed = lease.close();
    *lock_state(&state) = StreamState::Idle;
    tracing::info!(frames = produced, "stream stopped");

    let produced = outcome?;
    closed.map(|_| produced)
}
