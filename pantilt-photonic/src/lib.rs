//! # 📷 pantilt-photonic — Câmera do suporte
//!
//! Foto, gravação de vídeo e streaming contínuo de frames BGR sobre um
//! dispositivo de captura externo.
//!
//! ## Arquitetura
//!
//! ```text
//! ┌──────────────┐   open_feed    ┌───────────┐  publish  ┌───────────┐
//! │    Camera    │ ─────────────► │ FeedLease │ ────────► │ FrameSlot │ ◄── latest()
//! │ (exclusiva)  │                │ (produtor)│           │ (último)  │
//! └──────┬───────┘                └───────────┘           └───────────┘
//!        │ CaptureDevice
//!        ▼
//!   driver real / SyntheticCamera
//! ```
//!
//! Gravação e streaming nunca usam o dispositivo ao mesmo tempo.
//!
//! ## Exemplo
//!
//! ```no_run
//! use pantilt_photonic::{Camera, FrameStreamer, SyntheticCamera};
//!
//! let camera = Camera::new(SyntheticCamera::new());
//! let mut streamer = FrameStreamer::new(camera);
//! streamer.start(320, 240)?;
//! if let Some(frame) = streamer.latest_frame() {
//!     println!("{}x{}", frame.width, frame.height);
//! }
//! streamer.cleanup()?;
//! # Ok::<(), pantilt_photonic::PhotonicError>(())
//! ```

pub mod camera;
pub mod error;
pub mod stream;
pub mod synthetic;
pub mod types;

pub use camera::{CAPTURE_SETTLE, Camera, CameraMode, CaptureDevice, FeedLease, FrameSource};
pub use error::{PhotonicError, PhotonicResult};
pub use stream::{FrameSlot, FrameStreamer, STREAM_WARMUP, StreamState};
pub use synthetic::{CameraEvent, SyntheticCamera, SyntheticFeed, frame_marker};
pub use types::{CHANNELS, CaptureSettings, Frame};
