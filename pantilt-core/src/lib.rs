//! # 🎯 pantilt-core — Abstrações base do suporte pan/tilt
//!
//! Define os traits que os demais crates do workspace implementam e o relógio
//! injetável usado por todas as esperas de duração fixa.
//!
//! > *"Trait no core, implementação no módulo."*
//!
//! | Crate | Implementa |
//! |:------|:-----------|
//! | `pantilt-actuator` | [`Actuator`](traits::Actuator) para servos |
//! | `pantilt-photonic` | câmera e streaming de frames |
//! | `pantilt-orchestration` | [`MountComponent`](traits::MountComponent) para o suporte |

pub mod traits;
pub mod timing;

pub use traits::{Actuator, ActuatorStatus, MountComponent};
pub use timing::{thread_sleeper, RecordingSleeper, Sleeper, ThreadSleeper};

/// Re-exports de uso comum
pub mod prelude {
    pub use crate::timing::{thread_sleeper, RecordingSleeper, Sleeper, ThreadSleeper};
    pub use crate::traits::{Actuator, ActuatorStatus, MountComponent};
}
