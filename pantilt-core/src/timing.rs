//! Relógio injetável para esperas de duração fixa
//!
//! Todo atraso do sistema (settle de 5 ms, pausa de 500 ms, warm-up de 1 s) é
//! uma espera fixa. Passar por um [`Sleeper`] permite que os testes verifiquem
//! o contrato de tempo sem dormir de verdade.

use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Fonte de esperas bloqueantes
pub trait Sleeper: Send + Sync + Debug {
    /// Bloqueia a thread chamadora por `duration`
    fn sleep(&self, duration: Duration);
}

/// Espera real via `std::thread::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Registra as esperas pedidas sem bloquear.
///
/// Clones compartilham o mesmo registro.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    log: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Todas as esperas registradas, em ordem
    pub fn recorded(&self) -> Vec<Duration> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Quantas esperas de exatamente `duration` foram pedidas
    pub fn count_of(&self, duration: Duration) -> usize {
        self.recorded().iter().filter(|d| **d == duration).count()
    }

    /// Soma de todas as esperas
    pub fn total(&self) -> Duration {
        self.recorded().iter().sum()
    }

    pub fn clear(&self) {
        if let Ok(mut log) = self.log.lock() {
            log.clear();
        }
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        if let Ok(mut log) = self.log.lock() {
            log.push(duration);
        }
    }
}

/// Sleeper padrão compartilhado
pub fn thread_sleeper() -> Arc<dyn Sleeper> {
    Arc::new(ThreadSleeper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_recording_sleeper_does_not_block() {
        let sleeper = RecordingSleeper::new();
        let start = Instant::now();
        sleeper.sleep(Duration::from_secs(10));
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(sleeper.recorded(), vec![Duration::from_secs(10)]);
    }

    #[test]
    fn test_recording_sleeper_clones_share_log() {
        let sleeper = RecordingSleeper::new();
        let clone = sleeper.clone();
        clone.sleep(Duration::from_millis(5));
        clone.sleep(Duration::from_millis(5));
        clone.sleep(Duration::from_millis(500));

        assert_eq!(sleeper.count_of(Duration::from_millis(5)), 2);
        assert_eq!(sleeper.total(), Duration::from_millis(510));

        sleeper.clear();
        assert!(clone.recorded().is_empty());
    }

    #[test]
    fn test_thread_sleeper_blocks() {
        let start = Instant::now();
        ThreadSleeper.sleep(Duration::from_millis(5));
        assert!(start.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn test_shared_thread_sleeper_blocks() {
        let sleeper = thread_sleeper();
        let start = Instant::now();
        sleeper.sleep(Duration::from_millis(5));
        assert!(start.elapsed() >= Duration::from_millis(5));
    }
}
