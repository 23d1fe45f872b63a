//! # Pausas entre Términos
//! src/pi/pacing.rs
//!
//! El cálculo es tan rápido para N chico que el progreso no se alcanza a
//! observar. `Pacer` es el gancho que se invoca después de cada término;
//! en producción mete una pausa aleatoria corta, en tests no hace nada.

use rand::Rng;
use std::thread;
use std::time::Duration;

/// Gancho invocado una vez por término
pub trait Pacer: Send + Sync {
    /// Llamado después de terminar el término `term` (base 0)
    fn pause(&self, term: usize);
}

/// Sin pausas
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

impl Pacer for NoPacing {
    fn pause(&self, _term: usize) {}
}

/// Pausa aleatoria uniforme en `[0, max)`
#[derive(Debug, Clone, Copy)]
pub struct RandomPacing {
    max: Duration,
}

impl RandomPacing {
    pub fn new(max: Duration) -> Self {
        Self { max }
    }

    /// Construye el pacer a partir de milisegundos; 0 desactiva las pausas
    pub fn from_millis(max_ms: u64) -> Box<dyn Pacer> {
        if max_ms == 0 {
            Box::new(NoPacing)
        } else {
            Box::new(Self::new(Duration::from_millis(max_ms)))
        }
    }

    pub fn max(&self) -> Duration {
        self.max
    }
}

impl Pacer for RandomPacing {
    fn pause(&self, _term: usize) {
        if self.max.is_zero() {
            return;
        }
        let fraction: f64 = rand::thread_rng().gen_range(0.0..1.0);
        thread::sleep(self.max.mul_f64(fraction));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_random_pacing_stays_below_max() {
        let pacer = RandomPacing::new(Duration::from_millis(5));
        let start = Instant::now();
        for term in 0..4 {
            pacer.pause(term);
        }
        // 4 pausas de < 5ms cada una, con margen para el scheduler
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn test_zero_max_does_not_sleep() {
        let pacer = RandomPacing::new(Duration::ZERO);
        let start = Instant::now();
        pacer.pause(0);
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_from_millis() {
        // Solo verificamos que ambos caminos producen un pacer usable
        RandomPacing::from_millis(0).pause(0);
        RandomPacing::from_millis(1).pause(0);
    }
}
