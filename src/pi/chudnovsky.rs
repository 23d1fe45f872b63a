//! # Serie de Chudnovsky
//! src/pi/chudnovsky.rs
//!
//! π = 426880·√10005 / Σ aₖ·(13591409 + 545140134·k)
//!
//! donde aₖ = (-1)ᵏ (6k)! / ((3k)! (k!)³ 640320³ᵏ). Cada término aporta
//! ~14 dígitos correctos, por eso usamos `n/14 + 3` términos.
//!
//! Se trabaja en punto fijo con enteros grandes: todos los valores están
//! multiplicados por 10^(n + GUARD_DIGITS). Los dígitos de guarda absorben
//! el error de truncamiento de las divisiones y de la raíz cuadrada.
//!
//! aₖ se obtiene de aₖ₋₁ con la recurrencia
//!
//! ```text
//! aₖ = -aₖ₋₁ · (6k-5)(2k-1)(6k-1) / (k³ · 640320³/24)
//! ```

use super::pacing::{NoPacing, Pacer};
use num_bigint::BigInt;
use num_traits::Zero;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Dígitos extra de precisión interna
pub const GUARD_DIGITS: usize = 10;

/// 640320³ / 24
const C3_OVER_24: u64 = 10_939_058_860_032_000;

const LINEAR_A: u64 = 13_591_409;
const LINEAR_B: u64 = 545_140_134;

/// Número de términos necesarios para `digits` dígitos
pub fn terms_for(digits: usize) -> usize {
    digits / 14 + 3
}

/// Evento de progreso emitido por el algoritmo
///
/// `total` incluye un paso final de redondeo/formateo, así que la fracción
/// llega a 1.0 solo cuando el string de dígitos ya existe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub completed: usize,
    pub total: usize,
}

impl ProgressEvent {
    /// Fracción completada en (0, 1]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }

    pub fn is_final(&self) -> bool {
        self.completed >= self.total
    }
}

/// Errores del cálculo
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComputeError {
    #[error("n must be non-negative, got {digits}")]
    InvalidArgument { digits: i64 },

    #[error("Computation was cancelled")]
    Cancelled,

    #[error("Computation exceeded time limit of {}ms", .limit.as_millis())]
    TimedOut { limit: Duration },
}

impl ComputeError {
    /// Nombre corto del tipo de error (se expone en el payload de falla)
    pub fn kind(&self) -> &'static str {
        match self {
            ComputeError::InvalidArgument { .. } => "InvalidArgument",
            ComputeError::Cancelled => "Cancelled",
            ComputeError::TimedOut { .. } => "TimedOut",
        }
    }
}

/// Calculadora de π
pub struct SeriesComputer {
    pacer: Box<dyn Pacer>,
    cancel: Option<CancellationToken>,
    time_limit: Option<Duration>,
}

impl SeriesComputer {
    /// Calculadora sin pausas, sin cancelación y sin límite de tiempo
    pub fn new() -> Self {
        Self {
            pacer: Box::new(NoPacing),
            cancel: None,
            time_limit: None,
        }
    }

    pub fn with_pacer(mut self, pacer: Box<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    /// El token se revisa una vez por término
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Límite de tiempo contado desde el inicio de `compute`
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Calcula π con exactamente `digits` dígitos decimales (redondeado)
    ///
    /// `on_progress` se invoca después de cada término y una última vez
    /// después de formatear el resultado (fracción 1.0).
    ///
    /// # Errores
    ///
    /// - `InvalidArgument` si `digits < 0`, antes de emitir cualquier evento
    /// - `Cancelled` / `TimedOut` si se interrumpe entre términos
    pub fn compute<F>(&self, digits: i64, mut on_progress: F) -> Result<String, ComputeError>
    where
        F: FnMut(ProgressEvent),
    {
        let n = usize::try_from(digits).map_err(|_| ComputeError::InvalidArgument { digits })?;
        let deadline = self.time_limit.map(|limit| (Instant::now() + limit, limit));

        let terms = terms_for(n);
        let total = terms + 1;
        let one = pow10(n + GUARD_DIGITS);

        let mut term = one.clone();
        let mut a_sum = BigInt::zero();
        let mut b_sum = BigInt::zero();

        for k in 0..terms {
            self.check_interrupt(deadline)?;

            if k > 0 {
                let k_big = BigInt::from(k);
                let numerator =
                    BigInt::from(6 * k - 5) * BigInt::from(2 * k - 1) * BigInt::from(6 * k - 1);
                let denominator = &k_big * &k_big * &k_big * BigInt::from(C3_OVER_24);
                term *= -numerator;
                term /= denominator;
                b_sum += &term * &k_big;
            }
            a_sum += &term;

            self.pacer.pause(k);
            on_progress(ProgressEvent {
                completed: k + 1,
                total,
            });
        }

        let series = a_sum * LINEAR_A + b_sum * LINEAR_B;
        let sqrt_10005 = (BigInt::from(10_005u32) * &one * &one).sqrt();
        let pi = BigInt::from(426_880u32) * sqrt_10005 * &one / series;

        let value = format_rounded(&pi, n);
        on_progress(ProgressEvent {
            completed: total,
            total,
        });
        Ok(value)
    }

    fn check_interrupt(&self, deadline: Option<(Instant, Duration)>) -> Result<(), ComputeError> {
        if self.cancel.as_ref().is_some_and(|token| token.is_cancelled()) {
            return Err(ComputeError::Cancelled);
        }
        if let Some((at, limit)) = deadline {
            if Instant::now() >= at {
                return Err(ComputeError::TimedOut { limit });
            }
        }
        Ok(())
    }
}

impl Default for SeriesComputer {
    fn default() -> Self {
        Self::new()
    }
}

fn pow10(exp: usize) -> BigInt {
    num_traits::pow(BigInt::from(10u8), exp)
}

/// Redondea (half-up) un valor en punto fijo con `digits + GUARD_DIGITS`
/// decimales a `digits` decimales y lo formatea.
///
/// Con `digits == 0` el resultado es la parte entera seguida de `.`
fn format_rounded(scaled: &BigInt, digits: usize) -> String {
    let guard = pow10(GUARD_DIGITS);
    let half = &guard / 2u32;
    let rounded = (scaled + half) / guard;

    if digits == 0 {
        return format!("{}.", rounded);
    }

    let unit = pow10(digits);
    let int_part = &rounded / &unit;
    let frac = (&rounded % &unit).to_string();
    let padding = "0".repeat(digits.saturating_sub(frac.len()));
    format!("{}.{}{}", int_part, padding, frac)
}
