//! # Cálculo de π
//! src/pi/mod.rs
//!
//! Algoritmo puro: calcula π con N dígitos decimales usando la serie de
//! Chudnovsky y reporta su avance mediante eventos `ProgressEvent`.
//! No sabe nada de jobs ni de cómo se despacha el trabajo.
//!
//! ## Ejemplo
//!
//! ```
//! use pi_jobs::pi::SeriesComputer;
//!
//! let computer = SeriesComputer::new();
//! let pi = computer.compute(5, |_event| {}).unwrap();
//! assert_eq!(pi, "3.14159");
//! ```

pub mod chudnovsky;
pub mod pacing;

pub use chudnovsky::{terms_for, ComputeError, ProgressEvent, SeriesComputer, GUARD_DIGITS};
pub use pacing::{NoPacing, Pacer, RandomPacing};
