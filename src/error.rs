//! # Errores del Servicio
//! src/error.rs
//!
//! Taxonomía de errores compartida por el sistema de jobs, la
//! configuración y el servidor.
//!
//! - `InvalidArgument`: entrada malformada, se rechaza al enviar el job.
//! - `NotFound`: id que no corresponde a ningún job (error de frontera).
//! - `Computation`: falla durante la ejecución, queda guardada en el job.

use crate::jobs::JobId;
use crate::pi::ComputeError;

/// Errores del sistema de jobs
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// Parámetro ausente, no entero o fuera de rango
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No existe un job con ese identificador
    #[error("Job not found: {0}")]
    NotFound(String),

    /// El job ya está en un estado terminal y no acepta más escrituras
    #[error("Job already finished: {0}")]
    AlreadyTerminal(JobId),

    /// La cola de despacho está llena
    #[error("Queue is full (max capacity: {capacity})")]
    QueueFull { capacity: usize },

    /// Falla del cálculo en sí
    #[error(transparent)]
    Computation(#[from] ComputeError),
}

/// Errores de validación de la configuración
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Workers must be >= 1")]
    NoWorkers,

    #[error("Queue capacity must be >= 1")]
    NoQueueCapacity,

    #[error("Max digits must be >= 1")]
    NoMaxDigits,

    #[error("Cleanup interval must be > 0")]
    NoCleanupInterval,
}

/// Errores al levantar el servidor
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
