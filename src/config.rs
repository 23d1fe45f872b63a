//! # Configuración del Servidor
//! src/config.rs
//!
//! Argumentos CLI con respaldo en variables de entorno (también leídas
//! desde `.env` al arrancar).
//!
//! ### CLI
//! ```bash
//! ./pi_jobs --port 8080 --workers 8 --pacing-max-ms 0
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 WORKERS=8 PACING_MAX_MS=0 ./pi_jobs
//! ```

use crate::error::ConfigError;
use clap::Parser;

/// Configuración del servicio de cálculo de π
#[derive(Debug, Clone, Parser)]
#[command(name = "pi_jobs")]
#[command(about = "Servicio HTTP de cálculo de π en segundo plano con polling de progreso")]
#[command(version)]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "5000", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    // === Ejecución ===
    /// Número de workers que calculan π en paralelo
    #[arg(long, default_value = "4", env = "WORKERS")]
    pub workers: usize,

    /// Capacidad máxima de la cola de jobs pendientes
    #[arg(long = "queue-capacity", default_value = "1000", env = "QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    /// Máximo de dígitos aceptado por /calculate_pi
    #[arg(long = "max-digits", default_value = "100000", env = "MAX_DIGITS")]
    pub max_digits: i64,

    /// Pausa aleatoria máxima entre términos, en milisegundos (0 = sin pausas)
    #[arg(long = "pacing-max-ms", default_value = "30", env = "PACING_MAX_MS")]
    pub pacing_max_ms: u64,

    /// Tiempo máximo por job en milisegundos (0 = sin límite)
    #[arg(long = "job-timeout-ms", default_value = "0", env = "JOB_TIMEOUT_MS")]
    pub job_timeout_ms: u64,

    // === Limpieza ===
    /// Segundos que un job terminado permanece consultable
    #[arg(long = "jobs-cleanup-age", default_value = "3600", env = "JOBS_CLEANUP_AGE")]
    pub jobs_cleanup_age_secs: u64,

    /// Cada cuántos segundos corre la limpieza
    #[arg(long = "cleanup-interval", default_value = "60", env = "CLEANUP_INTERVAL")]
    pub cleanup_interval_secs: u64,
}

impl Config {
    /// Dirección completa para bind (host:port)
    ///
    /// ```rust
    /// use pi_jobs::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:5000");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::NoQueueCapacity);
        }
        if self.max_digits < 1 {
            return Err(ConfigError::NoMaxDigits);
        }
        if self.cleanup_interval_secs == 0 {
            return Err(ConfigError::NoCleanupInterval);
        }
        Ok(())
    }

    /// Registra un resumen de la configuración
    pub fn log_summary(&self) {
        tracing::info!(
            address = %self.address(),
            workers = self.workers,
            queue_capacity = self.queue_capacity,
            max_digits = self.max_digits,
            "Server configuration"
        );
        tracing::info!(
            pacing_max_ms = self.pacing_max_ms,
            job_timeout_ms = self.job_timeout_ms,
            jobs_cleanup_age_secs = self.jobs_cleanup_age_secs,
            cleanup_interval_secs = self.cleanup_interval_secs,
            "Job execution settings"
        );
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "127.0.0.1".to_string(),
            workers: 4,
            queue_capacity: 1000,
            max_digits: 100_000,
            pacing_max_ms: 30,
            job_timeout_ms: 0,
            jobs_cleanup_age_secs: 3600,
            cleanup_interval_secs: 60,
        }
    }
}
