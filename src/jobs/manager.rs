//! # Gestor Central de Jobs
//! src/jobs/manager.rs
//!
//! Coordina el ciclo de vida de los jobs: envío, despacho a workers,
//! polling, cancelación y limpieza de jobs antiguos.

use crate::error::JobError;
use crate::jobs::executor::{spawn_workers, Executor, ExecutorConfig};
use crate::jobs::job::{Job, JobId};
use crate::jobs::queue::{Dispatch, JobQueue};
use crate::jobs::status::{project, StatusView};
use crate::jobs::store::JobStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Configuración del Job Manager
#[derive(Debug, Clone)]
pub struct JobManagerConfig {
    /// Número de workers
    pub workers: usize,

    /// Capacidad máxima de la cola de despacho
    pub queue_capacity: usize,

    /// Máximo de dígitos aceptado por `submit`
    pub max_digits: i64,

    /// Pausa máxima entre términos (0 = sin pausas)
    pub pacing_max_ms: u64,

    /// Tiempo máximo por job (0 = sin límite)
    pub job_timeout_ms: u64,

    /// Edad a partir de la cual se eliminan jobs terminados
    pub cleanup_age: Duration,

    /// Cada cuánto corre la limpieza
    pub cleanup_interval: Duration,
}

impl Default for JobManagerConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 1000,
            max_digits: 100_000,
            pacing_max_ms: 30,
            job_timeout_ms: 0,
            cleanup_age: Duration::from_secs(3600),
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

impl JobManagerConfig {
    /// Crea una configuración desde el Config principal
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            workers: config.workers,
            queue_capacity: config.queue_capacity,
            max_digits: config.max_digits,
            pacing_max_ms: config.pacing_max_ms,
            job_timeout_ms: config.job_timeout_ms,
            cleanup_age: Duration::from_secs(config.jobs_cleanup_age_secs),
            cleanup_interval: Duration::from_secs(config.cleanup_interval_secs),
        }
    }

    fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            pacing_max_ms: self.pacing_max_ms,
            time_limit: (self.job_timeout_ms > 0).then(|| Duration::from_millis(self.job_timeout_ms)),
        }
    }
}

/// Gestor central de jobs
pub struct JobManager {
    config: JobManagerConfig,
    store: JobStore,
    queue: JobQueue,

    /// Tokens de cancelación de jobs no terminados
    cancels: Arc<Mutex<HashMap<JobId, CancellationToken>>>,

    /// Señal de apagado para el hilo de limpieza
    shutdown: CancellationToken,

    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl JobManager {
    /// Crea el manager e inicia workers y limpieza periódica
    pub fn new(config: JobManagerConfig) -> Self {
        let store = JobStore::new();
        let queue = JobQueue::new(config.queue_capacity);
        let executor = Arc::new(Executor::new(store.clone(), config.executor_config()));

        let mut workers = spawn_workers(executor, queue.clone(), config.workers);
        tracing::info!(workers = workers.len(), queue_capacity = config.queue_capacity, "Job manager started");

        let manager = Self {
            config,
            store,
            queue,
            cancels: Arc::new(Mutex::new(HashMap::new())),
            shutdown: CancellationToken::new(),
            workers: Mutex::new(Vec::new()),
        };

        if let Some(janitor) = manager.spawn_janitor() {
            workers.push(janitor);
        }
        *lock(&manager.workers) = workers;
        manager
    }

    /// Encola un cálculo de `n` dígitos y retorna el id sin esperar
    ///
    /// Los errores de validación nunca crean un job.
    pub fn submit(&self, n: Option<i64>) -> Result<JobId, JobError> {
        let digits = n.ok_or_else(|| JobError::InvalidArgument("Please provide n as integer".to_string()))?;
        if digits < 0 {
            return Err(JobError::InvalidArgument(format!("n must be non-negative, got {}", digits)));
        }
        if digits > self.config.max_digits {
            return Err(JobError::InvalidArgument(format!(
                "n must be at most {}, got {}",
                self.config.max_digits, digits
            )));
        }

        let id = self.store.create(digits);
        let cancel = CancellationToken::new();
        lock(&self.cancels).insert(id, cancel.clone());

        if let Err(e) = self.queue.enqueue(Dispatch { id, digits, cancel }) {
            lock(&self.cancels).remove(&id);
            self.store.remove(id);
            tracing::warn!(error = %e, "Rejected submission");
            return Err(e);
        }

        tracing::info!(job_id = %id, digits, "Job submitted");
        Ok(id)
    }

    /// Estado actual del job en el esquema externo
    pub fn poll(&self, id: &str) -> Result<StatusView, JobError> {
        let job = self.get(id)?;
        Ok(project(&job))
    }

    /// Snapshot interno del job
    pub fn get(&self, id: &str) -> Result<Job, JobError> {
        let id: JobId = id.parse()?;
        self.store.get(id)
    }

    /// Pide la cancelación de un job
    ///
    /// El job termina en `Failed` cuando el worker revisa el token.
    pub fn cancel(&self, id: &str) -> Result<(), JobError> {
        let job = self.get(id)?;
        if job.is_terminal() {
            return Err(JobError::AlreadyTerminal(job.id()));
        }

        if let Some(token) = lock(&self.cancels).get(&job.id()) {
            token.cancel();
        }
        tracing::info!(job_id = %job.id(), "Cancellation requested");
        Ok(())
    }

    /// Elimina jobs terminados antiguos y tokens que ya no sirven
    pub fn cleanup(&self) -> usize {
        let removed = purge(&self.store, &self.cancels, self.config.cleanup_age);
        if removed > 0 {
            tracing::info!(removed, "Cleaned up finished jobs");
        }
        removed
    }

    /// Cierra la cola, espera a los workers y detiene la limpieza
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.queue.close();
        let handles: Vec<_> = lock(&self.workers).drain(..).collect();
        for handle in handles {
            if handle.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }
        tracing::info!("Job manager stopped");
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn config(&self) -> &JobManagerConfig {
        &self.config
    }

    fn spawn_janitor(&self) -> Option<JoinHandle<()>> {
        let store = self.store.clone();
        let cancels = Arc::clone(&self.cancels);
        let shutdown = self.shutdown.clone();
        let age = self.config.cleanup_age;
        let interval = self.config.cleanup_interval;

        let spawned = thread::Builder::new()
            .name("pi-janitor".to_string())
            .spawn(move || {
                // Dormimos en pasos cortos para reaccionar rápido al apagado
                let step = interval.min(Duration::from_millis(100));
                let mut waited = Duration::ZERO;
                while !shutdown.is_cancelled() {
                    thread::sleep(step);
                    waited += step;
                    if waited >= interval {
                        waited = Duration::ZERO;
                        let removed = purge(&store, &cancels, age);
                        if removed > 0 {
                            tracing::info!(removed, "Cleaned up finished jobs");
                        }
                    }
                }
            });

        match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!(error = %e, "Failed to spawn cleanup thread");
                None
            }
        }
    }
}

impl Drop for JobManager {
    fn drop(&mut self) {
        self.shutdown.cancel();
        self.queue.close();
    }
}

fn purge(
    store: &JobStore,
    cancels: &Mutex<HashMap<JobId, CancellationToken>>,
    age: Duration,
) -> usize {
    let removed = store.purge_finished(age);
    lock(cancels).retain(|id, _| matches!(store.get(*id), Ok(job) if !job.is_terminal()));
    removed
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
