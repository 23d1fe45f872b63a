//! # Ejecutor de Jobs
//! src/jobs/executor.rs
//!
//! Corre una invocación de `SeriesComputer` por job y escribe en el
//! `JobStore` el progreso, el resultado o la falla.
//!
//! ```text
//! Dispatch ──► Executor::run ──► SeriesComputer::compute
//!                   ▲                     │
//!                   └── ProgressEvent ────┘
//!                   │
//!                   └──► JobStore::update / complete / fail
//! ```
//!
//! El algoritmo solo emite eventos `(completados, total)`; la traducción a
//! progreso y comentario vive aquí.

use crate::error::JobError;
use crate::jobs::comment::progress_comment;
use crate::jobs::job::{FailureDetail, JobState};
use crate::jobs::queue::{Dispatch, JobQueue};
use crate::jobs::store::JobStore;
use crate::pi::{ComputeError, RandomPacing, SeriesComputer};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Parámetros de ejecución
#[derive(Debug, Clone, Default)]
pub struct ExecutorConfig {
    /// Pausa máxima entre términos (0 = sin pausas)
    pub pacing_max_ms: u64,

    /// Tiempo máximo por job
    pub time_limit: Option<Duration>,
}

/// Ejecuta jobs escribiendo su estado en el store
pub struct Executor {
    store: JobStore,
    config: ExecutorConfig,
}

impl Executor {
    pub fn new(store: JobStore, config: ExecutorConfig) -> Self {
        Self { store, config }
    }

    /// Ejecuta un job hasta un estado terminal y retorna ese estado
    pub fn run(&self, dispatch: Dispatch) -> Result<JobState, JobError> {
        let Dispatch { id, digits, cancel } = dispatch;

        // Cancelado mientras esperaba en la cola
        if cancel.is_cancelled() {
            tracing::info!(job_id = %id, "Job cancelled before start");
            self.store.fail(id, FailureDetail::from(&ComputeError::Cancelled))?;
            return Ok(JobState::Failed);
        }

        tracing::info!(job_id = %id, digits, "Job started");
        let started = Instant::now();

        let mut computer = SeriesComputer::new()
            .with_pacer(RandomPacing::from_millis(self.config.pacing_max_ms))
            .with_cancellation(cancel);
        if let Some(limit) = self.config.time_limit {
            computer = computer.with_time_limit(limit);
        }

        let store = &self.store;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            computer.compute(digits, |event| {
                let progress = event.fraction();
                let comment = progress_comment(progress, started.elapsed());
                tracing::debug!(
                    job_id = %id,
                    completed = event.completed,
                    total = event.total,
                    "Progress"
                );
                if let Err(e) = store.update(id, progress, comment) {
                    tracing::warn!(job_id = %id, error = %e, "Failed to record progress");
                }
            })
        }));

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(Ok(value)) => {
                self.store.complete(id, value)?;
                tracing::info!(job_id = %id, elapsed_ms, "Job finished");
                Ok(JobState::Succeeded)
            }
            Ok(Err(err)) => {
                tracing::warn!(job_id = %id, error = %err, elapsed_ms, "Job failed");
                self.store.fail(id, FailureDetail::from(&err))?;
                Ok(JobState::Failed)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(job_id = %id, error = %message, "Job panicked");
                self.store.fail(id, FailureDetail::new("Panic", message))?;
                Ok(JobState::Failed)
            }
        }
    }
}

/// Lanza `count` workers que consumen la cola hasta que se cierre
pub fn spawn_workers(executor: Arc<Executor>, queue: JobQueue, count: usize) -> Vec<JoinHandle<()>> {
    (0..count)
        .map(|i| {
            let executor = Arc::clone(&executor);
            let queue = queue.clone();
            let name = format!("pi-worker-{}", i);
            thread::Builder::new()
                .name(name.clone())
                .spawn(move || worker_loop(&name, &queue, &executor))
        })
        .filter_map(|spawned| match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!(error = %e, "Failed to spawn worker thread");
                None
            }
        })
        .collect()
}

/// Loop principal del worker
fn worker_loop(name: &str, queue: &JobQueue, executor: &Executor) {
    tracing::debug!(worker = name, "Worker started");

    while let Some(dispatch) = queue.dequeue() {
        let id = dispatch.id;
        tracing::debug!(worker = name, job_id = %id, "Worker picked up job");
        if let Err(e) = executor.run(dispatch) {
            tracing::warn!(worker = name, job_id = %id, error = %e, "Could not store final state");
        }
    }

    tracing::debug!(worker = name, "Worker stopped");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "computation panicked".to_string()
    }
}
