//! # Almacén de Jobs
//! src/jobs/store.rs
//!
//! Mapa concurrente `JobId -> Job`, única fuente de verdad del estado.
//!
//! ## Sincronización
//!
//! - Un `RwLock` protege el mapa: solo se toma en escritura para crear o
//!   eliminar jobs.
//! - Cada record tiene su propio `Mutex`: las escrituras de un worker y las
//!   lecturas de los pollers solo compiten por el record de ese job.
//! - `get` clona el record completo bajo su lock, así que nunca se observa
//!   una mezcla de campos de dos escrituras distintas.

use crate::error::JobError;
use crate::jobs::job::{FailureDetail, Job, JobId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;

type Record = Arc<Mutex<Job>>;

/// Store en memoria compartido entre submitter, workers y pollers
#[derive(Clone, Default)]
pub struct JobStore {
    jobs: Arc<RwLock<HashMap<JobId, Record>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Crea un job nuevo en `Pending` y retorna su id
    pub fn create(&self, digits: i64) -> JobId {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        // UUID v4: una colisión con un id vivo es prácticamente imposible,
        // pero igual la descartamos
        let mut id = JobId::new();
        while jobs.contains_key(&id) {
            id = JobId::new();
        }
        jobs.insert(id, Arc::new(Mutex::new(Job::new(id, digits))));
        id
    }

    /// Registra progreso y comentario. Pasa `Pending -> Running`
    pub fn update(&self, id: JobId, progress: f64, comment: String) -> Result<(), JobError> {
        let record = self.record(id)?;
        let mut job = lock(&record);
        job.record_progress(progress, comment)
    }

    /// Marca el job como `Succeeded` con progreso 1.0
    pub fn complete(&self, id: JobId, result: String) -> Result<(), JobError> {
        let record = self.record(id)?;
        let mut job = lock(&record);
        job.mark_succeeded(result)
    }

    /// Marca el job como `Failed` desde cualquier estado no terminal
    pub fn fail(&self, id: JobId, error: FailureDetail) -> Result<(), JobError> {
        let record = self.record(id)?;
        let mut job = lock(&record);
        job.mark_failed(error)
    }

    /// Snapshot consistente del job
    pub fn get(&self, id: JobId) -> Result<Job, JobError> {
        let record = self.record(id)?;
        let job = lock(&record);
        Ok(job.clone())
    }

    /// Elimina un job (usado cuando el despacho se rechaza)
    pub fn remove(&self, id: JobId) -> Option<Job> {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        let record = jobs.remove(&id)?;
        let job = lock(&record).clone();
        Some(job)
    }

    /// Elimina jobs terminados hace más de `max_age`
    ///
    /// Retorna cuántos se eliminaron
    pub fn purge_finished(&self, max_age: Duration) -> usize {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        let before = jobs.len();
        jobs.retain(|_, record| {
            let job = lock(record);
            match job.finished_for() {
                Some(age) => age < max_age,
                None => true,
            }
        });
        before - jobs.len()
    }

    /// Número de jobs almacenados
    pub fn len(&self) -> usize {
        self.jobs.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record(&self, id: JobId) -> Result<Record, JobError> {
        let jobs = self.jobs.read().unwrap_or_else(|e| e.into_inner());
        let record = jobs.get(&id).cloned();
        record.ok_or_else(|| JobError::NotFound(id.to_string()))
    }
}

fn lock(record: &Mutex<Job>) -> MutexGuard<'_, Job> {
    record.lock().unwrap_or_else(|e| e.into_inner())
}
