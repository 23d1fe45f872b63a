//! # Estructura de Job
//! src/jobs/job.rs
//!
//! Representa un trabajo con su estado interno, progreso y resultado.
//!
//! ## Máquina de estados
//!
//! ```text
//! Pending ──► Running ──► Succeeded
//!    │           │
//!    └───────────┴──────► Failed
//! ```
//!
//! Pending puede saltar directo a un estado terminal. Los estados
//! terminales son absorbentes: el record ya no cambia.

use crate::error::JobError;
use crate::pi::ComputeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Identificador opaco y único de un job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = JobError;

    /// Un string que no es UUID nunca puede nombrar a un job
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(JobId)
            .map_err(|_| JobError::NotFound(s.to_string()))
    }
}

/// Estados internos de un job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Creado, esperando un worker
    Pending,

    /// Un worker lo está ejecutando
    Running,

    /// Terminó con resultado
    Succeeded,

    /// Terminó con error
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Running => "running",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}

/// Detalle de una falla, tal como se expone a quien hace polling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDetail {
    #[serde(rename = "exc_type")]
    pub error_type: String,

    #[serde(rename = "exc_message")]
    pub message: String,
}

impl FailureDetail {
    pub fn new(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.into(),
            message: message.into(),
        }
    }
}

impl From<&ComputeError> for FailureDetail {
    fn from(err: &ComputeError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

/// Record de un job
///
/// Los clones son snapshots: el store entrega copias completas tomadas
/// bajo el lock del record.
#[derive(Debug, Clone)]
pub struct Job {
    id: JobId,
    digits: i64,
    state: JobState,
    progress: f64,
    comment: Option<String>,
    result: Option<String>,
    error: Option<FailureDetail>,
    created_at: Instant,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
}

impl Job {
    /// Crea un job en `Pending` con progreso 0
    pub fn new(id: JobId, digits: i64) -> Self {
        Self {
            id,
            digits,
            state: JobState::Pending,
            progress: 0.0,
            comment: None,
            result: None,
            error: None,
            created_at: Instant::now(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn digits(&self) -> i64 {
        self.digits
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn error(&self) -> Option<&FailureDetail> {
        self.error.as_ref()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Tiempo desde la creación
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Tiempo de ejecución (si ya empezó)
    pub fn execution_time(&self) -> Option<Duration> {
        self.started_at.map(|start| match self.finished_at {
            Some(end) => end.duration_since(start),
            None => start.elapsed(),
        })
    }

    /// Tiempo desde que llegó a un estado terminal
    pub fn finished_for(&self) -> Option<Duration> {
        self.finished_at.map(|at| at.elapsed())
    }

    /// Registra progreso; la primera llamada pasa de `Pending` a `Running`
    ///
    /// El progreso nunca retrocede: un valor menor al guardado se ignora,
    /// pero el comentario sí se actualiza.
    pub(crate) fn record_progress(&mut self, progress: f64, comment: String) -> Result<(), JobError> {
        self.ensure_open()?;
        if progress.is_nan() {
            return Err(JobError::InvalidArgument("progress must be a number".to_string()));
        }
        if self.state == JobState::Pending {
            self.state = JobState::Running;
            self.started_at = Some(Instant::now());
        }
        self.progress = self.progress.max(progress.clamp(0.0, 1.0));
        self.comment = Some(comment);
        Ok(())
    }

    /// Marca el job como completado con su resultado
    pub(crate) fn mark_succeeded(&mut self, result: String) -> Result<(), JobError> {
        self.ensure_open()?;
        self.state = JobState::Succeeded;
        self.progress = 1.0;
        self.result = Some(result);
        self.finished_at = Some(Instant::now());
        Ok(())
    }

    /// Marca el job como fallido; conserva el último progreso registrado
    pub(crate) fn mark_failed(&mut self, error: FailureDetail) -> Result<(), JobError> {
        self.ensure_open()?;
        self.state = JobState::Failed;
        self.error = Some(error);
        self.finished_at = Some(Instant::now());
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), JobError> {
        if self.is_terminal() {
            return Err(JobError::AlreadyTerminal(self.id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn new_job() -> Job {
        Job::new(JobId::new(), 10)
    }

    #[test]
    fn test_job_creation() {
        let job = new_job();
        assert_eq!(job.state(), JobState::Pending);
        assert_eq!(job.progress(), 0.0);
        assert!(job.comment().is_none());
        assert!(job.result().is_none());
        assert!(job.error().is_none());
        assert!(job.execution_time().is_none());
        assert_eq!(job.digits(), 10);
    }

    #[test]
    fn test_job_lifecycle() {
        let mut job = new_job();

        job.record_progress(0.25, "working".to_string()).unwrap();
        assert_eq!(job.state(), JobState::Running);
        assert_eq!(job.progress(), 0.25);
        assert_eq!(job.comment(), Some("working"));
        assert!(job.execution_time().is_some());

        job.mark_succeeded("3.1415926536".to_string()).unwrap();
        assert_eq!(job.state(), JobState::Succeeded);
        assert_eq!(job.progress(), 1.0);
        assert_eq!(job.result(), Some("3.1415926536"));
        assert!(job.error().is_none());
        assert!(job.finished_for().is_some());
    }

    #[test]
    fn test_pending_can_finish_directly() {
        let mut job = new_job();
        job.mark_failed(FailureDetail::new("Cancelled", "Computation was cancelled")).unwrap();
        assert_eq!(job.state(), JobState::Failed);
        assert!(job.result().is_none());
        assert_eq!(job.error().unwrap().error_type, "Cancelled");

        let mut job = new_job();
        job.mark_succeeded("3.".to_string()).unwrap();
        assert_eq!(job.state(), JobState::Succeeded);
    }

    #[test]
    fn test_progress_is_monotonic_and_clamped() {
        let mut job = new_job();
        job.record_progress(0.5, "a".to_string()).unwrap();
        job.record_progress(0.3, "b".to_string()).unwrap();
        assert_eq!(job.progress(), 0.5);
        assert_eq!(job.comment(), Some("b"));

        job.record_progress(7.0, "c".to_string()).unwrap();
        assert_eq!(job.progress(), 1.0);

        assert_matches!(
            job.record_progress(f64::NAN, "d".to_string()),
            Err(JobError::InvalidArgument(_))
        );
        assert_eq!(job.progress(), 1.0);
    }

    #[test]
    fn test_terminal_states_are_absorbing() {
        let mut job = new_job();
        job.record_progress(0.4, "x".to_string()).unwrap();
        job.mark_failed(FailureDetail::new("Panic", "boom")).unwrap();

        assert_matches!(job.record_progress(0.9, "y".to_string()), Err(JobError::AlreadyTerminal(_)));
        assert_matches!(job.mark_succeeded("3.1".to_string()), Err(JobError::AlreadyTerminal(_)));
        assert_matches!(job.mark_failed(FailureDetail::new("Other", "z")), Err(JobError::AlreadyTerminal(_)));

        assert_eq!(job.state(), JobState::Failed);
        assert_eq!(job.progress(), 0.4);
        assert!(job.result().is_none());
        assert_eq!(job.error().unwrap().message, "boom");
    }

    #[test]
    fn test_job_id_parsing() {
        let id = JobId::new();
        let parsed: JobId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);

        assert_matches!("not-a-uuid".parse::<JobId>(), Err(JobError::NotFound(s)) if s == "not-a-uuid");
    }

    #[test]
    fn test_failure_detail_serialization() {
        let detail = FailureDetail::from(&ComputeError::Cancelled);
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["exc_type"], "Cancelled");
        assert_eq!(json["exc_message"], "Computation was cancelled");
    }

    #[test]
    fn test_state_names() {
        assert_eq!(JobState::Pending.as_str(), "pending");
        assert!(!JobState::Running.is_terminal());
        assert!(JobState::Succeeded.is_terminal());
        assert!(JobState::Failed.is_terminal());
    }
}
