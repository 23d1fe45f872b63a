//! # Sistema de Jobs
//!
//! Ejecuta cálculos de π de forma asíncrona: quien envía un job recibe un
//! id de inmediato y consulta el avance con polling.
//!
//! ## Endpoints
//!
//! - `/calculate_pi?n=N` - Encolar un cálculo
//! - `/check_progress/<id>` - Consultar estado
//! - `/cancel/<id>` - Cancelar job

pub mod comment;
pub mod executor;
pub mod handlers;
pub mod job;
pub mod manager;
pub mod queue;
pub mod status;
pub mod store;

pub use job::{FailureDetail, Job, JobId, JobState};
pub use manager::{JobManager, JobManagerConfig};
pub use status::{ExternalState, StatusView};
pub use store::JobStore;
