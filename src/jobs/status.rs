//! # Proyección de Estado (contrato de polling)
//! src/jobs/status.rs
//!
//! Traduce un snapshot de `Job` al esquema externo:
//!
//! ```json
//! {"state": "PROGRESS", "progress": 0.42, "comment": "Working...", "result": null}
//! ```
//!
//! | interno     | state      | progress        | result                 |
//! |-------------|------------|-----------------|------------------------|
//! | Pending     | `PROGRESS` | 0               | null                   |
//! | Running     | `PROGRESS` | en vivo         | null                   |
//! | Succeeded   | `FINISHED` | 1               | dígitos                |
//! | Failed      | `UNKNOWN`  | último guardado | payload del error      |
//!
//! Un job fallido se reporta como `UNKNOWN` y no como un estado de error
//! explícito: los clientes existentes dependen de ese vocabulario.

use crate::jobs::job::{Job, JobState};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Estado externo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExternalState {
    Progress,
    Finished,
    Unknown,
}

/// Respuesta de polling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusView {
    pub state: ExternalState,
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub result: Value,
}

/// Proyecta un snapshot al esquema externo
pub fn project(job: &Job) -> StatusView {
    match job.state() {
        JobState::Pending => StatusView {
            state: ExternalState::Progress,
            progress: 0.0,
            comment: None,
            result: Value::Null,
        },
        JobState::Running => StatusView {
            state: ExternalState::Progress,
            progress: job.progress(),
            comment: job.comment().map(str::to_string),
            result: Value::Null,
        },
        JobState::Succeeded => StatusView {
            state: ExternalState::Finished,
            progress: 1.0,
            comment: job.comment().map(str::to_string),
            result: job.result().map_or(Value::Null, |digits| Value::String(digits.to_string())),
        },
        JobState::Failed => StatusView {
            state: ExternalState::Unknown,
            progress: job.progress(),
            comment: None,
            result: job
                .error()
                .and_then(|detail| serde_json::to_value(detail).ok())
                .unwrap_or_else(|| Value::String("unknown error".to_string())),
        },
    }
}
