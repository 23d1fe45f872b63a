//! # Handlers HTTP para Jobs
//! src/jobs/handlers.rs
//!
//! - `GET /calculate_pi?n=N` → `{"id": "<uuid>"}`
//! - `GET /check_progress/<id>` → `{"state", "progress", "comment", "result"}`
//! - `GET|POST /cancel/<id>` → `{"id": "<uuid>", "cancelled": true}`
//!
//! Los handlers son delgados: parsean el request, llaman al `JobManager`
//! y traducen `JobError` a un código HTTP.

use crate::error::JobError;
use crate::http::{Request, Response, StatusCode};
use crate::jobs::manager::JobManager;
use crate::router::Router;
use serde_json::json;
use std::sync::Arc;

pub const CALCULATE_PI_PATH: &str = "/calculate_pi";
pub const CHECK_PROGRESS_PREFIX: &str = "/check_progress/";
pub const CANCEL_PREFIX: &str = "/cancel/";

/// Segundos sugeridos en `Retry-After` cuando la cola está llena
const RETRY_AFTER_SECS: &str = "5";

/// Registra las rutas del servicio sobre un manager compartido
pub fn register_routes(router: &mut Router, manager: Arc<JobManager>) {
    let m = Arc::clone(&manager);
    router.register(CALCULATE_PI_PATH, move |req| calculate_pi_handler(req, &m));

    let m = Arc::clone(&manager);
    router.register_prefix(CHECK_PROGRESS_PREFIX, move |req| check_progress_handler(req, &m));

    router.register_prefix(CANCEL_PREFIX, move |req| cancel_handler(req, &manager));
}

/// Handler para /calculate_pi?n=N
///
/// `n` ausente o no entero se trata igual: 400 con
/// `{"error": "Please provide n as integer"}`.
pub fn calculate_pi_handler(req: &Request, manager: &JobManager) -> Response {
    let n = req
        .query_param("n")
        .and_then(|raw| raw.trim().parse::<i64>().ok());

    match manager.submit(n) {
        Ok(id) => Response::json(StatusCode::Ok, &json!({ "id": id })),
        Err(e) => error_response(&e),
    }
}

/// Handler para /check_progress/<id>
pub fn check_progress_handler(req: &Request, manager: &JobManager) -> Response {
    let id = req.path_tail(CHECK_PROGRESS_PREFIX).unwrap_or_default();

    match manager.poll(id) {
        Ok(view) => Response::json(StatusCode::Ok, &view),
        Err(e) => error_response(&e),
    }
}

/// Handler para /cancel/<id>
///
/// Un job ya terminado responde 409.
pub fn cancel_handler(req: &Request, manager: &JobManager) -> Response {
    let id = req.path_tail(CANCEL_PREFIX).unwrap_or_default();

    match manager.cancel(id) {
        Ok(()) => Response::json(StatusCode::Ok, &json!({ "id": id, "cancelled": true })),
        Err(e) => error_response(&e),
    }
}

/// Traduce un `JobError` a su respuesta HTTP
pub fn error_response(error: &JobError) -> Response {
    match error {
        JobError::InvalidArgument(message) => Response::error(StatusCode::BadRequest, message),
        JobError::NotFound(_) => Response::error(StatusCode::NotFound, &error.to_string()),
        JobError::AlreadyTerminal(_) => Response::error(StatusCode::Conflict, &error.to_string()),
        JobError::QueueFull { .. } => {
            Response::error(StatusCode::ServiceUnavailable, &error.to_string())
                .with_header("Retry-After", RETRY_AFTER_SECS)
        }
        JobError::Computation(_) => {
            Response::error(StatusCode::InternalServerError, &error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::job::JobId;
    use crate::jobs::manager::JobManagerConfig;
    use crate::pi::ComputeError;
    use std::thread;
    use std::time::{Duration, Instant};

    fn manager() -> JobManager {
        JobManager::new(JobManagerConfig {
            workers: 2,
            pacing_max_ms: 0,
            ..JobManagerConfig::default()
        })
    }

    fn get(path: &str) -> Request {
        Request::parse(format!("GET {} HTTP/1.0\r\n\r\n", path).as_bytes()).unwrap()
    }

    fn wait_finished(manager: &JobManager, id: &str) -> serde_json::Value {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            let response = check_progress_handler(&get(&format!("/check_progress/{}", id)), manager);
            let body = response.body_json().unwrap();
            if body["state"] != "PROGRESS" || Instant::now() > deadline {
                return body;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    // ==================== calculate_pi ====================

    #[test]
    fn test_calculate_pi_returns_id() {
        let manager = manager();
        let response = calculate_pi_handler(&get("/calculate_pi?n=3"), &manager);

        assert_eq!(response.status(), StatusCode::Ok);
        let body = response.body_json().unwrap();
        let id = body["id"].as_str().unwrap();
        assert!(id.parse::<JobId>().is_ok());
    }

    #[test]
    fn test_calculate_pi_missing_n() {
        let manager = manager();
        let response = calculate_pi_handler(&get("/calculate_pi"), &manager);

        assert_eq!(response.status(), StatusCode::BadRequest);
        assert_eq!(
            response.body_json().unwrap(),
            json!({"error": "Please provide n as integer"})
        );
        assert!(manager.store().is_empty());
    }

    #[test]
    fn test_calculate_pi_non_integer_n() {
        let manager = manager();
        for query in ["n=abc", "n=1.5", "n="] {
            let response = calculate_pi_handler(&get(&format!("/calculate_pi?{}", query)), &manager);
            assert_eq!(response.status(), StatusCode::BadRequest, "query {}", query);
            assert_eq!(response.body_json().unwrap()["error"], "Please provide n as integer");
        }
        assert!(manager.store().is_empty());
    }

    #[test]
    fn test_calculate_pi_negative_n() {
        let manager = manager();
        let response = calculate_pi_handler(&get("/calculate_pi?n=-5"), &manager);

        assert_eq!(response.status(), StatusCode::BadRequest);
        assert!(manager.store().is_empty());
    }

    #[test]
    fn test_calculate_pi_too_many_digits() {
        let manager = manager();
        let too_many = manager.config().max_digits + 1;
        let response = calculate_pi_handler(&get(&format!("/calculate_pi?n={}", too_many)), &manager);
        assert_eq!(response.status(), StatusCode::BadRequest);
    }

    // ==================== check_progress ====================

    #[test]
    fn test_check_progress_until_finished() {
        let manager = manager();
        let response = calculate_pi_handler(&get("/calculate_pi?n=5"), &manager);
        let id = response.body_json().unwrap()["id"].as_str().unwrap().to_string();

        let body = wait_finished(&manager, &id);
        assert_eq!(body["state"], "FINISHED");
        assert_eq!(body["progress"], 1.0);
        assert_eq!(body["result"], "3.14159");
    }

    #[test]
    fn test_check_progress_unknown_id() {
        let manager = manager();
        let id = JobId::new().to_string();
        let response = check_progress_handler(&get(&format!("/check_progress/{}", id)), &manager);

        assert_eq!(response.status(), StatusCode::NotFound);
        assert_eq!(
            response.body_json().unwrap()["error"],
            format!("Job not found: {}", id)
        );
    }

    #[test]
    fn test_check_progress_malformed_id() {
        let manager = manager();
        let response = check_progress_handler(&get("/check_progress/not-a-uuid"), &manager);
        assert_eq!(response.status(), StatusCode::NotFound);

        let response = check_progress_handler(&get("/check_progress/"), &manager);
        assert_eq!(response.status(), StatusCode::NotFound);
    }

    // ==================== cancel ====================

    #[test]
    fn test_cancel_unknown_id() {
        let manager = manager();
        let response = cancel_handler(&get(&format!("/cancel/{}", JobId::new())), &manager);
        assert_eq!(response.status(), StatusCode::NotFound);
    }

    #[test]
    fn test_cancel_finished_job_conflicts() {
        let manager = manager();
        let response = calculate_pi_handler(&get("/calculate_pi?n=1"), &manager);
        let id = response.body_json().unwrap()["id"].as_str().unwrap().to_string();
        assert_eq!(wait_finished(&manager, &id)["state"], "FINISHED");

        let response = cancel_handler(&get(&format!("/cancel/{}", id)), &manager);
        assert_eq!(response.status(), StatusCode::Conflict);
    }

    #[test]
    fn test_cancel_pending_job() {
        // Sin workers el job queda en la cola hasta que lo cancelamos
        let manager = JobManager::new(JobManagerConfig {
            workers: 0,
            ..JobManagerConfig::default()
        });
        let response = calculate_pi_handler(&get("/calculate_pi?n=10"), &manager);
        let id = response.body_json().unwrap()["id"].as_str().unwrap().to_string();

        let response = cancel_handler(&get(&format!("/cancel/{}", id)), &manager);
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(
            response.body_json().unwrap(),
            json!({"id": id, "cancelled": true})
        );
    }

    // ==================== error_response ====================

    #[test]
    fn test_error_response_mapping() {
        let id = JobId::new();
        let cases = [
            (JobError::InvalidArgument("bad".to_string()), StatusCode::BadRequest),
            (JobError::NotFound("x".to_string()), StatusCode::NotFound),
            (JobError::AlreadyTerminal(id), StatusCode::Conflict),
            (JobError::QueueFull { capacity: 1 }, StatusCode::ServiceUnavailable),
            (JobError::Computation(ComputeError::Cancelled), StatusCode::InternalServerError),
        ];

        for (error, status) in cases {
            assert_eq!(error_response(&error).status(), status, "{}", error);
        }
    }

    #[test]
    fn test_queue_full_sets_retry_after() {
        let response = error_response(&JobError::QueueFull { capacity: 1 });
        assert_eq!(response.header("Retry-After"), Some(RETRY_AFTER_SECS));
        assert_eq!(
            response.body_json().unwrap()["error"],
            "Queue is full (max capacity: 1)"
        );
    }

    #[test]
    fn test_register_routes() {
        let manager = Arc::new(manager());
        let mut router = Router::new();
        register_routes(&mut router, Arc::clone(&manager));
        assert_eq!(router.len(), 3);

        let response = router.route(&get("/calculate_pi?n=2"));
        assert_eq!(response.status(), StatusCode::Ok);

        let response = router.route(&get("/check_progress/missing"));
        assert_eq!(response.status(), StatusCode::NotFound);
    }
}
