//! # Sistema de Routing
//! src/router/mod.rs
//!
//! ```text
//! Request → Router → Handler → Response
//! ```
//!
//! Las rutas exactas (`/calculate_pi`) tienen prioridad sobre las de
//! prefijo (`/check_progress/`). Entre prefijos gana el más largo.
//! Sin coincidencia se responde 404.

use crate::http::{Request, Response, StatusCode};
use std::sync::Arc;

/// Un handler recibe un Request y retorna una Response
///
/// Son closures para poder capturar estado compartido (el `JobManager`).
pub type Handler = Arc<dyn Fn(&Request) -> Response + Send + Sync>;

enum Pattern {
    Exact(String),
    Prefix(String),
}

/// Router que mapea paths a handlers
#[derive(Default)]
pub struct Router {
    routes: Vec<(Pattern, Handler)>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra una ruta exacta
    ///
    /// # Ejemplo
    /// ```
    /// use pi_jobs::router::Router;
    /// use pi_jobs::http::{Request, Response, StatusCode};
    ///
    /// let mut router = Router::new();
    /// router.register("/hello", |_req: &Request| {
    ///     Response::json(StatusCode::Ok, &serde_json::json!({"message": "Hello"}))
    /// });
    ///
    /// let request = Request::parse(b"GET /hello HTTP/1.0\r\n\r\n").unwrap();
    /// assert_eq!(router.route(&request).status(), StatusCode::Ok);
    /// ```
    pub fn register<F>(&mut self, path: &str, handler: F)
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.routes
            .push((Pattern::Exact(path.to_string()), Arc::new(handler)));
    }

    /// Registra una ruta que acepta cualquier path que empiece con `prefix`
    pub fn register_prefix<F>(&mut self, prefix: &str, handler: F)
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.routes
            .push((Pattern::Prefix(prefix.to_string()), Arc::new(handler)));
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Ejecuta el handler correspondiente al path del request
    pub fn route(&self, request: &Request) -> Response {
        let mut response = match self.find(request.path()) {
            Some(handler) => handler(request),
            None => Response::error(
                StatusCode::NotFound,
                &format!("Route not found: {}", request.path()),
            ),
        };
        add_common_headers(&mut response);
        response
    }

    fn find(&self, path: &str) -> Option<&Handler> {
        let exact = self.routes.iter().find_map(|(pattern, handler)| match pattern {
            Pattern::Exact(route) if route == path => Some(handler),
            _ => None,
        });

        exact.or_else(|| {
            self.routes
                .iter()
                .filter_map(|(pattern, handler)| match pattern {
                    Pattern::Prefix(prefix) if path.starts_with(prefix.as_str()) => {
                        Some((prefix.len(), handler))
                    }
                    _ => None,
                })
                .max_by_key(|(len, _)| *len)
                .map(|(_, handler)| handler)
        })
    }
}

/// Headers comunes a todas las respuestas
pub fn add_common_headers(response: &mut Response) {
    response.add_header("Server", "pi-jobs/1.0");
    response.add_header("Connection", "close");
}
