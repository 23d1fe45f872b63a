//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Un thread por conexión. Cada conexión lleva un único request HTTP/1.0
//! y se cierra después de responder.

use crate::config::Config;
use crate::error::ServerError;
use crate::http::{Request, Response, StatusCode};
use crate::jobs::handlers::register_routes;
use crate::jobs::{JobManager, JobManagerConfig};
use crate::router::{add_common_headers, Router};
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Tamaño máximo aceptado para request line + headers
const MAX_REQUEST_BYTES: usize = 8192;

/// Tiempo máximo esperando bytes del cliente
const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Servidor HTTP/1.0 del servicio de π
pub struct Server {
    config: Config,
    router: Arc<Router>,
    manager: Arc<JobManager>,
    listener: TcpListener,
}

impl Server {
    /// Valida la configuración, arranca el `JobManager` y hace bind
    pub fn bind(config: Config) -> Result<Self, ServerError> {
        config.validate()?;

        let listener = TcpListener::bind(config.address())?;
        let manager = Arc::new(JobManager::new(JobManagerConfig::from_config(&config)));

        let mut router = Router::new();
        register_routes(&mut router, Arc::clone(&manager));

        Ok(Self {
            config,
            router: Arc::new(router),
            manager,
            listener,
        })
    }

    /// Dirección real (útil con puerto 0)
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn manager(&self) -> &Arc<JobManager> {
        &self.manager
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Acepta conexiones indefinidamente
    pub fn run(&self) -> Result<(), ServerError> {
        let address = self.local_addr()?;
        tracing::info!(%address, "Server listening");

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let router = Arc::clone(&self.router);
                    let spawned = thread::Builder::new()
                        .name("http-conn".to_string())
                        .spawn(move || {
                            if let Err(e) = handle_connection(stream, &router) {
                                tracing::warn!(error = %e, "Connection error");
                            }
                        });
                    if let Err(e) = spawned {
                        tracing::error!(error = %e, "Failed to spawn connection thread");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Failed to accept connection"),
            }
        }

        Ok(())
    }
}

/// Lee un request, lo enruta y escribe la respuesta
fn handle_connection(mut stream: TcpStream, router: &Router) -> io::Result<()> {
    let start = Instant::now();
    let request_id = Uuid::new_v4().simple().to_string();
    stream.set_read_timeout(Some(READ_TIMEOUT))?;

    let raw = read_head(&mut stream)?;
    if raw.is_empty() {
        tracing::debug!(request_id = %request_id, "Connection closed without data");
        return Ok(());
    }

    let (mut response, path) = match Request::parse(&raw) {
        Ok(request) => {
            tracing::debug!(
                request_id = %request_id,
                method = request.method().as_str(),
                path = request.path(),
                "Request received"
            );
            let response = router.route(&request);
            (response, request.path().to_string())
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Malformed request");
            let mut response =
                Response::error(StatusCode::BadRequest, &format!("Invalid request: {}", e));
            add_common_headers(&mut response);
            (response, String::new())
        }
    };

    response.add_header("X-Request-Id", &request_id);
    stream.write_all(&response.to_bytes())?;
    stream.flush()?;

    tracing::info!(
        request_id = %request_id,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Request handled"
    );
    Ok(())
}

/// Lee hasta el fin de los headers, EOF o el tamaño máximo
fn read_head(stream: &mut impl Read) -> io::Result<Vec<u8>> {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let read = stream.read(&mut chunk)?;
        if read == 0 {
            break;
        }
        raw.extend_from_slice(&chunk[..read]);
        if raw.windows(4).any(|w| w == b"\r\n\r\n") || raw.len() >= MAX_REQUEST_BYTES {
            break;
        }
    }

    raw.truncate(MAX_REQUEST_BYTES);
    Ok(raw)
}
