//! # pi_jobs
//! src/lib.rs
//!
//! Servicio HTTP que calcula π a N decimales en segundo plano. El cliente
//! recibe un id de inmediato y consulta el avance con polling.
//!
//! ## Arquitectura
//!
//! - `pi`: serie de Chudnovsky en punto fijo con eventos de progreso
//! - `jobs`: registro de jobs, cola, workers y proyección de estado
//! - `http`: parsing y construcción de mensajes HTTP/1.0
//! - `router`: enrutamiento de paths a handlers
//! - `server`: listener TCP, un thread por conexión
//! - `config`: argumentos CLI y variables de entorno
//! - `error`: tipos de error compartidos
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use pi_jobs::config::Config;
//! use pi_jobs::server::Server;
//!
//! let server = Server::bind(Config::default())?;
//! server.run()?;
//! # Ok::<(), pi_jobs::error::ServerError>(())
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod jobs;
pub mod pi;
pub mod router;
pub mod server;
