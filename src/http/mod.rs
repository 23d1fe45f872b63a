//! # Módulo HTTP
//! src/http/mod.rs
//!
//! HTTP/1.0 escrito a mano sobre `TcpStream`: una conexión por request,
//! sin keep-alive ni chunked encoding.

pub mod request;
pub mod response;
pub mod status;

pub use request::{Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
