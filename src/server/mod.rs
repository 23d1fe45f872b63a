//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Escucha en un puerto, acepta conexiones y despacha cada request al
//! router en su propio thread.

pub mod tcp;

pub use tcp::Server;
