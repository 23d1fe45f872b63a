//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! Solo los códigos que el servicio realmente emite.

/// Códigos de estado soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok = 200,

    /// Parámetro `n` ausente o inválido, request malformado
    BadRequest = 400,

    /// Ruta o job inexistente
    NotFound = 404,

    /// Cancelación de un job ya terminado
    Conflict = 409,

    InternalServerError = 500,

    /// Cola llena
    ServiceUnavailable = 503,
}

impl StatusCode {
    /// ```
    /// use pi_jobs::http::StatusCode;
    /// assert_eq!(StatusCode::Conflict.as_u16(), 409);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::Conflict => "Conflict",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.as_u16())
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.as_u16())
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.as_u16())
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato de status line: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
