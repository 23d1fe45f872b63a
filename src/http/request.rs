//! # Parsing de Requests HTTP/1.0
//! src/http/request.rs
//!
//! Parser HTTP/1.0 mínimo: request line, headers y query string.
//!
//! ```text
//! GET /calculate_pi?n=10 HTTP/1.0\r\n
//! Host: localhost:5000\r\n
//! \r\n
//! ```

use std::collections::HashMap;

/// Métodos HTTP soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GET,
    HEAD,
    POST,
}

impl Method {
    fn parse(s: &str) -> Result<Self, ParseError> {
        match s {
            "GET" => Ok(Method::GET),
            "HEAD" => Ok(Method::HEAD),
            "POST" => Ok(Method::POST),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
        }
    }
}

/// Request HTTP parseado
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    query_params: HashMap<String, String>,
    headers: HashMap<String, String>,
    version: String,
}

/// Errores de parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Empty request")]
    EmptyRequest,

    #[error("Invalid request line format")]
    InvalidRequestLine,

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("Invalid HTTP version: {0}")]
    InvalidHttpVersion(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

impl Request {
    /// Parsea un request desde bytes
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use pi_jobs::http::Request;
    ///
    /// let raw = b"GET /calculate_pi?n=10 HTTP/1.0\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.path(), "/calculate_pi");
    /// assert_eq!(request.query_param("n"), Some("10"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        let text = std::str::from_utf8(buffer).map_err(|_| ParseError::InvalidRequestLine)?;
        if text.trim().is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        let mut lines = text.split("\r\n");
        let request_line = lines.next().ok_or(ParseError::EmptyRequest)?;
        let (method, path, query_params, version) = Self::parse_request_line(request_line)?;

        let mut headers = HashMap::new();
        for line in lines {
            // La línea vacía marca el fin de los headers
            if line.trim().is_empty() {
                break;
            }
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| ParseError::InvalidHeader(line.to_string()))?;
            headers.insert(name.trim().to_string(), value.trim().to_string());
        }

        Ok(Request {
            method,
            path,
            query_params,
            headers,
            version,
        })
    }

    /// `METHOD /path?query VERSION`
    fn parse_request_line(
        line: &str,
    ) -> Result<(Method, String, HashMap<String, String>, String), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let [method, target, version] = parts.as_slice() else {
            return Err(ParseError::InvalidRequestLine);
        };

        let method = Method::parse(method)?;
        if *version != "HTTP/1.0" && *version != "HTTP/1.1" {
            return Err(ParseError::InvalidHttpVersion(version.to_string()));
        }

        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (*target, ""),
        };

        Ok((
            method,
            url_decode(path),
            parse_query_string(query),
            version.to_string(),
        ))
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Resto del path después de `prefix`, si el path empieza con él
    ///
    /// `/check_progress/abc` con prefix `/check_progress/` da `Some("abc")`
    pub fn path_tail(&self, prefix: &str) -> Option<&str> {
        self.path.strip_prefix(prefix)
    }

    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(|s| s.as_str())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

/// `a=1&b=hola%20mundo` -> {"a": "1", "b": "hola mundo"}
fn parse_query_string(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|param| !param.is_empty())
        .map(|param| match param.split_once('=') {
            Some((key, value)) => (url_decode(key), url_decode(value)),
            None => (url_decode(param), String::new()),
        })
        .collect()
}

/// Decodifica `%XX` y `+`; las secuencias inválidas se dejan tal cual
fn url_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
                match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    Some(byte) => {
                        out.push(byte);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_get() {
        let request = Request::parse(b"GET / HTTP/1.0\r\n\r\n").unwrap();
        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.path(), "/");
        assert!(request.query_params().is_empty());
        assert_eq!(request.version(), "HTTP/1.0");
    }

    #[test]
    fn test_parse_with_query_params() {
        let request = Request::parse(b"GET /calculate_pi?n=10&x=y HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.path(), "/calculate_pi");
        assert_eq!(request.query_param("n"), Some("10"));
        assert_eq!(request.query_param("x"), Some("y"));
        assert_eq!(request.query_param("missing"), None);
    }

    #[test]
    fn test_param_without_value() {
        let request = Request::parse(b"GET /calculate_pi?n HTTP/1.0\r\n\r\n").unwrap();
        assert_eq!(request.query_param("n"), Some(""));
    }

    #[test]
    fn test_path_tail() {
        let request = Request::parse(b"POST /cancel/abc-123 HTTP/1.0\r\n\r\n").unwrap();
        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.path_tail("/cancel/"), Some("abc-123"));
        assert_eq!(request.path_tail("/check_progress/"), None);
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let raw = b"GET / HTTP/1.0\r\nHost: localhost:5000\r\nUser-Agent: test\r\n\r\n";
        let request = Request::parse(raw).unwrap();
        assert_eq!(request.header("host"), Some("localhost:5000"));
        assert_eq!(request.header("User-Agent"), Some("test"));
    }

    #[test]
    fn test_url_decode() {
        assert_eq!(url_decode("hello%20world"), "hello world");
        assert_eq!(url_decode("a+b"), "a b");
        assert_eq!(url_decode("%2D5"), "-5");
        assert_eq!(url_decode("100%"), "100%");
        assert_eq!(url_decode("%zz"), "%zz");
    }

    #[test]
    fn test_invalid_method() {
        let result = Request::parse(b"DELETE / HTTP/1.0\r\n\r\n");
        assert!(matches!(result, Err(ParseError::UnsupportedMethod(_))));
    }

    #[test]
    fn test_invalid_version() {
        let result = Request::parse(b"GET / HTTP/2.0\r\n\r\n");
        assert!(matches!(result, Err(ParseError::InvalidHttpVersion(_))));
    }

    #[test]
    fn test_empty_request() {
        assert!(matches!(Request::parse(b""), Err(ParseError::EmptyRequest)));
    }

    #[test]
    fn test_invalid_request_line() {
        let result = Request::parse(b"GET\r\n\r\n");
        assert!(matches!(result, Err(ParseError::InvalidRequestLine)));
    }

    #[test]
    fn test_invalid_header() {
        let result = Request::parse(b"GET / HTTP/1.0\r\nnot a header\r\n\r\n");
        assert!(matches!(result, Err(ParseError::InvalidHeader(_))));
    }
}
